//! The ecological model variants. Each file holds one `VectorField`
//! implementation plus the parameter specs (names, defaults and control
//! ranges) that the factory turns into a `ParameterSet`.

pub mod food_web;
pub mod lotka_volterra;
pub mod rosenzweig_macarthur;

pub use food_web::FoodWeb;
pub use lotka_volterra::LotkaVolterra;
pub use rosenzweig_macarthur::RosenzweigMacArthur;

/// Floor applied to every denominator so parameter values pushed outside
/// their intended domain degrade smoothly instead of producing infinities
/// or NaNs.
pub(crate) const DENOM_FLOOR: f64 = 1e-9;

pub(crate) fn floored(denominator: f64) -> f64 {
    denominator.max(DENOM_FLOOR)
}

#[cfg(test)]
mod tests {
    use super::{floored, DENOM_FLOOR};

    #[test]
    fn floored_clamps_zero_and_negative_denominators() {
        assert_eq!(floored(2.0), 2.0);
        assert_eq!(floored(0.0), DENOM_FLOOR);
        assert_eq!(floored(-3.5), DENOM_FLOOR);
    }
}
