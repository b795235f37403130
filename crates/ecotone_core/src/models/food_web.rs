use super::floored;
use crate::params::{ParamSpec, ParameterSet};
use crate::traits::VectorField;
use anyhow::Result;

/// Two-patch, two-consumer food web with adaptive dispersal.
///
/// Each patch holds a chemostat nutrient pool `N`, an autotroph `A` and two
/// consumers `H1`, `H2`. Locally the autotroph takes up nutrient with Monod
/// kinetics `r(N) = r_max N / (N_h + N)` and each consumer grazes with a
/// Type II response `g_i(A) = a_i A / (1 + a_i h A)`; every biological
/// compartment is diluted at rate `D`. Between patches, nutrient and
/// autotroph diffuse at fixed rates while each consumer disperses at a
/// density-dependent rate
///
/// ```text
/// d_Hi(A) = d_Hmax_i / (1 + exp(k_i (A - x0_i)))
/// x0_i    = D / (a_i (e - h D))
/// ```
///
/// where `x0_i` is the autotroph density at which consumer `i` has zero net
/// growth. `k_i = 0` gives random dispersal at half the maximal rate; large
/// `k_i` concentrates emigration on patches below the zero-net-growth point.
///
/// State layout: `[N_a, N_b, A_a, A_b, H1_a, H1_b, H2_a, H2_b]`.
pub struct FoodWeb {
    supply: usize,
    dilution: usize,
    half_sat: usize,
    r_max: usize,
    handling: usize,
    efficiency: usize,
    d_nutrient: usize,
    d_autotroph: usize,
    a1: usize,
    a2: usize,
    k1: usize,
    k2: usize,
    d_hmax1: usize,
    d_hmax2: usize,
}

/// Defaults from the original model; the `k_i` slider ranges are its
/// "random dispersal (0) to adaptive dispersal (2)" axis. The maximal
/// dispersal rates came from free-form text entry, so their ranges are wide.
pub const PARAMS: [ParamSpec; 14] = [
    ParamSpec::new("S", "nutrient supply concentration", 4.8, 0.0, 10.0),
    ParamSpec::new("D", "dilution rate", 0.3, 0.0, 1.0),
    ParamSpec::new("N_h", "nutrient half-saturation", 1.5, 0.0, 5.0),
    ParamSpec::new("r_max", "autotroph growth rate", 0.7, 0.0, 2.0),
    ParamSpec::new("h", "handling time", 0.53, 0.0, 2.0),
    ParamSpec::new("e", "conversion efficiency", 0.33, 0.0, 1.0),
    ParamSpec::new("d_N", "nutrient dispersal rate", 1.0, 0.0, 5.0),
    ParamSpec::new("d_A", "autotroph dispersal rate", 0.001, 0.0, 1.0),
    ParamSpec::new("a_1", "attack rate of consumer 1", 1.0, 0.0, 3.0),
    ParamSpec::new("a_2", "attack rate of consumer 2", 1.0, 0.0, 3.0),
    ParamSpec::new("k_1", "dispersal adaptability of consumer 1", 0.0, 0.0, 2.0),
    ParamSpec::new("k_2", "dispersal adaptability of consumer 2", 0.0, 0.0, 2.0),
    ParamSpec::new("d_Hmax1", "maximal dispersal rate of consumer 1", 10.0, 0.0, 100.0),
    ParamSpec::new("d_Hmax2", "maximal dispersal rate of consumer 2", 0.01, 0.0, 100.0),
];

/// Autotroph density at which a consumer with the given attack rate has zero
/// net growth: the inflection point of its dispersal sigmoid. The
/// denominator is floored so `e <= h D` (no viable density at all) degrades
/// smoothly instead of dividing by zero.
pub fn zero_net_growth_point(attack: f64, efficiency: f64, handling: f64, dilution: f64) -> f64 {
    dilution / floored(attack * (efficiency - handling * dilution))
}

impl FoodWeb {
    pub fn new(params: &ParameterSet) -> Result<Self> {
        Ok(Self {
            supply: params.require("S")?,
            dilution: params.require("D")?,
            half_sat: params.require("N_h")?,
            r_max: params.require("r_max")?,
            handling: params.require("h")?,
            efficiency: params.require("e")?,
            d_nutrient: params.require("d_N")?,
            d_autotroph: params.require("d_A")?,
            a1: params.require("a_1")?,
            a2: params.require("a_2")?,
            k1: params.require("k_1")?,
            k2: params.require("k_2")?,
            d_hmax1: params.require("d_Hmax1")?,
            d_hmax2: params.require("d_Hmax2")?,
        })
    }
}

impl VectorField for FoodWeb {
    fn dimension(&self) -> usize {
        8
    }

    fn eval(&self, _t: f64, state: &[f64], params: &ParameterSet, out: &mut [f64]) {
        let s = params.value_at(self.supply);
        let dil = params.value_at(self.dilution);
        let n_h = params.value_at(self.half_sat);
        let r_max = params.value_at(self.r_max);
        let h = params.value_at(self.handling);
        let e = params.value_at(self.efficiency);
        let d_n = params.value_at(self.d_nutrient);
        let d_a = params.value_at(self.d_autotroph);
        let a1 = params.value_at(self.a1);
        let a2 = params.value_at(self.a2);
        let k1 = params.value_at(self.k1);
        let k2 = params.value_at(self.k2);
        let d_hmax1 = params.value_at(self.d_hmax1);
        let d_hmax2 = params.value_at(self.d_hmax2);

        let (n_a, n_b) = (state[0], state[1]);
        let (aut_a, aut_b) = (state[2], state[3]);
        let (h1_a, h1_b) = (state[4], state[5]);
        let (h2_a, h2_b) = (state[6], state[7]);

        // Monod nutrient uptake per patch.
        let r_a = r_max * n_a / floored(n_h + n_a);
        let r_b = r_max * n_b / floored(n_h + n_b);

        // Type II grazing per consumer and patch.
        let g1_a = a1 * aut_a / floored(1.0 + a1 * h * aut_a);
        let g1_b = a1 * aut_b / floored(1.0 + a1 * h * aut_b);
        let g2_a = a2 * aut_a / floored(1.0 + a2 * h * aut_a);
        let g2_b = a2 * aut_b / floored(1.0 + a2 * h * aut_b);

        // Density-dependent dispersal around each consumer's zero-net-growth
        // point.
        let x01 = zero_net_growth_point(a1, e, h, dil);
        let x02 = zero_net_growth_point(a2, e, h, dil);
        let d1_a = d_hmax1 / (1.0 + (k1 * (aut_a - x01)).exp());
        let d1_b = d_hmax1 / (1.0 + (k1 * (aut_b - x01)).exp());
        let d2_a = d_hmax2 / (1.0 + (k2 * (aut_a - x02)).exp());
        let d2_b = d_hmax2 / (1.0 + (k2 * (aut_b - x02)).exp());

        // Nutrients: chemostat supply, uptake, diffusive exchange.
        out[0] = dil * (s - n_a) - r_a * aut_a + d_n * (n_b - n_a);
        out[1] = dil * (s - n_b) - r_b * aut_b + d_n * (n_a - n_b);

        // Autotrophs: growth, grazing losses, dilution, diffusive exchange.
        out[2] = r_a * aut_a - (g1_a * h1_a + g2_a * h2_a) - dil * aut_a + d_a * (aut_b - aut_a);
        out[3] = r_b * aut_b - (g1_b * h1_b + g2_b * h2_b) - dil * aut_b + d_a * (aut_a - aut_b);

        // Consumers: assimilation, dilution, adaptive emigration/immigration.
        out[4] = e * g1_a * h1_a - dil * h1_a - d1_a * h1_a + d1_b * h1_b;
        out[5] = e * g1_b * h1_b - dil * h1_b - d1_b * h1_b + d1_a * h1_a;
        out[6] = e * g2_a * h2_a - dil * h2_a - d2_a * h2_a + d2_b * h2_b;
        out[7] = e * g2_b * h2_b - dil * h2_b - d2_b * h2_b + d2_a * h2_a;
    }
}

#[cfg(test)]
mod tests {
    use super::{zero_net_growth_point, FoodWeb, PARAMS};
    use crate::params::ParameterSet;
    use crate::solver::{integrate, SolverOptions};
    use crate::traits::VectorField;
    use crate::trajectory::TimeGrid;

    fn build() -> (FoodWeb, ParameterSet) {
        let params = ParameterSet::from_specs(&PARAMS);
        let field = FoodWeb::new(&params).expect("field");
        (field, params)
    }

    #[test]
    fn zero_net_growth_point_matches_closed_form() {
        // D / (a (e - h D)) with the default parameters.
        let x0 = zero_net_growth_point(1.0, 0.33, 0.53, 0.3);
        assert!((x0 - 0.3 / (0.33 - 0.53 * 0.3)).abs() < 1e-12);
    }

    #[test]
    fn zero_net_growth_point_survives_degenerate_denominator() {
        // e <= h D leaves the consumer without a viable density; the floor
        // keeps the reference point finite.
        let x0 = zero_net_growth_point(1.0, 0.1, 1.0, 0.3);
        assert!(x0.is_finite());
        assert!(x0 > 0.0);
    }

    #[test]
    fn zero_adaptability_gives_random_dispersal_at_half_rate() {
        // k = 0 makes the sigmoid flat: every patch emigrates at d_Hmax / 2.
        let (field, params) = build();
        let state = [2.0, 2.5, 2.5, 2.0, 0.08, 0.4, 0.05, 0.1];
        let mut out = [0.0; 8];
        field.eval(0.0, &state, &params, &mut out);

        // With d_H1 = 5 on both patches, consumer-1 exchange is
        // 5 * (H1_b - H1_a) on patch a; check it against a hand-built total.
        let dil = 0.3;
        let e = 0.33;
        let g1_a = 2.5 / (1.0 + 0.53 * 2.5);
        let expected = e * g1_a * 0.08 - dil * 0.08 + 5.0 * (0.4 - 0.08);
        assert!((out[4] - expected).abs() < 1e-12);
    }

    #[test]
    fn mirrored_state_produces_mirrored_derivative() {
        let (field, params) = build();
        let state = [2.0, 2.5, 2.5, 2.0, 0.08, 0.4, 0.05, 0.1];
        let mirrored = [2.5, 2.0, 2.0, 2.5, 0.4, 0.08, 0.1, 0.05];
        let mut out = [0.0; 8];
        let mut out_mirrored = [0.0; 8];
        field.eval(0.0, &state, &params, &mut out);
        field.eval(0.0, &mirrored, &params, &mut out_mirrored);
        for pair in 0..4 {
            assert_eq!(out[2 * pair], out_mirrored[2 * pair + 1]);
            assert_eq!(out[2 * pair + 1], out_mirrored[2 * pair]);
        }
    }

    #[test]
    fn symmetric_patches_stay_symmetric() {
        // Identical initial densities plus symmetric parameters keep both
        // patches on the same trajectory at every sampled time.
        let (field, params) = build();
        let initial = [2.0, 2.0, 2.5, 2.5, 0.08, 0.08, 0.05, 0.05];
        let grid = TimeGrid::uniform_steps(0.0, 1.0, 201).expect("grid");
        let traj = integrate(&field, &initial, &grid, &params, &SolverOptions::default())
            .expect("integration should succeed");

        for row in 0..traj.len() {
            for pair in 0..4 {
                let a = traj.value(row, 2 * pair);
                let b = traj.value(row, 2 * pair + 1);
                assert!(
                    (a - b).abs() < 1e-12,
                    "row {row}, pair {pair}: {a} vs {b}"
                );
            }
        }
    }

    #[test]
    fn extreme_parameters_keep_the_derivative_finite() {
        let (field, mut params) = build();
        params.set("h", 2.0);
        params.set("D", 1.0);
        params.set("e", 0.0);
        params.set("k_1", 2.0);
        params.set("d_Hmax1", 100.0);
        let state = [2.0, 2.5, 2.5, 2.0, 0.08, 0.4, 0.05, 0.1];
        let mut out = [0.0; 8];
        field.eval(0.0, &state, &params, &mut out);
        assert!(out.iter().all(|v| v.is_finite()));
    }
}
