use super::floored;
use crate::params::{ParamSpec, ParameterSet};
use crate::traits::VectorField;
use anyhow::Result;

/// Predator-prey dynamics with logistic prey growth and a saturating
/// (Type II) functional response `f(N) = a N / (1 + a h N)`:
///
/// ```text
/// Ndot = r (1 - N/K) N - f(N) P
/// Pdot = c f(N) P - d P
/// ```
///
/// State layout: `[N (prey), P (predator)]`.
pub struct RosenzweigMacArthur {
    r: usize,
    a: usize,
    c: usize,
    d: usize,
    k: usize,
    h: usize,
}

/// Defaults and control ranges of the original interactive sliders.
pub const PARAMS: [ParamSpec; 6] = [
    ParamSpec::new("r", "growth rate", 1.0, 0.0, 5.0),
    ParamSpec::new("a", "attack rate", 0.5, 0.0, 1.0),
    ParamSpec::new("c", "conversion efficiency", 0.25, 0.0, 0.75),
    ParamSpec::new("d", "death rate", 0.1, 0.0, 1.0),
    ParamSpec::new("K", "carrying capacity", 6.0, 0.0, 10.0),
    ParamSpec::new("h", "handling time", 1.5, 0.0, 2.3),
];

impl RosenzweigMacArthur {
    pub fn new(params: &ParameterSet) -> Result<Self> {
        Ok(Self {
            r: params.require("r")?,
            a: params.require("a")?,
            c: params.require("c")?,
            d: params.require("d")?,
            k: params.require("K")?,
            h: params.require("h")?,
        })
    }
}

impl VectorField for RosenzweigMacArthur {
    fn dimension(&self) -> usize {
        2
    }

    fn eval(&self, _t: f64, state: &[f64], params: &ParameterSet, out: &mut [f64]) {
        let n = state[0];
        let p = state[1];
        let r = params.value_at(self.r);
        let a = params.value_at(self.a);
        let c = params.value_at(self.c);
        let d = params.value_at(self.d);
        let k = params.value_at(self.k);
        let h = params.value_at(self.h);

        let response = a * n / floored(1.0 + a * h * n);

        out[0] = r * (1.0 - n / floored(k)) * n - response * p;
        out[1] = c * response * p - d * p;
    }
}
