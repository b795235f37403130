use crate::params::{ParamSpec, ParameterSet};
use crate::traits::VectorField;
use anyhow::Result;

/// Mass-action predator-prey dynamics:
///
/// ```text
/// Ndot = r N - a N P
/// Pdot = c a N P - d P
/// ```
///
/// State layout: `[N (prey), P (predator)]`.
pub struct LotkaVolterra {
    r: usize,
    a: usize,
    c: usize,
    d: usize,
}

/// Defaults and control ranges of the original interactive sliders.
pub const PARAMS: [ParamSpec; 4] = [
    ParamSpec::new("r", "growth rate", 1.0, 0.0, 5.0),
    ParamSpec::new("a", "attack rate", 1.0, 0.0, 2.5),
    ParamSpec::new("c", "conversion efficiency", 0.25, 0.0, 5.0),
    ParamSpec::new("d", "death rate", 0.2, 0.0, 1.0),
];

impl LotkaVolterra {
    /// Resolves parameter indices against `params` once; evaluation reads by
    /// index afterwards.
    pub fn new(params: &ParameterSet) -> Result<Self> {
        Ok(Self {
            r: params.require("r")?,
            a: params.require("a")?,
            c: params.require("c")?,
            d: params.require("d")?,
        })
    }
}

impl VectorField for LotkaVolterra {
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

        out[0] = r * n - a * n * p;
        out[1] = c * a * n * p - d * p;
    }
}
