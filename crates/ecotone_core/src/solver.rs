use crate::error::IntegrationError;
use crate::params::ParameterSet;
use crate::traits::VectorField;
use crate::trajectory::{TimeGrid, Trajectory};
use nalgebra::DMatrix;

/// Tolerances and budgets for one integration run.
#[derive(Debug, Clone)]
pub struct SolverOptions {
    /// Relative tolerance.
    pub rtol: f64,
    /// Absolute tolerance.
    pub atol: f64,
    /// Initial step size; 0.0 picks one from the grid span.
    pub h0: f64,
    /// Smallest step the controller may take.
    pub h_min: f64,
    /// Total step-attempt budget for the whole run. Exhausting it fails the
    /// run rather than returning a truncated trajectory.
    pub max_steps: usize,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            rtol: 1e-6,
            atol: 1e-9,
            h0: 0.0,
            h_min: 1e-14,
            max_steps: 100_000,
        }
    }
}

impl SolverOptions {
    fn validate(&self) -> Result<(), IntegrationError> {
        if !self.rtol.is_finite() || self.rtol <= 0.0 {
            return Err(IntegrationError::BadInput("rtol must be finite and > 0".into()));
        }
        if !self.atol.is_finite() || self.atol <= 0.0 {
            return Err(IntegrationError::BadInput("atol must be finite and > 0".into()));
        }
        if !(self.h_min > 0.0) || !self.h_min.is_finite() {
            return Err(IntegrationError::BadInput("h_min must be finite and > 0".into()));
        }
        if self.max_steps == 0 {
            return Err(IntegrationError::BadInput("max_steps must be > 0".into()));
        }
        Ok(())
    }

    fn initial_step(&self, span: f64) -> f64 {
        if self.h0 > 0.0 {
            self.h0.min(span)
        } else {
            (span * 1e-3).max(self.h_min).min(span)
        }
    }
}

// Dormand-Prince 4(5) tableau.
const A21: f64 = 1.0 / 5.0;
const A31: f64 = 3.0 / 40.0;
const A32: f64 = 9.0 / 40.0;
const A41: f64 = 44.0 / 45.0;
const A42: f64 = -56.0 / 15.0;
const A43: f64 = 32.0 / 9.0;
const A51: f64 = 19372.0 / 6561.0;
const A52: f64 = -25360.0 / 2187.0;
const A53: f64 = 64448.0 / 6561.0;
const A54: f64 = -212.0 / 729.0;
const A61: f64 = 9017.0 / 3168.0;
const A62: f64 = -355.0 / 33.0;
const A63: f64 = 46732.0 / 5247.0;
const A64: f64 = 49.0 / 176.0;
const A65: f64 = -5103.0 / 18656.0;

// 5th-order weights (the advancing solution).
const B1: f64 = 35.0 / 384.0;
const B3: f64 = 500.0 / 1113.0;
const B4: f64 = 125.0 / 192.0;
const B5: f64 = -2187.0 / 6784.0;
const B6: f64 = 11.0 / 84.0;

// Embedded 4th-order weights.
const BE1: f64 = 5179.0 / 57600.0;
const BE3: f64 = 7571.0 / 16695.0;
const BE4: f64 = 393.0 / 640.0;
const BE5: f64 = -92097.0 / 339200.0;
const BE6: f64 = 187.0 / 2100.0;
const BE7: f64 = 1.0 / 40.0;

// Error weights: y5 - y4.
const E1: f64 = B1 - BE1;
const E3: f64 = B3 - BE3;
const E4: f64 = B4 - BE4;
const E5: f64 = B5 - BE5;
const E6: f64 = B6 - BE6;
const E7: f64 = -BE7;

/// Solves the initial-value problem `ds/dt = field(t, s, params)`,
/// `s(grid.start()) = y0`, reporting the solution exactly at the grid times.
///
/// Uses the Dormand-Prince 4(5) pair with FSAL and adaptive step control;
/// internal steps are clamped so every requested sample time is hit exactly.
/// The output has `grid.len()` rows and `field.dimension()` columns. A grid
/// of length 1 returns the initial state unchanged.
pub fn integrate(
    field: &dyn VectorField,
    y0: &[f64],
    grid: &TimeGrid,
    params: &ParameterSet,
    opts: &SolverOptions,
) -> Result<Trajectory, IntegrationError> {
    opts.validate()?;
    let dim = field.dimension();
    if y0.len() != dim {
        return Err(IntegrationError::BadInput(format!(
            "initial state has dimension {}, model expects {dim}",
            y0.len()
        )));
    }
    if y0.iter().any(|v| !v.is_finite()) {
        return Err(IntegrationError::NonFinite { t: grid.start() });
    }

    let rows = grid.len();
    let mut data = DMatrix::zeros(rows, dim);
    for (j, &v) in y0.iter().enumerate() {
        data[(0, j)] = v;
    }
    if rows == 1 {
        return Ok(Trajectory::new(data));
    }

    let mut t = grid.start();
    let mut y = y0.to_vec();
    let mut h = opts.initial_step(grid.end() - grid.start());

    let mut k1 = vec![0.0; dim];
    let mut k2 = vec![0.0; dim];
    let mut k3 = vec![0.0; dim];
    let mut k4 = vec![0.0; dim];
    let mut k5 = vec![0.0; dim];
    let mut k6 = vec![0.0; dim];
    let mut k7 = vec![0.0; dim];
    let mut y_tmp = vec![0.0; dim];
    let mut y_new = vec![0.0; dim];

    field.eval(t, &y, params, &mut k1);
    if k1.iter().any(|v| !v.is_finite()) {
        return Err(IntegrationError::NonFinite { t });
    }

    let mut attempts = 0usize;

    for row in 1..rows {
        let t_target = grid.time(row);

        while t < t_target {
            attempts += 1;
            if attempts > opts.max_steps {
                return Err(IntegrationError::StepBudgetExhausted {
                    max_steps: opts.max_steps,
                    t,
                });
            }

            let remaining = t_target - t;
            let h_step = h.min(remaining).max(opts.h_min.min(remaining));
            let hits_target = h_step >= remaining;

            for i in 0..dim {
                y_tmp[i] = y[i] + h_step * A21 * k1[i];
            }
            field.eval(t + h_step / 5.0, &y_tmp, params, &mut k2);

            for i in 0..dim {
                y_tmp[i] = y[i] + h_step * (A31 * k1[i] + A32 * k2[i]);
            }
            field.eval(t + 3.0 * h_step / 10.0, &y_tmp, params, &mut k3);

            for i in 0..dim {
                y_tmp[i] = y[i] + h_step * (A41 * k1[i] + A42 * k2[i] + A43 * k3[i]);
            }
            field.eval(t + 4.0 * h_step / 5.0, &y_tmp, params, &mut k4);

            for i in 0..dim {
                y_tmp[i] = y[i]
                    + h_step * (A51 * k1[i] + A52 * k2[i] + A53 * k3[i] + A54 * k4[i]);
            }
            field.eval(t + 8.0 * h_step / 9.0, &y_tmp, params, &mut k5);

            for i in 0..dim {
                y_tmp[i] = y[i]
                    + h_step
                        * (A61 * k1[i] + A62 * k2[i] + A63 * k3[i] + A64 * k4[i] + A65 * k5[i]);
            }
            field.eval(t + h_step, &y_tmp, params, &mut k6);

            for i in 0..dim {
                y_new[i] = y[i]
                    + h_step * (B1 * k1[i] + B3 * k3[i] + B4 * k4[i] + B5 * k5[i] + B6 * k6[i]);
            }

            // FSAL stage: reused as k1 of the next step when accepted.
            field.eval(t + h_step, &y_new, params, &mut k7);

            let mut err_norm = 0.0;
            for i in 0..dim {
                let ei = h_step
                    * (E1 * k1[i] + E3 * k3[i] + E4 * k4[i] + E5 * k5[i] + E6 * k6[i]
                        + E7 * k7[i]);
                let scale = opts.atol + opts.rtol * y[i].abs().max(y_new[i].abs());
                err_norm += (ei / scale) * (ei / scale);
            }
            err_norm = (err_norm / dim as f64).sqrt();

            if !err_norm.is_finite() {
                // State or derivative blew up; shrink hard, fail once the
                // step floor is reached.
                if h_step <= opts.h_min {
                    return Err(IntegrationError::NonFinite { t });
                }
                h = (h_step * 0.2).max(opts.h_min);
                continue;
            }

            if err_norm <= 1.0 {
                y.copy_from_slice(&y_new);
                k1.copy_from_slice(&k7);
                t = if hits_target { t_target } else { t + h_step };
            } else if h_step <= opts.h_min {
                return Err(IntegrationError::StepUnderflow { t, h: h_step });
            }

            let factor = if err_norm == 0.0 {
                5.0
            } else {
                (0.9 * err_norm.powf(-0.2)).clamp(0.2, 5.0)
            };
            h = (h_step * factor).max(opts.h_min);
        }

        for (j, &v) in y.iter().enumerate() {
            data[(row, j)] = v;
        }
    }

    Ok(Trajectory::new(data))
}

#[cfg(test)]
mod tests {
    use super::{integrate, SolverOptions};
    use crate::error::IntegrationError;
    use crate::params::{ParamSpec, ParameterSet};
    use crate::traits::VectorField;
    use crate::trajectory::TimeGrid;

    /// ds/dt = -lambda * s, solution s0 * exp(-lambda t).
    struct ExponentialDecay {
        lambda: usize,
    }

    impl ExponentialDecay {
        const PARAMS: [ParamSpec; 1] = [ParamSpec::new("lambda", "decay rate", 1.0, 0.0, 10.0)];

        fn build() -> (Self, ParameterSet) {
            let params = ParameterSet::from_specs(&Self::PARAMS);
            let lambda = params.require("lambda").expect("lambda index");
            (Self { lambda }, params)
        }
    }

    impl VectorField for ExponentialDecay {
        fn dimension(&self) -> usize {
            1
        }

        fn eval(&self, _t: f64, state: &[f64], params: &ParameterSet, out: &mut [f64]) {
            out[0] = -params.value_at(self.lambda) * state[0];
        }
    }

    #[test]
    fn matches_closed_form_exponential_decay() {
        let (field, params) = ExponentialDecay::build();
        let grid = TimeGrid::uniform_steps(0.0, 0.5, 11).expect("grid");
        let traj = integrate(&field, &[2.0], &grid, &params, &SolverOptions::default())
            .expect("integration should succeed");

        assert_eq!(traj.len(), 11);
        assert_eq!(traj.dimension(), 1);
        for (row, &t) in grid.times().iter().enumerate() {
            let exact = 2.0 * (-t).exp();
            assert!(
                (traj.value(row, 0) - exact).abs() < 1e-6,
                "row {row}: got {}, want {exact}",
                traj.value(row, 0)
            );
        }
    }

    #[test]
    fn degenerate_grid_returns_initial_state() {
        let (field, params) = ExponentialDecay::build();
        let grid = TimeGrid::from_times(vec![4.2]).expect("grid");
        let traj = integrate(&field, &[0.75], &grid, &params, &SolverOptions::default())
            .expect("integration should succeed");
        assert_eq!(traj.len(), 1);
        assert_eq!(traj.value(0, 0), 0.75);
    }

    #[test]
    fn repeated_runs_are_deterministic() {
        let (field, params) = ExponentialDecay::build();
        let grid = TimeGrid::uniform_steps(0.0, 1.0, 20).expect("grid");
        let opts = SolverOptions::default();
        let a = integrate(&field, &[1.0], &grid, &params, &opts).expect("first run");
        let b = integrate(&field, &[1.0], &grid, &params, &opts).expect("second run");
        assert_eq!(a.max_abs_diff(&b), 0.0);
    }

    #[test]
    fn exhausted_step_budget_is_an_error() {
        let (field, params) = ExponentialDecay::build();
        let grid = TimeGrid::uniform_steps(0.0, 1.0, 50).expect("grid");
        let opts = SolverOptions {
            max_steps: 3,
            ..SolverOptions::default()
        };
        let err = integrate(&field, &[1.0], &grid, &params, &opts).expect_err("expected failure");
        assert!(matches!(
            err,
            IntegrationError::StepBudgetExhausted { max_steps: 3, .. }
        ));
    }

    #[test]
    fn rejects_mismatched_initial_state() {
        let (field, params) = ExponentialDecay::build();
        let grid = TimeGrid::uniform_steps(0.0, 1.0, 2).expect("grid");
        let err = integrate(&field, &[1.0, 2.0], &grid, &params, &SolverOptions::default())
            .expect_err("expected failure");
        assert!(matches!(err, IntegrationError::BadInput(_)));
    }

    #[test]
    fn rejects_non_finite_initial_state() {
        let (field, params) = ExponentialDecay::build();
        let grid = TimeGrid::uniform_steps(0.0, 1.0, 2).expect("grid");
        let err = integrate(&field, &[f64::NAN], &grid, &params, &SolverOptions::default())
            .expect_err("expected failure");
        assert!(matches!(err, IntegrationError::NonFinite { .. }));
    }

    #[test]
    fn rejects_invalid_options() {
        let (field, params) = ExponentialDecay::build();
        let grid = TimeGrid::uniform_steps(0.0, 1.0, 2).expect("grid");
        let opts = SolverOptions {
            rtol: 0.0,
            ..SolverOptions::default()
        };
        let err = integrate(&field, &[1.0], &grid, &params, &opts).expect_err("expected failure");
        assert!(matches!(err, IntegrationError::BadInput(_)));
    }
}
