use crate::error::SessionError;
use crate::params::ParameterSet;
use crate::solver::{integrate, SolverOptions};
use crate::traits::VectorField;
use crate::trajectory::{TimeGrid, Trajectory};

/// The one stateful actor in the engine.
///
/// A session owns the fixed initial state and time grid, the working
/// parameter set and the latest trajectory. Every parameter change
/// re-integrates the whole trajectory from the original initial state —
/// never from the last computed state — so the display always shows what
/// the fixed initial condition evolves into under the currently selected
/// parameters. Calls are synchronous: each one finishes (or fails) before
/// the caller can issue the next.
pub struct SimulationSession {
    field: Box<dyn VectorField>,
    initial_state: Vec<f64>,
    grid: TimeGrid,
    defaults: ParameterSet,
    params: ParameterSet,
    options: SolverOptions,
    trajectory: Trajectory,
}

impl std::fmt::Debug for SimulationSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulationSession")
            .field("initial_state", &self.initial_state)
            .field("grid", &self.grid)
            .field("params", &self.params)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl SimulationSession {
    /// Builds the session and eagerly runs the first integration so a
    /// trajectory is available immediately. `defaults` is captured for
    /// `reset`.
    pub fn new(
        field: Box<dyn VectorField>,
        initial_state: Vec<f64>,
        grid: TimeGrid,
        defaults: ParameterSet,
        options: SolverOptions,
    ) -> Result<Self, SessionError> {
        if initial_state.len() != field.dimension() {
            return Err(SessionError::DimensionMismatch {
                expected: field.dimension(),
                actual: initial_state.len(),
            });
        }

        let trajectory = integrate(field.as_ref(), &initial_state, &grid, &defaults, &options)?;
        Ok(Self {
            field,
            initial_state,
            grid,
            params: defaults.clone(),
            defaults,
            options,
            trajectory,
        })
    }

    /// Commits one parameter change and recomputes the trajectory.
    ///
    /// Unknown names and non-finite values are rejected with the parameter
    /// set left unchanged. Finite values outside the declared control range
    /// are accepted with a warning; the models' denominator floors keep the
    /// dynamics well defined there. If the integration fails, the previous
    /// trajectory is retained untouched while the parameter stays set, like
    /// a committed control that stays moved.
    pub fn set_parameter(&mut self, name: &str, value: f64) -> Result<&Trajectory, SessionError> {
        if !value.is_finite() {
            return Err(SessionError::NonFiniteValue {
                name: name.to_string(),
                value,
            });
        }
        let Some(idx) = self.params.index_of(name) else {
            return Err(SessionError::UnknownParameter(name.to_string()));
        };

        let spec = self.params.spec_at(idx);
        if value < spec.min || value > spec.max {
            log::warn!(
                "parameter \"{name}\" set to {value}, outside its control range [{}, {}]",
                spec.min,
                spec.max
            );
        }

        let previous = self.params.set_at(idx, value);
        log::debug!("parameter \"{name}\" changed from {previous} to {value}");

        self.reintegrate()
    }

    /// Restores the parameter values captured at construction and recomputes
    /// the trajectory.
    pub fn reset(&mut self) -> Result<&Trajectory, SessionError> {
        self.params = self.defaults.clone();
        log::debug!("parameters reset to defaults");
        self.reintegrate()
    }

    fn reintegrate(&mut self) -> Result<&Trajectory, SessionError> {
        let trajectory = integrate(
            self.field.as_ref(),
            &self.initial_state,
            &self.grid,
            &self.params,
            &self.options,
        )?;
        self.trajectory = trajectory;
        Ok(&self.trajectory)
    }

    pub fn trajectory(&self) -> &Trajectory {
        &self.trajectory
    }

    pub fn parameters(&self) -> &ParameterSet {
        &self.params
    }

    pub fn time_grid(&self) -> &TimeGrid {
        &self.grid
    }

    pub fn initial_state(&self) -> &[f64] {
        &self.initial_state
    }

    pub fn dimension(&self) -> usize {
        self.field.dimension()
    }
}

#[cfg(test)]
mod tests {
    use super::SimulationSession;
    use crate::error::SessionError;
    use crate::models::{self, LotkaVolterra};
    use crate::params::{ParamSpec, ParameterSet};
    use crate::solver::SolverOptions;
    use crate::traits::VectorField;
    use crate::trajectory::TimeGrid;

    fn lotka_volterra_session() -> SimulationSession {
        let params = ParameterSet::from_specs(&models::lotka_volterra::PARAMS);
        let field = LotkaVolterra::new(&params).expect("field");
        let grid = TimeGrid::uniform_steps(0.0, 1.0, 100).expect("grid");
        SimulationSession::new(
            Box::new(field),
            vec![0.5, 1.0],
            grid,
            params,
            SolverOptions::default(),
        )
        .expect("session")
    }

    #[test]
    fn construction_runs_the_first_integration() {
        let session = lotka_volterra_session();
        assert_eq!(session.trajectory().len(), 100);
        assert_eq!(session.trajectory().dimension(), 2);
        assert_eq!(session.trajectory().row(0), vec![0.5, 1.0]);
    }

    #[test]
    fn rejects_mismatched_initial_state() {
        let params = ParameterSet::from_specs(&models::lotka_volterra::PARAMS);
        let field = LotkaVolterra::new(&params).expect("field");
        let grid = TimeGrid::uniform_steps(0.0, 1.0, 10).expect("grid");
        let err = SimulationSession::new(
            Box::new(field),
            vec![0.5],
            grid,
            params,
            SolverOptions::default(),
        )
        .expect_err("expected failure");
        assert!(matches!(
            err,
            SessionError::DimensionMismatch {
                expected: 2,
                actual: 1
            }
        ));
    }

    #[test]
    fn unknown_parameter_leaves_everything_untouched() {
        let mut session = lotka_volterra_session();
        let before = session.trajectory().clone();
        let err = session
            .set_parameter("K", 3.0)
            .map(|_| ())
            .expect_err("expected failure");
        assert_eq!(err, SessionError::UnknownParameter("K".to_string()));
        assert_eq!(session.parameters().get("K"), None);
        assert_eq!(session.trajectory().max_abs_diff(&before), 0.0);
    }

    #[test]
    fn non_finite_value_is_rejected_before_committing() {
        let mut session = lotka_volterra_session();
        let err = session
            .set_parameter("r", f64::NAN)
            .map(|_| ())
            .expect_err("expected failure");
        assert!(matches!(err, SessionError::NonFiniteValue { .. }));
        assert_eq!(session.parameters().get("r"), Some(1.0));
    }

    #[test]
    fn parameter_change_recomputes_from_the_original_initial_state() {
        let mut session = lotka_volterra_session();
        let initial = session.trajectory().clone();

        session.set_parameter("r", 2.0).expect("change should succeed");
        assert!(session.trajectory().max_abs_diff(&initial) > 1e-6);

        // Returning the value restores the exact original trajectory, which
        // only holds because recomputation always starts from the fixed
        // initial condition.
        session.set_parameter("r", 1.0).expect("change should succeed");
        assert_eq!(session.trajectory().max_abs_diff(&initial), 0.0);
    }

    #[test]
    fn reset_restores_the_initial_trajectory() {
        let mut session = lotka_volterra_session();
        let initial = session.trajectory().clone();

        session.set_parameter("r", 3.0).expect("change should succeed");
        session.set_parameter("a", 0.4).expect("change should succeed");
        session.reset().expect("reset should succeed");

        assert_eq!(session.parameters().get("r"), Some(1.0));
        assert_eq!(session.parameters().get("a"), Some(1.0));
        assert_eq!(session.trajectory().max_abs_diff(&initial), 0.0);
    }

    /// Returns a NaN derivative as soon as its parameter goes negative.
    struct Fickle {
        q: usize,
    }

    impl VectorField for Fickle {
        fn dimension(&self) -> usize {
            1
        }

        fn eval(&self, _t: f64, state: &[f64], params: &ParameterSet, out: &mut [f64]) {
            let q = params.value_at(self.q);
            out[0] = if q < 0.0 { f64::NAN } else { -q * state[0] };
        }
    }

    #[test]
    fn failed_integration_retains_the_previous_trajectory() {
        const SPECS: [ParamSpec; 1] = [ParamSpec::new("q", "decay rate", 1.0, 0.0, 10.0)];
        let params = ParameterSet::from_specs(&SPECS);
        let q = params.require("q").expect("q index");
        let grid = TimeGrid::uniform_steps(0.0, 1.0, 10).expect("grid");
        let mut session = SimulationSession::new(
            Box::new(Fickle { q }),
            vec![1.0],
            grid,
            params,
            SolverOptions::default(),
        )
        .expect("session");

        let before = session.trajectory().clone();
        let err = session
            .set_parameter("q", -1.0)
            .map(|_| ())
            .expect_err("expected failure");
        assert!(matches!(err, SessionError::Integration(_)));
        assert_eq!(session.trajectory().max_abs_diff(&before), 0.0);
        // The committed value stays set, like a moved control.
        assert_eq!(session.parameters().get("q"), Some(-1.0));
    }
}
