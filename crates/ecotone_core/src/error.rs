use thiserror::Error;

/// Failure of one integration run. The caller's previous trajectory is never
/// touched by a failed run; the solver returns an error instead of a
/// truncated or degraded result.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IntegrationError {
    #[error("invalid solver input: {0}")]
    BadInput(String),

    #[error("step budget of {max_steps} exhausted at t = {t:.6e}")]
    StepBudgetExhausted { max_steps: usize, t: f64 },

    #[error("step size underflow at t = {t:.6e} (h = {h:.3e}) with the error test still failing")]
    StepUnderflow { t: f64, h: f64 },

    #[error("non-finite state or derivative encountered at t = {t:.6e}")]
    NonFinite { t: f64 },
}

/// Errors reported by `SimulationSession` operations. All are local to the
/// session; none require restarting it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    #[error("\"{0}\" is not a parameter of the active model")]
    UnknownParameter(String),

    #[error("parameter \"{name}\" must be finite, got {value}")]
    NonFiniteValue { name: String, value: f64 },

    #[error("initial state has dimension {actual}, model expects {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error(transparent)]
    Integration(#[from] IntegrationError),
}
