use crate::params::ParameterSet;

/// The derivative function of one ecological model variant.
///
/// Implementations must be pure: the same `(t, state, params)` always yields
/// the same derivative, with no hidden state. All models here are autonomous,
/// so `t` is accepted for interface uniformity and ignored by the math.
///
/// The trait is object-safe; a `SimulationSession` holds the active variant
/// as `Box<dyn VectorField>`.
pub trait VectorField {
    /// Returns the dimension of the state space.
    fn dimension(&self) -> usize;

    /// Evaluates the vector field.
    /// state: current compartment densities (length `dimension()`)
    /// params: the active parameter values
    /// out: buffer to write ds/dt into (length `dimension()`)
    fn eval(&self, t: f64, state: &[f64], params: &ParameterSet, out: &mut [f64]);
}
