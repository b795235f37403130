pub mod error;
pub mod factory;
pub mod models;
pub mod params;
pub mod session;
pub mod solver;
/// The `ecotone_core` crate is the computational engine behind the interactive
/// population-dynamics explorer. The frontend only ever talks to a
/// `SimulationSession`; everything below it is pure computation.
///
/// Key components:
/// - **Traits**: `VectorField` (the derivative function of one model variant).
/// - **Models**: Lotka-Volterra, Rosenzweig-MacArthur and the two-patch
///   food web with adaptive dispersal.
/// - **Solver**: adaptive Dormand-Prince 4(5) integrator sampled on a
///   caller-supplied time grid.
/// - **Session**: the single stateful actor; owns the parameters and the
///   latest trajectory, recomputing from the fixed initial condition on
///   every parameter change.
pub mod traits;
pub mod trajectory;
