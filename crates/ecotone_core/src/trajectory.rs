use anyhow::{bail, Result};
use nalgebra::DMatrix;
use serde::Serialize;

/// Ordered sample times for one session. Immutable once constructed;
/// every trajectory produced during the session is aligned to it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeGrid {
    times: Vec<f64>,
}

impl TimeGrid {
    /// Builds a grid from explicit sample times. Times must be finite and
    /// strictly ascending, with at least one entry.
    pub fn from_times(times: Vec<f64>) -> Result<Self> {
        if times.is_empty() {
            bail!("Time grid must contain at least one sample time.");
        }
        for pair in times.windows(2) {
            if !(pair[1] > pair[0]) {
                bail!(
                    "Time grid must be strictly ascending ({} followed by {}).",
                    pair[0],
                    pair[1]
                );
            }
        }
        if times.iter().any(|t| !t.is_finite()) {
            bail!("Time grid entries must be finite.");
        }
        Ok(Self { times })
    }

    /// Builds `n` uniformly spaced samples `start, start+dt, ...`.
    pub fn uniform_steps(start: f64, dt: f64, n: usize) -> Result<Self> {
        if n == 0 {
            bail!("Time grid must contain at least one sample time.");
        }
        if !(dt > 0.0) || !dt.is_finite() || !start.is_finite() {
            bail!("Uniform time grid requires finite start and positive dt.");
        }
        Ok(Self {
            times: (0..n).map(|i| start + dt * i as f64).collect(),
        })
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn time(&self, idx: usize) -> f64 {
        self.times[idx]
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn start(&self) -> f64 {
        self.times[0]
    }

    pub fn end(&self) -> f64 {
        self.times[self.times.len() - 1]
    }
}

/// A solved trajectory: one row per time-grid sample, one column per state
/// dimension. Produced wholesale by the integrator and replaced wholesale on
/// every recomputation; never patched in place.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    data: DMatrix<f64>,
}

impl Trajectory {
    pub(crate) fn new(data: DMatrix<f64>) -> Self {
        Self { data }
    }

    /// Number of sampled times (rows).
    pub fn len(&self) -> usize {
        self.data.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.data.nrows() == 0
    }

    /// State-space dimension (columns).
    pub fn dimension(&self) -> usize {
        self.data.ncols()
    }

    pub fn value(&self, row: usize, dim: usize) -> f64 {
        self.data[(row, dim)]
    }

    /// The state vector at one sampled time.
    pub fn row(&self, row: usize) -> Vec<f64> {
        self.data.row(row).iter().copied().collect()
    }

    /// All samples of one compartment, aligned to the time grid. This is the
    /// shape renderers consume.
    pub fn series(&self, dim: usize) -> Vec<f64> {
        self.data.column(dim).iter().copied().collect()
    }

    /// Largest elementwise difference to another trajectory of the same
    /// shape. Used by tests and by callers comparing recomputations.
    pub fn max_abs_diff(&self, other: &Trajectory) -> f64 {
        assert_eq!(self.data.shape(), other.data.shape());
        let mut max = 0.0_f64;
        for (a, b) in self.data.iter().zip(other.data.iter()) {
            max = max.max((a - b).abs());
        }
        max
    }
}
