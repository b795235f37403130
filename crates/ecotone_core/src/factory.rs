use crate::models::{food_web, lotka_volterra, rosenzweig_macarthur};
use crate::models::{FoodWeb, LotkaVolterra, RosenzweigMacArthur};
use crate::params::{ParamSpec, ParameterSet};
use crate::session::SimulationSession;
use crate::solver::SolverOptions;
use crate::traits::VectorField;
use crate::trajectory::TimeGrid;
use anyhow::{bail, Result};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// The model variants the factory can start a session for. This is the only
/// cross-variant surface the engine exposes: everything downstream of
/// `build_session` is variant-agnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ModelKind {
    LotkaVolterra,
    RosenzweigMacArthur,
    FoodWeb,
}

impl ModelKind {
    pub const ALL: [ModelKind; 3] = [
        ModelKind::LotkaVolterra,
        ModelKind::RosenzweigMacArthur,
        ModelKind::FoodWeb,
    ];

    pub fn title(self) -> &'static str {
        match self {
            ModelKind::LotkaVolterra => "Lotka-Volterra predator-prey",
            ModelKind::RosenzweigMacArthur => "Rosenzweig-MacArthur predator-prey",
            ModelKind::FoodWeb => "Two-patch food web with adaptive dispersal",
        }
    }

    pub fn param_specs(self) -> &'static [ParamSpec] {
        match self {
            ModelKind::LotkaVolterra => &lotka_volterra::PARAMS,
            ModelKind::RosenzweigMacArthur => &rosenzweig_macarthur::PARAMS,
            ModelKind::FoodWeb => &food_web::PARAMS,
        }
    }

    /// Compartment names in state-vector order, for legends and listings.
    pub fn state_labels(self) -> &'static [&'static str] {
        match self {
            ModelKind::LotkaVolterra | ModelKind::RosenzweigMacArthur => &["prey", "predator"],
            ModelKind::FoodWeb => &[
                "N_a", "N_b", "A_a", "A_b", "H1_a", "H1_b", "H2_a", "H2_b",
            ],
        }
    }

    /// The fixed initial densities every recomputation starts from.
    pub fn initial_state(self) -> Vec<f64> {
        match self {
            ModelKind::LotkaVolterra => vec![0.5, 1.0],
            ModelKind::RosenzweigMacArthur => vec![0.1, 0.1],
            ModelKind::FoodWeb => vec![2.0, 2.5, 2.5, 2.0, 0.08, 0.4, 0.05, 0.1],
        }
    }

    /// The fixed sample times for the variant (unit spacing, as in the
    /// original exploration tool).
    pub fn time_grid(self) -> Result<TimeGrid> {
        match self {
            ModelKind::LotkaVolterra => TimeGrid::uniform_steps(0.0, 1.0, 100),
            ModelKind::RosenzweigMacArthur | ModelKind::FoodWeb => {
                TimeGrid::uniform_steps(0.0, 1.0, 1000)
            }
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ModelKind::LotkaVolterra => "lotka-volterra",
            ModelKind::RosenzweigMacArthur => "rosenzweig-macarthur",
            ModelKind::FoodWeb => "food-web",
        };
        write!(f, "{name}")
    }
}

impl FromStr for ModelKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "lv" | "lotka-volterra" | "lotkavolterra" => Ok(ModelKind::LotkaVolterra),
            "rm" | "rosenzweig-macarthur" | "rosenzweigmacarthur" => {
                Ok(ModelKind::RosenzweigMacArthur)
            }
            "fw" | "food-web" | "foodweb" => Ok(ModelKind::FoodWeb),
            other => bail!(
                "unknown model \"{other}\" (expected lotka-volterra, rosenzweig-macarthur or food-web)"
            ),
        }
    }
}

/// Assembles a ready-to-drive session for one variant: its derivative
/// function, default parameters, initial state and time grid, with the first
/// trajectory already computed.
pub fn build_session(kind: ModelKind, options: SolverOptions) -> Result<SimulationSession> {
    let params = ParameterSet::from_specs(kind.param_specs());
    let field: Box<dyn VectorField> = match kind {
        ModelKind::LotkaVolterra => Box::new(LotkaVolterra::new(&params)?),
        ModelKind::RosenzweigMacArthur => Box::new(RosenzweigMacArthur::new(&params)?),
        ModelKind::FoodWeb => Box::new(FoodWeb::new(&params)?),
    };
    let grid = kind.time_grid()?;
    let session = SimulationSession::new(field, kind.initial_state(), grid, params, options)?;
    Ok(session)
}
