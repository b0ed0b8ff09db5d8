//! The model represents the static input data provided by the user.
use crate::coefficients::Coefficients;
use crate::scenario::{Scenario, ScenarioSet};
use crate::time::Horizon;
use std::path::PathBuf;

pub mod parameters;
pub use parameters::ModelParameters;

/// Model definition.
///
/// Built once from the model directory and shared by reference with every part of the problem
/// construction. Nothing mutates it afterwards.
pub struct Model {
    /// Path to model folder
    pub model_path: PathBuf,
    /// Parameters from the model TOML file
    pub parameters: ModelParameters,
    /// Engineering and economic coefficients
    pub coefficients: Coefficients,
    /// The planning horizon
    pub horizon: Horizon,
    /// The scenarios to optimise over
    pub scenarios: ScenarioSet,
}

impl Model {
    /// Iterate over the model's scenarios
    pub fn iter_scenarios(&self) -> std::slice::Iter<'_, Scenario> {
        self.scenarios.iter()
    }
}
