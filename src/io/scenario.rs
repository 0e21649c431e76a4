// src/io/scenario.rs

use crate::error::{SimError, SimResult};
use crate::simulation::comparison::{NamedPolicy, PolicyCatalog};
use crate::simulation::config::SimulationConfig;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Layout of a JSON scenario file.
///
/// ```json
/// {
///   "simulation": { "replications": 1000, "master_seed": 7 },
///   "policies": [
///     { "name": "lean", "order_up_to": 9, "review_interval": 3, "horizon_days": 60 },
///     { "name": "fat",  "order_up_to": 15, "review_interval": 3, "horizon_days": 60 }
///   ]
/// }
/// ```
///
/// Anything a policy leaves out comes from the default scenario.
#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioFile {
    #[serde(default)]
    pub simulation: Option<SimulationConfig>,
    pub policies: Vec<NamedPolicy>,
}

impl ScenarioFile {
    pub fn catalog(&self) -> PolicyCatalog {
        PolicyCatalog::new(self.policies.clone())
    }
}

pub fn parse_scenario(text: &str) -> SimResult<ScenarioFile> {
    let scenario: ScenarioFile = serde_json::from_str(text)?;
    if scenario.policies.is_empty() {
        return Err(SimError::config("scenario file lists no policies"));
    }
    for policy in &scenario.policies {
        policy.parameters.validate()?;
    }
    if let Some(simulation) = &scenario.simulation {
        simulation.validate()?;
    }
    Ok(scenario)
}

pub fn load_scenario<P: AsRef<Path>>(path: P) -> SimResult<ScenarioFile> {
    let text = fs::read_to_string(path)?;
    parse_scenario(&text)
}
