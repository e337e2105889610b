use std::path::Path;

use serde::Deserialize;

use crate::app_config::SimulationConfig;
use crate::ConfigError;

#[derive(Debug, Deserialize)]
pub struct ScenarioFile {
    #[serde(default)]
    pub simulation: SimulationConfig,
}

/// Load and validate a simulation scenario from a YAML file.
///
/// Fields missing from the file keep their defaults.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_scenario(path: &Path) -> Result<SimulationConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ScenarioFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let scenario: ScenarioFile =
        serde_yaml::from_str(&content).map_err(ConfigError::ScenarioFileParse)?;

    validate_simulation(&scenario.simulation)?;

    Ok(scenario.simulation)
}

/// Reject simulation parameters that cannot produce a panel.
///
/// # Errors
///
/// Returns [`ConfigError::Validation`] naming the first offending field.
pub fn validate_simulation(simulation: &SimulationConfig) -> Result<(), ConfigError> {
    if simulation.num_users == 0 {
        return Err(ConfigError::Validation(
            "num_users must be at least 1".to_string(),
        ));
    }

    if simulation.months == 0 {
        return Err(ConfigError::Validation(
            "months must be at least 1".to_string(),
        ));
    }

    if !simulation.posts_per_user_mean.is_finite() || simulation.posts_per_user_mean <= 0.0 {
        return Err(ConfigError::Validation(format!(
            "posts_per_user_mean must be positive, got {}",
            simulation.posts_per_user_mean
        )));
    }

    Ok(())
}
