use std::path::PathBuf;

use chrono::NaiveDate;

use crate::app_config::{
    AnalysisConfig, AppConfig, SimulationConfig, DEFAULT_INFLUENCER_FRACTION,
    DEFAULT_MAX_JOIN_DROP_FRACTION, DEFAULT_MONTHS, DEFAULT_NUM_USERS,
    DEFAULT_POSTS_PER_USER_MEAN, DEFAULT_SEED, DEFAULT_SHOCK_STRENGTH, DEFAULT_START_DATE,
};
use crate::scenario::{load_scenario, validate_simulation};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if values are invalid or the scenario file cannot
/// be loaded.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if values are invalid or the scenario file cannot
/// be loaded.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable is optional. When `ALIGNIV_SCENARIO_PATH` is set, the
/// scenario file replaces the simulation block read from the environment.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u64 = |var: &str, default: u64| -> Result<u64, ConfigError> {
        match lookup(var) {
            Ok(raw) => raw.trim().parse::<u64>().map_err(|e| invalid(var, e.to_string())),
            Err(_) => Ok(default),
        }
    };

    let parse_f64 = |var: &str, default: f64| -> Result<f64, ConfigError> {
        match lookup(var) {
            Ok(raw) => raw.trim().parse::<f64>().map_err(|e| invalid(var, e.to_string())),
            Err(_) => Ok(default),
        }
    };

    let seed = parse_u64("ALIGNIV_SEED", DEFAULT_SEED)?;
    let output_dir = PathBuf::from(or_default("ALIGNIV_OUTPUT_DIR", "outputs"));
    let log_level = or_default("ALIGNIV_LOG_LEVEL", "info");
    let scenario_path = lookup("ALIGNIV_SCENARIO_PATH").ok().map(PathBuf::from);

    let num_users = parse_u64("ALIGNIV_NUM_USERS", DEFAULT_NUM_USERS as u64)?;
    let num_users =
        usize::try_from(num_users).map_err(|e| invalid("ALIGNIV_NUM_USERS", e.to_string()))?;
    let posts_per_user_mean = parse_f64("ALIGNIV_POSTS_PER_USER_MEAN", DEFAULT_POSTS_PER_USER_MEAN)?;
    let months = parse_u64("ALIGNIV_MONTHS", u64::from(DEFAULT_MONTHS))?;
    let months = u32::try_from(months).map_err(|e| invalid("ALIGNIV_MONTHS", e.to_string()))?;
    let start_date = NaiveDate::parse_from_str(
        &or_default("ALIGNIV_START_DATE", DEFAULT_START_DATE),
        "%Y-%m-%d",
    )
    .map_err(|e| invalid("ALIGNIV_START_DATE", e.to_string()))?;

    let max_join_drop_fraction =
        parse_f64("ALIGNIV_MAX_JOIN_DROP_FRACTION", DEFAULT_MAX_JOIN_DROP_FRACTION)?;
    let influencer_fraction = parse_f64("ALIGNIV_INFLUENCER_FRACTION", DEFAULT_INFLUENCER_FRACTION)?;
    let shock_strength = parse_f64("ALIGNIV_SHOCK_STRENGTH", DEFAULT_SHOCK_STRENGTH)?;

    let simulation = match &scenario_path {
        Some(path) => load_scenario(path)?,
        None => {
            let simulation = SimulationConfig {
                num_users,
                posts_per_user_mean,
                months,
                start_date,
            };
            validate_simulation(&simulation)?;
            simulation
        }
    };

    let analysis = AnalysisConfig {
        seed,
        max_join_drop_fraction,
        influencer_fraction,
        shock_strength,
    };
    validate_analysis(&analysis)?;

    Ok(AppConfig {
        output_dir,
        log_level,
        scenario_path,
        simulation,
        analysis,
    })
}

/// Check analysis parameters for values that would make the run meaningless.
///
/// # Errors
///
/// Returns [`ConfigError::Validation`] naming the first offending field.
pub fn validate_analysis(analysis: &AnalysisConfig) -> Result<(), ConfigError> {
    let fraction_ok = |v: f64| v.is_finite() && (0.0..=1.0).contains(&v);

    if !fraction_ok(analysis.max_join_drop_fraction) {
        return Err(ConfigError::Validation(format!(
            "max_join_drop_fraction must be within [0, 1], got {}",
            analysis.max_join_drop_fraction
        )));
    }
    if !fraction_ok(analysis.influencer_fraction) || analysis.influencer_fraction == 0.0 {
        return Err(ConfigError::Validation(format!(
            "influencer_fraction must be within (0, 1], got {}",
            analysis.influencer_fraction
        )));
    }
    if !analysis.shock_strength.is_finite() {
        return Err(ConfigError::Validation(format!(
            "shock_strength must be finite, got {}",
            analysis.shock_strength
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
