use std::collections::HashMap;
use std::env::VarError;
use std::path::Path;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

#[test]
fn build_app_config_uses_defaults_when_env_is_empty() {
    let map: HashMap<&str, &str> = HashMap::new();
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.analysis.seed, 42);
    assert_eq!(cfg.output_dir, PathBuf::from("outputs"));
    assert_eq!(cfg.log_level, "info");
    assert!(cfg.scenario_path.is_none());
    assert_eq!(cfg.simulation, SimulationConfig::default());
    assert!((cfg.analysis.influencer_fraction - 0.10).abs() < f64::EPSILON);
    assert!((cfg.analysis.shock_strength - 0.5).abs() < f64::EPSILON);
    assert!((cfg.analysis.max_join_drop_fraction - 0.05).abs() < f64::EPSILON);
}

#[test]
fn seed_override() {
    let mut map = HashMap::new();
    map.insert("ALIGNIV_SEED", "7");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.analysis.seed, 7);
}

#[test]
fn seed_invalid() {
    let mut map = HashMap::new();
    map.insert("ALIGNIV_SEED", "forty-two");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "ALIGNIV_SEED"),
        "expected InvalidEnvVar(ALIGNIV_SEED), got: {result:?}"
    );
}

#[test]
fn simulation_overrides() {
    let mut map = HashMap::new();
    map.insert("ALIGNIV_NUM_USERS", "25");
    map.insert("ALIGNIV_MONTHS", "4");
    map.insert("ALIGNIV_POSTS_PER_USER_MEAN", "12.5");
    map.insert("ALIGNIV_START_DATE", "2020-03-01");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.simulation.num_users, 25);
    assert_eq!(cfg.simulation.months, 4);
    assert!((cfg.simulation.posts_per_user_mean - 12.5).abs() < f64::EPSILON);
    assert_eq!(
        cfg.simulation.start_date,
        NaiveDate::from_ymd_opt(2020, 3, 1).unwrap()
    );
}

#[test]
fn start_date_invalid() {
    let mut map = HashMap::new();
    map.insert("ALIGNIV_START_DATE", "03/01/2020");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "ALIGNIV_START_DATE"),
        "expected InvalidEnvVar(ALIGNIV_START_DATE), got: {result:?}"
    );
}

#[test]
fn zero_months_fails_validation() {
    let mut map = HashMap::new();
    map.insert("ALIGNIV_MONTHS", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::Validation(ref msg)) if msg.contains("months")),
        "expected Validation(months), got: {result:?}"
    );
}

#[test]
fn join_drop_fraction_out_of_range_fails_validation() {
    let mut map = HashMap::new();
    map.insert("ALIGNIV_MAX_JOIN_DROP_FRACTION", "1.5");
    let result = build_app_config(lookup_from_map(&map));
    assert!(matches!(result, Err(ConfigError::Validation(_))));
}

#[test]
fn zero_influencer_fraction_fails_validation() {
    let mut map = HashMap::new();
    map.insert("ALIGNIV_INFLUENCER_FRACTION", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(matches!(result, Err(ConfigError::Validation(_))));
}

#[test]
fn shock_strength_invalid() {
    let mut map = HashMap::new();
    map.insert("ALIGNIV_SHOCK_STRENGTH", "strong");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "ALIGNIV_SHOCK_STRENGTH"),
        "expected InvalidEnvVar(ALIGNIV_SHOCK_STRENGTH), got: {result:?}"
    );
}

#[test]
fn scenario_path_replaces_simulation_block() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("config")
        .join("scenario.yaml");
    let path_str = path.to_string_lossy().to_string();
    let mut map = HashMap::new();
    map.insert("ALIGNIV_SCENARIO_PATH", path_str.as_str());
    map.insert("ALIGNIV_NUM_USERS", "5");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.scenario_path.as_deref(), Some(path.as_path()));
    assert_eq!(cfg.simulation.num_users, 300);
}

#[test]
fn missing_scenario_file_is_io_error() {
    let mut map = HashMap::new();
    map.insert("ALIGNIV_SCENARIO_PATH", "/nonexistent/aligniv.yaml");
    let result = build_app_config(lookup_from_map(&map));
    assert!(matches!(result, Err(ConfigError::ScenarioFileIo { .. })));
}
