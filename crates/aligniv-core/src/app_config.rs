use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const DEFAULT_SEED: u64 = 42;
pub const DEFAULT_NUM_USERS: usize = 300;
pub const DEFAULT_POSTS_PER_USER_MEAN: f64 = 60.0;
pub const DEFAULT_MONTHS: u32 = 12;
pub const DEFAULT_START_DATE: &str = "2010-01-01";
pub const DEFAULT_MAX_JOIN_DROP_FRACTION: f64 = 0.05;
pub const DEFAULT_INFLUENCER_FRACTION: f64 = 0.10;
pub const DEFAULT_SHOCK_STRENGTH: f64 = 0.5;

/// Parameters of the synthetic population.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub num_users: usize,
    pub posts_per_user_mean: f64,
    pub months: u32,
    pub start_date: NaiveDate,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            num_users: DEFAULT_NUM_USERS,
            posts_per_user_mean: DEFAULT_POSTS_PER_USER_MEAN,
            months: DEFAULT_MONTHS,
            start_date: NaiveDate::from_ymd_opt(2010, 1, 1).unwrap_or_default(),
        }
    }
}

/// Parameters of panel construction and instrument synthesis.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    pub seed: u64,
    /// Largest share of alignment rows the topical/sentiment join may drop.
    pub max_join_drop_fraction: f64,
    pub influencer_fraction: f64,
    /// Weight of the monthly shock in `treatment`.
    pub shock_strength: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            max_join_drop_fraction: DEFAULT_MAX_JOIN_DROP_FRACTION,
            influencer_fraction: DEFAULT_INFLUENCER_FRACTION,
            shock_strength: DEFAULT_SHOCK_STRENGTH,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub output_dir: PathBuf,
    pub log_level: String,
    pub scenario_path: Option<PathBuf>,
    pub simulation: SimulationConfig,
    pub analysis: AnalysisConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("outputs"),
            log_level: "info".to_string(),
            scenario_path: None,
            simulation: SimulationConfig::default(),
            analysis: AnalysisConfig::default(),
        }
    }
}
