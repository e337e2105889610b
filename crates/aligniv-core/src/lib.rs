//! Shared records, error taxonomy, configuration, and seeded sampling for
//! the aligniv pipeline.

pub mod app_config;
pub mod config;
pub mod csv;
pub mod error;
pub mod normalize;
pub mod sampling;
pub mod scenario;
pub mod types;

pub use app_config::{AnalysisConfig, AppConfig, SimulationConfig};
pub use config::{load_app_config, load_app_config_from_env, validate_analysis};
pub use error::{ConfigError, PipelineError, Stage};
pub use normalize::{mean_vector, safe_renormalize, SafeNormalized};
pub use sampling::{DirichletSampler, NormalSampler, PoissonSampler, SamplingError};
pub use scenario::{load_scenario, validate_simulation};
pub use types::{
    AugmentedPanel, AugmentedRow, CheckinEvent, Column, CommunityTopicProfile, Month, Panel,
    PanelRow, Post, SentimentAlignment, SentimentObservation, TopicObservation, TopicProfile,
    TopicalAlignment, UserMonthSentiment, FIXED_COLUMNS,
};
