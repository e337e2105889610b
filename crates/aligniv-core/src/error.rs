use thiserror::Error;

/// Pipeline stage at which an error was detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    TopicalAlignment,
    SentimentAlignment,
    PanelAssembly,
    InfluencerSynthesis,
    InstrumentSynthesis,
    FirstStage,
    TwoStageLeastSquares,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::TopicalAlignment => write!(f, "topical alignment"),
            Stage::SentimentAlignment => write!(f, "sentiment alignment"),
            Stage::PanelAssembly => write!(f, "panel assembly"),
            Stage::InfluencerSynthesis => write!(f, "influencer synthesis"),
            Stage::InstrumentSynthesis => write!(f, "instrument synthesis"),
            Stage::FirstStage => write!(f, "first-stage regression"),
            Stage::TwoStageLeastSquares => write!(f, "2SLS regression"),
        }
    }
}

/// Errors that abort a pipeline run.
///
/// Every variant carries the [`Stage`] that detected it and a detail message
/// naming the offending key (month, join, column). None of these are
/// retried: inputs are deterministic given the seed.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A join discarded too many rows, a key was duplicated, or a required
    /// column is missing.
    #[error("data integrity error in {stage}: {detail}")]
    DataIntegrity { stage: Stage, detail: String },

    /// The input cannot support the computation (empty log, constant
    /// instrument, fewer than two months, all-zero month).
    #[error("degenerate input in {stage}: {detail}")]
    DegenerateInput { stage: Stage, detail: String },

    /// The first-stage instrument coefficient is numerically zero.
    #[error("identification error in {stage}: {detail}")]
    Identification { stage: Stage, detail: String },

    /// Singular or rank-deficient design matrix.
    #[error("numeric error in {stage}: {detail}")]
    Numeric { stage: Stage, detail: String },
}

impl PipelineError {
    pub fn data_integrity(stage: Stage, detail: impl Into<String>) -> Self {
        Self::DataIntegrity {
            stage,
            detail: detail.into(),
        }
    }

    pub fn degenerate(stage: Stage, detail: impl Into<String>) -> Self {
        Self::DegenerateInput {
            stage,
            detail: detail.into(),
        }
    }

    pub fn identification(stage: Stage, detail: impl Into<String>) -> Self {
        Self::Identification {
            stage,
            detail: detail.into(),
        }
    }

    pub fn numeric(stage: Stage, detail: impl Into<String>) -> Self {
        Self::Numeric {
            stage,
            detail: detail.into(),
        }
    }

    /// The stage that raised this error.
    #[must_use]
    pub fn stage(&self) -> Stage {
        match self {
            Self::DataIntegrity { stage, .. }
            | Self::DegenerateInput { stage, .. }
            | Self::Identification { stage, .. }
            | Self::Numeric { stage, .. } => *stage,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid environment variable {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read scenario file {path}: {source}")]
    ScenarioFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse scenario file: {0}")]
    ScenarioFileParse(#[from] serde_yaml::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_stage_and_detail() {
        let err = PipelineError::data_integrity(Stage::PanelAssembly, "join dropped 40% of rows");
        assert_eq!(
            err.to_string(),
            "data integrity error in panel assembly: join dropped 40% of rows"
        );
    }

    #[test]
    fn stage_accessor_covers_all_variants() {
        assert_eq!(
            PipelineError::numeric(Stage::FirstStage, "singular").stage(),
            Stage::FirstStage
        );
        assert_eq!(
            PipelineError::identification(Stage::TwoStageLeastSquares, "zero").stage(),
            Stage::TwoStageLeastSquares
        );
        assert_eq!(
            PipelineError::degenerate(Stage::InstrumentSynthesis, "one month").stage(),
            Stage::InstrumentSynthesis
        );
    }
}
