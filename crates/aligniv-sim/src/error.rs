use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Sampling(#[from] aligniv_core::SamplingError),

    #[error("topic weights invalid for {user_id}: {reason}")]
    TopicWeights { user_id: String, reason: String },

    #[error("simulated date out of range: {start} + {days} days")]
    DateOutOfRange { start: chrono::NaiveDate, days: u64 },

    #[error("failed to write {what}: {source}")]
    Write {
        what: &'static str,
        #[source]
        source: std::io::Error,
    },
}
