//! Synthetic social-media activity and the keyword topic model used to read
//! it back.

pub mod error;
pub mod export;
pub mod generator;
pub mod templates;
pub mod topics;

pub use error::SimError;
pub use export::{write_synthetic_data, CHECKINS_FILE, POSTS_FILE};
pub use generator::{generate, SimulatedPost, SyntheticData};
pub use topics::KeywordTopicModel;
