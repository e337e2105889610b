//! Sentiment side of the aligniv pipeline.
//!
//! Cleans post text, scores it with a lexicon, and turns per-post sentiment
//! into per-user-month alignment against the community's monthly baseline.

pub mod alignment;
pub mod pipeline;
pub mod scorer;
pub mod text;

pub use alignment::{
    alignment_score, community_sentiment, compute_sentiment_alignment, user_month_sentiment,
};
pub use pipeline::score_posts;
pub use scorer::lexicon_score;
pub use text::{clean_text, tokenize};
