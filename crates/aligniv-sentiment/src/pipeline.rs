//! Per-post sentiment scoring.

use aligniv_core::{Post, SentimentObservation};

use crate::scorer::lexicon_score;

/// Score every post with the lexicon scorer.
///
/// Output order matches input order, one observation per post. An empty
/// input yields an empty output; the alignment engine decides whether that
/// is fatal.
#[must_use]
pub fn score_posts(posts: &[Post]) -> Vec<SentimentObservation> {
    let observations: Vec<SentimentObservation> = posts
        .iter()
        .map(|post| SentimentObservation {
            user_id: post.user_id.clone(),
            timestamp: post.timestamp,
            score: lexicon_score(&post.text),
        })
        .collect();

    if observations.is_empty() {
        tracing::info!("no posts to score");
        return observations;
    }

    #[allow(clippy::cast_precision_loss)]
    let denom = observations.len() as f64;
    let mean: f64 = observations.iter().map(|o| o.score).sum::<f64>() / denom;
    let neutral = observations.iter().filter(|o| o.score == 0.0).count();
    tracing::info!(
        posts = observations.len(),
        neutral,
        mean_score = mean,
        "scored post sentiment"
    );

    observations
}
