//! Sentiment alignment: how close each user's monthly mood is to the
//! community's.

use std::collections::BTreeMap;

use aligniv_core::{
    Month, PipelineError, SentimentAlignment, SentimentObservation, Stage, UserMonthSentiment,
};

const STAGE: Stage = Stage::SentimentAlignment;

/// Mean sentiment per `(user_id, month)`, sorted by key.
///
/// # Errors
///
/// - [`PipelineError::DegenerateInput`] if `observations` is empty.
/// - [`PipelineError::DataIntegrity`] if any score is NaN or infinite.
pub fn user_month_sentiment(
    observations: &[SentimentObservation],
) -> Result<Vec<UserMonthSentiment>, PipelineError> {
    if observations.is_empty() {
        return Err(PipelineError::degenerate(STAGE, "sentiment log is empty"));
    }

    let mut groups: BTreeMap<(String, Month), (f64, u32)> = BTreeMap::new();
    for obs in observations {
        let month = Month::from_timestamp(obs.timestamp);
        if !obs.score.is_finite() {
            return Err(PipelineError::data_integrity(
                STAGE,
                format!(
                    "non-finite sentiment {} for user {} in month {month}",
                    obs.score, obs.user_id
                ),
            ));
        }
        let entry = groups.entry((obs.user_id.clone(), month)).or_insert((0.0, 0));
        entry.0 += obs.score;
        entry.1 += 1;
    }

    Ok(groups
        .into_iter()
        .map(|((user_id, month), (sum, count))| UserMonthSentiment {
            user_id,
            month,
            avg_sentiment: sum / f64::from(count),
        })
        .collect())
}

/// Mean of all users' monthly sentiment, per month.
#[must_use]
pub fn community_sentiment(user_months: &[UserMonthSentiment]) -> BTreeMap<Month, f64> {
    let mut sums: BTreeMap<Month, (f64, u32)> = BTreeMap::new();
    for um in user_months {
        let entry = sums.entry(um.month).or_insert((0.0, 0));
        entry.0 += um.avg_sentiment;
        entry.1 += 1;
    }
    sums.into_iter()
        .map(|(month, (sum, count))| (month, sum / f64::from(count)))
        .collect()
}

/// `1 - |user - community|`.
#[must_use]
pub fn alignment_score(avg_sentiment: f64, community_sentiment: f64) -> f64 {
    1.0 - (avg_sentiment - community_sentiment).abs()
}

/// Run the sentiment alignment engine over per-post sentiment.
///
/// Output rows are sorted by `(user_id, month)`.
///
/// # Errors
///
/// Propagates [`user_month_sentiment`] errors, and returns
/// [`PipelineError::DegenerateInput`] for a month in which every user's mean
/// sentiment is exactly zero (the community baseline carries no signal).
pub fn compute_sentiment_alignment(
    observations: &[SentimentObservation],
) -> Result<Vec<SentimentAlignment>, PipelineError> {
    let user_months = user_month_sentiment(observations)?;

    let mut nonzero_months: BTreeMap<Month, bool> = BTreeMap::new();
    for um in &user_months {
        *nonzero_months.entry(um.month).or_insert(false) |= um.avg_sentiment != 0.0;
    }
    if let Some((month, _)) = nonzero_months.iter().find(|(_, nonzero)| !**nonzero) {
        return Err(PipelineError::degenerate(
            STAGE,
            format!("every user's sentiment is zero in month {month}"),
        ));
    }

    let community = community_sentiment(&user_months);

    let rows: Vec<SentimentAlignment> = user_months
        .into_iter()
        .map(|um| {
            // Every user-month month is a community key by construction.
            let community_sentiment = community.get(&um.month).copied().unwrap_or_default();
            SentimentAlignment {
                score: alignment_score(um.avg_sentiment, community_sentiment),
                user_id: um.user_id,
                month: um.month,
                avg_sentiment: um.avg_sentiment,
                community_sentiment,
            }
        })
        .collect();

    tracing::info!(
        rows = rows.len(),
        months = community.len(),
        "computed sentiment alignment"
    );

    Ok(rows)
}
