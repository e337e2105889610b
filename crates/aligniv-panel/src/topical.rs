//! Topical alignment: distance between a user's monthly topic mix and the
//! community's.

use std::collections::BTreeMap;

use aligniv_core::{
    mean_vector, safe_renormalize, CommunityTopicProfile, Month, PipelineError, Stage,
    TopicObservation, TopicProfile, TopicalAlignment,
};

const STAGE: Stage = Stage::TopicalAlignment;

/// Renormalized mean topic vector per `(user_id, month)`, sorted by key.
///
/// Users without observations in a month get no profile for that month.
///
/// # Errors
///
/// - [`PipelineError::DegenerateInput`] if `observations` is empty or has
///   zero-length vectors.
/// - [`PipelineError::DataIntegrity`] if vector lengths differ or a weight is
///   negative or not finite.
pub fn user_topic_profiles(
    observations: &[TopicObservation],
) -> Result<Vec<TopicProfile>, PipelineError> {
    let Some(first) = observations.first() else {
        return Err(PipelineError::degenerate(STAGE, "topic log is empty"));
    };
    let k = first.weights.len();
    if k == 0 {
        return Err(PipelineError::degenerate(
            STAGE,
            "topic vectors have no components",
        ));
    }

    let mut groups: BTreeMap<(String, Month), Vec<&[f64]>> = BTreeMap::new();
    for obs in observations {
        let month = Month::from_timestamp(obs.timestamp);
        if obs.weights.len() != k {
            return Err(PipelineError::data_integrity(
                STAGE,
                format!(
                    "topic vector for user {} in month {month} has {} components, expected {k}",
                    obs.user_id,
                    obs.weights.len()
                ),
            ));
        }
        if let Some(w) = obs.weights.iter().find(|w| !w.is_finite() || **w < 0.0) {
            return Err(PipelineError::data_integrity(
                STAGE,
                format!(
                    "invalid topic weight {w} for user {} in month {month}",
                    obs.user_id
                ),
            ));
        }
        groups
            .entry((obs.user_id.clone(), month))
            .or_default()
            .push(&obs.weights);
    }

    Ok(groups
        .into_iter()
        .map(|((user_id, month), vectors)| {
            let mean = mean_vector(vectors, k).unwrap_or_else(|| vec![0.0; k]);
            TopicProfile {
                user_id,
                month,
                weights: safe_renormalize(&mean).into_weights_or_zero(k),
            }
        })
        .collect())
}

/// Mean of all user profiles per month, renormalized. A month in which every
/// profile is all zero yields the zero vector.
#[must_use]
pub fn community_profiles(profiles: &[TopicProfile]) -> Vec<CommunityTopicProfile> {
    let mut by_month: BTreeMap<Month, Vec<&[f64]>> = BTreeMap::new();
    for p in profiles {
        by_month.entry(p.month).or_default().push(&p.weights);
    }
    by_month
        .into_iter()
        .map(|(month, vectors)| {
            let k = vectors.first().map_or(0, |v| v.len());
            let mean = mean_vector(vectors, k).unwrap_or_else(|| vec![0.0; k]);
            CommunityTopicProfile {
                month,
                weights: safe_renormalize(&mean).into_weights_or_zero(k),
            }
        })
        .collect()
}

/// `1 - L1(user, community)`. Not clamped; ranges over `[-(K-1), 1]` for
/// distributions over K topics.
#[must_use]
pub fn alignment_score(user: &[f64], community: &[f64]) -> f64 {
    1.0 - user
        .iter()
        .zip(community)
        .map(|(u, c)| (u - c).abs())
        .sum::<f64>()
}

/// Run the topical alignment engine over per-observation topic vectors.
///
/// Output rows are sorted by `(user_id, month)`.
///
/// # Errors
///
/// Propagates [`user_topic_profiles`] errors, and returns
/// [`PipelineError::DegenerateInput`] for a month whose community profile
/// carries no topic mass.
pub fn compute_topical_alignment(
    observations: &[TopicObservation],
) -> Result<Vec<TopicalAlignment>, PipelineError> {
    let profiles = user_topic_profiles(observations)?;
    let community: BTreeMap<Month, Vec<f64>> = community_profiles(&profiles)
        .into_iter()
        .map(|c| (c.month, c.weights))
        .collect();

    if let Some(month) = community
        .iter()
        .find(|(_, w)| w.iter().all(|x| *x == 0.0))
        .map(|(m, _)| *m)
    {
        return Err(PipelineError::degenerate(
            STAGE,
            format!("community topic profile is all zero in month {month}"),
        ));
    }

    let mut rows = Vec::with_capacity(profiles.len());
    for profile in profiles {
        let Some(reference) = community.get(&profile.month) else {
            return Err(PipelineError::data_integrity(
                STAGE,
                format!("no community profile for month {}", profile.month),
            ));
        };
        rows.push(TopicalAlignment {
            score: alignment_score(&profile.weights, reference),
            user_id: profile.user_id,
            month: profile.month,
        });
    }

    tracing::info!(
        rows = rows.len(),
        months = community.len(),
        "computed topical alignment"
    );

    Ok(rows)
}

#[cfg(test)]
#[path = "topical_test.rs"]
mod tests;
