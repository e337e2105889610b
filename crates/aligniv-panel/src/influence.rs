//! Synthetic treatment and instrument for demonstrating the causal
//! estimator.
//!
//! Treatment is the topical alignment of a user's assigned influencer, shifted
//! by a monthly shock. The shock series depends only on the month list and
//! the generator passed in, never on any user attribute.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use aligniv_core::{
    AugmentedPanel, AugmentedRow, Month, NormalSampler, Panel, PipelineError, Stage,
};
use rand::Rng;

const BASE_SHOCK_MEAN: f64 = 0.0;
const BASE_SHOCK_SD: f64 = 0.5;
const SPIKE_MEAN: f64 = 1.5;
const SPIKE_SD: f64 = 0.3;
const MONTHS_PER_SPIKE: usize = 6;

/// Mapping from every panel user to an influencer.
#[derive(Debug, Clone, PartialEq)]
pub struct InfluencerAssignment {
    influencers: Vec<String>,
    map: BTreeMap<String, String>,
}

impl InfluencerAssignment {
    /// Influencers in rank order (highest volume first).
    #[must_use]
    pub fn influencers(&self) -> &[String] {
        &self.influencers
    }

    #[must_use]
    pub fn influencer_of(&self, user_id: &str) -> Option<&str> {
        self.map.get(user_id).map(String::as_str)
    }

    #[must_use]
    pub fn is_influencer(&self, user_id: &str) -> bool {
        self.influencer_of(user_id) == Some(user_id)
    }

    /// `(user_id, influencer)` pairs sorted by user.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.map.iter().map(|(u, i)| (u.as_str(), i.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Number of influencers for `users` distinct users: `max(1, round(fraction * users))`,
/// capped at `users`.
#[must_use]
pub fn influencer_count(users: usize, fraction: f64) -> usize {
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    let rounded = (fraction * users as f64).round().max(0.0) as usize;
    rounded.max(1).min(users)
}

/// Pick the top `fraction` of users by total event volume as influencers and
/// map everyone else to one of them uniformly at random.
///
/// Volume ties are broken by ascending `user_id`. Non-influencers draw from
/// `rng` in ascending `user_id` order.
///
/// # Errors
///
/// Returns [`PipelineError::DegenerateInput`] if the panel has no rows.
pub fn assign_influencers<R: Rng + ?Sized>(
    panel: &Panel,
    fraction: f64,
    rng: &mut R,
) -> Result<InfluencerAssignment, PipelineError> {
    let mut volumes: BTreeMap<&str, u64> = BTreeMap::new();
    for (row, volume) in panel.rows.iter().zip(panel.row_volumes()) {
        let total = volumes.entry(row.user_id.as_str()).or_default();
        *total = total.saturating_add(volume);
    }
    if volumes.is_empty() {
        return Err(PipelineError::degenerate(
            Stage::InfluencerSynthesis,
            "panel has no users",
        ));
    }

    let mut ranked: Vec<(&str, u64)> = volumes.iter().map(|(u, v)| (*u, *v)).collect();
    ranked.sort_by_key(|(user, volume)| (Reverse(*volume), *user));

    let count = influencer_count(ranked.len(), fraction);
    let influencers: Vec<String> = ranked[..count]
        .iter()
        .map(|(u, _)| (*u).to_string())
        .collect();

    let mut map = BTreeMap::new();
    for user in volumes.keys() {
        let influencer = if influencers.iter().any(|i| i == user) {
            (*user).to_string()
        } else {
            influencers[rng.random_range(0..influencers.len())].clone()
        };
        map.insert((*user).to_string(), influencer);
    }

    tracing::info!(
        users = map.len(),
        influencers = influencers.len(),
        "assigned influencers"
    );

    Ok(InfluencerAssignment { influencers, map })
}

/// Exogenous monthly shock: Normal(0, 0.5) per month plus a Normal(1.5, 0.3)
/// spike on a random subset of `max(1, ceil(months / 6))` months.
#[derive(Debug, Clone, PartialEq)]
pub struct InstrumentSeries {
    shocks: BTreeMap<Month, f64>,
    spike_months: Vec<Month>,
}

impl InstrumentSeries {
    /// Build the series over the distinct months in `months`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::DegenerateInput`] for fewer than two distinct
    /// months.
    pub fn build<I, R>(months: I, rng: &mut R) -> Result<Self, PipelineError>
    where
        I: IntoIterator<Item = Month>,
        R: Rng + ?Sized,
    {
        let stage = Stage::InstrumentSynthesis;
        let months: Vec<Month> = months
            .into_iter()
            .collect::<std::collections::BTreeSet<_>>()
            .into_iter()
            .collect();
        if months.len() < 2 {
            return Err(PipelineError::degenerate(
                stage,
                format!(
                    "instrument needs at least 2 distinct months, found {}",
                    months.len()
                ),
            ));
        }

        let base = NormalSampler::new(BASE_SHOCK_MEAN, BASE_SHOCK_SD)
            .map_err(|e| PipelineError::numeric(stage, e.to_string()))?;
        let spike = NormalSampler::new(SPIKE_MEAN, SPIKE_SD)
            .map_err(|e| PipelineError::numeric(stage, e.to_string()))?;

        let mut values: Vec<f64> = months.iter().map(|_| base.sample(rng)).collect();

        let spike_count = months.len().div_ceil(MONTHS_PER_SPIKE).max(1);
        let mut spike_idx = rand::seq::index::sample(rng, months.len(), spike_count).into_vec();
        spike_idx.sort_unstable();
        for &i in &spike_idx {
            values[i] += spike.sample(rng);
        }

        let spike_months = spike_idx.iter().map(|&i| months[i]).collect();
        let shocks = months.into_iter().zip(values).collect();

        Ok(Self {
            shocks,
            spike_months,
        })
    }

    #[must_use]
    pub fn get(&self, month: Month) -> Option<f64> {
        self.shocks.get(&month).copied()
    }

    #[must_use]
    pub fn spike_months(&self) -> &[Month] {
        &self.spike_months
    }

    /// `(month, shock)` in month order.
    pub fn iter(&self) -> impl Iterator<Item = (Month, f64)> + '_ {
        self.shocks.iter().map(|(m, s)| (*m, *s))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.shocks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shocks.is_empty()
    }
}

/// Attach influencer, influencer topical alignment, monthly shock and
/// treatment to every panel row.
///
/// When an influencer has no row for a month, the global mean topical
/// alignment is used instead.
///
/// # Errors
///
/// Returns [`PipelineError::DataIntegrity`] if a row's user has no
/// influencer or a row's month has no shock.
pub fn augment_panel(
    panel: &Panel,
    assignment: &InfluencerAssignment,
    instrument: &InstrumentSeries,
    shock_strength: f64,
) -> Result<AugmentedPanel, PipelineError> {
    if panel.rows.is_empty() {
        return Err(PipelineError::degenerate(
            Stage::InfluencerSynthesis,
            "panel has no rows",
        ));
    }

    let own_score: BTreeMap<(&str, Month), f64> = panel
        .rows
        .iter()
        .map(|r| ((r.user_id.as_str(), r.month), r.topical_alignment))
        .collect();
    #[allow(clippy::cast_precision_loss)]
    let global_mean = panel.rows.iter().map(|r| r.topical_alignment).sum::<f64>()
        / panel.rows.len() as f64;

    let mut fallbacks = 0_usize;
    let mut rows = Vec::with_capacity(panel.rows.len());
    for row in &panel.rows {
        let influencer = assignment.influencer_of(&row.user_id).ok_or_else(|| {
            PipelineError::data_integrity(
                Stage::InfluencerSynthesis,
                format!("user {} has no assigned influencer", row.user_id),
            )
        })?;
        let monthly_shock = instrument.get(row.month).ok_or_else(|| {
            PipelineError::data_integrity(
                Stage::InstrumentSynthesis,
                format!("no instrument value for month {}", row.month),
            )
        })?;
        let influencer_topical_alignment =
            if let Some(score) = own_score.get(&(influencer, row.month)) {
                *score
            } else {
                fallbacks += 1;
                global_mean
            };
        rows.push(AugmentedRow {
            row: row.clone(),
            influencer: influencer.to_string(),
            influencer_topical_alignment,
            monthly_shock,
            treatment: influencer_topical_alignment + shock_strength * monthly_shock,
        });
    }

    tracing::info!(
        rows = rows.len(),
        fallbacks,
        shock_strength,
        "augmented panel with treatment and instrument"
    );

    Ok(AugmentedPanel {
        categories: panel.categories.clone(),
        rows,
    })
}

#[cfg(test)]
#[path = "influence_test.rs"]
mod tests;
