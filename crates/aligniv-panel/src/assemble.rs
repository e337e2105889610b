//! Panel assembly: join the two alignment tables and attach pivoted event
//! counts.

use std::collections::{BTreeMap, BTreeSet};

use aligniv_core::{
    CheckinEvent, Month, Panel, PanelRow, PipelineError, SentimentAlignment, Stage,
    TopicalAlignment, FIXED_COLUMNS,
};

const STAGE: Stage = Stage::PanelAssembly;

type Key = (String, Month);

/// Event counts summed per `(user_id, month, category)` and pivoted to one
/// column per category.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventCounts {
    /// Distinct categories, sorted.
    pub categories: Vec<String>,
    /// Counts aligned with `categories`, zero-filled.
    pub counts: BTreeMap<(String, Month), Vec<u64>>,
}

/// Sum check-in counts by `(user_id, month, category)` and pivot.
///
/// # Errors
///
/// Returns [`PipelineError::DataIntegrity`] for an empty category name, a
/// category that would shadow a fixed panel column, or a summed count that
/// overflows `u64`.
pub fn pivot_event_counts(checkins: &[CheckinEvent]) -> Result<EventCounts, PipelineError> {
    let mut categories = BTreeSet::new();
    for event in checkins {
        let category = event.category.as_str();
        if category.trim().is_empty() {
            return Err(PipelineError::data_integrity(
                STAGE,
                format!("empty event category for user {}", event.user_id),
            ));
        }
        if FIXED_COLUMNS.contains(&category) {
            return Err(PipelineError::data_integrity(
                STAGE,
                format!("event category '{category}' collides with a panel column"),
            ));
        }
        categories.insert(category);
    }
    let categories: Vec<String> = categories.into_iter().map(str::to_string).collect();

    let mut counts: BTreeMap<Key, Vec<u64>> = BTreeMap::new();
    for event in checkins {
        // Categories were collected from these same events.
        let Ok(idx) = categories.binary_search(&event.category) else {
            continue;
        };
        let month = Month::from_timestamp(event.timestamp);
        let row = counts
            .entry((event.user_id.clone(), month))
            .or_insert_with(|| vec![0; categories.len()]);
        row[idx] = row[idx].checked_add(event.count).ok_or_else(|| {
            PipelineError::data_integrity(
                STAGE,
                format!(
                    "event count overflow for ({}, {month}, {})",
                    event.user_id, event.category
                ),
            )
        })?;
    }

    Ok(EventCounts { categories, counts })
}

fn index_unique<'a, T, F>(
    rows: &'a [T],
    table: &str,
    key: F,
) -> Result<BTreeMap<Key, &'a T>, PipelineError>
where
    F: Fn(&T) -> Key,
{
    let mut index = BTreeMap::new();
    for row in rows {
        let (user_id, month) = key(row);
        if index.insert((user_id.clone(), month), row).is_some() {
            return Err(PipelineError::data_integrity(
                STAGE,
                format!("duplicate key ({user_id}, {month}) in {table} table"),
            ));
        }
    }
    Ok(index)
}

/// Assemble the user-month panel.
///
/// Topical and sentiment alignment are inner-joined on `(user_id, month)`;
/// event counts are left-joined with missing counts as zero. Rows come out
/// sorted by key.
///
/// # Errors
///
/// Returns [`PipelineError::DataIntegrity`] if either alignment table has a
/// duplicate key, the join is empty, the join drops more than
/// `max_drop_fraction` of the larger table, or a category is invalid.
pub fn assemble_panel(
    topical: &[TopicalAlignment],
    sentiment: &[SentimentAlignment],
    checkins: &[CheckinEvent],
    max_drop_fraction: f64,
) -> Result<Panel, PipelineError> {
    let topical_index = index_unique(topical, "topical alignment", |r| {
        (r.user_id.clone(), r.month)
    })?;
    let sentiment_index = index_unique(sentiment, "sentiment alignment", |r| {
        (r.user_id.clone(), r.month)
    })?;
    let events = pivot_event_counts(checkins)?;

    let mut rows = Vec::with_capacity(topical_index.len().min(sentiment_index.len()));
    for (key, t) in &topical_index {
        let Some(s) = sentiment_index.get(key) else {
            continue;
        };
        let event_counts = events
            .counts
            .get(key)
            .cloned()
            .unwrap_or_else(|| vec![0; events.categories.len()]);
        rows.push(PanelRow {
            user_id: key.0.clone(),
            month: key.1,
            topical_alignment: t.score,
            avg_sentiment: s.avg_sentiment,
            community_sentiment: s.community_sentiment,
            sentiment_alignment: s.score,
            event_counts,
        });
    }

    let larger = topical_index.len().max(sentiment_index.len());
    if rows.is_empty() {
        return Err(PipelineError::data_integrity(
            STAGE,
            format!(
                "alignment join is empty ({} topical rows, {} sentiment rows share no (user_id, month) key)",
                topical_index.len(),
                sentiment_index.len()
            ),
        ));
    }

    #[allow(clippy::cast_precision_loss)]
    let dropped_fraction = 1.0 - rows.len() as f64 / larger as f64;
    if dropped_fraction > max_drop_fraction {
        return Err(PipelineError::data_integrity(
            STAGE,
            format!(
                "alignment join dropped {:.1}% of rows ({} of {larger} kept), limit is {:.1}%",
                dropped_fraction * 100.0,
                rows.len(),
                max_drop_fraction * 100.0
            ),
        ));
    }
    if dropped_fraction > 0.0 {
        tracing::warn!(
            kept = rows.len(),
            larger,
            dropped_fraction,
            "alignment join dropped rows within tolerance"
        );
    }

    tracing::info!(
        rows = rows.len(),
        categories = events.categories.len(),
        "assembled panel"
    );

    Ok(Panel {
        categories: events.categories,
        rows,
    })
}

#[cfg(test)]
#[path = "assemble_test.rs"]
mod tests;
