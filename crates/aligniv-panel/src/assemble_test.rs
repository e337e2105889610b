use chrono::{NaiveDate, TimeZone, Utc};

use super::*;

fn month(m: u32) -> Month {
    Month::containing(NaiveDate::from_ymd_opt(2010, m, 1).unwrap())
}

fn topical(user: &str, m: u32, score: f64) -> TopicalAlignment {
    TopicalAlignment {
        user_id: user.to_string(),
        month: month(m),
        score,
    }
}

fn sentiment(user: &str, m: u32, avg: f64) -> SentimentAlignment {
    SentimentAlignment {
        user_id: user.to_string(),
        month: month(m),
        avg_sentiment: avg,
        community_sentiment: 0.1,
        score: 1.0 - (avg - 0.1).abs(),
    }
}

fn checkin(user: &str, m: u32, day: u32, category: &str, count: u64) -> CheckinEvent {
    CheckinEvent {
        user_id: user.to_string(),
        timestamp: Utc.with_ymd_and_hms(2010, m, day, 0, 0, 0).unwrap(),
        category: category.to_string(),
        count,
    }
}

#[test]
fn pivot_sums_within_user_month_category() {
    let events = pivot_event_counts(&[
        checkin("a", 1, 1, "gym", 2),
        checkin("a", 1, 20, "gym", 3),
        checkin("a", 1, 5, "food", 1),
        checkin("b", 2, 1, "shop", 4),
    ])
    .unwrap();
    assert_eq!(events.categories, vec!["food", "gym", "shop"]);
    assert_eq!(events.counts[&("a".to_string(), month(1))], vec![1, 5, 0]);
    assert_eq!(events.counts[&("b".to_string(), month(2))], vec![0, 0, 4]);
}

#[test]
fn overflowing_count_is_data_integrity() {
    let err = pivot_event_counts(&[
        checkin("a", 1, 1, "gym", u64::MAX),
        checkin("a", 1, 2, "gym", 1),
    ])
    .unwrap_err();
    assert!(matches!(err, PipelineError::DataIntegrity { .. }), "{err}");
    assert!(err.to_string().contains("(a, 2010-01-01, gym)"), "{err}");
}

#[test]
fn joins_and_left_fills_counts() {
    let panel = assemble_panel(
        &[topical("a", 1, 0.9), topical("b", 1, 0.4)],
        &[sentiment("b", 1, -0.2), sentiment("a", 1, 0.3)],
        &[checkin("a", 1, 1, "gym", 2)],
        0.05,
    )
    .unwrap();
    assert_eq!(panel.categories, vec!["gym"]);
    assert_eq!(panel.rows.len(), 2);
    assert_eq!(panel.rows[0].user_id, "a");
    assert_eq!(panel.rows[0].event_counts, vec![2]);
    assert!((panel.rows[0].avg_sentiment - 0.3).abs() < 1e-12);
    assert_eq!(panel.rows[1].user_id, "b");
    assert_eq!(panel.rows[1].event_counts, vec![0]);
    assert!((panel.rows[1].topical_alignment - 0.4).abs() < 1e-12);
}

#[test]
fn empty_event_log_still_builds_panel() {
    let panel = assemble_panel(
        &[topical("a", 1, 0.9), topical("a", 2, 0.8)],
        &[sentiment("a", 1, 0.3), sentiment("a", 2, 0.1)],
        &[],
        0.05,
    )
    .unwrap();
    assert!(panel.categories.is_empty());
    assert_eq!(panel.rows.len(), 2);
    assert!(panel.rows.iter().all(|r| r.event_counts.is_empty()));
    assert_eq!(panel.row_volumes(), vec![0, 0]);
}

#[test]
fn disjoint_tables_are_data_integrity() {
    let err = assemble_panel(
        &[topical("a", 1, 0.9)],
        &[sentiment("b", 1, 0.3)],
        &[],
        1.0,
    )
    .unwrap_err();
    assert!(matches!(err, PipelineError::DataIntegrity { .. }));
    assert!(err.to_string().contains("join is empty"), "{err}");
}

#[test]
fn excessive_drop_is_data_integrity() {
    let topical_rows: Vec<_> = (0..10).map(|u| topical(&format!("u{u}"), 1, 0.5)).collect();
    let sentiment_rows: Vec<_> = (0..8).map(|u| sentiment(&format!("u{u}"), 1, 0.2)).collect();
    let err = assemble_panel(&topical_rows, &sentiment_rows, &[], 0.05).unwrap_err();
    assert!(matches!(err, PipelineError::DataIntegrity { .. }));
    assert!(err.to_string().contains("20.0%"), "{err}");

    let panel = assemble_panel(&topical_rows, &sentiment_rows, &[], 0.25).unwrap();
    assert_eq!(panel.rows.len(), 8);
}

#[test]
fn duplicate_key_is_data_integrity() {
    let err = assemble_panel(
        &[topical("a", 1, 0.9), topical("a", 1, 0.8)],
        &[sentiment("a", 1, 0.3)],
        &[],
        0.05,
    )
    .unwrap_err();
    assert!(matches!(err, PipelineError::DataIntegrity { .. }));
}

#[test]
fn category_shadowing_fixed_column_is_rejected() {
    let err = pivot_event_counts(&[checkin("a", 1, 1, "treatment", 1)]).unwrap_err();
    assert!(matches!(err, PipelineError::DataIntegrity { .. }));
    let err = pivot_event_counts(&[checkin("a", 1, 1, " ", 1)]).unwrap_err();
    assert!(matches!(err, PipelineError::DataIntegrity { .. }));
}
