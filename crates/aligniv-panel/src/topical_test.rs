use chrono::{DateTime, TimeZone, Utc};

use super::*;

fn ts(month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2010, month, day, 9, 30, 0).unwrap()
}

fn obs(user: &str, month: u32, day: u32, weights: &[f64]) -> TopicObservation {
    TopicObservation {
        user_id: user.to_string(),
        timestamp: ts(month, day),
        weights: weights.to_vec(),
    }
}

#[test]
fn identical_users_score_one_every_month() {
    // Ten users, three months, the same topic mix for everyone in a month.
    let mixes = [[0.7, 0.2, 0.1], [0.1, 0.1, 0.8], [0.25, 0.5, 0.25]];
    let mut log = Vec::new();
    for u in 0..10 {
        for (m, mix) in mixes.iter().enumerate() {
            let month = u32::try_from(m).unwrap() + 1;
            log.push(obs(&format!("user_{u}"), month, 3, mix));
            log.push(obs(&format!("user_{u}"), month, 17, mix));
        }
    }
    let rows = compute_topical_alignment(&log).unwrap();
    assert_eq!(rows.len(), 30);
    assert!(rows.iter().all(|r| (r.score - 1.0).abs() < 1e-12), "{rows:?}");
}

#[test]
fn profiles_average_then_renormalize() {
    let profiles = user_topic_profiles(&[
        obs("a", 1, 1, &[1.0, 0.0]),
        obs("a", 1, 2, &[0.0, 1.0]),
        obs("a", 1, 3, &[0.0, 1.0]),
    ])
    .unwrap();
    assert_eq!(profiles.len(), 1);
    let w = &profiles[0].weights;
    assert!((w[0] - 1.0 / 3.0).abs() < 1e-12);
    assert!((w[1] - 2.0 / 3.0).abs() < 1e-12);
}

#[test]
fn absent_user_months_are_not_imputed() {
    let profiles = user_topic_profiles(&[
        obs("a", 1, 1, &[1.0, 0.0]),
        obs("a", 2, 1, &[1.0, 0.0]),
        obs("b", 2, 1, &[0.0, 1.0]),
    ])
    .unwrap();
    let keys: Vec<(String, String)> = profiles
        .iter()
        .map(|p| (p.user_id.clone(), p.month.to_string()))
        .collect();
    assert_eq!(
        keys,
        vec![
            ("a".to_string(), "2010-01-01".to_string()),
            ("a".to_string(), "2010-02-01".to_string()),
            ("b".to_string(), "2010-02-01".to_string()),
        ]
    );
}

#[test]
fn community_profiles_sum_to_one_or_are_zero() {
    let profiles = user_topic_profiles(&[
        obs("a", 1, 1, &[0.6, 0.4, 0.0]),
        obs("b", 1, 1, &[0.0, 0.0, 1.0]),
        obs("a", 2, 1, &[0.0, 0.0, 0.0]),
        obs("b", 2, 4, &[0.0, 0.0, 0.0]),
    ])
    .unwrap();
    let community = community_profiles(&profiles);
    assert_eq!(community.len(), 2);
    assert!((community[0].weights.iter().sum::<f64>() - 1.0).abs() < 1e-12);
    assert!(community[1].weights.iter().all(|w| *w == 0.0));
}

#[test]
fn zero_mass_month_fails_alignment_naming_month() {
    let err = compute_topical_alignment(&[
        obs("a", 1, 1, &[0.5, 0.5]),
        obs("a", 2, 1, &[0.0, 0.0]),
    ])
    .unwrap_err();
    assert!(matches!(err, PipelineError::DegenerateInput { .. }));
    assert!(err.to_string().contains("2010-02-01"), "{err}");
}

#[test]
fn score_recomputes_from_stored_profiles() {
    let log = [
        obs("a", 5, 1, &[0.9, 0.1]),
        obs("b", 5, 1, &[0.2, 0.8]),
        obs("c", 5, 2, &[0.5, 0.5]),
    ];
    let profiles = user_topic_profiles(&log).unwrap();
    let community = community_profiles(&profiles);
    let rows = compute_topical_alignment(&log).unwrap();
    for (row, profile) in rows.iter().zip(&profiles) {
        let again = alignment_score(&profile.weights, &community[0].weights);
        assert!((row.score - again).abs() < 1e-12);
    }
}

#[test]
fn opposite_distributions_reach_lower_bound() {
    assert!((alignment_score(&[1.0, 0.0], &[0.0, 1.0]) + 1.0).abs() < 1e-12);
}

#[test]
fn empty_log_is_degenerate() {
    let err = compute_topical_alignment(&[]).unwrap_err();
    assert!(matches!(err, PipelineError::DegenerateInput { .. }));
}

#[test]
fn mismatched_dimensions_are_data_integrity() {
    let err = user_topic_profiles(&[
        obs("a", 1, 1, &[0.5, 0.5]),
        obs("b", 1, 1, &[0.2, 0.3, 0.5]),
    ])
    .unwrap_err();
    assert!(matches!(err, PipelineError::DataIntegrity { .. }));
}

#[test]
fn negative_weight_is_data_integrity() {
    let err = user_topic_profiles(&[obs("a", 1, 1, &[1.5, -0.5])]).unwrap_err();
    assert!(matches!(err, PipelineError::DataIntegrity { .. }));
}
