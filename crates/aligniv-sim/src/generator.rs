//! Synthetic population: posts and check-ins for `num_users` users over
//! `months` thirty-day periods.

use aligniv_core::{
    CheckinEvent, DirichletSampler, PoissonSampler, Post, SimulationConfig,
};
use chrono::{DateTime, Days, NaiveDate, NaiveTime, TimeZone, Utc};
use rand::distr::weighted::WeightedIndex;
use rand::distr::Distribution;
use rand::Rng;

use crate::error::SimError;
use crate::templates::{CHECKIN_CATEGORIES, TEMPLATES, TOPICS};

const TOPIC_PREFERENCE_ALPHA: f64 = 0.8;
const MIN_POSTS_PER_USER: u64 = 5;
const DAYS_PER_PERIOD: u64 = 30;
const POST_DAY_SPREAD: u64 = 28;
const CHECKIN_RATE: f64 = 1.5;
const BURST_PROBABILITY: f64 = 0.01;
const BURST_MIN: u64 = 10;
const BURST_MAX_EXCLUSIVE: u64 = 20;

/// A generated post together with the topic its template was drawn from.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedPost {
    pub post: Post,
    pub true_topic: &'static str,
}

#[derive(Debug, Clone, Default)]
pub struct SyntheticData {
    pub posts: Vec<SimulatedPost>,
    pub checkins: Vec<CheckinEvent>,
}

impl SyntheticData {
    /// The raw post log without simulation labels.
    #[must_use]
    pub fn posts(&self) -> Vec<Post> {
        self.posts.iter().map(|p| p.post.clone()).collect()
    }
}

fn timestamp_after(start: NaiveDate, days: u64) -> Result<DateTime<Utc>, SimError> {
    let date = start
        .checked_add_days(Days::new(days))
        .ok_or(SimError::DateOutOfRange { start, days })?;
    Ok(Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)))
}

/// Generate the synthetic post log and check-in log.
///
/// Each user gets a Dirichlet topic preference and a Poisson number of posts
/// (at least five), each placed in a uniformly chosen period and rendered
/// from a template of a topic drawn from that preference. Check-ins are
/// Poisson counts per user, period and category, with occasional bursts;
/// zero counts are not recorded.
///
/// # Errors
///
/// Returns [`SimError`] if a sampler cannot be built from the config or a
/// generated date overflows the calendar.
pub fn generate<R: Rng + ?Sized>(
    config: &SimulationConfig,
    rng: &mut R,
) -> Result<SyntheticData, SimError> {
    let preference = DirichletSampler::new(TOPIC_PREFERENCE_ALPHA, TOPICS.len())?;
    let post_count = PoissonSampler::new(config.posts_per_user_mean)?;
    let checkin_count = PoissonSampler::new(CHECKIN_RATE)?;

    let mut data = SyntheticData::default();

    for uid in 0..config.num_users {
        let user_id = format!("user_{uid}");
        let topic_pref = preference.sample(rng);
        let topic_index =
            WeightedIndex::new(&topic_pref).map_err(|e| SimError::TopicWeights {
                user_id: user_id.clone(),
                reason: e.to_string(),
            })?;

        let num_posts = post_count.sample(rng).max(MIN_POSTS_PER_USER);
        for _ in 0..num_posts {
            let period = u64::from(rng.random_range(0..config.months));
            let day = rng.random_range(0..POST_DAY_SPREAD);
            let timestamp = timestamp_after(config.start_date, DAYS_PER_PERIOD * period + day)?;
            let topic = topic_index.sample(rng);
            let templates = &TEMPLATES[topic];
            let text = templates[rng.random_range(0..templates.len())];
            data.posts.push(SimulatedPost {
                post: Post {
                    user_id: user_id.clone(),
                    timestamp,
                    text: text.to_string(),
                },
                true_topic: TOPICS[topic],
            });
        }

        for period in 0..u64::from(config.months) {
            let timestamp = timestamp_after(config.start_date, DAYS_PER_PERIOD * period)?;
            for category in CHECKIN_CATEGORIES {
                let mut count = checkin_count.sample(rng);
                if rng.random::<f64>() < BURST_PROBABILITY {
                    count += rng.random_range(BURST_MIN..BURST_MAX_EXCLUSIVE);
                }
                if count > 0 {
                    data.checkins.push(CheckinEvent {
                        user_id: user_id.clone(),
                        timestamp,
                        category: category.to_string(),
                        count,
                    });
                }
            }
        }
    }

    tracing::info!(
        users = config.num_users,
        months = config.months,
        posts = data.posts.len(),
        checkins = data.checkins.len(),
        "generated synthetic activity"
    );

    Ok(data)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use aligniv_core::Month;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    fn small_config() -> SimulationConfig {
        SimulationConfig {
            num_users: 12,
            posts_per_user_mean: 20.0,
            months: 3,
            start_date: NaiveDate::from_ymd_opt(2010, 1, 1).unwrap(),
        }
    }

    #[test]
    fn same_seed_same_data() {
        let config = small_config();
        let a = generate(&config, &mut StdRng::seed_from_u64(42)).unwrap();
        let b = generate(&config, &mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(a.posts, b.posts);
        assert_eq!(a.checkins, b.checkins);
    }

    #[test]
    fn every_user_posts_at_least_the_minimum() {
        let data = generate(&small_config(), &mut StdRng::seed_from_u64(1)).unwrap();
        for uid in 0..12 {
            let user = format!("user_{uid}");
            let n = data.posts.iter().filter(|p| p.post.user_id == user).count();
            assert!(n >= 5, "{user} has {n} posts");
        }
    }

    #[test]
    fn posts_stay_within_simulated_periods() {
        let config = small_config();
        let data = generate(&config, &mut StdRng::seed_from_u64(5)).unwrap();
        let start = timestamp_after(config.start_date, 0).unwrap();
        let end = timestamp_after(config.start_date, 90).unwrap();
        assert!(data
            .posts
            .iter()
            .all(|p| p.post.timestamp >= start && p.post.timestamp < end));
        let months: BTreeSet<Month> = data
            .posts
            .iter()
            .map(|p| Month::from_timestamp(p.post.timestamp))
            .collect();
        assert!(months.len() <= 3);
    }

    #[test]
    fn post_text_matches_true_topic_templates() {
        let data = generate(&small_config(), &mut StdRng::seed_from_u64(9)).unwrap();
        for p in &data.posts {
            let idx = TOPICS.iter().position(|t| *t == p.true_topic).unwrap();
            assert!(TEMPLATES[idx].contains(&p.post.text.as_str()));
        }
    }

    #[test]
    fn checkins_are_positive_and_categorized() {
        let data = generate(&small_config(), &mut StdRng::seed_from_u64(3)).unwrap();
        assert!(!data.checkins.is_empty());
        assert!(data.checkins.iter().all(|c| c.count > 0));
        assert!(data
            .checkins
            .iter()
            .all(|c| CHECKIN_CATEGORIES.contains(&c.category.as_str())));
    }

    #[test]
    fn invalid_post_rate_is_rejected() {
        let config = SimulationConfig {
            posts_per_user_mean: -1.0,
            ..small_config()
        };
        let err = generate(&config, &mut StdRng::seed_from_u64(0)).unwrap_err();
        assert!(matches!(err, SimError::Sampling(_)));
    }
}
