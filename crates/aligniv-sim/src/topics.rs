//! Keyword topic model over the template vocabulary.

use std::collections::BTreeMap;

use aligniv_core::{safe_renormalize, Post, TopicObservation};
use aligniv_sentiment::tokenize;

use crate::templates::{TEMPLATES, TOPICS};

const DEFAULT_SMOOTHING: f64 = 0.05;

/// Maps a post to a topic-probability vector by counting keyword hits per
/// topic and adding a small constant to every topic before normalizing.
#[derive(Debug, Clone)]
pub struct KeywordTopicModel {
    topics: Vec<String>,
    keywords: BTreeMap<String, Vec<usize>>,
    smoothing: f64,
}

impl KeywordTopicModel {
    /// Build a model whose keywords are the tokens of each topic's templates.
    #[must_use]
    pub fn from_templates() -> Self {
        let mut keywords: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        for (topic, templates) in TEMPLATES.iter().enumerate() {
            for token in templates.iter().flat_map(|t| tokenize(t)) {
                let topics = keywords.entry(token).or_default();
                if !topics.contains(&topic) {
                    topics.push(topic);
                }
            }
        }
        Self {
            topics: TOPICS.iter().map(|t| (*t).to_string()).collect(),
            keywords,
            smoothing: DEFAULT_SMOOTHING,
        }
    }

    #[must_use]
    pub fn with_smoothing(mut self, smoothing: f64) -> Self {
        self.smoothing = smoothing.max(0.0);
        self
    }

    #[must_use]
    pub fn num_topics(&self) -> usize {
        self.topics.len()
    }

    #[must_use]
    pub fn topics(&self) -> &[String] {
        &self.topics
    }

    /// Topic probabilities for one piece of text. Text with no keyword hits
    /// and zero smoothing maps to the zero vector.
    #[must_use]
    pub fn infer(&self, text: &str) -> Vec<f64> {
        let mut hits = vec![self.smoothing; self.topics.len()];
        for token in tokenize(text) {
            if let Some(topics) = self.keywords.get(&token) {
                for &topic in topics {
                    hits[topic] += 1.0;
                }
            }
        }
        safe_renormalize(&hits).into_weights_or_zero(self.topics.len())
    }

    /// One topic observation per post, in input order.
    #[must_use]
    pub fn infer_posts(&self, posts: &[Post]) -> Vec<TopicObservation> {
        let observations: Vec<TopicObservation> = posts
            .iter()
            .map(|post| TopicObservation {
                user_id: post.user_id.clone(),
                timestamp: post.timestamp,
                weights: self.infer(&post.text),
            })
            .collect();
        tracing::info!(
            posts = observations.len(),
            topics = self.topics.len(),
            "inferred post topics"
        );
        observations
    }
}

impl Default for KeywordTopicModel {
    fn default() -> Self {
        Self::from_templates()
    }
}
