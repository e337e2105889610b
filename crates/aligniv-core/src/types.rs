use std::str::FromStr;

use chrono::{DateTime, Datelike, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A calendar month, stored as its first day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Month(NaiveDate);

impl Month {
    /// The month containing `date`.
    #[must_use]
    pub fn containing(date: NaiveDate) -> Self {
        Self(date - Days::new(u64::from(date.day0())))
    }

    /// Truncate a UTC timestamp to its month.
    #[must_use]
    pub fn from_timestamp(ts: DateTime<Utc>) -> Self {
        Self::containing(ts.date_naive())
    }

    #[must_use]
    pub fn first_day(self) -> NaiveDate {
        self.0
    }
}

impl std::fmt::Display for Month {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

/// A raw social-media post: the text payload of one event.
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    pub user_id: String,
    pub timestamp: DateTime<Utc>,
    pub text: String,
}

/// Per-event topic-probability vector produced by the topic model.
#[derive(Debug, Clone, PartialEq)]
pub struct TopicObservation {
    pub user_id: String,
    pub timestamp: DateTime<Utc>,
    pub weights: Vec<f64>,
}

/// Per-event sentiment produced by the sentiment scorer, nominally in [-1, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct SentimentObservation {
    pub user_id: String,
    pub timestamp: DateTime<Utc>,
    pub score: f64,
}

/// A categorized behavioral event (check-in).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckinEvent {
    pub user_id: String,
    pub timestamp: DateTime<Utc>,
    pub category: String,
    pub count: u64,
}

/// A user's renormalized topic distribution for one month.
///
/// Weights sum to 1, or are all zero when the month carried no topic mass.
#[derive(Debug, Clone, PartialEq)]
pub struct TopicProfile {
    pub user_id: String,
    pub month: Month,
    pub weights: Vec<f64>,
}

/// Community-average topic distribution for one month.
#[derive(Debug, Clone, PartialEq)]
pub struct CommunityTopicProfile {
    pub month: Month,
    pub weights: Vec<f64>,
}

/// `1 - L1(user profile, community profile)` for one user-month. Not clamped.
#[derive(Debug, Clone, PartialEq)]
pub struct TopicalAlignment {
    pub user_id: String,
    pub month: Month,
    pub score: f64,
}

/// Mean sentiment for one user-month.
#[derive(Debug, Clone, PartialEq)]
pub struct UserMonthSentiment {
    pub user_id: String,
    pub month: Month,
    pub avg_sentiment: f64,
}

/// Sentiment alignment for one user-month.
#[derive(Debug, Clone, PartialEq)]
pub struct SentimentAlignment {
    pub user_id: String,
    pub month: Month,
    pub avg_sentiment: f64,
    pub community_sentiment: f64,
    /// `1 - |avg_sentiment - community_sentiment|`
    pub score: f64,
}

/// One `(user_id, month)` row of the analysis panel.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelRow {
    pub user_id: String,
    pub month: Month,
    pub topical_alignment: f64,
    pub avg_sentiment: f64,
    pub community_sentiment: f64,
    pub sentiment_alignment: f64,
    /// Aligned with [`Panel::categories`].
    pub event_counts: Vec<u64>,
}

/// The canonical user-month analysis table. Rows are sorted by
/// `(user_id, month)`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Panel {
    pub categories: Vec<String>,
    pub rows: Vec<PanelRow>,
}

impl Panel {
    /// Total event count per row, in row order, saturating at `u64::MAX`.
    #[must_use]
    pub fn row_volumes(&self) -> Vec<u64> {
        self.rows
            .iter()
            .map(|r| {
                r.event_counts
                    .iter()
                    .fold(0_u64, |acc, c| acc.saturating_add(*c))
            })
            .collect()
    }
}

/// A panel row with influencer treatment and instrument attached.
#[derive(Debug, Clone, PartialEq)]
pub struct AugmentedRow {
    pub row: PanelRow,
    pub influencer: String,
    pub influencer_topical_alignment: f64,
    pub monthly_shock: f64,
    pub treatment: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AugmentedPanel {
    pub categories: Vec<String>,
    pub rows: Vec<AugmentedRow>,
}

impl AugmentedPanel {
    /// Extract a numeric column. Returns `None` when `column` names an
    /// event category that is not present.
    #[must_use]
    pub fn column(&self, column: &Column) -> Option<Vec<f64>> {
        let category_idx = match column {
            Column::EventCount(category) => {
                Some(self.categories.iter().position(|c| c == category)?)
            }
            _ => None,
        };
        Some(
            self.rows
                .iter()
                .map(|r| r.value(column, category_idx))
                .collect(),
        )
    }
}

impl AugmentedRow {
    #[allow(clippy::cast_precision_loss)]
    fn value(&self, column: &Column, category_idx: Option<usize>) -> f64 {
        match column {
            Column::TopicalAlignment => self.row.topical_alignment,
            Column::AvgSentiment => self.row.avg_sentiment,
            Column::CommunitySentiment => self.row.community_sentiment,
            Column::SentimentAlignment => self.row.sentiment_alignment,
            Column::InfluencerTopicalAlignment => self.influencer_topical_alignment,
            Column::MonthlyShock => self.monthly_shock,
            Column::Treatment => self.treatment,
            Column::EventCount(_) => {
                category_idx.map_or(0.0, |idx| self.row.event_counts[idx] as f64)
            }
        }
    }
}

/// Panel column names that event categories may not shadow.
pub const FIXED_COLUMNS: &[&str] = &[
    "user_id",
    "month",
    "topical_alignment",
    "avg_sentiment",
    "community_sentiment",
    "sentiment_alignment",
    "influencer",
    "influencer_topical_alignment",
    "monthly_shock",
    "treatment",
];

/// Typed selector over the numeric columns of an [`AugmentedPanel`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Column {
    TopicalAlignment,
    AvgSentiment,
    CommunitySentiment,
    SentimentAlignment,
    InfluencerTopicalAlignment,
    MonthlyShock,
    Treatment,
    /// Pivoted event count for the named category.
    EventCount(String),
}

impl std::fmt::Display for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Column::TopicalAlignment => write!(f, "topical_alignment"),
            Column::AvgSentiment => write!(f, "avg_sentiment"),
            Column::CommunitySentiment => write!(f, "community_sentiment"),
            Column::SentimentAlignment => write!(f, "sentiment_alignment"),
            Column::InfluencerTopicalAlignment => write!(f, "influencer_topical_alignment"),
            Column::MonthlyShock => write!(f, "monthly_shock"),
            Column::Treatment => write!(f, "treatment"),
            Column::EventCount(category) => write!(f, "{category}"),
        }
    }
}

impl FromStr for Column {
    type Err = String;

    /// Any name that is not a fixed numeric column is taken as an event
    /// category.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        match name {
            "" => Err("column name must be non-empty".to_string()),
            "topical_alignment" => Ok(Column::TopicalAlignment),
            "avg_sentiment" => Ok(Column::AvgSentiment),
            "community_sentiment" => Ok(Column::CommunitySentiment),
            "sentiment_alignment" => Ok(Column::SentimentAlignment),
            "influencer_topical_alignment" => Ok(Column::InfluencerTopicalAlignment),
            "monthly_shock" => Ok(Column::MonthlyShock),
            "treatment" => Ok(Column::Treatment),
            "user_id" | "month" | "influencer" => {
                Err(format!("column '{name}' is not numeric"))
            }
            other => Ok(Column::EventCount(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn row(user: &str, counts: Vec<u64>) -> AugmentedRow {
        AugmentedRow {
            row: PanelRow {
                user_id: user.to_string(),
                month: Month::containing(NaiveDate::from_ymd_opt(2010, 3, 1).unwrap()),
                topical_alignment: 0.5,
                avg_sentiment: 0.1,
                community_sentiment: 0.2,
                sentiment_alignment: 0.9,
                event_counts: counts,
            },
            influencer: user.to_string(),
            influencer_topical_alignment: 0.5,
            monthly_shock: -0.25,
            treatment: 0.375,
        }
    }

    #[test]
    fn month_truncates_timestamp() {
        let ts = Utc.with_ymd_and_hms(2010, 2, 27, 13, 45, 0).unwrap();
        let month = Month::from_timestamp(ts);
        assert_eq!(month.first_day(), NaiveDate::from_ymd_opt(2010, 2, 1).unwrap());
        assert_eq!(month.to_string(), "2010-02-01");
    }

    #[test]
    fn month_ordering_follows_calendar() {
        let dec = Month::containing(NaiveDate::from_ymd_opt(2009, 12, 31).unwrap());
        let jan = Month::containing(NaiveDate::from_ymd_opt(2010, 1, 1).unwrap());
        assert!(dec < jan);
    }

    #[test]
    fn column_parses_fixed_names_and_categories() {
        assert_eq!("treatment".parse::<Column>().unwrap(), Column::Treatment);
        assert_eq!(
            "monthly_shock".parse::<Column>().unwrap(),
            Column::MonthlyShock
        );
        assert_eq!(
            "food".parse::<Column>().unwrap(),
            Column::EventCount("food".to_string())
        );
        assert!("".parse::<Column>().is_err());
        assert!("user_id".parse::<Column>().is_err());
    }

    #[test]
    fn column_display_round_trips_names() {
        for name in ["avg_sentiment", "influencer_topical_alignment", "gym"] {
            assert_eq!(name.parse::<Column>().unwrap().to_string(), name);
        }
    }

    #[test]
    fn event_count_column_follows_category_order() {
        let panel = AugmentedPanel {
            categories: vec!["food".to_string(), "gym".to_string()],
            rows: vec![row("user_0", vec![3, 1]), row("user_1", vec![0, 7])],
        };
        assert_eq!(
            panel.column(&Column::EventCount("gym".to_string())),
            Some(vec![1.0, 7.0])
        );
        assert_eq!(panel.column(&Column::Treatment), Some(vec![0.375, 0.375]));
        assert!(panel
            .column(&Column::EventCount("shop".to_string()))
            .is_none());
    }
}
