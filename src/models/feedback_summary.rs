use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::feedback::HelpfulnessCounts;

/// One rolled-up aggregation window, written once per run.
///
/// `period_start` is inclusive and `period_end` exclusive, so consecutive
/// daily windows never count a record twice.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeedbackSummary {
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
    pub total_feedback: u64,
    pub helpful_count: u64,
    pub unhelpful_count: u64,
    pub helpfulness_rate: f64,
    pub generated_at: DateTime<Utc>,
}

impl FeedbackSummary {
    pub fn from_counts(
        period_start: DateTime<Utc>,
        period_end: DateTime<Utc>,
        counts: HelpfulnessCounts,
        generated_at: DateTime<Utc>,
    ) -> Self {
        let total = counts.total();
        let helpfulness_rate = if total == 0 {
            0.0
        } else {
            counts.helpful as f64 / total as f64
        };

        Self {
            period_start,
            period_end,
            total_feedback: total,
            helpful_count: counts.helpful,
            unhelpful_count: counts.unhelpful,
            helpfulness_rate,
            generated_at,
        }
    }
}
