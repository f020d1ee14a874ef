use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Feedback {
    pub id: Uuid,
    pub session_id: Option<String>,
    pub helpful: bool,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateFeedback {
    #[validate(length(min = 1, max = 128))]
    pub session_id: Option<String>,
    pub helpful: bool,
    #[validate(length(max = 2000))]
    pub comment: Option<String>,
}

/// Per-window counts grouped on the `helpful` flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HelpfulnessCounts {
    pub helpful: u64,
    pub unhelpful: u64,
}

impl HelpfulnessCounts {
    pub fn total(&self) -> u64 {
        self.helpful + self.unhelpful
    }

    pub fn record(&mut self, helpful: bool, count: u64) {
        if helpful {
            self.helpful += count;
        } else {
            self.unhelpful += count;
        }
    }
}
