use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};

use crate::error::{Error, Result};
use crate::models::feedback::{CreateFeedback, Feedback, HelpfulnessCounts};
use crate::models::feedback_summary::FeedbackSummary;

/// Storage for raw feedback events and their rolled-up summaries.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FeedbackStore: Send + Sync {
    /// Counts feedback with `start <= created_at < end`, grouped on `helpful`.
    async fn count_by_helpfulness(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<HelpfulnessCounts>;

    async fn insert_summary(&self, summary: &FeedbackSummary) -> Result<()>;

    async fn record_feedback(&self, feedback: CreateFeedback) -> Result<Feedback>;

    async fn latest_summary(&self) -> Result<Option<FeedbackSummary>>;
}

#[derive(Clone)]
pub struct PgFeedbackStore {
    pool: PgPool,
}

impl PgFeedbackStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FeedbackStore for PgFeedbackStore {
    async fn count_by_helpfulness(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<HelpfulnessCounts> {
        let rows = sqlx::query(
            r#"
            SELECT helpful, COUNT(*) AS count
            FROM feedback
            WHERE created_at >= $1 AND created_at < $2
            GROUP BY helpful
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        let mut counts = HelpfulnessCounts::default();
        for row in rows {
            let helpful: bool = row.try_get("helpful")?;
            let count: i64 = row.try_get("count")?;
            counts.record(helpful, to_unsigned("count", count)?);
        }
        Ok(counts)
    }

    async fn insert_summary(&self, summary: &FeedbackSummary) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO feedback_summaries
                (period_start, period_end, total_feedback, helpful_count, unhelpful_count, helpfulness_rate, generated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(summary.period_start)
        .bind(summary.period_end)
        .bind(to_signed("total_feedback", summary.total_feedback)?)
        .bind(to_signed("helpful_count", summary.helpful_count)?)
        .bind(to_signed("unhelpful_count", summary.unhelpful_count)?)
        .bind(summary.helpfulness_rate)
        .bind(summary.generated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn record_feedback(&self, feedback: CreateFeedback) -> Result<Feedback> {
        let row = sqlx::query_as::<_, Feedback>(
            r#"
            INSERT INTO feedback (session_id, helpful, comment)
            VALUES ($1, $2, $3)
            RETURNING id, session_id, helpful, comment, created_at
            "#,
        )
        .bind(&feedback.session_id)
        .bind(feedback.helpful)
        .bind(&feedback.comment)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn latest_summary(&self) -> Result<Option<FeedbackSummary>> {
        let row = sqlx::query(
            r#"
            SELECT period_start, period_end, total_feedback, helpful_count, unhelpful_count, helpfulness_rate, generated_at
            FROM feedback_summaries
            ORDER BY generated_at DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else { return Ok(None) };
        Ok(Some(FeedbackSummary {
            period_start: row.try_get("period_start")?,
            period_end: row.try_get("period_end")?,
            total_feedback: to_unsigned("total_feedback", row.try_get("total_feedback")?)?,
            helpful_count: to_unsigned("helpful_count", row.try_get("helpful_count")?)?,
            unhelpful_count: to_unsigned("unhelpful_count", row.try_get("unhelpful_count")?)?,
            helpfulness_rate: row.try_get("helpfulness_rate")?,
            generated_at: row.try_get("generated_at")?,
        }))
    }
}

fn to_unsigned(column: &str, value: i64) -> Result<u64> {
    u64::try_from(value)
        .map_err(|_| Error::Internal(format!("negative {} in store: {}", column, value)))
}

fn to_signed(column: &str, value: u64) -> Result<i64> {
    i64::try_from(value)
        .map_err(|_| Error::Internal(format!("{} overflows BIGINT: {}", column, value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_counts_are_malformed_data() {
        assert!(matches!(to_unsigned("count", -1), Err(Error::Internal(_))));
        assert_eq!(to_unsigned("count", 12).unwrap(), 12);
    }

    #[test]
    fn oversized_counts_do_not_wrap() {
        assert!(to_signed("total_feedback", u64::MAX).is_err());
        assert_eq!(to_signed("total_feedback", 7).unwrap(), 7);
    }
}
