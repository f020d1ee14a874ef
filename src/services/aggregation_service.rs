//! Periodic roll-up of helpfulness feedback.
//!
//! The job alternates between idle (sleeping one interval) and aggregating
//! (one cycle over the last day of feedback). Cycles run back to back on a
//! single task and never overlap. A failed cycle is logged and the loop
//! carries on after the usual sleep.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn, Instrument};

use crate::error::{Error, Result};
use crate::models::feedback_summary::FeedbackSummary;
use crate::services::feedback_store::FeedbackStore;
use crate::utils::time;

pub const WINDOW_DAYS: i64 = 1;

#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    Written(FeedbackSummary),
    Skipped,
    Failed(String),
}

#[derive(Clone)]
pub struct FeedbackAggregator {
    store: Option<Arc<dyn FeedbackStore>>,
    interval: Duration,
    store_timeout: Duration,
}

impl FeedbackAggregator {
    pub fn new(
        store: Option<Arc<dyn FeedbackStore>>,
        interval: Duration,
        store_timeout: Duration,
    ) -> Self {
        Self {
            store,
            interval,
            store_timeout,
        }
    }

    /// Aggregates the window ending at `now`. `Ok(None)` when no store is configured.
    pub async fn run_once_at(&self, now: DateTime<Utc>) -> Result<Option<FeedbackSummary>> {
        let Some(store) = &self.store else {
            return Ok(None);
        };

        let start = now - chrono::Duration::days(WINDOW_DAYS);
        let work = async {
            let counts = store.count_by_helpfulness(start, now).await?;
            let summary = FeedbackSummary::from_counts(start, now, counts, time::now());
            store.insert_summary(&summary).await?;
            Ok::<_, Error>(summary)
        };

        let summary = tokio::time::timeout(self.store_timeout, work)
            .await
            .map_err(|_| {
                Error::Timeout(format!(
                    "feedback store did not respond within {:?}",
                    self.store_timeout
                ))
            })??;
        Ok(Some(summary))
    }

    /// One unit of scheduled work. Never returns an error.
    pub async fn run_cycle(&self) -> CycleOutcome {
        let now = time::now();
        let span = tracing::info_span!("feedback_aggregation", window_end = %now);
        async {
            debug!("aggregating");
            match self.run_once_at(now).await {
                Ok(Some(summary)) => {
                    info!(
                        total = summary.total_feedback,
                        helpful = summary.helpful_count,
                        unhelpful = summary.unhelpful_count,
                        rate = summary.helpfulness_rate,
                        "feedback summary stored"
                    );
                    CycleOutcome::Written(summary)
                }
                Ok(None) => {
                    warn!("feedback store not configured, skipping aggregation");
                    CycleOutcome::Skipped
                }
                Err(e) => {
                    error!(error = %e, "feedback aggregation failed");
                    CycleOutcome::Failed(e.to_string())
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Runs until the process exits: aggregate, sleep one interval, repeat.
    pub async fn run(self) {
        info!(
            interval_secs = self.interval.as_secs(),
            store_configured = self.store.is_some(),
            "feedback aggregation job started"
        );
        loop {
            self.run_cycle().await;
            debug!(interval_secs = self.interval.as_secs(), "aggregation idle");
            tokio::time::sleep(self.interval).await;
        }
    }
}
