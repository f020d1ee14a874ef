#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use advisor_backend::{
    error::{Error, Result},
    models::{
        feedback::{CreateFeedback, Feedback, HelpfulnessCounts},
        feedback_summary::FeedbackSummary,
    },
    services::feedback_store::FeedbackStore,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behaviour {
    Normal,
    Failing,
    Hanging,
}

pub struct InMemoryStore {
    behaviour: Behaviour,
    feedback: Mutex<Vec<Feedback>>,
    summaries: Mutex<Vec<FeedbackSummary>>,
    count_calls: AtomicUsize,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::with_behaviour(Behaviour::Normal)
    }

    pub fn with_behaviour(behaviour: Behaviour) -> Self {
        Self {
            behaviour,
            feedback: Mutex::new(Vec::new()),
            summaries: Mutex::new(Vec::new()),
            count_calls: AtomicUsize::new(0),
        }
    }

    pub fn seed(&self, helpful: bool, created_at: DateTime<Utc>) {
        self.feedback.lock().unwrap().push(Feedback {
            id: Uuid::new_v4(),
            session_id: None,
            helpful,
            comment: None,
            created_at,
        });
    }

    pub fn count_calls(&self) -> usize {
        self.count_calls.load(Ordering::SeqCst)
    }

    pub fn summaries(&self) -> Vec<FeedbackSummary> {
        self.summaries.lock().unwrap().clone()
    }
}

#[async_trait]
impl FeedbackStore for InMemoryStore {
    async fn count_by_helpfulness(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<HelpfulnessCounts> {
        self.count_calls.fetch_add(1, Ordering::SeqCst);
        match self.behaviour {
            Behaviour::Failing => return Err(Error::Internal("store unreachable".into())),
            Behaviour::Hanging => std::future::pending::<()>().await,
            Behaviour::Normal => {}
        }

        let mut counts = HelpfulnessCounts::default();
        for f in self.feedback.lock().unwrap().iter() {
            if f.created_at >= start && f.created_at < end {
                counts.record(f.helpful, 1);
            }
        }
        Ok(counts)
    }

    async fn insert_summary(&self, summary: &FeedbackSummary) -> Result<()> {
        self.summaries.lock().unwrap().push(summary.clone());
        Ok(())
    }

    async fn record_feedback(&self, feedback: CreateFeedback) -> Result<Feedback> {
        let stored = Feedback {
            id: Uuid::new_v4(),
            session_id: feedback.session_id,
            helpful: feedback.helpful,
            comment: feedback.comment,
            created_at: Utc::now(),
        };
        self.feedback.lock().unwrap().push(stored.clone());
        Ok(stored)
    }

    async fn latest_summary(&self) -> Result<Option<FeedbackSummary>> {
        Ok(self
            .summaries
            .lock()
            .unwrap()
            .iter()
            .max_by_key(|s| s.generated_at)
            .cloned())
    }
}
