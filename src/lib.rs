pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use std::sync::Arc;

use crate::services::{feedback_store::FeedbackStore, webhook_verifier::WebhookVerifier};

#[derive(Clone)]
pub struct AppState {
    pub verifier: Arc<WebhookVerifier>,
    pub feedback_store: Option<Arc<dyn FeedbackStore>>,
}

impl AppState {
    pub fn new(verifier: WebhookVerifier, feedback_store: Option<Arc<dyn FeedbackStore>>) -> Self {
        Self {
            verifier: Arc::new(verifier),
            feedback_store,
        }
    }
}
