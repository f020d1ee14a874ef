use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::{Error, Result},
    models::{
        feedback::{CreateFeedback, Feedback},
        feedback_summary::FeedbackSummary,
    },
    services::feedback_store::FeedbackStore,
    utils::validation::validated,
    AppState,
};

pub async fn submit_feedback(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CreateFeedback>, JsonRejection>,
) -> Result<(StatusCode, Json<Feedback>)> {
    let store = require_store(&state)?;
    let Json(payload) = payload?;
    let payload = validated(payload)?;
    let stored = store.record_feedback(payload).await?;
    tracing::debug!(feedback_id = %stored.id, helpful = stored.helpful, "feedback recorded");
    Ok((StatusCode::CREATED, Json(stored)))
}

pub async fn latest_summary(State(state): State<AppState>) -> Result<Json<FeedbackSummary>> {
    let store = require_store(&state)?;
    let summary = store
        .latest_summary()
        .await?
        .ok_or_else(|| Error::NotFound("no_summary_yet".to_string()))?;
    Ok(Json(summary))
}

fn require_store(state: &AppState) -> Result<Arc<dyn FeedbackStore>> {
    state
        .feedback_store
        .clone()
        .ok_or_else(|| Error::Unavailable("feedback_store_unavailable".to_string()))
}
