pub mod feedback;
pub mod health;
pub mod webhook;

use std::any::Any;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

use crate::{
    middleware::{cors::feedback_cors, rate_limit},
    AppState,
};

pub const WEBHOOK_PATH: &str = "/api/webhooks/dodo";

/// Bodies above this are not provider notifications.
const MAX_BODY_BYTES: usize = 1024 * 1024;

pub fn router(state: AppState, feedback_rps: u32) -> Router {
    let webhook_api = Router::new().route(WEBHOOK_PATH, post(webhook::handle_dodo_webhook));

    let feedback_api = Router::new()
        .route("/api/feedback", post(feedback::submit_feedback))
        .route("/api/feedback/summary/latest", get(feedback::latest_summary))
        .layer(axum::middleware::from_fn_with_state(
            rate_limit::RateLimiter::new(feedback_rps),
            rate_limit::rps_middleware,
        ))
        .layer(feedback_cors());

    Router::new()
        .route("/health", get(health::health))
        .merge(webhook_api)
        .merge(feedback_api)
        .with_state(state)
        .layer(axum::extract::DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CatchPanicLayer::custom(internal_failure))
        .layer(TraceLayer::new_for_http())
}

fn internal_failure(_panic: Box<dyn Any + Send + 'static>) -> Response {
    tracing::error!("request handler panicked");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "internal_error" })),
    )
        .into_response()
}
