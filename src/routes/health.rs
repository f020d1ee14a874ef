use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::{dto::feedback_dto::HealthResponse, AppState};

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let feedback_store = if state.feedback_store.is_some() {
        "configured"
    } else {
        "disabled"
    };
    let body = HealthResponse {
        status: "ok".to_string(),
        feedback_store: feedback_store.to_string(),
    };
    (StatusCode::OK, Json(body))
}
