use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;

pub type Result<T> = std::result::Result<T, Error>;

/// Reasons an inbound payment webhook is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WebhookError {
    #[error("Missing webhook header: {0}")]
    Unauthenticated(&'static str),

    #[error("Invalid webhook timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Webhook is {age_secs}s old, tolerance is {tolerance_secs}s")]
    StaleWebhook { age_secs: i64, tolerance_secs: i64 },

    #[error("Webhook signature mismatch")]
    InvalidSignature,

    #[error("Malformed webhook payload: {0}")]
    MalformedPayload(String),

    #[error("Internal webhook failure: {0}")]
    Internal(String),
}

impl WebhookError {
    pub fn code(&self) -> &'static str {
        match self {
            WebhookError::Unauthenticated(_) => "missing_webhook_headers",
            WebhookError::InvalidTimestamp(_) => "invalid_webhook_timestamp",
            WebhookError::StaleWebhook { .. } => "stale_webhook",
            WebhookError::InvalidSignature => "invalid_webhook_signature",
            WebhookError::MalformedPayload(_) => "malformed_payload",
            WebhookError::Internal(_) => "internal_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            WebhookError::Unauthenticated(_)
            | WebhookError::InvalidTimestamp(_)
            | WebhookError::StaleWebhook { .. }
            | WebhookError::InvalidSignature => StatusCode::UNAUTHORIZED,
            WebhookError::MalformedPayload(_) => StatusCode::BAD_REQUEST,
            WebhookError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid request body: {0}")]
    InvalidBody(#[from] JsonRejection),

    #[error(transparent)]
    Webhook(#[from] WebhookError),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let (status, error_message) = match self {
            Error::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Error::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            Error::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            Error::Json(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            Error::InvalidBody(rejection) => (StatusCode::BAD_REQUEST, rejection.body_text()),
            Error::Webhook(err) => {
                if let WebhookError::Internal(detail) = &err {
                    tracing::error!(%detail, "webhook processing failed");
                }
                (err.status(), err.code().to_string())
            }
            other => {
                tracing::error!(error = %other, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error".to_string(),
                )
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Error::NotFound("Resource not found".to_string()),
            other => Error::Database(other),
        }
    }
}
