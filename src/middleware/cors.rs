use axum::http::{header, Method};
use tower_http::cors::{Any, CorsLayer};

/// Browser clients only ever call the feedback API; the provider calls the
/// webhook server to server.
pub fn feedback_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
        .allow_origin(Any)
}
