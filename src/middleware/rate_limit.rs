//! Per-process throttle for the public feedback API.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;

const WINDOW: Duration = Duration::from_secs(1);

/// Submissions accepted in the current one-second window.
#[derive(Debug)]
struct Budget {
    opened_at: Instant,
    spent: u32,
}

#[derive(Clone, Debug)]
pub struct RateLimiter {
    per_window: u32,
    budget: Arc<Mutex<Budget>>,
}

/// Returned when the window's budget is exhausted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Throttled {
    pub limit: u32,
    pub retry_after: Duration,
}

impl RateLimiter {
    /// A limit of zero is treated as one request per window.
    pub fn new(rps: u32) -> Self {
        Self {
            per_window: rps.max(1),
            budget: Arc::new(Mutex::new(Budget {
                opened_at: Instant::now(),
                spent: 0,
            })),
        }
    }

    pub fn check(&self) -> Result<(), Throttled> {
        self.check_at(Instant::now())
    }

    pub fn check_at(&self, now: Instant) -> Result<(), Throttled> {
        // A panic while holding the lock leaves the counters usable.
        let mut budget = self.budget.lock().unwrap_or_else(|p| p.into_inner());

        let elapsed = now.saturating_duration_since(budget.opened_at);
        if elapsed >= WINDOW {
            *budget = Budget {
                opened_at: now,
                spent: 0,
            };
        }

        if budget.spent >= self.per_window {
            return Err(Throttled {
                limit: self.per_window,
                retry_after: WINDOW.saturating_sub(elapsed),
            });
        }
        budget.spent += 1;
        Ok(())
    }
}

impl IntoResponse for Throttled {
    fn into_response(self) -> Response {
        // Retry-After is whole seconds; never advertise zero.
        let retry_secs = self.retry_after.as_secs().max(1);
        (
            StatusCode::TOO_MANY_REQUESTS,
            [(header::RETRY_AFTER, retry_secs.to_string())],
            Json(json!({ "error": "rate_limit_exceeded", "limit": self.limit })),
        )
            .into_response()
    }
}

pub async fn rps_middleware(
    State(limiter): State<RateLimiter>,
    req: Request<Body>,
    next: Next,
) -> Response {
    match limiter.check() {
        Ok(()) => next.run(req).await,
        Err(throttled) => {
            tracing::warn!(
                path = %req.uri().path(),
                limit = throttled.limit,
                "feedback rate limit exceeded"
            );
            throttled.into_response()
        }
    }
}
