//! Payment provider webhook authentication.
//!
//! Every inbound notification goes through [`WebhookVerifier::verify_at`]:
//! header presence, timestamp freshness, HMAC-SHA256 over the raw body and,
//! only once the body is authenticated, JSON decoding. The standalone
//! [`verify_webhook`] runs the same routine with a caller-chosen set of checks.

use chrono::{DateTime, Duration, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Map, Value as JsonValue};
use tracing::{debug, info, warn};

use crate::error::{Error, Result, WebhookError};
use crate::utils::signature::{sign_hex, signatures_match, strip_secret_prefix};
use crate::utils::time::{self, parse_iso8601};

pub const SIGNATURE_HEADER: &str = "webhook-signature";
pub const TIMESTAMP_HEADER: &str = "webhook-timestamp";

/// Maximum accepted age of a webhook, inclusive.
pub const TOLERANCE_SECS: i64 = 300;

/// How far ahead of our clock a sender's timestamp may be.
pub const MAX_CLOCK_SKEW_SECS: i64 = 60;

const PREVIEW_BYTES: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifyOptions {
    pub check_timestamp: bool,
    pub tolerance: Duration,
    pub max_clock_skew: Duration,
}

impl Default for VerifyOptions {
    fn default() -> Self {
        Self {
            check_timestamp: true,
            tolerance: Duration::seconds(TOLERANCE_SECS),
            max_clock_skew: Duration::seconds(MAX_CLOCK_SKEW_SECS),
        }
    }
}

impl VerifyOptions {
    /// Signature only; the timestamp header is optional and ignored.
    pub fn signature_only() -> Self {
        Self {
            check_timestamp: false,
            ..Self::default()
        }
    }
}

/// An authenticated and decoded webhook.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedWebhook {
    pub event_type: Option<String>,
    pub data: Map<String, JsonValue>,
    pub payload: JsonValue,
}

pub struct WebhookVerifier {
    key: SecretString,
    options: VerifyOptions,
}

impl std::fmt::Debug for WebhookVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookVerifier")
            .field("key", &"[REDACTED]")
            .field("options", &self.options)
            .finish()
    }
}

impl WebhookVerifier {
    /// Builds a verifier from the configured secret, dropping a `whsec_` prefix.
    pub fn new(secret: &SecretString) -> Result<Self> {
        Self::from_raw_secret(secret.expose_secret())
    }

    fn from_raw_secret(raw: &str) -> Result<Self> {
        let key = strip_secret_prefix(raw.trim());
        if key.is_empty() {
            return Err(Error::Config("webhook secret is empty".to_string()));
        }
        Ok(Self {
            key: SecretString::new(key.to_string()),
            options: VerifyOptions::default(),
        })
    }

    pub fn with_options(mut self, options: VerifyOptions) -> Self {
        self.options = options;
        self
    }

    pub fn verify(
        &self,
        body: &[u8],
        signature: Option<&str>,
        timestamp: Option<&str>,
    ) -> std::result::Result<VerifiedWebhook, WebhookError> {
        self.verify_at(body, signature, timestamp, time::now())
    }

    pub fn verify_at(
        &self,
        body: &[u8],
        signature: Option<&str>,
        timestamp: Option<&str>,
        now: DateTime<Utc>,
    ) -> std::result::Result<VerifiedWebhook, WebhookError> {
        let signature = non_empty(signature);
        let timestamp = non_empty(timestamp);

        debug!(
            body_len = body.len(),
            body_preview = %preview(body),
            signature = signature.map(signature_prefix).unwrap_or_default(),
            timestamp = timestamp.unwrap_or_default(),
            "verifying webhook"
        );

        let Some(signature) = signature else {
            warn!("webhook rejected: missing {}", SIGNATURE_HEADER);
            return Err(WebhookError::Unauthenticated(SIGNATURE_HEADER));
        };

        if self.options.check_timestamp {
            let Some(timestamp) = timestamp else {
                warn!("webhook rejected: missing {}", TIMESTAMP_HEADER);
                return Err(WebhookError::Unauthenticated(TIMESTAMP_HEADER));
            };
            self.check_freshness(timestamp, now)?;
        }

        let expected = sign_hex(self.key.expose_secret().as_bytes(), body);
        if !signatures_match(&expected, signature) {
            warn!(
                provided = signature_prefix(signature),
                expected = signature_prefix(&expected),
                "webhook rejected: signature mismatch"
            );
            return Err(WebhookError::InvalidSignature);
        }

        let verified = decode_payload(body)?;
        info!(
            event_type = verified.event_type.as_deref().unwrap_or("<none>"),
            "webhook verified"
        );
        Ok(verified)
    }

    fn check_freshness(
        &self,
        raw: &str,
        now: DateTime<Utc>,
    ) -> std::result::Result<(), WebhookError> {
        let Some(sent_at) = parse_iso8601(raw) else {
            warn!(timestamp = raw, "webhook rejected: unparsable timestamp");
            return Err(WebhookError::InvalidTimestamp(format!(
                "cannot parse {:?}",
                raw
            )));
        };

        let age = now - sent_at;
        debug!(timestamp = raw, age_secs = age.num_seconds(), "webhook age");

        if age > self.options.tolerance {
            warn!(
                timestamp = raw,
                age_secs = age.num_seconds(),
                "webhook rejected: stale"
            );
            return Err(WebhookError::StaleWebhook {
                age_secs: age.num_seconds(),
                tolerance_secs: self.options.tolerance.num_seconds(),
            });
        }

        if -age > self.options.max_clock_skew {
            warn!(
                timestamp = raw,
                ahead_secs = (-age).num_seconds(),
                "webhook rejected: timestamp in the future"
            );
            return Err(WebhookError::InvalidTimestamp(format!(
                "{}s in the future",
                (-age).num_seconds()
            )));
        }

        Ok(())
    }
}

/// Verifies a webhook outside the HTTP path, e.g. when re-checking stored
/// deliveries. `secret` may carry the `whsec_` prefix.
pub fn verify_webhook(
    body: &[u8],
    signature: Option<&str>,
    timestamp: Option<&str>,
    secret: &str,
    options: VerifyOptions,
) -> std::result::Result<VerifiedWebhook, WebhookError> {
    let verifier = WebhookVerifier::from_raw_secret(secret)
        .map_err(|e| WebhookError::Internal(e.to_string()))?
        .with_options(options);
    verifier.verify(body, signature, timestamp)
}

fn decode_payload(body: &[u8]) -> std::result::Result<VerifiedWebhook, WebhookError> {
    let payload: JsonValue = serde_json::from_slice(body).map_err(|e| {
        warn!(error = %e, "verified webhook body is not JSON");
        WebhookError::MalformedPayload(e.to_string())
    })?;

    let JsonValue::Object(fields) = &payload else {
        return Err(WebhookError::MalformedPayload(
            "expected a JSON object".to_string(),
        ));
    };

    let event_type = match fields.get("type") {
        None | Some(JsonValue::Null) => None,
        Some(JsonValue::String(t)) => Some(t.clone()),
        Some(_) => {
            return Err(WebhookError::MalformedPayload(
                "`type` must be a string".to_string(),
            ))
        }
    };

    let data = match fields.get("data") {
        None | Some(JsonValue::Null) => Map::new(),
        Some(JsonValue::Object(data)) => data.clone(),
        Some(_) => {
            return Err(WebhookError::MalformedPayload(
                "`data` must be an object".to_string(),
            ))
        }
    };

    Ok(VerifiedWebhook {
        event_type,
        data,
        payload,
    })
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn signature_prefix(sig: &str) -> &str {
    sig.get(..12).unwrap_or(sig)
}

fn preview(body: &[u8]) -> String {
    let cut = &body[..body.len().min(PREVIEW_BYTES)];
    let mut text = String::from_utf8_lossy(cut).into_owned();
    if body.len() > PREVIEW_BYTES {
        text.push_str("...");
    }
    text
}
