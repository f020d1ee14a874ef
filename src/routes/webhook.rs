use axum::{extract::State, http::HeaderMap, Json};
use bytes::Bytes;
use tracing::{info, warn};

use crate::{
    dto::webhook_dto::WebhookAck,
    error::Result,
    models::payment::{PaymentEventKind, ProviderEvent},
    services::webhook_verifier::{VerifiedWebhook, SIGNATURE_HEADER, TIMESTAMP_HEADER},
    AppState,
};

pub async fn handle_dodo_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookAck>> {
    let signature = header_str(&headers, SIGNATURE_HEADER);
    let timestamp = header_str(&headers, TIMESTAMP_HEADER);

    let verified = state.verifier.verify(&body, signature, timestamp)?;
    log_event(&verified);

    Ok(Json(WebhookAck::received(verified.event_type)))
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn log_event(verified: &VerifiedWebhook) {
    let Some(event_type) = verified.event_type.as_deref() else {
        warn!("verified webhook carries no event type");
        return;
    };

    let kind = PaymentEventKind::parse(event_type);
    match ProviderEvent::decode(kind, &verified.data) {
        Ok(ProviderEvent::Payment(payment)) => info!(
            event_type,
            payment_id = %payment.payment_id,
            amount = payment.total_amount,
            currency = %payment.currency,
            "payment event received"
        ),
        Ok(ProviderEvent::Subscription(sub)) => info!(
            event_type,
            subscription_id = %sub.subscription_id,
            status = %sub.status,
            "subscription event received"
        ),
        Ok(ProviderEvent::Untyped) => info!(event_type, category = ?kind.category(), "event received"),
        Err(e) => warn!(event_type, error = %e, "event data does not match the expected shape"),
    }
}
