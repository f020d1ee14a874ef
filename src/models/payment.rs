use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    Payment,
    Refund,
    Dispute,
    Subscription,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentEventKind {
    PaymentSucceeded,
    PaymentFailed,
    PaymentProcessing,
    PaymentCancelled,
    RefundSucceeded,
    RefundFailed,
    DisputeOpened,
    SubscriptionActive,
    SubscriptionRenewed,
    SubscriptionOnHold,
    SubscriptionPlanChanged,
    SubscriptionCancelled,
    SubscriptionFailed,
    SubscriptionExpired,
    Unknown,
}

impl PaymentEventKind {
    pub fn parse(event_type: &str) -> Self {
        match event_type {
            "payment.succeeded" => Self::PaymentSucceeded,
            "payment.failed" => Self::PaymentFailed,
            "payment.processing" => Self::PaymentProcessing,
            "payment.cancelled" => Self::PaymentCancelled,
            "refund.succeeded" => Self::RefundSucceeded,
            "refund.failed" => Self::RefundFailed,
            "dispute.opened" => Self::DisputeOpened,
            "subscription.active" => Self::SubscriptionActive,
            "subscription.renewed" => Self::SubscriptionRenewed,
            "subscription.on_hold" => Self::SubscriptionOnHold,
            "subscription.plan_changed" => Self::SubscriptionPlanChanged,
            "subscription.cancelled" => Self::SubscriptionCancelled,
            "subscription.failed" => Self::SubscriptionFailed,
            "subscription.expired" => Self::SubscriptionExpired,
            _ => Self::Unknown,
        }
    }

    pub fn category(&self) -> EventCategory {
        match self {
            Self::PaymentSucceeded
            | Self::PaymentFailed
            | Self::PaymentProcessing
            | Self::PaymentCancelled => EventCategory::Payment,
            Self::RefundSucceeded | Self::RefundFailed => EventCategory::Refund,
            Self::DisputeOpened => EventCategory::Dispute,
            Self::SubscriptionActive
            | Self::SubscriptionRenewed
            | Self::SubscriptionOnHold
            | Self::SubscriptionPlanChanged
            | Self::SubscriptionCancelled
            | Self::SubscriptionFailed
            | Self::SubscriptionExpired => EventCategory::Subscription,
            Self::Unknown => EventCategory::Other,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Customer {
    #[validate(length(min = 1))]
    pub customer_id: String,
    #[validate(email)]
    pub email: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PaymentData {
    #[validate(length(min = 1))]
    pub payment_id: String,
    /// Minor currency units.
    #[validate(range(min = 0))]
    pub total_amount: i64,
    #[validate(length(equal = 3))]
    pub currency: String,
    #[validate(nested)]
    pub customer: Option<Customer>,
    pub subscription_id: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SubscriptionData {
    #[validate(length(min = 1))]
    pub subscription_id: String,
    #[validate(length(min = 1))]
    pub product_id: String,
    pub status: String,
    #[validate(range(min = 1))]
    pub quantity: i32,
    #[validate(range(min = 0))]
    pub recurring_pre_tax_amount: Option<i64>,
    #[validate(length(equal = 3))]
    pub currency: Option<String>,
    pub next_billing_date: Option<DateTime<Utc>>,
    #[validate(nested)]
    pub customer: Option<Customer>,
}

/// Typed view of a verified event's `data` object.
#[derive(Debug, Clone)]
pub enum ProviderEvent {
    Payment(PaymentData),
    Subscription(SubscriptionData),
    Untyped,
}

impl ProviderEvent {
    /// Decodes and validates `data` for the categories we have models for.
    pub fn decode(
        kind: PaymentEventKind,
        data: &Map<String, JsonValue>,
    ) -> crate::error::Result<Self> {
        let value = JsonValue::Object(data.clone());
        match kind.category() {
            EventCategory::Payment => {
                let payment: PaymentData = serde_json::from_value(value)?;
                payment.validate()?;
                Ok(Self::Payment(payment))
            }
            EventCategory::Subscription => {
                let subscription: SubscriptionData = serde_json::from_value(value)?;
                subscription.validate()?;
                Ok(Self::Subscription(subscription))
            }
            _ => Ok(Self::Untyped),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn as_map(value: JsonValue) -> Map<String, JsonValue> {
        match value {
            JsonValue::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn event_kinds_are_classified() {
        assert_eq!(
            PaymentEventKind::parse("payment.succeeded").category(),
            EventCategory::Payment
        );
        assert_eq!(
            PaymentEventKind::parse("subscription.on_hold"),
            PaymentEventKind::SubscriptionOnHold
        );
        assert_eq!(
            PaymentEventKind::parse("refund.failed").category(),
            EventCategory::Refund
        );
        assert_eq!(
            PaymentEventKind::parse("license_key.created"),
            PaymentEventKind::Unknown
        );
    }

    #[test]
    fn decodes_valid_payment() {
        let data = as_map(json!({
            "payment_id": "pay_123",
            "total_amount": 1999,
            "currency": "USD",
            "customer": { "customer_id": "cus_1", "email": "a@example.com", "name": "Ada" }
        }));
        let event = ProviderEvent::decode(PaymentEventKind::PaymentSucceeded, &data).unwrap();
        let ProviderEvent::Payment(payment) = event else {
            panic!("expected payment");
        };
        assert_eq!(payment.total_amount, 1999);
        assert_eq!(payment.customer.unwrap().customer_id, "cus_1");
    }

    #[test]
    fn rejects_negative_amount_and_bad_email() {
        let data = as_map(json!({
            "payment_id": "pay_123",
            "total_amount": -5,
            "currency": "USD"
        }));
        assert!(ProviderEvent::decode(PaymentEventKind::PaymentFailed, &data).is_err());

        let data = as_map(json!({
            "payment_id": "pay_123",
            "total_amount": 5,
            "currency": "USD",
            "customer": { "customer_id": "cus_1", "email": "not-an-email" }
        }));
        assert!(ProviderEvent::decode(PaymentEventKind::PaymentFailed, &data).is_err());
    }

    #[test]
    fn subscription_requires_positive_quantity() {
        let mut data = as_map(json!({
            "subscription_id": "sub_1",
            "product_id": "prod_1",
            "status": "active",
            "quantity": 1,
            "currency": "EUR",
            "next_billing_date": "2024-06-01T00:00:00Z"
        }));
        assert!(matches!(
            ProviderEvent::decode(PaymentEventKind::SubscriptionActive, &data),
            Ok(ProviderEvent::Subscription(_))
        ));

        data.insert("quantity".into(), json!(0));
        assert!(ProviderEvent::decode(PaymentEventKind::SubscriptionActive, &data).is_err());
    }

    #[test]
    fn other_categories_stay_untyped() {
        let event = ProviderEvent::decode(PaymentEventKind::DisputeOpened, &Map::new()).unwrap();
        assert!(matches!(event, ProviderEvent::Untyped));
    }
}
