use serde::{Deserialize, Serialize};

/// Body returned to the provider once a webhook is verified.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WebhookAck {
    pub status: String,
    pub event_type: Option<String>,
}

impl WebhookAck {
    pub fn received(event_type: Option<String>) -> Self {
        Self {
            status: "received".to_string(),
            event_type,
        }
    }
}
