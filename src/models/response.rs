use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub environment: String,
    pub uptime_seconds: u64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WebhookAction {
    InviteDelivered,
    DeliveryFailed,
    Recorded,
    Ignored,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct WebhookAck {
    pub success: bool,
    pub event: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<String>,
    pub action: WebhookAction,
    pub request_id: String,
}
