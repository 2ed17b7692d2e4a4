use super::PaymentRecord;
use crate::error::GateError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookNotification {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    pub event: String,
    #[serde(default)]
    pub object: Value,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentEvent {
    Succeeded,
    WaitingForCapture,
    Canceled,
    Other(String),
}

impl From<&str> for PaymentEvent {
    fn from(event: &str) -> Self {
        match event {
            "payment.succeeded" => Self::Succeeded,
            "payment.waiting_for_capture" => Self::WaitingForCapture,
            "payment.canceled" => Self::Canceled,
            other => Self::Other(other.to_string()),
        }
    }
}

impl WebhookNotification {
    pub fn payment_event(&self) -> PaymentEvent {
        PaymentEvent::from(self.event.as_str())
    }

    pub fn object_id(&self) -> Option<&str> {
        self.object.get("id").and_then(Value::as_str)
    }

    pub fn payment(&self) -> Result<PaymentRecord, GateError> {
        PaymentRecord::deserialize(&self.object)
            .map_err(|e| GateError::InvalidEvent(format!("{}: {}", self.event, e)))
    }
}
