use rust_decimal::Decimal;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// Metadata key the processor echoes back in every notification.
pub const CORRELATION_KEY: &str = "chat_id";

/// Chat that initiated a payment. The only link between the offer and the
/// later confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequesterId(pub i64);

impl fmt::Display for RequesterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RequesterId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

// Metadata values are strings on the processor side
impl Serialize for RequesterId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for RequesterId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(i64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(Self(n)),
            Raw::Text(s) => s.parse().map_err(de::Error::custom),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Amount {
    pub value: Decimal,
    pub currency: String,
}

impl Amount {
    pub fn new(mut value: Decimal, currency: impl Into<String>) -> Self {
        // The processor expects exactly two fractional digits
        value.rescale(2);
        Self {
            value,
            currency: currency.into(),
        }
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.currency)
    }
}

/// What the request flow asks the processor for.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentRequest {
    pub amount: Amount,
    pub description: String,
    pub requester: RequesterId,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreatePaymentBody {
    pub amount: Amount,
    pub capture: bool,
    pub confirmation: ConfirmationRequest,
    pub description: String,
    pub metadata: PaymentMetadata,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConfirmationRequest {
    #[serde(rename = "type")]
    pub kind: String,
    pub return_url: String,
}

impl ConfirmationRequest {
    pub fn redirect(return_url: impl Into<String>) -> Self {
        Self {
            kind: "redirect".to_string(),
            return_url: return_url.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentMetadata {
    pub chat_id: RequesterId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    WaitingForCapture,
    Succeeded,
    Canceled,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Confirmation {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub confirmation_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancellationDetails {
    #[serde(default)]
    pub party: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
}

impl fmt::Display for CancellationDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.party, &self.reason) {
            (Some(party), Some(reason)) => write!(f, "{} ({})", reason, party),
            (None, Some(reason)) => write!(f, "{}", reason),
            (Some(party), None) => write!(f, "canceled by {}", party),
            (None, None) => write!(f, "no reason given"),
        }
    }
}

/// Payment object as returned by the processor, both from the create call and
/// inside webhook notifications. Never stored locally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub id: String,
    pub status: PaymentStatus,
    #[serde(default)]
    pub paid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Amount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmation: Option<Confirmation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancellation_details: Option<CancellationDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

impl PaymentRecord {
    pub fn confirmation_url(&self) -> Option<&str> {
        self.confirmation
            .as_ref()
            .and_then(|c| c.confirmation_url.as_deref())
    }

    /// Requester echoed back in the metadata, if present and well formed.
    pub fn requester(&self) -> Option<RequesterId> {
        let value = self.metadata.as_ref()?.get(CORRELATION_KEY)?;
        match value {
            Value::String(s) => s.parse().ok(),
            Value::Number(n) => n.as_i64().map(RequesterId),
            _ => None,
        }
    }
}
