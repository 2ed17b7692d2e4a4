use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Why a create-payment call did not yield a payment record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentFailure {
    /// 4xx: the processor refused the request as malformed.
    Rejected { status: u16, description: String },
    /// 5xx: the processor may or may not have created the payment.
    Indeterminate { status: u16 },
    UnexpectedStatus { status: u16 },
    /// No response at all.
    Network(String),
}

impl PaymentFailure {
    pub fn from_status(status: u16, description: Option<String>) -> Self {
        match status {
            400..=499 => Self::Rejected {
                status,
                description: description.unwrap_or_else(|| "check the request data".to_string()),
            },
            500..=599 => Self::Indeterminate { status },
            _ => Self::UnexpectedStatus { status },
        }
    }

    pub fn is_indeterminate(&self) -> bool {
        matches!(self, Self::Indeterminate { .. })
    }
}

impl fmt::Display for PaymentFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rejected { status, description } => {
                write!(f, "rejected with {}: {}", status, description)
            }
            Self::Indeterminate { status } => {
                write!(f, "processor answered {}, outcome unknown", status)
            }
            Self::UnexpectedStatus { status } => write!(f, "unexpected HTTP status {}", status),
            Self::Network(e) => write!(f, "could not reach the processor: {}", e),
        }
    }
}

#[derive(Error, Debug)]
pub enum GateError {
    #[error("Chat transport error: {0}")]
    Transport(String),

    #[error("Payment request failed: {failure}")]
    PaymentRequestFailed { failure: PaymentFailure },

    #[error("Payment canceled: {}", .reason.as_deref().unwrap_or("no reason given"))]
    PaymentCanceled { reason: Option<String> },

    #[error("Notification has no requester in its metadata")]
    MissingCorrelationKey,

    #[error("Membership lookup failed: {0}")]
    MembershipLookupFailed(String),

    #[error("Invalid notification: {0}")]
    InvalidEvent(String),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl GateError {
    pub fn payment(failure: PaymentFailure) -> Self {
        Self::PaymentRequestFailed { failure }
    }

    /// True when the processor may have created the payment after all.
    pub fn is_indeterminate(&self) -> bool {
        matches!(self, Self::PaymentRequestFailed { failure } if failure.is_indeterminate())
    }
}

impl From<teloxide::RequestError> for GateError {
    fn from(e: teloxide::RequestError) -> Self {
        Self::Transport(e.to_string())
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub error_code: String,
    pub timestamp: chrono::DateTime<Utc>,
    pub request_id: String,
}

impl IntoResponse for GateError {
    fn into_response(self) -> Response {
        let request_id = Uuid::new_v4().to_string();

        let (status, error_code) = match &self {
            GateError::MissingCorrelationKey => {
                (StatusCode::BAD_REQUEST, "MISSING_CORRELATION_KEY")
            }
            GateError::InvalidEvent(_) => (StatusCode::BAD_REQUEST, "INVALID_EVENT"),
            GateError::Transport(_) | GateError::PaymentRequestFailed { .. } => {
                (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR")
            }
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let body = ErrorResponse {
            success: false,
            error: self.to_string(),
            error_code: error_code.to_string(),
            timestamp: Utc::now(),
            request_id,
        };

        tracing::error!(
            error = ?self,
            error_code = error_code,
            "Request failed"
        );

        (status, Json(body)).into_response()
    }
}
