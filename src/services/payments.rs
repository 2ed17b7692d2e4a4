use crate::{
    config::PaymentSettings,
    error::{GateError, PaymentFailure},
    models::{
        ConfirmationRequest, CreatePaymentBody, PaymentMetadata, PaymentRecord, PaymentRequest,
        PaymentStatus,
    },
};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::{header::AUTHORIZATION, StatusCode};
use serde::Deserialize;
use uuid::Uuid;

pub const IDEMPOTENCE_HEADER: &str = "Idempotence-Key";

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_payment(&self, request: &PaymentRequest) -> Result<PaymentRecord, GateError>;
}

// A create-payment call ready to be sent. Retrying `send` with the same value
// reuses the idempotence key.
#[derive(Debug, Clone)]
pub struct PreparedPayment {
    pub idempotence_key: Uuid,
    pub body: CreatePaymentBody,
}

#[derive(Debug, Deserialize)]
struct ProcessorError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

pub struct YooKassaClient {
    client: reqwest::Client,
    endpoint: String,
    authorization: String,
    return_url: String,
    capture: bool,
}

impl YooKassaClient {
    pub fn new(settings: &PaymentSettings) -> Self {
        let credentials = format!("{}:{}", settings.shop_id, settings.secret_key);

        Self {
            client: reqwest::Client::new(),
            endpoint: format!("{}/v3/payments", settings.api_url.trim_end_matches('/')),
            authorization: format!("Basic {}", STANDARD.encode(credentials)),
            return_url: settings.return_url.clone(),
            capture: settings.capture,
        }
    }

    pub fn prepare(&self, request: &PaymentRequest) -> PreparedPayment {
        PreparedPayment {
            idempotence_key: Uuid::new_v4(),
            body: CreatePaymentBody {
                amount: request.amount.clone(),
                capture: self.capture,
                confirmation: ConfirmationRequest::redirect(self.return_url.clone()),
                description: request.description.clone(),
                metadata: PaymentMetadata {
                    chat_id: request.requester,
                },
            },
        }
    }

    pub async fn send(&self, prepared: &PreparedPayment) -> Result<PaymentRecord, GateError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header(AUTHORIZATION, &self.authorization)
            .header(IDEMPOTENCE_HEADER, prepared.idempotence_key.to_string())
            .json(&prepared.body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Could not reach YooKassa: {}", e);
                GateError::payment(PaymentFailure::Network(e.to_string()))
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            let details = serde_json::from_str::<ProcessorError>(&body).ok();
            let failure = PaymentFailure::from_status(
                status.as_u16(),
                details.as_ref().and_then(|d| d.description.clone()),
            );

            match &failure {
                PaymentFailure::Rejected { description, .. } => tracing::error!(
                    "YooKassa rejected payment request ({}, code {:?}): {}",
                    status,
                    details.as_ref().and_then(|d| d.code.as_deref()),
                    description
                ),
                PaymentFailure::Indeterminate { .. } => tracing::error!(
                    "YooKassa answered {}, payment outcome unknown (idempotence key {})",
                    status,
                    prepared.idempotence_key
                ),
                _ => tracing::error!("Unexpected HTTP status from YooKassa: {} {}", status, body),
            }

            return Err(GateError::payment(failure));
        }

        // A 200 we cannot read may still be a created payment
        let record: PaymentRecord = response.json().await.map_err(|e| {
            tracing::error!("Unreadable payment object from YooKassa: {}", e);
            GateError::payment(PaymentFailure::Indeterminate {
                status: status.as_u16(),
            })
        })?;

        interpret(record)
    }
}

pub(crate) fn interpret(record: PaymentRecord) -> Result<PaymentRecord, GateError> {
    match record.status {
        PaymentStatus::Succeeded => {
            tracing::info!("Payment {} succeeded immediately", record.id);
            Ok(record)
        }
        PaymentStatus::Pending => {
            tracing::info!("Payment {} pending, waiting for notification", record.id);
            Ok(record)
        }
        PaymentStatus::Canceled => {
            let reason = record.cancellation_details.as_ref().map(ToString::to_string);
            tracing::error!(
                "Payment {} canceled: {}",
                record.id,
                reason.as_deref().unwrap_or("no reason given")
            );
            Err(GateError::PaymentCanceled { reason })
        }
        other => {
            tracing::info!("Payment {} created with status {:?}", record.id, other);
            Ok(record)
        }
    }
}

#[async_trait]
impl PaymentGateway for YooKassaClient {
    async fn create_payment(&self, request: &PaymentRequest) -> Result<PaymentRecord, GateError> {
        let prepared = self.prepare(request);
        tracing::info!(
            "Creating payment of {} for chat {} (idempotence key {})",
            request.amount,
            request.requester,
            prepared.idempotence_key
        );
        self.send(&prepared).await
    }
}
