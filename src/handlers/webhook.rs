use crate::{
    error::GateError,
    messages,
    models::{PaymentEvent, RequesterId, WebhookAck, WebhookAction, WebhookNotification},
    services::{Button, ChatTransport, InviteIssuer},
};
use axum::{extract::rejection::JsonRejection, extract::State, Json};
use std::sync::Arc;
use uuid::Uuid;

pub struct ConfirmationFlow {
    transport: Arc<dyn ChatTransport>,
    invites: InviteIssuer,
}

impl ConfirmationFlow {
    pub fn new(transport: Arc<dyn ChatTransport>, invites: InviteIssuer) -> Self {
        Self { transport, invites }
    }

    pub async fn process(
        &self,
        notification: &WebhookNotification,
    ) -> Result<WebhookAction, GateError> {
        let payment = match notification.payment_event() {
            PaymentEvent::Other(event) => {
                tracing::info!(
                    "Ignoring event {} for {}",
                    event,
                    notification.object_id().unwrap_or("unknown object")
                );
                return Ok(WebhookAction::Ignored);
            }
            _ => notification.payment()?,
        };

        match notification.payment_event() {
            PaymentEvent::Succeeded => {
                let requester = payment.requester().ok_or_else(|| {
                    tracing::error!(
                        "Payment {} succeeded without a requester in its metadata, grant it manually",
                        payment.id
                    );
                    GateError::MissingCorrelationKey
                })?;
                Ok(self.grant_access(requester, &payment.id).await)
            }
            PaymentEvent::WaitingForCapture => {
                tracing::info!("Payment {} is waiting for capture", payment.id);
                Ok(WebhookAction::Recorded)
            }
            PaymentEvent::Canceled => {
                tracing::info!(
                    "Payment {} canceled: {}",
                    payment.id,
                    payment
                        .cancellation_details
                        .as_ref()
                        .map(ToString::to_string)
                        .unwrap_or_else(|| "no reason given".to_string())
                );
                Ok(WebhookAction::Recorded)
            }
            PaymentEvent::Other(_) => Ok(WebhookAction::Ignored),
        }
    }

    async fn grant_access(&self, requester: RequesterId, payment_id: &str) -> WebhookAction {
        match self.deliver_invite(requester).await {
            Ok(()) => {
                tracing::info!("Invite for payment {} delivered to chat {}", payment_id, requester);
                WebhookAction::InviteDelivered
            }
            Err(e) => {
                tracing::error!(
                    error = ?e,
                    "Could not grant access for payment {} to chat {}, not retried",
                    payment_id,
                    requester
                );
                if let Err(notify) = self
                    .transport
                    .send_text(requester, messages::GRANT_FAILED, None)
                    .await
                {
                    tracing::warn!("Could not tell chat {} to contact support: {}", requester, notify);
                }
                WebhookAction::DeliveryFailed
            }
        }
    }

    async fn deliver_invite(&self, requester: RequesterId) -> Result<(), GateError> {
        let chat = self.transport.resolve_chat(requester).await?;
        let invite_link = self.invites.issue().await?;
        let button = Button::url(messages::GO_TO_CHANNEL, invite_link);
        self.transport
            .send_text(chat.id, messages::PAYMENT_SUCCEEDED, Some(&button))
            .await
    }
}

pub async fn payment_webhook(
    State(flow): State<Arc<ConfirmationFlow>>,
    payload: Result<Json<WebhookNotification>, JsonRejection>,
) -> Result<Json<WebhookAck>, GateError> {
    let Json(notification) = payload.map_err(|e| GateError::InvalidEvent(e.body_text()))?;

    tracing::info!(
        event = %notification.event,
        object_id = ?notification.object_id(),
        "Notification received"
    );

    let action = flow.process(&notification).await?;

    let payment_id = notification.object_id().map(str::to_string);

    Ok(Json(WebhookAck {
        success: true,
        event: notification.event,
        payment_id,
        action,
        request_id: Uuid::new_v4().to_string(),
    }))
}
