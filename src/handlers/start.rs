use crate::{
    config::{Config, ImageSource, OfferMode},
    error::GateError,
    messages,
    models::{Amount, PaymentRequest, PaymentStatus, RequesterId},
    services::{Button, ChatTransport, InviteIssuer, MembershipOracle, PaymentGateway},
};
use std::sync::Arc;

pub const PAY_CALLBACK: &str = "pay";

#[derive(Debug, Clone)]
pub struct StartCommand {
    pub chat: RequesterId,
    pub user: RequesterId,
    pub first_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    Authorized { invite_link: String },
    Welcomed,
    PaymentOffered {
        payment_id: String,
        confirmation_url: String,
    },
    PaidOnCreation { payment_id: String },
    Failed { indeterminate: bool },
}

#[derive(Debug, Clone)]
pub struct OfferSettings {
    pub amount: Amount,
    pub description: String,
    pub image: ImageSource,
    pub mode: OfferMode,
    pub welcome_template: Option<String>,
}

impl OfferSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            amount: config.payment.amount.clone(),
            description: config.payment.description.clone(),
            image: config.image.clone(),
            mode: config.offer_mode,
            welcome_template: config.welcome_template.clone(),
        }
    }
}

pub struct RequestFlow {
    transport: Arc<dyn ChatTransport>,
    payments: Arc<dyn PaymentGateway>,
    membership: MembershipOracle,
    invites: InviteIssuer,
    settings: OfferSettings,
}

impl RequestFlow {
    pub fn new(
        transport: Arc<dyn ChatTransport>,
        payments: Arc<dyn PaymentGateway>,
        invites: InviteIssuer,
        settings: OfferSettings,
    ) -> Self {
        Self {
            membership: MembershipOracle::new(transport.clone()),
            transport,
            payments,
            invites,
            settings,
        }
    }

    pub async fn handle_start(&self, command: &StartCommand) -> StartOutcome {
        tracing::info!("/start from chat {} (user {})", command.chat, command.user);
        let name = messages::display_name(command.first_name.as_deref());

        if self.membership.is_member(command.user).await {
            return self.present_invite(command.chat, name).await;
        }

        let result = match self.settings.mode {
            OfferMode::Immediate => self.offer_payment(command.chat, Some(name)).await,
            OfferMode::Button => {
                let button = Button::callback(messages::pay_button(&self.settings.amount), PAY_CALLBACK);
                self.send_welcome(command.chat, name, &button)
                    .await
                    .map(|_| StartOutcome::Welcomed)
            }
        };

        self.finish(command.chat, result).await
    }

    pub async fn handle_pay_button(&self, command: &StartCommand) -> StartOutcome {
        tracing::info!("Pay button pressed in chat {}", command.chat);

        // Old welcome messages stay clickable after joining
        if self.membership.is_member(command.user).await {
            let name = messages::display_name(command.first_name.as_deref());
            return self.present_invite(command.chat, name).await;
        }

        let result = self.offer_payment(command.chat, None).await;
        self.finish(command.chat, result).await
    }

    async fn present_invite(&self, chat: RequesterId, name: &str) -> StartOutcome {
        let invite_link = match self.invites.issue().await {
            Ok(link) => link,
            Err(e) => {
                tracing::error!("Could not issue invite for member chat {}: {}", chat, e);
                self.notify(chat, messages::TRY_LATER).await;
                return StartOutcome::Failed {
                    indeterminate: false,
                };
            }
        };

        let button = Button::url(messages::GO_TO_CHANNEL, invite_link.clone());
        if let Err(e) = self
            .transport
            .send_text(chat, &messages::already_member(name), Some(&button))
            .await
        {
            tracing::error!("Could not send invite to member chat {}: {}", chat, e);
            return StartOutcome::Failed {
                indeterminate: false,
            };
        }

        tracing::info!("Chat {} is already a member, invite presented", chat);
        StartOutcome::Authorized { invite_link }
    }

    async fn offer_payment(
        &self,
        chat: RequesterId,
        welcome_name: Option<&str>,
    ) -> Result<StartOutcome, GateError> {
        let request = PaymentRequest {
            amount: self.settings.amount.clone(),
            description: self.settings.description.clone(),
            requester: chat,
        };

        let record = self.payments.create_payment(&request).await?;
        let confirmation_url = match (record.status, record.confirmation_url()) {
            (_, Some(url)) => url.to_string(),
            (PaymentStatus::Succeeded, None) => {
                tracing::info!("Payment {} completed without confirmation", record.id);
                self.transport
                    .send_text(chat, messages::PAYMENT_RECEIVED, None)
                    .await?;
                return Ok(StartOutcome::PaidOnCreation {
                    payment_id: record.id.clone(),
                });
            }
            (_, None) => {
                return Err(GateError::InternalError(format!(
                    "Payment {} has no confirmation URL",
                    record.id
                )))
            }
        };

        let button = Button::url(
            messages::pay_button(&self.settings.amount),
            confirmation_url.clone(),
        );
        match welcome_name {
            Some(name) => self.send_welcome(chat, name, &button).await?,
            None => {
                self.transport
                    .send_text(chat, messages::PAYMENT_LINK_PROMPT, Some(&button))
                    .await?
            }
        }

        Ok(StartOutcome::PaymentOffered {
            payment_id: record.id,
            confirmation_url,
        })
    }

    async fn send_welcome(
        &self,
        chat: RequesterId,
        name: &str,
        button: &Button,
    ) -> Result<(), GateError> {
        if self.settings.image != ImageSource::None {
            // Decoration only, the offer goes out without it
            if let Err(e) = self.transport.send_photo(chat, &self.settings.image).await {
                tracing::warn!("Could not send welcome image to chat {}: {}", chat, e);
            }
        }

        let text = messages::welcome(name, self.settings.welcome_template.as_deref());
        self.transport.send_text(chat, &text, Some(button)).await
    }

    async fn finish(
        &self,
        chat: RequesterId,
        result: Result<StartOutcome, GateError>,
    ) -> StartOutcome {
        match result {
            Ok(outcome) => {
                tracing::info!("Request flow for chat {} finished: {:?}", chat, outcome);
                outcome
            }
            Err(e) => {
                tracing::error!(error = ?e, "Request flow for chat {} failed", chat);
                self.notify(chat, messages::payment_failure(&e)).await;
                StartOutcome::Failed {
                    indeterminate: e.is_indeterminate(),
                }
            }
        }
    }

    async fn notify(&self, chat: RequesterId, text: &str) {
        if let Err(e) = self.transport.send_text(chat, text, None).await {
            tracing::warn!("Could not send failure notice to chat {}: {}", chat, e);
        }
    }
}
