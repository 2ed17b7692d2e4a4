#![allow(dead_code)]

use async_trait::async_trait;
use channel_gate::{
    config::{ImageSource, InviteStrategy, OfferMode},
    error::{GateError, PaymentFailure},
    handlers::{ConfirmationFlow, OfferSettings, RequestFlow},
    models::{Amount, PaymentRecord, PaymentRequest, RequesterId},
    services::{Button, ChatTransport, InviteIssuer, MembershipStatus, PaymentGateway, ResolvedChat},
};
use rust_decimal_macros::dec;
use serde_json::json;
use std::sync::{Arc, Mutex};

pub const GENERATED_LINK: &str = "https://t.me/+generatedInvite";
pub const CONFIRMATION_URL: &str = "https://yoomoney.ru/checkout/payments/v2/contract?orderId=2d1b";

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    SendText {
        chat: RequesterId,
        text: String,
        button: Option<Button>,
    },
    SendPhoto {
        chat: RequesterId,
        image: ImageSource,
    },
    MemberStatus {
        user: RequesterId,
    },
    CreateInviteLink {
        member_limit: Option<u32>,
    },
    ResolveChat {
        chat: RequesterId,
    },
}

/// Chat transport that records every call and answers from canned settings.
pub struct RecordingTransport {
    calls: Mutex<Vec<Call>>,
    membership: Option<MembershipStatus>,
    fail_invites: bool,
    fail_photos: bool,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            membership: Some(MembershipStatus::None),
            fail_invites: false,
            fail_photos: false,
        }
    }

    pub fn with_membership(mut self, status: MembershipStatus) -> Self {
        self.membership = Some(status);
        self
    }

    /// Membership lookups error out.
    pub fn with_broken_membership(mut self) -> Self {
        self.membership = None;
        self
    }

    pub fn with_failing_invites(mut self) -> Self {
        self.fail_invites = true;
        self
    }

    pub fn with_failing_photos(mut self) -> Self {
        self.fail_photos = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn texts(&self) -> Vec<(RequesterId, String, Option<Button>)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::SendText { chat, text, button } => Some((chat, text, button)),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ChatTransport for RecordingTransport {
    async fn send_text(
        &self,
        chat: RequesterId,
        text: &str,
        button: Option<&Button>,
    ) -> Result<(), GateError> {
        self.record(Call::SendText {
            chat,
            text: text.to_string(),
            button: button.cloned(),
        });
        Ok(())
    }

    async fn send_photo(&self, chat: RequesterId, image: &ImageSource) -> Result<(), GateError> {
        self.record(Call::SendPhoto {
            chat,
            image: image.clone(),
        });
        if self.fail_photos {
            return Err(GateError::Transport("photo upload failed".to_string()));
        }
        Ok(())
    }

    async fn member_status(&self, user: RequesterId) -> Result<MembershipStatus, GateError> {
        self.record(Call::MemberStatus { user });
        self.membership
            .ok_or_else(|| GateError::MembershipLookupFailed("Bad Request: user not found".to_string()))
    }

    async fn create_invite_link(&self, member_limit: Option<u32>) -> Result<String, GateError> {
        self.record(Call::CreateInviteLink { member_limit });
        if self.fail_invites {
            return Err(GateError::Transport("not enough rights to invite".to_string()));
        }
        Ok(GENERATED_LINK.to_string())
    }

    async fn resolve_chat(&self, chat: RequesterId) -> Result<ResolvedChat, GateError> {
        self.record(Call::ResolveChat { chat });
        Ok(ResolvedChat { id: chat })
    }
}

#[derive(Debug, Clone)]
pub enum GatewayReply {
    Pending,
    /// Completed at creation, with no confirmation block.
    Succeeded,
    Fail(PaymentFailure),
    Canceled,
}

/// Payment gateway that records requests and replies with a fixed outcome.
pub struct StubGateway {
    requests: Mutex<Vec<PaymentRequest>>,
    reply: GatewayReply,
}

impl StubGateway {
    pub fn new(reply: GatewayReply) -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            reply,
        }
    }

    pub fn requests(&self) -> Vec<PaymentRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PaymentGateway for StubGateway {
    async fn create_payment(&self, request: &PaymentRequest) -> Result<PaymentRecord, GateError> {
        self.requests.lock().unwrap().push(request.clone());
        match &self.reply {
            GatewayReply::Pending => Ok(pending_record(request.requester)),
            GatewayReply::Succeeded => Ok(succeeded_record(request.requester)),
            GatewayReply::Fail(failure) => Err(GateError::payment(failure.clone())),
            GatewayReply::Canceled => Err(GateError::PaymentCanceled {
                reason: Some("expired_on_confirmation".to_string()),
            }),
        }
    }
}

pub fn pending_record(requester: RequesterId) -> PaymentRecord {
    serde_json::from_value(json!({
        "id": "2d1b5d9c-000f-5000-8000-1ab2c3d4e5f6",
        "status": "pending",
        "paid": false,
        "amount": { "value": "100.00", "currency": "RUB" },
        "confirmation": { "type": "redirect", "confirmation_url": CONFIRMATION_URL },
        "metadata": { "chat_id": requester.to_string() }
    }))
    .unwrap()
}

pub fn succeeded_record(requester: RequesterId) -> PaymentRecord {
    serde_json::from_value(json!({
        "id": "2d1b5d9c-000f-5000-8000-1ab2c3d4e5f6",
        "status": "succeeded",
        "paid": true,
        "amount": { "value": "100.00", "currency": "RUB" },
        "metadata": { "chat_id": requester.to_string() }
    }))
    .unwrap()
}

pub fn offer_settings(mode: OfferMode, image: ImageSource) -> OfferSettings {
    OfferSettings {
        amount: Amount::new(dec!(100), "RUB"),
        description: "Доступ к закрытому каналу".to_string(),
        image,
        mode,
        welcome_template: None,
    }
}

pub fn generated_invites() -> InviteStrategy {
    InviteStrategy::Generated {
        member_limit: Some(1),
    }
}

pub fn request_flow(
    transport: Arc<RecordingTransport>,
    gateway: Arc<StubGateway>,
    settings: OfferSettings,
) -> RequestFlow {
    let invites = InviteIssuer::new(transport.clone(), generated_invites());
    RequestFlow::new(transport, gateway, invites, settings)
}

pub fn confirmation_flow(
    transport: Arc<RecordingTransport>,
    strategy: InviteStrategy,
) -> ConfirmationFlow {
    let invites = InviteIssuer::new(transport.clone(), strategy);
    ConfirmationFlow::new(transport, invites)
}
