use crate::{config::InviteStrategy, error::GateError, services::ChatTransport};
use std::sync::Arc;

#[derive(Clone)]
pub struct InviteIssuer {
    transport: Arc<dyn ChatTransport>,
    strategy: InviteStrategy,
}

impl InviteIssuer {
    pub fn new(transport: Arc<dyn ChatTransport>, strategy: InviteStrategy) -> Self {
        tracing::info!("Invite strategy: {:?}", strategy);
        Self {
            transport,
            strategy,
        }
    }

    pub async fn issue(&self) -> Result<String, GateError> {
        match &self.strategy {
            InviteStrategy::Static(link) => Ok(link.clone()),
            InviteStrategy::Generated { member_limit } => {
                let link = self.transport.create_invite_link(*member_limit).await?;
                tracing::debug!("Generated invite link (member limit {:?})", member_limit);
                Ok(link)
            }
        }
    }
}
