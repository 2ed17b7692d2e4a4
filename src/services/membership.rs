use crate::{models::RequesterId, services::ChatTransport};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipStatus {
    Member,
    Administrator,
    Creator,
    None,
}

impl MembershipStatus {
    pub fn grants_access(&self) -> bool {
        matches!(self, Self::Member | Self::Administrator | Self::Creator)
    }
}

#[derive(Clone)]
pub struct MembershipOracle {
    transport: Arc<dyn ChatTransport>,
}

impl MembershipOracle {
    pub fn new(transport: Arc<dyn ChatTransport>) -> Self {
        Self { transport }
    }

    // Fails closed: a failed lookup counts as "not a member".
    pub async fn is_member(&self, user: RequesterId) -> bool {
        match self.transport.member_status(user).await {
            Ok(status) => {
                tracing::debug!("User {} membership status: {:?}", user, status);
                status.grants_access()
            }
            Err(e) => {
                tracing::warn!(
                    "Membership lookup for {} failed: {}, treating as non-member",
                    user,
                    e
                );
                false
            }
        }
    }
}
