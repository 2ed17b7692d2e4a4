pub mod access;
pub mod membership;
pub mod payments;
pub mod transport;

pub use access::InviteIssuer;
pub use membership::{MembershipOracle, MembershipStatus};
pub use payments::{PaymentGateway, PreparedPayment, YooKassaClient};
pub use transport::{Button, ButtonAction, ChatTransport, ResolvedChat, TelegramTransport};
