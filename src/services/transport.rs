use crate::{
    config::ImageSource,
    error::GateError,
    models::RequesterId,
    services::membership::MembershipStatus,
};
use async_trait::async_trait;
use teloxide::{
    prelude::*,
    types::{
        ChatMemberStatus, InlineKeyboardButton, InlineKeyboardMarkup, InputFile, Recipient,
    },
};
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ButtonAction {
    Url(String),
    Callback(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub text: String,
    pub action: ButtonAction,
}

impl Button {
    pub fn url(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            action: ButtonAction::Url(url.into()),
        }
    }

    pub fn callback(text: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            action: ButtonAction::Callback(data.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedChat {
    pub id: RequesterId,
}

#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send_text(
        &self,
        chat: RequesterId,
        text: &str,
        button: Option<&Button>,
    ) -> Result<(), GateError>;

    async fn send_photo(&self, chat: RequesterId, image: &ImageSource) -> Result<(), GateError>;

    async fn member_status(&self, user: RequesterId) -> Result<MembershipStatus, GateError>;

    async fn create_invite_link(&self, member_limit: Option<u32>) -> Result<String, GateError>;

    async fn resolve_chat(&self, chat: RequesterId) -> Result<ResolvedChat, GateError>;
}

pub struct TelegramTransport {
    bot: Bot,
    channel: Recipient,
}

impl TelegramTransport {
    pub fn new(bot: Bot, channel_id: &str) -> Self {
        let channel = parse_channel(channel_id);
        tracing::info!("Telegram transport gating channel {:?}", channel);
        Self { bot, channel }
    }
}

pub fn parse_channel(channel_id: &str) -> Recipient {
    let channel_id = channel_id.trim();
    match channel_id.parse::<i64>() {
        Ok(id) => Recipient::Id(ChatId(id)),
        Err(_) => Recipient::ChannelUsername(channel_id.to_string()),
    }
}

fn parse_url(url: &str) -> Result<Url, GateError> {
    Url::parse(url).map_err(|e| GateError::Transport(format!("Invalid URL {}: {}", url, e)))
}

fn keyboard(button: &Button) -> Result<InlineKeyboardMarkup, GateError> {
    let button = match &button.action {
        ButtonAction::Url(url) => InlineKeyboardButton::url(button.text.clone(), parse_url(url)?),
        ButtonAction::Callback(data) => {
            InlineKeyboardButton::callback(button.text.clone(), data.clone())
        }
    };
    Ok(InlineKeyboardMarkup::new(vec![vec![button]]))
}

#[async_trait]
impl ChatTransport for TelegramTransport {
    async fn send_text(
        &self,
        chat: RequesterId,
        text: &str,
        button: Option<&Button>,
    ) -> Result<(), GateError> {
        let mut request = self.bot.send_message(ChatId(chat.0), text);
        if let Some(button) = button {
            request = request.reply_markup(keyboard(button)?);
        }
        request.await?;
        Ok(())
    }

    async fn send_photo(&self, chat: RequesterId, image: &ImageSource) -> Result<(), GateError> {
        let file = match image {
            ImageSource::Url(url) => InputFile::url(parse_url(url)?),
            ImageSource::File(path) => InputFile::file(path.clone()),
            ImageSource::None => return Ok(()),
        };
        self.bot.send_photo(ChatId(chat.0), file).await?;
        Ok(())
    }

    async fn member_status(&self, user: RequesterId) -> Result<MembershipStatus, GateError> {
        let user_id = u64::try_from(user.0)
            .map_err(|_| GateError::MembershipLookupFailed(format!("{} is not a user id", user)))?;

        let member = self
            .bot
            .get_chat_member(self.channel.clone(), UserId(user_id))
            .await
            .map_err(|e| GateError::MembershipLookupFailed(e.to_string()))?;

        Ok(match member.kind.status() {
            ChatMemberStatus::Owner => MembershipStatus::Creator,
            ChatMemberStatus::Administrator => MembershipStatus::Administrator,
            ChatMemberStatus::Member => MembershipStatus::Member,
            _ => MembershipStatus::None,
        })
    }

    async fn create_invite_link(&self, member_limit: Option<u32>) -> Result<String, GateError> {
        let mut request = self.bot.create_chat_invite_link(self.channel.clone());
        if let Some(limit) = member_limit {
            request = request.member_limit(limit);
        }
        let link = request.await?;
        Ok(link.invite_link)
    }

    async fn resolve_chat(&self, chat: RequesterId) -> Result<ResolvedChat, GateError> {
        let resolved = self.bot.get_chat(ChatId(chat.0)).await?;
        Ok(ResolvedChat {
            id: RequesterId(resolved.id.0),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_channel_ids_are_chat_ids() {
        assert_eq!(
            parse_channel("-1002065680710"),
            Recipient::Id(ChatId(-1002065680710))
        );
    }

    #[test]
    fn usernames_stay_usernames() {
        assert_eq!(
            parse_channel(" @private_channel "),
            Recipient::ChannelUsername("@private_channel".to_string())
        );
    }

    #[test]
    fn url_buttons_reject_malformed_links() {
        let button = Button::url("Pay", "not a url");
        assert!(matches!(keyboard(&button), Err(GateError::Transport(_))));
    }
}
