//! Telegram update routing: `/start` and the pay button go to [`RequestFlow`].

use crate::{
    handlers::{RequestFlow, StartCommand, PAY_CALLBACK},
    models::RequesterId,
};
use std::sync::Arc;
use teloxide::{
    dispatching::{UpdateFilterExt, UpdateHandler},
    prelude::*,
    types::User,
    utils::command::BotCommands,
};

pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(BotCommands, Clone, Debug)]
#[command(rename_rule = "lowercase", description = "Доступные команды:")]
pub enum Command {
    #[command(description = "получить доступ к каналу")]
    Start,
}

pub fn schema() -> UpdateHandler<HandlerError> {
    dptree::entry()
        .branch(
            Update::filter_message()
                .filter_command::<Command>()
                .endpoint(on_command),
        )
        .branch(Update::filter_callback_query().endpoint(on_callback))
}

fn requester(id: UserId) -> Option<RequesterId> {
    i64::try_from(id.0).ok().map(RequesterId)
}

fn start_command(chat: RequesterId, user: &User) -> Option<StartCommand> {
    Some(StartCommand {
        chat,
        user: requester(user.id)?,
        first_name: Some(user.first_name.clone()),
    })
}

async fn on_command(msg: Message, cmd: Command, flow: Arc<RequestFlow>) -> Result<(), HandlerError> {
    match cmd {
        Command::Start => {
            let Some(user) = msg.from.as_ref() else {
                tracing::debug!("Ignoring /start without a sender in chat {}", msg.chat.id);
                return Ok(());
            };
            if let Some(command) = start_command(RequesterId(msg.chat.id.0), user) {
                flow.handle_start(&command).await;
            }
        }
    }
    Ok(())
}

async fn on_callback(
    bot: Bot,
    query: CallbackQuery,
    flow: Arc<RequestFlow>,
) -> Result<(), HandlerError> {
    // Stops the client-side spinner whatever the data was
    if let Err(e) = bot.answer_callback_query(query.id.clone()).await {
        tracing::warn!("Could not answer callback query: {}", e);
    }

    if query.data.as_deref() != Some(PAY_CALLBACK) {
        tracing::debug!("Ignoring callback data {:?}", query.data);
        return Ok(());
    }

    // The welcome lives in the private chat, whose id is the user's id
    let Some(chat) = requester(query.from.id) else {
        return Ok(());
    };
    if let Some(command) = start_command(chat, &query.from) {
        flow.handle_pay_button(&command).await;
    }
    Ok(())
}
