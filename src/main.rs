use anyhow::Result;
use channel_gate::{
    bot::{schema, Command},
    config::Config,
    handlers::{self, ConfirmationFlow, HealthState, OfferSettings, RequestFlow},
    services::{ChatTransport, InviteIssuer, PaymentGateway, TelegramTransport, YooKassaClient},
};
use std::sync::Arc;
use teloxide::{dptree, prelude::*, utils::command::BotCommands};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;

    tracing::info!("Starting channel-gate v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {:?}", config.environment);

    // Initialize collaborators
    let bot = Bot::new(&config.bot_token);
    let transport: Arc<dyn ChatTransport> =
        Arc::new(TelegramTransport::new(bot.clone(), &config.channel_id));
    let payments: Arc<dyn PaymentGateway> = Arc::new(YooKassaClient::new(&config.payment));
    let invites = InviteIssuer::new(transport.clone(), config.invite.clone());

    // Build the two flows
    let request_flow = Arc::new(RequestFlow::new(
        transport.clone(),
        payments,
        invites.clone(),
        OfferSettings::from_config(&config),
    ));
    let confirmation_flow = Arc::new(ConfirmationFlow::new(transport, invites));

    if let Err(e) = bot.set_my_commands(Command::bot_commands()).await {
        tracing::warn!("Could not register bot commands: {}", e);
    }

    // Telegram long polling runs beside the webhook server
    let mut dispatcher = Dispatcher::builder(bot, schema())
        .dependencies(dptree::deps![request_flow])
        .default_handler(|update| async move {
            tracing::trace!("Unhandled update: {:?}", update.id);
        })
        .build();
    let dispatcher_shutdown = dispatcher.shutdown_token();
    let dispatcher_task = tokio::spawn(async move { dispatcher.dispatch().await });

    let app = handlers::router(confirmation_flow, HealthState::new(config.environment.clone()));

    // Start server
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on http://{}", addr);
    tracing::info!("Webhook endpoint: http://{}/webhook", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    match dispatcher_shutdown.shutdown() {
        Ok(done) => {
            done.await;
            dispatcher_task.await?;
        }
        Err(_) => {
            tracing::debug!("Dispatcher was not running");
            dispatcher_task.abort();
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to listen for ctrl+c");
    tracing::info!("Shutting down gracefully...");
}
