pub mod health;
pub mod start;
pub mod webhook;

pub use health::*;
pub use start::*;
pub use webhook::*;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::{DefaultMakeSpan, TraceLayer};

pub fn router(confirmation: Arc<ConfirmationFlow>, health: HealthState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .with_state(health)
        .route("/webhook", post(payment_webhook))
        .with_state(confirmation)
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default()))
}
