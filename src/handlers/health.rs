use crate::{config::Environment, models::HealthStatus};
use axum::{extract::State, Json};
use chrono::Utc;
use std::time::Instant;

#[derive(Clone)]
pub struct HealthState {
    pub environment: Environment,
    pub started_at: Instant,
}

impl HealthState {
    pub fn new(environment: Environment) -> Self {
        Self {
            environment,
            started_at: Instant::now(),
        }
    }
}

pub async fn root() -> &'static str {
    "Payment webhook receiver is running"
}

pub async fn health_check(State(state): State<HealthState>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        environment: format!("{:?}", state.environment).to_lowercase(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        timestamp: Utc::now(),
    })
}
