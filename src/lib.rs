pub mod bot;
pub mod config;
pub mod error;
pub mod handlers;
pub mod messages;
pub mod models;
pub mod services;
