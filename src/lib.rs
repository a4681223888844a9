//! ClubGate Telegram Bot
//!
//! Membership gate for a community chat. Users log in to the website through
//! the bot, submit a membership form, and the admin and the group decide on
//! it through inline buttons and a poll.

#![allow(non_snake_case)]

pub mod config;
pub mod database;
pub mod handlers;
pub mod models;
pub mod services;
pub mod telegram;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{ClubGateError, Result};

// Re-export main components for easy access
pub use database::{Database, DatabaseService, MemoryDatabase};
pub use services::ServiceFactory;
pub use telegram::{BotRuntime, SenderHandle};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
