//! Error handling for ClubGate
//!
//! This module defines the main error types used throughout the application
//! and provides a unified error handling strategy.

use std::time::Duration;
use thiserror::Error;

/// Main error type for ClubGate application
#[derive(Error, Debug)]
pub enum ClubGateError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Telegram API error: {0}")]
    Telegram(#[from] TelegramError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration loading error: {0}")]
    ConfigLoad(#[from] config::ConfigError),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("User not found: {telegram_id}")]
    UserNotFound { telegram_id: i64 },

    #[error("Form not found: {form_id}")]
    FormNotFound { form_id: i64 },

    #[error("Outbound queue is closed")]
    QueueClosed,

    #[error("Outbound queue is full")]
    QueueFull,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Errors returned by the Telegram platform adapter
#[derive(Error, Debug)]
pub enum TelegramError {
    #[error("Too many requests, retry after {retry_after:?}")]
    TooManyRequests { retry_after: Duration },

    #[error("Telegram request failed: {0}")]
    Request(#[source] teloxide::RequestError),

    #[error("Telegram rejected the request: {0}")]
    Rejected(String),
}

impl From<teloxide::RequestError> for TelegramError {
    fn from(error: teloxide::RequestError) -> Self {
        match error {
            teloxide::RequestError::RetryAfter(seconds) => TelegramError::TooManyRequests {
                retry_after: seconds.duration(),
            },
            other => TelegramError::Request(other),
        }
    }
}

/// Result type alias for ClubGate operations
pub type Result<T> = std::result::Result<T, ClubGateError>;

impl ClubGateError {
    /// Whether the error is a typed "row does not exist" outcome
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ClubGateError::UserNotFound { .. } | ClubGateError::FormNotFound { .. }
        )
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ClubGateError::Database(_) => ErrorSeverity::Critical,
            ClubGateError::Migration(_) => ErrorSeverity::Critical,
            ClubGateError::Config(_) => ErrorSeverity::Critical,
            ClubGateError::ConfigLoad(_) => ErrorSeverity::Critical,
            ClubGateError::PermissionDenied(_) => ErrorSeverity::Warning,
            ClubGateError::Authentication(_) => ErrorSeverity::Warning,
            ClubGateError::UserNotFound { .. } => ErrorSeverity::Info,
            ClubGateError::FormNotFound { .. } => ErrorSeverity::Info,
            ClubGateError::InvalidInput(_) => ErrorSeverity::Info,
            _ => ErrorSeverity::Error,
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}
