//! Application settings management
//!
//! This module defines the configuration structure and provides methods
//! for loading settings from TOML files and environment variables.

use std::time::Duration;
use serde::{Deserialize, Serialize};

/// Main application configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub bot: BotConfig,
    pub sender: SenderConfig,
    pub site: SiteConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub shutdown_grace_seconds: u64,
}

/// Telegram bot configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BotConfig {
    pub token: String,
    /// Telegram id of the only account allowed to press admin buttons
    pub admin_id: i64,
    /// Telegram id of the community group
    pub group_id: i64,
    pub invite_link: String,
    /// Override of the Bot API endpoint, mostly for tests
    pub api_url: Option<String>,
    pub poll_timeout_seconds: u64,
    pub retry_delay_seconds: u64,
    pub update_queue_capacity: usize,
}

/// Outbound queue and rate limiter configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SenderConfig {
    pub queue_capacity: usize,
    pub burst: u32,
    pub per_second: u32,
    pub throttle_backoff_ms: u64,
    pub max_attempts: u32,
}

/// Website configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SiteConfig {
    pub url: String,
    pub token_ttl_hours: i64,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    /// Run migrations and exit
    pub only_migrate: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub file_path: Option<String>,
    /// Forward warnings and errors to the admin chat
    pub admin_alerts: bool,
}

impl Settings {
    /// Load settings from defaults, configuration file and environment variables
    pub fn new() -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::Config::try_from(&Settings::default())?)
            .add_source(config::File::with_name("config").required(false))
            .add_source(
                config::Environment::with_prefix("CLUBGATE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), crate::utils::errors::ClubGateError> {
        super::validation::validate_settings(self)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_seconds)
    }
}

impl BotConfig {
    pub fn poll_timeout(&self) -> Duration {
        Duration::from_secs(self.poll_timeout_seconds)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_seconds)
    }
}

impl SenderConfig {
    pub fn throttle_backoff(&self) -> Duration {
        Duration::from_millis(self.throttle_backoff_ms)
    }
}

impl DatabaseConfig {
    /// The in-process store is selected with a `memory://` url
    pub fn is_in_memory(&self) -> bool {
        self.url.starts_with("memory://")
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bot: BotConfig {
                token: String::new(),
                admin_id: 0,
                group_id: 0,
                invite_link: String::new(),
                api_url: None,
                poll_timeout_seconds: 30,
                retry_delay_seconds: 3,
                update_queue_capacity: 60,
            },
            sender: SenderConfig::default(),
            site: SiteConfig {
                url: "http://localhost:8080".to_string(),
                token_ttl_hours: 24,
            },
            database: DatabaseConfig {
                url: "postgresql://localhost/clubgate".to_string(),
                max_connections: 10,
                min_connections: 1,
                only_migrate: false,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                file_path: None,
                admin_alerts: true,
            },
            shutdown_grace_seconds: 4,
        }
    }
}

impl Default for SenderConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 60,
            burst: 30,
            per_second: 30,
            throttle_backoff_ms: 1000,
            max_attempts: 10,
        }
    }
}
