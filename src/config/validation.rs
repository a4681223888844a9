//! Configuration validation module
//!
//! This module provides validation functions for application configuration
//! to ensure all required settings are properly configured.

use crate::utils::errors::{ClubGateError, Result};
use super::Settings;

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_bot_config(&settings.bot)?;
    validate_sender_config(&settings.sender)?;
    validate_site_config(&settings.site)?;
    validate_database_config(&settings.database)?;
    validate_logging_config(&settings.logging)?;

    Ok(())
}

/// Validate bot configuration
fn validate_bot_config(config: &super::BotConfig) -> Result<()> {
    if config.token.is_empty() {
        return Err(ClubGateError::Config(
            "Bot token is required".to_string()
        ));
    }

    if config.admin_id == 0 {
        return Err(ClubGateError::Config(
            "Admin ID must be configured".to_string()
        ));
    }

    if config.group_id == 0 {
        return Err(ClubGateError::Config(
            "Group ID must be configured".to_string()
        ));
    }

    if config.update_queue_capacity == 0 {
        return Err(ClubGateError::Config(
            "Update queue capacity must be greater than 0".to_string()
        ));
    }

    if let Some(api_url) = &config.api_url {
        url::Url::parse(api_url)?;
    }

    Ok(())
}

/// Validate sender configuration
fn validate_sender_config(config: &super::SenderConfig) -> Result<()> {
    if config.queue_capacity == 0 {
        return Err(ClubGateError::Config(
            "Outbound queue capacity must be greater than 0".to_string()
        ));
    }

    if config.burst == 0 || config.per_second == 0 {
        return Err(ClubGateError::Config(
            "Rate limiter burst and rate must be greater than 0".to_string()
        ));
    }

    if config.max_attempts == 0 {
        return Err(ClubGateError::Config(
            "Max send attempts must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate website configuration
fn validate_site_config(config: &super::SiteConfig) -> Result<()> {
    url::Url::parse(&config.url)?;

    if config.token_ttl_hours <= 0 {
        return Err(ClubGateError::Config(
            "Token lifetime must be positive".to_string()
        ));
    }

    Ok(())
}

/// Validate database configuration
fn validate_database_config(config: &super::DatabaseConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(ClubGateError::Config(
            "Database URL is required".to_string()
        ));
    }

    if config.max_connections == 0 {
        return Err(ClubGateError::Config(
            "Max connections must be greater than 0".to_string()
        ));
    }

    if config.min_connections > config.max_connections {
        return Err(ClubGateError::Config(
            "Min connections cannot be greater than max connections".to_string()
        ));
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(ClubGateError::Config(
            "Log level is required".to_string()
        ));
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.level.as_str()) {
        return Err(ClubGateError::Config(
            format!("Invalid log level: {}. Valid levels: {:?}", config.level, valid_levels)
        ));
    }

    Ok(())
}
