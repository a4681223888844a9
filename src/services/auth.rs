//! Authentication service implementation
//!
//! Resolves website login tokens to users and answers the access questions
//! the bot and the website ask.

use std::sync::Arc;
use tracing::{debug, info};
use crate::database::Database;
use crate::models::{User, UserStatus};
use crate::utils::errors::{ClubGateError, Result};

/// Authentication service for login tokens and admin checks
#[derive(Clone)]
pub struct AuthService {
    db: Arc<dyn Database>,
    admin_id: i64,
}

impl AuthService {
    /// Create a new AuthService instance
    pub fn new(db: Arc<dyn Database>, admin_id: i64) -> Self {
        Self { db, admin_id }
    }

    /// Check if the Telegram account is the configured admin
    pub fn is_admin(&self, telegram_id: i64) -> bool {
        telegram_id == self.admin_id
    }

    /// Resolve a login token to its owner.
    ///
    /// Unknown and expired tokens are an `Authentication` error, banned owners
    /// a `PermissionDenied` one.
    pub async fn authenticate(&self, token: &str) -> Result<User> {
        let user = self.db
            .get_user_by_token(token)
            .await?
            .ok_or_else(|| {
                debug!("Login token is unknown or expired");
                ClubGateError::Authentication("invalid or expired token".to_string())
            })?;

        if user.status == UserStatus::Banned {
            info!(telegram_id = user.telegram_id, "Banned user tried to log in");
            return Err(ClubGateError::PermissionDenied("user is banned".to_string()));
        }

        Ok(user)
    }

    /// Users who never submitted a form are sent to the profile page first
    pub fn requires_profile(user: &User) -> bool {
        user.status == UserStatus::New
    }
}
