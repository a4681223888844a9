//! Login token model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Bearer credential for the website, one per user
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Token {
    pub token: String,
    pub user_telegram_id: i64,
    pub expire_at: DateTime<Utc>,
}

impl Token {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expire_at <= now
    }
}
