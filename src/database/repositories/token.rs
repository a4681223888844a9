//! Login token repository implementation

use sqlx::PgPool;
use chrono::{Duration, Utc};
use crate::models::Token;
use crate::utils::errors::ClubGateError;
use crate::utils::helpers::generate_token;

#[derive(Clone)]
#[derive(Debug)]
pub struct TokenRepository {
    pool: PgPool,
    ttl: Duration,
}

impl TokenRepository {
    pub fn new(pool: PgPool, ttl: Duration) -> Self {
        Self { pool, ttl }
    }

    /// Replace the user's token with a fresh one and push its expiry forward
    pub async fn create_or_prolong(&self, telegram_id: i64) -> Result<Token, ClubGateError> {
        let mut tx = self.pool.begin().await?;

        let owner: Option<(i64,)> = sqlx::query_as(
            "SELECT id FROM users WHERE telegram_id = $1 AND deleted_at IS NULL"
        )
        .bind(telegram_id)
        .fetch_optional(&mut *tx)
        .await?;

        if owner.is_none() {
            return Err(ClubGateError::UserNotFound { telegram_id });
        }

        let token = sqlx::query_as::<_, Token>(
            r#"
            INSERT INTO tokens (token, user_telegram_id, expire_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_telegram_id)
            DO UPDATE SET token = EXCLUDED.token, expire_at = EXCLUDED.expire_at
            RETURNING token, user_telegram_id, expire_at
            "#
        )
        .bind(generate_token())
        .bind(telegram_id)
        .bind(Utc::now() + self.ttl)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(token)
    }

    /// Find token row by its value regardless of expiry
    pub async fn find(&self, token: &str) -> Result<Option<Token>, ClubGateError> {
        let token = sqlx::query_as::<_, Token>(
            "SELECT token, user_telegram_id, expire_at FROM tokens WHERE token = $1"
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(token)
    }
}
