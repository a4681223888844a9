//! User repository implementation

use sqlx::PgPool;
use chrono::Utc;
use crate::models::{StatusUpdate, User, UserStatus, UserUpsert};
use crate::utils::errors::ClubGateError;

#[derive(Clone)]
#[derive(Debug)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a user or merge the given fields into the existing row
    pub async fn upsert(&self, upsert: UserUpsert) -> Result<User, ClubGateError> {
        let mut tx = self.pool.begin().await?;
        let now = Utc::now();

        let inserted = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (telegram_id, username, first_name, last_name, status, created_at, updated_at)
            VALUES ($1, $2, COALESCE($3, ''), $4, $5, $6, $6)
            ON CONFLICT (telegram_id) DO NOTHING
            RETURNING id, telegram_id, username, first_name, last_name, status, created_at, updated_at, deleted_at
            "#
        )
        .bind(upsert.telegram_id)
        .bind(&upsert.username)
        .bind(&upsert.first_name)
        .bind(&upsert.last_name)
        .bind(upsert.insert_status())
        .bind(now)
        .fetch_optional(&mut *tx)
        .await?;

        if let Some(user) = inserted {
            tx.commit().await?;
            return Ok(user);
        }

        let current = sqlx::query_as::<_, User>(
            "SELECT id, telegram_id, username, first_name, last_name, status, created_at, updated_at, deleted_at FROM users WHERE telegram_id = $1 FOR UPDATE"
        )
        .bind(upsert.telegram_id)
        .fetch_one(&mut *tx)
        .await?;

        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET username = COALESCE($2, username),
                first_name = COALESCE($3, first_name),
                last_name = COALESCE($4, last_name),
                status = $5,
                deleted_at = NULL,
                updated_at = $6
            WHERE telegram_id = $1
            RETURNING id, telegram_id, username, first_name, last_name, status, created_at, updated_at, deleted_at
            "#
        )
        .bind(upsert.telegram_id)
        .bind(&upsert.username)
        .bind(&upsert.first_name)
        .bind(&upsert.last_name)
        .bind(upsert.resolve_status(current.status))
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(user)
    }

    /// Find user by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<User>, ClubGateError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, telegram_id, username, first_name, last_name, status, created_at, updated_at, deleted_at FROM users WHERE id = $1 AND deleted_at IS NULL"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Find user by Telegram ID
    pub async fn find_by_telegram_id(&self, telegram_id: i64) -> Result<Option<User>, ClubGateError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, telegram_id, username, first_name, last_name, status, created_at, updated_at, deleted_at FROM users WHERE telegram_id = $1 AND deleted_at IS NULL"
        )
        .bind(telegram_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Find users by Telegram IDs
    pub async fn find_by_telegram_ids(&self, telegram_ids: &[i64]) -> Result<Vec<User>, ClubGateError> {
        let users = sqlx::query_as::<_, User>(
            "SELECT id, telegram_id, username, first_name, last_name, status, created_at, updated_at, deleted_at FROM users WHERE telegram_id = ANY($1) AND deleted_at IS NULL"
        )
        .bind(telegram_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    /// Find the owner of a login token that has not expired yet
    pub async fn find_by_token(&self, token: &str) -> Result<Option<User>, ClubGateError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT u.id, u.telegram_id, u.username, u.first_name, u.last_name, u.status, u.created_at, u.updated_at, u.deleted_at
            FROM users u
            JOIN tokens t ON t.user_telegram_id = u.telegram_id
            WHERE t.token = $1 AND t.expire_at > $2 AND u.deleted_at IS NULL
            "#
        )
        .bind(token)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Move the user to a new status if the transition is allowed
    pub async fn set_status(&self, telegram_id: i64, status: UserStatus) -> Result<StatusUpdate<User>, ClubGateError> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, User>(
            "SELECT id, telegram_id, username, first_name, last_name, status, created_at, updated_at, deleted_at FROM users WHERE telegram_id = $1 AND deleted_at IS NULL FOR UPDATE"
        )
        .bind(telegram_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(ClubGateError::UserNotFound { telegram_id })?;

        if !current.status.can_become(status) {
            tx.commit().await?;
            return Ok(StatusUpdate::Unchanged(current));
        }

        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET status = $2, updated_at = $3
            WHERE telegram_id = $1
            RETURNING id, telegram_id, username, first_name, last_name, status, created_at, updated_at, deleted_at
            "#
        )
        .bind(telegram_id)
        .bind(status)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(StatusUpdate::Changed(user))
    }
}
