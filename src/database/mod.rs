//! Database module
//!
//! This module defines the store contract used by the bot and the web layer,
//! and its two implementations: Postgres and in-memory.

pub mod connection;
pub mod memory;
pub mod repositories;
pub mod service;

use async_trait::async_trait;

use crate::models::{Form, FormStatus, NewForm, StatusUpdate, Token, User, UserStatus, UserUpsert};
use crate::utils::errors::Result;

// Re-export commonly used database components
pub use connection::{DatabasePool, PoolOptions, create_pool, run_migrations, health_check};
pub use memory::MemoryDatabase;
pub use repositories::{UserRepository, TokenRepository, FormRepository};
pub use service::DatabaseService;

/// Operations the bot and the website need from persistence.
///
/// Lookups return `Ok(None)` for missing rows. Mutations of a missing row fail
/// with `UserNotFound` or `FormNotFound`.
#[async_trait]
pub trait Database: Send + Sync {
    /// Insert or partially update a user keyed by Telegram id
    async fn upsert_user(&self, upsert: UserUpsert) -> Result<User>;

    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>>;

    async fn get_user_by_telegram_id(&self, telegram_id: i64) -> Result<Option<User>>;

    /// Resolve a login token, expired tokens resolve to nothing
    async fn get_user_by_token(&self, token: &str) -> Result<Option<User>>;

    /// Issue a fresh token for the user, replacing the previous one
    async fn create_or_prolong_token(&self, telegram_id: i64) -> Result<Token>;

    async fn create_form(&self, form: NewForm) -> Result<Form>;

    async fn get_form(&self, id: i64) -> Result<Option<Form>>;

    async fn set_form_status(&self, id: i64, status: FormStatus) -> Result<StatusUpdate<Form>>;

    /// Most recently submitted form of the user
    async fn get_last_form(&self, telegram_id: i64) -> Result<Option<Form>>;

    /// Most recently submitted accepted form of the user
    async fn get_actual_form(&self, telegram_id: i64) -> Result<Option<Form>>;

    /// Latest accepted form of every active user
    async fn list_accepted_forms(&self) -> Result<Vec<(Form, User)>>;

    async fn set_user_status(&self, telegram_id: i64, status: UserStatus) -> Result<StatusUpdate<User>>;
}
