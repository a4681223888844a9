//! In-process store
//!
//! Implements the `Database` contract over plain collections behind a mutex.
//! Used by the test-suite and by local runs with `database.url = "memory://"`.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tokio::sync::Mutex;

use crate::database::Database;
use crate::models::*;
use crate::utils::errors::{ClubGateError, Result};
use crate::utils::helpers::generate_token;

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<i64, User>,
    /// Keyed by owner, one token per user
    tokens: HashMap<i64, Token>,
    forms: Vec<Form>,
    next_user_id: i64,
    next_form_id: i64,
    writes: u64,
}

impl Tables {
    fn live_user(&self, telegram_id: i64) -> Option<&User> {
        self.users.get(&telegram_id).filter(|u| u.deleted_at.is_none())
    }

    fn latest_form(&self, telegram_id: i64, status: Option<FormStatus>) -> Option<Form> {
        self.forms
            .iter()
            .filter(|f| f.user_telegram_id == telegram_id)
            .filter(|f| status.map_or(true, |s| f.status == s))
            .max_by_key(|f| (f.created_at, f.id))
            .cloned()
    }
}

#[derive(Debug)]
pub struct MemoryDatabase {
    tables: Mutex<Tables>,
    token_ttl: Duration,
}

impl MemoryDatabase {
    pub fn new(token_ttl: Duration) -> Self {
        Self {
            tables: Mutex::new(Tables::default()),
            token_ttl,
        }
    }

    /// Number of successful writes so far
    pub async fn write_count(&self) -> u64 {
        self.tables.lock().await.writes
    }

    pub async fn user_count(&self) -> usize {
        self.tables.lock().await.users.len()
    }

    /// Store a token as is, bypassing issuance
    pub async fn insert_token(&self, token: Token) {
        let mut tables = self.tables.lock().await;
        tables.tokens.insert(token.user_telegram_id, token);
        tables.writes += 1;
    }

    /// Mark a user deleted without removing the row
    pub async fn soft_delete_user(&self, telegram_id: i64) -> Result<()> {
        let mut tables = self.tables.lock().await;
        let user = tables
            .users
            .get_mut(&telegram_id)
            .ok_or(ClubGateError::UserNotFound { telegram_id })?;
        user.deleted_at = Some(Utc::now());
        tables.writes += 1;
        Ok(())
    }
}

impl Default for MemoryDatabase {
    fn default() -> Self {
        Self::new(Duration::hours(24))
    }
}

#[async_trait]
impl Database for MemoryDatabase {
    async fn upsert_user(&self, upsert: UserUpsert) -> Result<User> {
        let mut tables = self.tables.lock().await;
        let now = Utc::now();

        let user = match tables.users.get(&upsert.telegram_id).cloned() {
            Some(mut user) => {
                if let Some(username) = upsert.username.clone() {
                    user.username = Some(username);
                }
                if let Some(first_name) = upsert.first_name.clone() {
                    user.first_name = first_name;
                }
                if let Some(last_name) = upsert.last_name.clone() {
                    user.last_name = Some(last_name);
                }
                user.status = upsert.resolve_status(user.status);
                user.deleted_at = None;
                user.updated_at = now;
                user
            }
            None => {
                tables.next_user_id += 1;
                User {
                    id: tables.next_user_id,
                    telegram_id: upsert.telegram_id,
                    username: upsert.username.clone(),
                    first_name: upsert.first_name.clone().unwrap_or_default(),
                    last_name: upsert.last_name.clone(),
                    status: upsert.insert_status(),
                    created_at: now,
                    updated_at: now,
                    deleted_at: None,
                }
            }
        };

        tables.users.insert(user.telegram_id, user.clone());
        tables.writes += 1;
        Ok(user)
    }

    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.id == id && u.deleted_at.is_none())
            .cloned())
    }

    async fn get_user_by_telegram_id(&self, telegram_id: i64) -> Result<Option<User>> {
        let tables = self.tables.lock().await;
        Ok(tables.live_user(telegram_id).cloned())
    }

    async fn get_user_by_token(&self, token: &str) -> Result<Option<User>> {
        let tables = self.tables.lock().await;
        let now = Utc::now();
        let owner = tables
            .tokens
            .values()
            .find(|t| t.token == token && !t.is_expired(now))
            .map(|t| t.user_telegram_id);

        Ok(owner.and_then(|id| tables.live_user(id).cloned()))
    }

    async fn create_or_prolong_token(&self, telegram_id: i64) -> Result<Token> {
        let mut tables = self.tables.lock().await;
        if tables.live_user(telegram_id).is_none() {
            return Err(ClubGateError::UserNotFound { telegram_id });
        }

        let token = Token {
            token: generate_token(),
            user_telegram_id: telegram_id,
            expire_at: Utc::now() + self.token_ttl,
        };
        tables.tokens.insert(telegram_id, token.clone());
        tables.writes += 1;
        Ok(token)
    }

    async fn create_form(&self, form: NewForm) -> Result<Form> {
        let mut tables = self.tables.lock().await;
        if tables.live_user(form.user_telegram_id).is_none() {
            return Err(ClubGateError::UserNotFound { telegram_id: form.user_telegram_id });
        }

        tables.next_form_id += 1;
        let now = Utc::now();
        let created = Form {
            id: tables.next_form_id,
            user_telegram_id: form.user_telegram_id,
            name: form.name,
            age: form.age,
            gender: form.gender,
            about: form.about,
            hobbies: form.hobbies,
            work: form.work,
            education: form.education,
            cover_letter: form.cover_letter,
            contacts: form.contacts,
            status: FormStatus::New,
            created_at: now,
            updated_at: now,
        };
        tables.forms.push(created.clone());
        tables.writes += 1;
        Ok(created)
    }

    async fn get_form(&self, id: i64) -> Result<Option<Form>> {
        let tables = self.tables.lock().await;
        Ok(tables.forms.iter().find(|f| f.id == id).cloned())
    }

    async fn set_form_status(&self, id: i64, status: FormStatus) -> Result<StatusUpdate<Form>> {
        let mut tables = self.tables.lock().await;
        let form = tables
            .forms
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or(ClubGateError::FormNotFound { form_id: id })?;

        if !form.status.can_become(status) {
            return Ok(StatusUpdate::Unchanged(form.clone()));
        }

        form.status = status;
        form.updated_at = Utc::now();
        let updated = form.clone();
        tables.writes += 1;
        Ok(StatusUpdate::Changed(updated))
    }

    async fn get_last_form(&self, telegram_id: i64) -> Result<Option<Form>> {
        let tables = self.tables.lock().await;
        Ok(tables.latest_form(telegram_id, None))
    }

    async fn get_actual_form(&self, telegram_id: i64) -> Result<Option<Form>> {
        let tables = self.tables.lock().await;
        Ok(tables.latest_form(telegram_id, Some(FormStatus::Accepted)))
    }

    async fn list_accepted_forms(&self) -> Result<Vec<(Form, User)>> {
        let tables = self.tables.lock().await;
        let mut result: Vec<(Form, User)> = tables
            .users
            .values()
            .filter(|u| u.status == UserStatus::Active && u.deleted_at.is_none())
            .filter_map(|u| {
                tables
                    .latest_form(u.telegram_id, Some(FormStatus::Accepted))
                    .map(|f| (f, u.clone()))
            })
            .collect();
        result.sort_by_key(|(form, _)| form.user_telegram_id);
        Ok(result)
    }

    async fn set_user_status(&self, telegram_id: i64, status: UserStatus) -> Result<StatusUpdate<User>> {
        let mut tables = self.tables.lock().await;
        let user = tables
            .users
            .get_mut(&telegram_id)
            .filter(|u| u.deleted_at.is_none())
            .ok_or(ClubGateError::UserNotFound { telegram_id })?;

        if !user.status.can_become(status) {
            return Ok(StatusUpdate::Unchanged(user.clone()));
        }

        user.status = status;
        user.updated_at = Utc::now();
        let updated = user.clone();
        tables.writes += 1;
        Ok(StatusUpdate::Changed(updated))
    }
}
