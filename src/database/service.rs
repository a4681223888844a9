//! Database service layer
//!
//! Postgres implementation of the `Database` contract, built from one
//! repository per entity.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Duration;

use crate::database::{Database, DatabasePool, FormRepository, TokenRepository, UserRepository};
use crate::models::*;
use crate::utils::errors::Result;

#[derive(Debug, Clone)]
pub struct DatabaseService {
    pub users: UserRepository,
    pub tokens: TokenRepository,
    pub forms: FormRepository,
}

impl DatabaseService {
    pub fn new(pool: DatabasePool, token_ttl: Duration) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            tokens: TokenRepository::new(pool.clone(), token_ttl),
            forms: FormRepository::new(pool),
        }
    }
}

#[async_trait]
impl Database for DatabaseService {
    async fn upsert_user(&self, upsert: UserUpsert) -> Result<User> {
        self.users.upsert(upsert).await
    }

    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        self.users.find_by_id(id).await
    }

    async fn get_user_by_telegram_id(&self, telegram_id: i64) -> Result<Option<User>> {
        self.users.find_by_telegram_id(telegram_id).await
    }

    async fn get_user_by_token(&self, token: &str) -> Result<Option<User>> {
        self.users.find_by_token(token).await
    }

    async fn create_or_prolong_token(&self, telegram_id: i64) -> Result<Token> {
        self.tokens.create_or_prolong(telegram_id).await
    }

    async fn create_form(&self, form: NewForm) -> Result<Form> {
        self.forms.create(form).await
    }

    async fn get_form(&self, id: i64) -> Result<Option<Form>> {
        self.forms.find_by_id(id).await
    }

    async fn set_form_status(&self, id: i64, status: FormStatus) -> Result<StatusUpdate<Form>> {
        self.forms.set_status(id, status).await
    }

    async fn get_last_form(&self, telegram_id: i64) -> Result<Option<Form>> {
        self.forms.find_latest(telegram_id, None).await
    }

    async fn get_actual_form(&self, telegram_id: i64) -> Result<Option<Form>> {
        self.forms.find_latest(telegram_id, Some(FormStatus::Accepted)).await
    }

    async fn list_accepted_forms(&self) -> Result<Vec<(Form, User)>> {
        let forms = self.forms.list_latest_accepted_of_active_users().await?;
        let ids: Vec<i64> = forms.iter().map(|f| f.user_telegram_id).collect();

        let mut users: HashMap<i64, User> = self.users
            .find_by_telegram_ids(&ids)
            .await?
            .into_iter()
            .map(|u| (u.telegram_id, u))
            .collect();

        // A user may change status between the two queries
        Ok(forms
            .into_iter()
            .filter_map(|form| {
                let user = users.remove(&form.user_telegram_id)?;
                (user.status == UserStatus::Active).then_some((form, user))
            })
            .collect())
    }

    async fn set_user_status(&self, telegram_id: i64, status: UserStatus) -> Result<StatusUpdate<User>> {
        self.users.set_status(telegram_id, status).await
    }
}
