//! Form repository implementation

use sqlx::PgPool;
use chrono::Utc;
use crate::models::{Form, FormStatus, NewForm, StatusUpdate};
use crate::utils::errors::ClubGateError;

#[derive(Clone)]
#[derive(Debug)]
pub struct FormRepository {
    pool: PgPool,
}

impl FormRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new form owned by an existing user
    pub async fn create(&self, form: NewForm) -> Result<Form, ClubGateError> {
        let mut tx = self.pool.begin().await?;

        let owner: Option<(i64,)> = sqlx::query_as(
            "SELECT id FROM users WHERE telegram_id = $1 AND deleted_at IS NULL"
        )
        .bind(form.user_telegram_id)
        .fetch_optional(&mut *tx)
        .await?;

        if owner.is_none() {
            return Err(ClubGateError::UserNotFound { telegram_id: form.user_telegram_id });
        }

        let now = Utc::now();
        let created = sqlx::query_as::<_, Form>(
            r#"
            INSERT INTO forms (user_telegram_id, name, age, gender, about, hobbies, work, education, cover_letter, contacts, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, 'new', $11, $11)
            RETURNING id, user_telegram_id, name, age, gender, about, hobbies, work, education, cover_letter, contacts, status, created_at, updated_at
            "#
        )
        .bind(form.user_telegram_id)
        .bind(form.name)
        .bind(form.age)
        .bind(form.gender)
        .bind(form.about)
        .bind(form.hobbies)
        .bind(form.work)
        .bind(form.education)
        .bind(form.cover_letter)
        .bind(form.contacts)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(created)
    }

    /// Find form by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Form>, ClubGateError> {
        let form = sqlx::query_as::<_, Form>(
            "SELECT id, user_telegram_id, name, age, gender, about, hobbies, work, education, cover_letter, contacts, status, created_at, updated_at FROM forms WHERE id = $1"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(form)
    }

    /// Decide a form, deciding twice leaves the first decision in place
    pub async fn set_status(&self, id: i64, status: FormStatus) -> Result<StatusUpdate<Form>, ClubGateError> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, Form>(
            "SELECT id, user_telegram_id, name, age, gender, about, hobbies, work, education, cover_letter, contacts, status, created_at, updated_at FROM forms WHERE id = $1 FOR UPDATE"
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(ClubGateError::FormNotFound { form_id: id })?;

        if !current.status.can_become(status) {
            tx.commit().await?;
            return Ok(StatusUpdate::Unchanged(current));
        }

        let form = sqlx::query_as::<_, Form>(
            r#"
            UPDATE forms
            SET status = $2, updated_at = $3
            WHERE id = $1
            RETURNING id, user_telegram_id, name, age, gender, about, hobbies, work, education, cover_letter, contacts, status, created_at, updated_at
            "#
        )
        .bind(id)
        .bind(status)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(StatusUpdate::Changed(form))
    }

    /// Latest form of the user, optionally restricted to one status
    pub async fn find_latest(&self, telegram_id: i64, status: Option<FormStatus>) -> Result<Option<Form>, ClubGateError> {
        let form = sqlx::query_as::<_, Form>(
            r#"
            SELECT id, user_telegram_id, name, age, gender, about, hobbies, work, education, cover_letter, contacts, status, created_at, updated_at
            FROM forms
            WHERE user_telegram_id = $1 AND ($2::form_status IS NULL OR status = $2)
            ORDER BY created_at DESC, id DESC
            LIMIT 1
            "#
        )
        .bind(telegram_id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?;

        Ok(form)
    }

    /// Latest accepted form of every active user
    pub async fn list_latest_accepted_of_active_users(&self) -> Result<Vec<Form>, ClubGateError> {
        let forms = sqlx::query_as::<_, Form>(
            r#"
            SELECT DISTINCT ON (f.user_telegram_id)
                f.id, f.user_telegram_id, f.name, f.age, f.gender, f.about, f.hobbies, f.work, f.education, f.cover_letter, f.contacts, f.status, f.created_at, f.updated_at
            FROM forms f
            JOIN users u ON u.telegram_id = f.user_telegram_id
            WHERE f.status = 'accepted' AND u.status = 'active' AND u.deleted_at IS NULL
            ORDER BY f.user_telegram_id, f.created_at DESC, f.id DESC
            "#
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(forms)
    }
}
