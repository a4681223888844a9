//! Membership form model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "gender", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    Nonbinary,
    #[default]
    Undefined,
}

impl Gender {
    /// Human readable label used in chat messages
    pub fn label(&self) -> &'static str {
        match self {
            Gender::Male => "мужской",
            Gender::Female => "женский",
            Gender::Nonbinary => "небинарный",
            Gender::Undefined => "не указан",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "form_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum FormStatus {
    New,
    Accepted,
    Rejected,
}

impl FormStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormStatus::New => "new",
            FormStatus::Accepted => "accepted",
            FormStatus::Rejected => "rejected",
        }
    }

    /// A form is decided exactly once
    pub fn can_become(&self, target: FormStatus) -> bool {
        *self == FormStatus::New && target != FormStatus::New
    }
}

impl std::fmt::Display for FormStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Form {
    pub id: i64,
    pub user_telegram_id: i64,
    pub name: String,
    pub age: Option<i32>,
    pub gender: Gender,
    pub about: Option<String>,
    pub hobbies: Option<String>,
    pub work: Option<String>,
    pub education: Option<String>,
    pub cover_letter: Option<String>,
    pub contacts: Option<String>,
    pub status: FormStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Form submission coming from the website
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewForm {
    pub user_telegram_id: i64,
    pub name: String,
    pub age: Option<i32>,
    #[serde(default)]
    pub gender: Gender,
    pub about: Option<String>,
    pub hobbies: Option<String>,
    pub work: Option<String>,
    pub education: Option<String>,
    pub cover_letter: Option<String>,
    pub contacts: Option<String>,
}
