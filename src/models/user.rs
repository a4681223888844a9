//! User model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Lifecycle of a community member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    New,
    Active,
    NotActive,
    Accepted,
    Rejected,
    Bot,
    Banned,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::New => "new",
            UserStatus::Active => "active",
            UserStatus::NotActive => "not_active",
            UserStatus::Accepted => "accepted",
            UserStatus::Rejected => "rejected",
            UserStatus::Bot => "bot",
            UserStatus::Banned => "banned",
        }
    }

    /// Bots and banned accounts never change status again
    pub fn is_terminal(&self) -> bool {
        matches!(self, UserStatus::Bot | UserStatus::Banned)
    }

    /// Whether a stored status may be replaced by `target`
    pub fn can_become(&self, target: UserStatus) -> bool {
        if *self == target || self.is_terminal() {
            return false;
        }
        match target {
            UserStatus::New => false,
            UserStatus::Accepted | UserStatus::Rejected => {
                matches!(self, UserStatus::New | UserStatus::NotActive)
            }
            UserStatus::Active | UserStatus::NotActive => true,
            UserStatus::Bot | UserStatus::Banned => true,
        }
    }

    /// Statuses allowed to join the group on their own request
    pub fn may_join_group(&self) -> bool {
        matches!(self, UserStatus::Active | UserStatus::Accepted | UserStatus::NotActive)
    }
}

impl std::fmt::Display for UserStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub telegram_id: i64,
    pub username: Option<String>,
    pub first_name: String,
    pub last_name: Option<String>,
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn display_name(&self) -> String {
        crate::utils::helpers::display_name(&self.first_name, self.last_name.as_deref())
    }
}

/// Partial user update keyed by Telegram id.
///
/// Fields left as `None` are not touched on an existing row. A new row gets
/// an empty first name and the `new` status unless given.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserUpsert {
    pub telegram_id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub status: Option<UserStatus>,
}

impl UserUpsert {
    pub fn new(telegram_id: i64) -> Self {
        Self {
            telegram_id,
            ..Default::default()
        }
    }

    pub fn with_status(mut self, status: UserStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Status a brand new row is created with
    pub fn insert_status(&self) -> UserStatus {
        self.status.unwrap_or(UserStatus::New)
    }

    /// Status an existing row ends up with
    pub fn resolve_status(&self, current: UserStatus) -> UserStatus {
        match self.status {
            Some(target) if current.can_become(target) => target,
            _ => current,
        }
    }
}
