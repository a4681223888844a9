//! Inline button payloads
//!
//! Admin buttons carry `admin:<entity>:<action>:<id>` where entity is `form`
//! or `user`, action is `accept` or `reject` and id is a decimal integer.

use std::fmt;

use super::outgoing::{InlineButton, InlineKeyboard};

const PREFIX: &str = "admin";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdminEntity {
    /// Id is the form id
    Form,
    /// Id is the user's Telegram id
    User,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdminAction {
    Accept,
    Reject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AdminCallback {
    pub entity: AdminEntity,
    pub action: AdminAction,
    pub id: i64,
}

impl AdminEntity {
    fn as_str(&self) -> &'static str {
        match self {
            AdminEntity::Form => "form",
            AdminEntity::User => "user",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "form" => Some(AdminEntity::Form),
            "user" => Some(AdminEntity::User),
            _ => None,
        }
    }
}

impl AdminAction {
    fn as_str(&self) -> &'static str {
        match self {
            AdminAction::Accept => "accept",
            AdminAction::Reject => "reject",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "accept" => Some(AdminAction::Accept),
            "reject" => Some(AdminAction::Reject),
            _ => None,
        }
    }
}

impl AdminCallback {
    pub fn new(entity: AdminEntity, action: AdminAction, id: i64) -> Self {
        Self { entity, action, id }
    }

    /// Parse button data, anything not in the admin format is `None`
    pub fn parse(data: &str) -> Option<Self> {
        let mut parts = data.split(':');
        if parts.next()? != PREFIX {
            return None;
        }
        let entity = AdminEntity::parse(parts.next()?)?;
        let action = AdminAction::parse(parts.next()?)?;
        let id = parts.next()?;
        if parts.next().is_some() {
            return None;
        }

        let digits = id.strip_prefix('-').unwrap_or(id);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        Some(Self::new(entity, action, id.parse().ok()?))
    }

    /// Accept/reject button pair for one form or user
    pub fn decision_keyboard(entity: AdminEntity, id: i64, accept_label: &str, reject_label: &str) -> InlineKeyboard {
        vec![vec![
            InlineButton::callback(accept_label, Self::new(entity, AdminAction::Accept, id).to_string()),
            InlineButton::callback(reject_label, Self::new(entity, AdminAction::Reject, id).to_string()),
        ]]
    }
}

impl fmt::Display for AdminCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}:{}", PREFIX, self.entity.as_str(), self.action.as_str(), self.id)
    }
}
