//! Data models module
//!
//! This module contains all data structures used throughout the application

pub mod user;
pub mod token;
pub mod form;

// Re-export commonly used models
pub use user::{User, UserStatus, UserUpsert};
pub use token::Token;
pub use form::{Form, FormStatus, Gender, NewForm};

/// Outcome of a status mutation.
///
/// `Unchanged` means the stored row already had the requested status or the
/// transition is not allowed, so nothing was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusUpdate<T> {
    Changed(T),
    Unchanged(T),
}

impl<T> StatusUpdate<T> {
    pub fn is_changed(&self) -> bool {
        matches!(self, StatusUpdate::Changed(_))
    }

    pub fn into_inner(self) -> T {
        match self {
            StatusUpdate::Changed(value) | StatusUpdate::Unchanged(value) => value,
        }
    }
}
