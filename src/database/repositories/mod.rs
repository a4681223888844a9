//! Database repositories module
//!
//! This module contains all repository implementations for data access

pub mod user;
pub mod token;
pub mod form;

// Re-export repositories
pub use user::UserRepository;
pub use token::TokenRepository;
pub use form::FormRepository;
