//! Services module
//!
//! This module contains business logic services

pub mod auth;
pub mod forms;
pub mod notification;
pub mod templates;

// Re-export commonly used services
pub use auth::AuthService;
pub use forms::FormService;
pub use notification::AdminNotifier;
pub use templates::Templates;

use std::sync::Arc;

use crate::config::Settings;
use crate::database::Database;
use crate::telegram::sender::SenderHandle;

/// Service factory for the website layer
#[derive(Clone)]
pub struct ServiceFactory {
    pub auth_service: AuthService,
    pub form_service: FormService,
    pub notifier: AdminNotifier,
}

impl ServiceFactory {
    /// Create all services on top of a running bot's sender
    pub fn new(db: Arc<dyn Database>, sender: SenderHandle, settings: &Settings) -> Self {
        let templates = Templates::new(&settings.site.url);
        let admin_id = settings.bot.admin_id;

        Self {
            auth_service: AuthService::new(db.clone(), admin_id),
            form_service: FormService::new(db, sender.clone(), templates, admin_id),
            notifier: AdminNotifier::new(sender, admin_id),
        }
    }
}
