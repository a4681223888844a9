//! Bot handlers module
//!
//! This module contains the update dispatcher and the handlers it routes to:
//! - Message handlers for private and group chats
//! - Command handlers for bot commands
//! - Callback handlers for admin inline buttons
//! - Join request handlers for the community group

pub mod callbacks;
pub mod commands;
pub mod join_requests;
pub mod messages;

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::BotConfig;
use crate::database::Database;
use crate::services::{AdminNotifier, Templates};
use crate::telegram::outgoing::Outgoing;
use crate::telegram::sender::SenderHandle;
use crate::telegram::update::{IncomingUpdate, UpdatePayload};
use crate::utils::errors::Result;

// Re-export commonly used handler functions
pub use callbacks::handle_callback_query;
pub use join_requests::handle_join_request;
pub use messages::handle_message;

/// Everything a handler needs
#[derive(Clone)]
pub struct HandlerContext {
    pub db: Arc<dyn Database>,
    pub sender: SenderHandle,
    pub notifier: AdminNotifier,
    pub templates: Templates,
    pub config: BotConfig,
}

impl HandlerContext {
    pub fn new(db: Arc<dyn Database>, sender: SenderHandle, templates: Templates, config: BotConfig) -> Self {
        let notifier = AdminNotifier::new(sender.clone(), config.admin_id);
        Self {
            db,
            sender,
            notifier,
            templates,
            config,
        }
    }

    /// Queue an HTML text message
    pub async fn send_text(&self, chat_id: i64, text: impl Into<String>) -> Result<()> {
        self.sender.send(Outgoing::text(chat_id, text)).await
    }

    pub async fn send(&self, outgoing: Outgoing) -> Result<()> {
        self.sender.send(outgoing).await
    }

    pub fn is_admin(&self, telegram_id: i64) -> bool {
        telegram_id == self.config.admin_id
    }

    pub fn is_community_group(&self, chat_id: i64) -> bool {
        chat_id == self.config.group_id
    }
}

/// Sequential consumer of the update queue
pub struct UpdateDispatcher {
    ctx: HandlerContext,
}

impl UpdateDispatcher {
    pub fn new(ctx: HandlerContext) -> Self {
        Self { ctx }
    }

    /// Process updates one at a time until cancelled or the queue closes
    pub async fn run(self, mut updates: mpsc::Receiver<IncomingUpdate>, cancel: CancellationToken) {
        info!("Update dispatcher started");

        loop {
            let update = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                update = updates.recv() => match update {
                    Some(update) => update,
                    None => break,
                },
            };

            self.process_update(update).await;
        }

        info!("Update dispatcher stopped");
    }

    /// Route one update to its handler, failures are logged and end the update
    pub async fn process_update(&self, update: IncomingUpdate) {
        let update_id = update.id;
        let kind = update.kind();
        debug!(update_id, kind, "Processing update");

        let result = match update.payload {
            UpdatePayload::Message(message) => handle_message(&self.ctx, message).await,
            UpdatePayload::CallbackQuery(callback) => handle_callback_query(&self.ctx, callback).await,
            UpdatePayload::JoinRequest(request) => handle_join_request(&self.ctx, request).await,
            UpdatePayload::Unsupported => {
                debug!(update_id, "Ignoring unsupported update");
                Ok(())
            }
        };

        if let Err(e) = result {
            if e.is_not_found() {
                warn!(update_id, kind, error = %e, "Update refers to a missing record");
            } else {
                error!(update_id, kind, severity = %e.severity(), error = %e, "Failed to process update");
            }
        }
    }
}
