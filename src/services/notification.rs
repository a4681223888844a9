//! Admin notifications
//!
//! `AdminNotifier` is the one way to tell the admin something. The dispatcher
//! uses it for join-request notes and the logging layer for alerts.

use tracing::debug;

use crate::telegram::outgoing::Outgoing;
use crate::telegram::sender::SenderHandle;
use crate::utils::errors::Result;

#[derive(Debug, Clone)]
pub struct AdminNotifier {
    sender: SenderHandle,
    admin_id: i64,
}

impl AdminNotifier {
    pub fn new(sender: SenderHandle, admin_id: i64) -> Self {
        Self { sender, admin_id }
    }

    pub fn admin_id(&self) -> i64 {
        self.admin_id
    }

    /// Queue an HTML message to the admin, waiting for queue space
    pub async fn notify(&self, text: impl Into<String>) -> Result<()> {
        debug!(admin_id = self.admin_id, "Queueing admin notification");
        self.sender.send(Outgoing::text(self.admin_id, text)).await
    }

    /// Queue an HTML message to the admin, failing instead of waiting
    pub fn try_notify(&self, text: impl Into<String>) -> Result<()> {
        self.sender.try_send(Outgoing::text(self.admin_id, text))
    }
}
