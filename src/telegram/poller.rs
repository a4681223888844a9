//! Update ingestion loop
//!
//! Long-polls the platform and feeds updates into the bounded update queue.
//! The offset lives in the loop only; after a restart the platform redelivers
//! whatever was not acknowledged.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use super::api::BotApi;
use super::update::IncomingUpdate;
use crate::config::BotConfig;

pub struct UpdatePoller {
    api: Arc<dyn BotApi>,
    updates: mpsc::Sender<IncomingUpdate>,
    poll_timeout: Duration,
    retry_delay: Duration,
}

impl UpdatePoller {
    pub fn new(api: Arc<dyn BotApi>, updates: mpsc::Sender<IncomingUpdate>, config: &BotConfig) -> Self {
        Self {
            api,
            updates,
            poll_timeout: config.poll_timeout(),
            retry_delay: config.retry_delay(),
        }
    }

    /// Poll until cancelled or the dispatcher goes away.
    ///
    /// Returns the next offset it would have requested.
    pub async fn run(self, cancel: CancellationToken) -> i64 {
        info!("Update poller started");
        let mut offset: i64 = 0;

        loop {
            if cancel.is_cancelled() {
                break;
            }

            let updates = tokio::select! {
                _ = cancel.cancelled() => break,
                result = self.api.get_updates(offset, self.poll_timeout) => match result {
                    Ok(updates) => updates,
                    Err(e) => {
                        error!(error = %e, offset, "Failed to get updates, retrying in {:?}", self.retry_delay);
                        tokio::select! {
                            _ = cancel.cancelled() => break,
                            _ = tokio::time::sleep(self.retry_delay) => {}
                        }
                        continue;
                    }
                }
            };

            for update in updates {
                if update.id < offset {
                    debug!(update_id = update.id, offset, "Skipping already seen update");
                    continue;
                }
                offset = update.id + 1;

                tokio::select! {
                    _ = cancel.cancelled() => {
                        info!(offset, "Update poller stopped");
                        return offset;
                    }
                    sent = self.updates.send(update) => {
                        if sent.is_err() {
                            info!(offset, "Update queue closed, stopping poller");
                            return offset;
                        }
                    }
                }
            }
        }

        info!(offset, "Update poller stopped");
        offset
    }
}
