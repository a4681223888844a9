//! Bot runtime
//!
//! Wires the three long-running tasks together:
//! poller -> update queue -> dispatcher -> outbound queue -> sender.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::api::BotApi;
use super::poller::UpdatePoller;
use super::sender::{OutboundSender, SenderHandle};
use crate::config::Settings;
use crate::database::Database;
use crate::handlers::{HandlerContext, UpdateDispatcher};
use crate::services::{AdminNotifier, Templates};
use crate::utils::errors::Result;

pub struct BotRuntime {
    sender: SenderHandle,
    notifier: AdminNotifier,
    cancel: CancellationToken,
    tasks: Vec<(&'static str, JoinHandle<()>)>,
}

impl BotRuntime {
    /// Build both queues and spawn poller, dispatcher and sender
    pub fn start(
        api: Arc<dyn BotApi>,
        db: Arc<dyn Database>,
        settings: &Settings,
        cancel: CancellationToken,
    ) -> Result<Self> {
        let (sender, outbound_rx) = SenderHandle::channel(settings.sender.queue_capacity);
        let outbound = OutboundSender::new(api.clone(), &sender, outbound_rx, &settings.sender)?;

        let (updates_tx, updates_rx) = mpsc::channel(settings.bot.update_queue_capacity);
        let poller = UpdatePoller::new(api, updates_tx, &settings.bot);

        let ctx = HandlerContext::new(
            db,
            sender.clone(),
            Templates::new(&settings.site.url),
            settings.bot.clone(),
        );
        let notifier = ctx.notifier.clone();
        let dispatcher = UpdateDispatcher::new(ctx);

        let tasks = vec![
            ("sender", tokio::spawn(outbound.run(cancel.clone()))),
            ("dispatcher", tokio::spawn(dispatcher.run(updates_rx, cancel.clone()))),
            ("poller", {
                let cancel = cancel.clone();
                tokio::spawn(async move {
                    poller.run(cancel).await;
                })
            }),
        ];

        info!(admin_id = settings.bot.admin_id, group_id = settings.bot.group_id, "Bot runtime started");
        Ok(Self {
            sender,
            notifier,
            cancel,
            tasks,
        })
    }

    /// Queue entry point shared with the website
    pub fn sender(&self) -> SenderHandle {
        self.sender.clone()
    }

    pub fn notifier(&self) -> AdminNotifier {
        self.notifier.clone()
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Cancel all tasks and wait for them at most `grace`
    pub async fn shutdown(mut self, grace: Duration) {
        info!(?grace, "Shutting down bot runtime");
        self.cancel.cancel();

        let tasks = &mut self.tasks;
        let finished = tokio::time::timeout(grace, async {
            for (name, task) in tasks.iter_mut() {
                if let Err(e) = task.await {
                    warn!(task = *name, error = %e, "Bot task ended abnormally");
                }
            }
        })
        .await;

        if finished.is_err() {
            for (name, task) in &self.tasks {
                if !task.is_finished() {
                    warn!(task = *name, "Bot task did not stop in time, aborting");
                    task.abort();
                }
            }
        }

        info!("Bot runtime stopped");
    }
}
