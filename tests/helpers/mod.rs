//! Test helpers module
//!
//! This module provides utilities and helpers for testing the ClubGate bot.
//! It includes a recording platform fake, update builders, the mock Bot API
//! server and the Postgres test database.

#![allow(dead_code)]

pub mod bot_api;
pub mod database_helper;
pub mod telegram_mock;
pub mod updates;

pub use bot_api::*;
pub use database_helper::*;
pub use telegram_mock::*;
pub use updates::*;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use ClubGate::config::{BotConfig, Settings};
use ClubGate::handlers::{HandlerContext, UpdateDispatcher};
use ClubGate::services::Templates;
use ClubGate::telegram::{Envelope, Outgoing, SenderHandle};
use ClubGate::MemoryDatabase;

pub const ADMIN_ID: i64 = 1000;
pub const GROUP_ID: i64 = -100500;
pub const SITE_URL: &str = "https://club.example";
pub const INVITE_LINK: &str = "https://t.me/+invite";

/// Bot settings pointing at the test admin and group
pub fn test_settings() -> Settings {
    let mut settings = Settings::default();
    settings.bot.token = test_bot_token();
    settings.bot.admin_id = ADMIN_ID;
    settings.bot.group_id = GROUP_ID;
    settings.bot.invite_link = INVITE_LINK.to_string();
    settings.bot.retry_delay_seconds = 0;
    settings.site.url = SITE_URL.to_string();
    settings.database.url = "memory://".to_string();
    settings.sender.throttle_backoff_ms = 10;
    settings
}

pub fn test_bot_config() -> BotConfig {
    test_settings().bot
}

/// Dispatcher over an in-memory store with the outbound queue exposed
pub struct DispatcherHarness {
    pub db: Arc<MemoryDatabase>,
    pub dispatcher: UpdateDispatcher,
    pub sender: SenderHandle,
    outbound: mpsc::Receiver<Envelope>,
}

impl DispatcherHarness {
    pub fn new() -> Self {
        let db = Arc::new(MemoryDatabase::default());
        let (sender, outbound) = SenderHandle::channel(64);
        let ctx = HandlerContext::new(
            db.clone(),
            sender.clone(),
            Templates::new(SITE_URL),
            test_bot_config(),
        );

        Self {
            db,
            dispatcher: UpdateDispatcher::new(ctx),
            sender,
            outbound,
        }
    }

    /// Process one update and return everything it queued
    pub async fn process(&mut self, update: ClubGate::telegram::IncomingUpdate) -> Vec<Outgoing> {
        self.dispatcher.process_update(update).await;
        self.drain()
    }

    pub fn drain(&mut self) -> Vec<Outgoing> {
        let mut sent = Vec::new();
        while let Ok(envelope) = self.outbound.try_recv() {
            sent.push(envelope.outgoing);
        }
        sent
    }
}

/// Text messages of a batch addressed to `chat_id`
pub fn texts_to(sent: &[Outgoing], chat_id: i64) -> Vec<String> {
    sent.iter()
        .filter_map(|outgoing| match outgoing {
            Outgoing::Message { chat_id: to, text, .. } if *to == chat_id => Some(text.clone()),
            _ => None,
        })
        .collect()
}

/// Poll `condition` until it holds or `timeout` elapses
pub async fn wait_until<F>(timeout: Duration, mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if condition() {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}
