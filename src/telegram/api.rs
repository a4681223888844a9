//! Platform capability used by the bot core
//!
//! `BotApi` exposes only the calls the pipeline makes. `TeloxideApi` is the
//! production implementation on top of `teloxide::Bot`.

use std::time::Duration;

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{
    AllowedUpdate, CallbackQueryId, InlineKeyboardButton, InlineKeyboardMarkup, InputPollOption,
    MessageId, ParseMode,
};

use super::outgoing::{InlineKeyboard, PollRequest};
use super::update::IncomingUpdate;
use crate::config::BotConfig;
use crate::utils::errors::{ClubGateError, TelegramError};

/// Extra time on top of the long-poll timeout before the HTTP client gives up
const REQUEST_TIMEOUT_MARGIN: Duration = Duration::from_secs(10);

#[async_trait]
pub trait BotApi: Send + Sync {
    /// Long-poll for updates with id >= `offset`
    async fn get_updates(&self, offset: i64, timeout: Duration) -> Result<Vec<IncomingUpdate>, TelegramError>;

    async fn send_message(&self, chat_id: i64, text: &str, keyboard: Option<&InlineKeyboard>) -> Result<(), TelegramError>;

    async fn send_poll(&self, poll: &PollRequest) -> Result<(), TelegramError>;

    /// Replace the inline keyboard of a message, `None` removes it
    async fn edit_reply_markup(&self, chat_id: i64, message_id: i32, keyboard: Option<&InlineKeyboard>) -> Result<(), TelegramError>;

    async fn stop_poll(&self, chat_id: i64, message_id: i32) -> Result<(), TelegramError>;

    async fn approve_join_request(&self, chat_id: i64, user_id: i64) -> Result<(), TelegramError>;

    async fn decline_join_request(&self, chat_id: i64, user_id: i64) -> Result<(), TelegramError>;

    async fn answer_callback_query(&self, callback_id: &str) -> Result<(), TelegramError>;
}

#[derive(Debug, Clone)]
pub struct TeloxideApi {
    bot: Bot,
}

impl TeloxideApi {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    /// Build a bot whose HTTP timeout outlasts the long poll
    pub fn from_config(config: &BotConfig) -> Result<Self, ClubGateError> {
        let client = teloxide::net::default_reqwest_settings()
            .timeout(config.poll_timeout() + REQUEST_TIMEOUT_MARGIN)
            .build()?;

        let mut bot = Bot::with_client(&config.token, client);
        if let Some(api_url) = &config.api_url {
            bot = bot.set_api_url(url::Url::parse(api_url)?);
        }

        Ok(Self::new(bot))
    }
}

fn to_markup(keyboard: &InlineKeyboard) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(keyboard.iter().map(|row| {
        row.iter()
            .map(|button| InlineKeyboardButton::callback(button.text.clone(), button.callback_data.clone()))
            .collect::<Vec<_>>()
    }))
}

fn to_user_id(user_id: i64) -> Result<UserId, TelegramError> {
    u64::try_from(user_id)
        .map(UserId)
        .map_err(|_| TelegramError::Rejected(format!("invalid user id {}", user_id)))
}

#[async_trait]
impl BotApi for TeloxideApi {
    async fn get_updates(&self, offset: i64, timeout: Duration) -> Result<Vec<IncomingUpdate>, TelegramError> {
        let offset = i32::try_from(offset)
            .map_err(|_| TelegramError::Rejected(format!("update offset {} out of range", offset)))?;
        let timeout = u32::try_from(timeout.as_secs()).unwrap_or(u32::MAX);

        let updates = self.bot
            .get_updates()
            .offset(offset)
            .timeout(timeout)
            .allowed_updates(vec![
                AllowedUpdate::Message,
                AllowedUpdate::CallbackQuery,
                AllowedUpdate::ChatJoinRequest,
            ])
            .await?;

        Ok(updates.into_iter().map(IncomingUpdate::from).collect())
    }

    async fn send_message(&self, chat_id: i64, text: &str, keyboard: Option<&InlineKeyboard>) -> Result<(), TelegramError> {
        let mut request = self.bot
            .send_message(ChatId(chat_id), text)
            .parse_mode(ParseMode::Html);
        if let Some(keyboard) = keyboard {
            request = request.reply_markup(to_markup(keyboard));
        }
        request.await?;
        Ok(())
    }

    async fn send_poll(&self, poll: &PollRequest) -> Result<(), TelegramError> {
        let options = poll.options.iter().map(|option| InputPollOption::new(option.clone()));
        let mut request = self.bot
            .send_poll(ChatId(poll.chat_id), poll.question.clone(), options)
            .is_anonymous(poll.is_anonymous);
        if let Some(keyboard) = &poll.keyboard {
            request = request.reply_markup(to_markup(keyboard));
        }
        request.await?;
        Ok(())
    }

    async fn edit_reply_markup(&self, chat_id: i64, message_id: i32, keyboard: Option<&InlineKeyboard>) -> Result<(), TelegramError> {
        let mut request = self.bot.edit_message_reply_markup(ChatId(chat_id), MessageId(message_id));
        if let Some(keyboard) = keyboard {
            request = request.reply_markup(to_markup(keyboard));
        }
        request.await?;
        Ok(())
    }

    async fn stop_poll(&self, chat_id: i64, message_id: i32) -> Result<(), TelegramError> {
        self.bot.stop_poll(ChatId(chat_id), MessageId(message_id)).await?;
        Ok(())
    }

    async fn approve_join_request(&self, chat_id: i64, user_id: i64) -> Result<(), TelegramError> {
        self.bot.approve_chat_join_request(ChatId(chat_id), to_user_id(user_id)?).await?;
        Ok(())
    }

    async fn decline_join_request(&self, chat_id: i64, user_id: i64) -> Result<(), TelegramError> {
        self.bot.decline_chat_join_request(ChatId(chat_id), to_user_id(user_id)?).await?;
        Ok(())
    }

    async fn answer_callback_query(&self, callback_id: &str) -> Result<(), TelegramError> {
        self.bot.answer_callback_query(CallbackQueryId(callback_id.to_string())).await?;
        Ok(())
    }
}
