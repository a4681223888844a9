//! Outbound platform calls
//!
//! Everything the bot sends is described by an `Outgoing` value and goes
//! through the rate-limited sender.

use serde::{Deserialize, Serialize};

use super::api::BotApi;
use crate::utils::errors::TelegramError;
use crate::utils::helpers::{truncate_html, MAX_MESSAGE_LENGTH};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineButton {
    pub text: String,
    pub callback_data: String,
}

impl InlineButton {
    pub fn callback(text: impl Into<String>, callback_data: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            callback_data: callback_data.into(),
        }
    }
}

/// Rows of inline buttons
pub type InlineKeyboard = Vec<Vec<InlineButton>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollRequest {
    pub chat_id: i64,
    pub question: String,
    pub options: Vec<String>,
    pub is_anonymous: bool,
    pub keyboard: Option<InlineKeyboard>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outgoing {
    /// HTML formatted text message
    Message {
        chat_id: i64,
        text: String,
        keyboard: Option<InlineKeyboard>,
    },
    Poll(PollRequest),
    /// Drop the inline keyboard of a sent message
    RemoveKeyboard { chat_id: i64, message_id: i32 },
    StopPoll { chat_id: i64, message_id: i32 },
    ApproveJoinRequest { chat_id: i64, user_id: i64 },
    DeclineJoinRequest { chat_id: i64, user_id: i64 },
    AnswerCallback { callback_id: String },
}

impl Outgoing {
    pub fn text(chat_id: i64, text: impl Into<String>) -> Self {
        Outgoing::Message {
            chat_id,
            text: truncate_html(&text.into(), MAX_MESSAGE_LENGTH),
            keyboard: None,
        }
    }

    pub fn with_keyboard(chat_id: i64, text: impl Into<String>, keyboard: InlineKeyboard) -> Self {
        Outgoing::Message {
            chat_id,
            text: truncate_html(&text.into(), MAX_MESSAGE_LENGTH),
            keyboard: Some(keyboard),
        }
    }

    /// Short label for logs
    pub fn kind(&self) -> &'static str {
        match self {
            Outgoing::Message { .. } => "message",
            Outgoing::Poll(_) => "poll",
            Outgoing::RemoveKeyboard { .. } => "remove_keyboard",
            Outgoing::StopPoll { .. } => "stop_poll",
            Outgoing::ApproveJoinRequest { .. } => "approve_join_request",
            Outgoing::DeclineJoinRequest { .. } => "decline_join_request",
            Outgoing::AnswerCallback { .. } => "answer_callback",
        }
    }

    /// Perform the call against the platform
    pub async fn deliver(&self, api: &dyn BotApi) -> Result<(), TelegramError> {
        match self {
            Outgoing::Message { chat_id, text, keyboard } => {
                api.send_message(*chat_id, text, keyboard.as_ref()).await
            }
            Outgoing::Poll(poll) => api.send_poll(poll).await,
            Outgoing::RemoveKeyboard { chat_id, message_id } => {
                api.edit_reply_markup(*chat_id, *message_id, None).await
            }
            Outgoing::StopPoll { chat_id, message_id } => api.stop_poll(*chat_id, *message_id).await,
            Outgoing::ApproveJoinRequest { chat_id, user_id } => {
                api.approve_join_request(*chat_id, *user_id).await
            }
            Outgoing::DeclineJoinRequest { chat_id, user_id } => {
                api.decline_join_request(*chat_id, *user_id).await
            }
            Outgoing::AnswerCallback { callback_id } => api.answer_callback_query(callback_id).await,
        }
    }
}
