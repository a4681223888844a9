//! Incoming update classification
//!
//! Platform updates are converted once into these types. Exactly one payload
//! variant is populated, so the dispatcher matches on it instead of probing
//! optional fields.

use serde::{Deserialize, Serialize};
use teloxide::types::{MaybeInaccessibleMessage, Update, UpdateKind};

/// Sender or member as seen by the bot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelegramUser {
    pub id: i64,
    pub is_bot: bool,
    pub first_name: String,
    pub last_name: Option<String>,
    pub username: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChatKind {
    Private,
    Group,
    Supergroup,
    Channel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRef {
    pub id: i64,
    pub kind: ChatKind,
}

impl ChatRef {
    pub fn is_private(&self) -> bool {
        self.kind == ChatKind::Private
    }

    pub fn is_group(&self) -> bool {
        matches!(self.kind, ChatKind::Group | ChatKind::Supergroup)
    }
}

/// What a message carries, as far as the bot cares
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageContent {
    Text(String),
    NewChatMembers(Vec<TelegramUser>),
    LeftChatMember(TelegramUser),
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomingMessage {
    pub id: i32,
    pub chat: ChatRef,
    pub from: Option<TelegramUser>,
    pub content: MessageContent,
    /// Sender of the message this one replies to
    pub reply_to_from: Option<TelegramUser>,
}

impl IncomingMessage {
    pub fn text(&self) -> Option<&str> {
        match &self.content {
            MessageContent::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn command(&self) -> Option<Command> {
        self.text().and_then(Command::parse)
    }
}

/// Message an inline button is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallbackOrigin {
    pub chat_id: i64,
    pub message_id: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomingCallback {
    pub id: String,
    pub from: TelegramUser,
    pub origin: Option<CallbackOrigin>,
    pub data: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomingJoinRequest {
    pub chat: ChatRef,
    pub from: TelegramUser,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpdatePayload {
    Message(IncomingMessage),
    CallbackQuery(IncomingCallback),
    JoinRequest(IncomingJoinRequest),
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomingUpdate {
    pub id: i64,
    pub payload: UpdatePayload,
}

impl IncomingUpdate {
    /// Short label for logs
    pub fn kind(&self) -> &'static str {
        match &self.payload {
            UpdatePayload::Message(_) => "message",
            UpdatePayload::CallbackQuery(_) => "callback_query",
            UpdatePayload::JoinRequest(_) => "join_request",
            UpdatePayload::Unsupported => "unsupported",
        }
    }
}

/// Bot command parsed from message text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// Lowercased name without the slash and bot mention
    pub name: String,
    pub args: String,
}

impl Command {
    /// Parse `/name@bot args`, returns `None` for plain text
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim_start();
        let rest = text.strip_prefix('/')?;
        let (head, args) = match rest.split_once(char::is_whitespace) {
            Some((head, args)) => (head, args.trim()),
            None => (rest, ""),
        };
        let name = head.split('@').next().unwrap_or_default();
        if name.is_empty() {
            return None;
        }

        Some(Self {
            name: name.to_lowercase(),
            args: args.to_string(),
        })
    }
}

impl From<&teloxide::types::User> for TelegramUser {
    fn from(user: &teloxide::types::User) -> Self {
        Self {
            id: user.id.0 as i64,
            is_bot: user.is_bot,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            username: user.username.clone(),
        }
    }
}

impl From<&teloxide::types::Chat> for ChatRef {
    fn from(chat: &teloxide::types::Chat) -> Self {
        let kind = if chat.is_private() {
            ChatKind::Private
        } else if chat.is_supergroup() {
            ChatKind::Supergroup
        } else if chat.is_group() {
            ChatKind::Group
        } else {
            ChatKind::Channel
        };

        Self { id: chat.id.0, kind }
    }
}

impl From<&teloxide::types::Message> for IncomingMessage {
    fn from(message: &teloxide::types::Message) -> Self {
        let content = if let Some(members) = message.new_chat_members() {
            MessageContent::NewChatMembers(members.iter().map(TelegramUser::from).collect())
        } else if let Some(member) = message.left_chat_member() {
            MessageContent::LeftChatMember(member.into())
        } else if let Some(text) = message.text() {
            MessageContent::Text(text.to_string())
        } else {
            MessageContent::Other
        };

        Self {
            id: message.id.0,
            chat: (&message.chat).into(),
            from: message.from.as_ref().map(TelegramUser::from),
            content,
            reply_to_from: message
                .reply_to_message()
                .and_then(|reply| reply.from.as_ref())
                .map(TelegramUser::from),
        }
    }
}

impl From<Update> for IncomingUpdate {
    fn from(update: Update) -> Self {
        let payload = match &update.kind {
            UpdateKind::Message(message) => UpdatePayload::Message(message.into()),
            UpdateKind::CallbackQuery(query) => UpdatePayload::CallbackQuery(IncomingCallback {
                id: query.id.0.clone(),
                from: (&query.from).into(),
                origin: query.message.as_ref().map(|message: &MaybeInaccessibleMessage| CallbackOrigin {
                    chat_id: message.chat().id.0,
                    message_id: message.id().0,
                }),
                data: query.data.clone(),
            }),
            UpdateKind::ChatJoinRequest(request) => UpdatePayload::JoinRequest(IncomingJoinRequest {
                chat: (&request.chat).into(),
                from: (&request.from).into(),
            }),
            _ => UpdatePayload::Unsupported,
        };

        Self {
            id: update.id.0 as i64,
            payload,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_parsing() {
        let cmd = Command::parse("/login").unwrap();
        assert_eq!(cmd.name, "login");
        assert_eq!(cmd.args, "");

        let cmd = Command::parse("/Info@ClubGateBot please").unwrap();
        assert_eq!(cmd.name, "info");
        assert_eq!(cmd.args, "please");
    }

    #[test]
    fn test_plain_text_is_not_a_command() {
        assert!(Command::parse("ping").is_none());
        assert!(Command::parse("/").is_none());
        assert!(Command::parse("/@bot").is_none());
    }

    #[test]
    fn test_private_text_message_conversion() {
        let update: Update = serde_json::from_str(&serde_json::json!({
            "update_id": 42,
            "message": {
                "message_id": 5,
                "date": 1700000000,
                "chat": {"id": 123, "type": "private", "first_name": "Anna"},
                "from": {"id": 123, "is_bot": false, "first_name": "Anna", "username": "anna"},
                "text": "/login"
            }
        }).to_string())
        .unwrap();

        let incoming = IncomingUpdate::from(update);
        assert_eq!(incoming.id, 42);
        let UpdatePayload::Message(message) = incoming.payload else {
            panic!("expected a message");
        };
        assert!(message.chat.is_private());
        assert_eq!(message.from.as_ref().unwrap().username.as_deref(), Some("anna"));
        assert_eq!(message.command().unwrap().name, "login");
    }

    #[test]
    fn test_callback_query_conversion() {
        let update: Update = serde_json::from_str(&serde_json::json!({
            "update_id": 7,
            "callback_query": {
                "id": "cb-1",
                "from": {"id": 1, "is_bot": false, "first_name": "Admin"},
                "chat_instance": "instance",
                "data": "admin:form:accept:42",
                "message": {
                    "message_id": 9,
                    "date": 1700000000,
                    "chat": {"id": 1, "type": "private", "first_name": "Admin"},
                    "text": "form"
                }
            }
        }).to_string())
        .unwrap();

        let incoming = IncomingUpdate::from(update);
        let UpdatePayload::CallbackQuery(callback) = incoming.payload else {
            panic!("expected a callback query");
        };
        assert_eq!(callback.id, "cb-1");
        assert_eq!(callback.origin, Some(CallbackOrigin { chat_id: 1, message_id: 9 }));
        assert_eq!(callback.data.as_deref(), Some("admin:form:accept:42"));
    }
}
