//! Update builders
//!
//! Build already classified updates, the way the poller hands them to the
//! dispatcher.

use ClubGate::telegram::update::{
    CallbackOrigin, ChatKind, ChatRef, IncomingCallback, IncomingJoinRequest, IncomingMessage,
    MessageContent, TelegramUser,
};
use ClubGate::telegram::{IncomingUpdate, UpdatePayload};

pub fn user(id: i64, first_name: &str) -> TelegramUser {
    TelegramUser {
        id,
        is_bot: false,
        first_name: first_name.to_string(),
        last_name: None,
        username: None,
    }
}

pub fn bot_user(id: i64, first_name: &str) -> TelegramUser {
    TelegramUser {
        is_bot: true,
        ..user(id, first_name)
    }
}

pub fn private_chat(id: i64) -> ChatRef {
    ChatRef { id, kind: ChatKind::Private }
}

pub fn group_chat(id: i64) -> ChatRef {
    ChatRef { id, kind: ChatKind::Supergroup }
}

fn message(update_id: i64, chat: ChatRef, from: TelegramUser, content: MessageContent) -> IncomingUpdate {
    IncomingUpdate {
        id: update_id,
        payload: UpdatePayload::Message(IncomingMessage {
            id: update_id as i32,
            chat,
            from: Some(from),
            content,
            reply_to_from: None,
        }),
    }
}

pub fn private_message(update_id: i64, from: TelegramUser, text: &str) -> IncomingUpdate {
    let chat = private_chat(from.id);
    message(update_id, chat, from, MessageContent::Text(text.to_string()))
}

pub fn group_message(update_id: i64, chat_id: i64, from: TelegramUser, text: &str) -> IncomingUpdate {
    message(update_id, group_chat(chat_id), from, MessageContent::Text(text.to_string()))
}

/// Group text message replying to a message of `reply_to`
pub fn group_reply(update_id: i64, chat_id: i64, from: TelegramUser, text: &str, reply_to: TelegramUser) -> IncomingUpdate {
    let mut update = group_message(update_id, chat_id, from, text);
    if let UpdatePayload::Message(message) = &mut update.payload {
        message.reply_to_from = Some(reply_to);
    }
    update
}

pub fn new_members(update_id: i64, chat_id: i64, from: TelegramUser, members: Vec<TelegramUser>) -> IncomingUpdate {
    message(update_id, group_chat(chat_id), from, MessageContent::NewChatMembers(members))
}

pub fn left_member(update_id: i64, chat_id: i64, member: TelegramUser) -> IncomingUpdate {
    message(update_id, group_chat(chat_id), member.clone(), MessageContent::LeftChatMember(member))
}

/// Button press on message `message_id` in `chat_id`
pub fn callback(update_id: i64, from: TelegramUser, chat_id: i64, message_id: i32, data: &str) -> IncomingUpdate {
    IncomingUpdate {
        id: update_id,
        payload: UpdatePayload::CallbackQuery(IncomingCallback {
            id: format!("cb-{}", update_id),
            from,
            origin: Some(CallbackOrigin { chat_id, message_id }),
            data: Some(data.to_string()),
        }),
    }
}

pub fn join_request(update_id: i64, chat_id: i64, from: TelegramUser) -> IncomingUpdate {
    IncomingUpdate {
        id: update_id,
        payload: UpdatePayload::JoinRequest(IncomingJoinRequest {
            chat: group_chat(chat_id),
            from,
        }),
    }
}
