//! Message handlers module
//!
//! Handles private and group messages and membership changes in the
//! community group.

use tracing::{debug, info};

use crate::handlers::commands::{handle_group_command, handle_private_command, BotCommand};
use crate::handlers::HandlerContext;
use crate::models::{UserStatus, UserUpsert};
use crate::telegram::update::{IncomingMessage, MessageContent, TelegramUser};
use crate::utils::errors::Result;
use crate::utils::helpers::non_blank;

/// Text that gets a liveness answer
const PING: &str = "ping";

/// Handle an incoming message
pub async fn handle_message(ctx: &HandlerContext, msg: IncomingMessage) -> Result<()> {
    if let Some(from) = msg.from.as_ref().filter(|from| !from.is_bot) {
        let status = ctx.is_community_group(msg.chat.id).then_some(UserStatus::Active);
        ctx.db.upsert_user(upsert_for(from, status)).await?;
    }

    if msg.chat.is_private() {
        handle_private_message(ctx, &msg).await
    } else if msg.chat.is_group() {
        handle_group_message(ctx, &msg).await
    } else {
        debug!(chat_id = msg.chat.id, "Ignoring message from channel");
        Ok(())
    }
}

async fn handle_private_message(ctx: &HandlerContext, msg: &IncomingMessage) -> Result<()> {
    if let Some(command) = msg.command() {
        return match BotCommand::from_command(&command) {
            Some(command) => handle_private_command(ctx, msg, command).await,
            None => {
                debug!(command = %command.name, "Unknown private command");
                Ok(())
            }
        };
    }

    if msg.text() == Some(PING) {
        return handle_ping(ctx, msg).await;
    }

    Ok(())
}

async fn handle_group_message(ctx: &HandlerContext, msg: &IncomingMessage) -> Result<()> {
    match &msg.content {
        MessageContent::NewChatMembers(members) => handle_new_chat_members(ctx, msg, members).await,
        MessageContent::LeftChatMember(member) => handle_left_chat_member(ctx, msg, member).await,
        MessageContent::Text(text) => {
            if let Some(command) = msg.command() {
                if let Some(command) = BotCommand::from_command(&command) {
                    return handle_group_command(ctx, msg, command).await;
                }
                return Ok(());
            }
            if text == PING {
                return handle_ping(ctx, msg).await;
            }
            Ok(())
        }
        MessageContent::Other => Ok(()),
    }
}

async fn handle_ping(ctx: &HandlerContext, msg: &IncomingMessage) -> Result<()> {
    ctx.send_text(msg.chat.id, ctx.templates.ping_reply()).await
}

/// Members joining the community group become active, bots are marked as such
pub async fn handle_new_chat_members(ctx: &HandlerContext, msg: &IncomingMessage, members: &[TelegramUser]) -> Result<()> {
    if !ctx.is_community_group(msg.chat.id) {
        debug!(chat_id = msg.chat.id, "Ignoring new members outside the community group");
        return Ok(());
    }

    let mut humans = 0;
    for member in members {
        let status = if member.is_bot {
            UserStatus::Bot
        } else {
            humans += 1;
            UserStatus::Active
        };
        let user = ctx.db.upsert_user(upsert_for(member, Some(status))).await?;
        info!(telegram_id = user.telegram_id, status = %user.status, "Member joined the group");
    }

    if humans == 1 {
        ctx.send_text(msg.chat.id, ctx.templates.new_chat_member()).await?;
    }

    Ok(())
}

/// A member leaving the community group becomes not active
pub async fn handle_left_chat_member(ctx: &HandlerContext, msg: &IncomingMessage, member: &TelegramUser) -> Result<()> {
    if !ctx.is_community_group(msg.chat.id) {
        debug!(chat_id = msg.chat.id, "Ignoring member leaving outside the community group");
        return Ok(());
    }

    let user = ctx.db.upsert_user(upsert_for(member, Some(UserStatus::NotActive))).await?;
    info!(telegram_id = user.telegram_id, status = %user.status, "Member left the group");
    Ok(())
}

fn upsert_for(user: &TelegramUser, status: Option<UserStatus>) -> UserUpsert {
    UserUpsert {
        telegram_id: user.id,
        username: non_blank(user.username.clone()),
        first_name: Some(user.first_name.clone()),
        last_name: non_blank(user.last_name.clone()),
        status,
    }
}
