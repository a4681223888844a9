//! Command handlers module
//!
//! This module contains handlers for the bot commands: /start, /login, /info

use tracing::{debug, info};

use crate::handlers::HandlerContext;
use crate::telegram::update::{Command, IncomingMessage, TelegramUser};
use crate::utils::errors::Result;

/// All commands the bot reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotCommand {
    /// Onboarding text
    Start,
    /// Issue a website login link
    Login,
    /// Show a member profile
    Info,
}

impl BotCommand {
    pub fn from_command(command: &Command) -> Option<Self> {
        match command.name.as_str() {
            "start" => Some(BotCommand::Start),
            "login" => Some(BotCommand::Login),
            "info" => Some(BotCommand::Info),
            _ => None,
        }
    }
}

/// Commands sent to the bot in a private chat
pub async fn handle_private_command(ctx: &HandlerContext, msg: &IncomingMessage, command: BotCommand) -> Result<()> {
    match command {
        BotCommand::Start => handle_start(ctx, msg).await,
        BotCommand::Login => handle_login(ctx, msg).await,
        BotCommand::Info => handle_own_info(ctx, msg).await,
    }
}

/// Commands sent in a group chat, only /info is meaningful there
pub async fn handle_group_command(ctx: &HandlerContext, msg: &IncomingMessage, command: BotCommand) -> Result<()> {
    match command {
        BotCommand::Info => handle_reply_info(ctx, msg).await,
        other => {
            debug!(chat_id = msg.chat.id, command = ?other, "Ignoring command in group chat");
            Ok(())
        }
    }
}

/// Handle /start command
pub async fn handle_start(ctx: &HandlerContext, msg: &IncomingMessage) -> Result<()> {
    ctx.send_text(msg.chat.id, ctx.templates.start_reply()).await
}

/// Handle /login command: issue or prolong the sender's token
pub async fn handle_login(ctx: &HandlerContext, msg: &IncomingMessage) -> Result<()> {
    let Some(from) = sender_of(msg) else {
        return Ok(());
    };

    let token = ctx.db.create_or_prolong_token(from.id).await?;
    info!(telegram_id = from.id, "Issued login token");

    ctx.send_text(msg.chat.id, ctx.templates.login_reply(&token.token)).await
}

/// Handle /info in a private chat: the sender's own profile
async fn handle_own_info(ctx: &HandlerContext, msg: &IncomingMessage) -> Result<()> {
    let Some(from) = sender_of(msg) else {
        return Ok(());
    };

    let Some(user) = ctx.db.get_user_by_telegram_id(from.id).await? else {
        return ctx.send_text(msg.chat.id, ctx.templates.info_no_user()).await;
    };
    let form = ctx.db.get_last_form(user.telegram_id).await?;

    ctx.send_text(msg.chat.id, ctx.templates.info_reply(&user, form.as_ref())).await
}

/// Handle /info in a group: profile of the member whose message is replied to
async fn handle_reply_info(ctx: &HandlerContext, msg: &IncomingMessage) -> Result<()> {
    let Some(target) = &msg.reply_to_from else {
        return ctx.send_text(msg.chat.id, ctx.templates.info_no_reply()).await;
    };

    let Some(user) = ctx.db.get_user_by_telegram_id(target.id).await? else {
        debug!(target_id = target.id, "No record for /info target");
        return ctx.send_text(msg.chat.id, ctx.templates.info_no_user()).await;
    };
    let form = ctx.db.get_actual_form(user.telegram_id).await?;

    ctx.send_text(msg.chat.id, ctx.templates.info_reply(&user, form.as_ref())).await
}

fn sender_of(msg: &IncomingMessage) -> Option<&TelegramUser> {
    let from = msg.from.as_ref();
    if from.is_none() {
        debug!(chat_id = msg.chat.id, "Command without sender");
    }
    from
}
