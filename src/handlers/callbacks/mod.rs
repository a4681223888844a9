//! Callback query handlers module
//!
//! Handles the admin's inline buttons: form decisions on the admin message
//! and member decisions on the group poll.

use tracing::{debug, info, warn};

use crate::handlers::HandlerContext;
use crate::models::{FormStatus, StatusUpdate, User, UserStatus};
use crate::telegram::callback_data::{AdminAction, AdminCallback, AdminEntity};
use crate::telegram::outgoing::{Outgoing, PollRequest};
use crate::telegram::update::{CallbackOrigin, IncomingCallback};
use crate::utils::errors::{ClubGateError, Result};

/// Main callback query dispatcher
pub async fn handle_callback_query(ctx: &HandlerContext, callback: IncomingCallback) -> Result<()> {
    let Some(origin) = callback.origin else {
        debug!(callback_id = %callback.id, "Dropping callback without message");
        return Ok(());
    };

    let result = handle_admin_callback(ctx, &callback, origin).await;

    // Clear the button's loading state whatever happened above
    if let Err(e) = ctx.send(Outgoing::AnswerCallback { callback_id: callback.id.clone() }).await {
        warn!(callback_id = %callback.id, error = %e, "Failed to queue callback answer");
    }

    result
}

async fn handle_admin_callback(ctx: &HandlerContext, callback: &IncomingCallback, origin: CallbackOrigin) -> Result<()> {
    let Some(command) = callback.data.as_deref().and_then(AdminCallback::parse) else {
        debug!(user_id = callback.from.id, data = ?callback.data, "Ignoring callback data");
        return Ok(());
    };

    if !ctx.is_admin(callback.from.id) {
        info!(user_id = callback.from.id, command = %command, "Ignoring admin callback from non-admin");
        return Ok(());
    }

    info!(command = %command, "Handling admin decision");
    match (command.entity, command.action) {
        (AdminEntity::Form, AdminAction::Accept) => accept_form(ctx, command.id, origin).await,
        (AdminEntity::Form, AdminAction::Reject) => reject_form(ctx, command.id, origin).await,
        (AdminEntity::User, AdminAction::Accept) => accept_user(ctx, command.id, origin).await,
        (AdminEntity::User, AdminAction::Reject) => reject_user(ctx, command.id, origin).await,
    }
}

/// Accept a form and put its owner to a group vote unless already a member
async fn accept_form(ctx: &HandlerContext, form_id: i64, origin: CallbackOrigin) -> Result<()> {
    let form = match ctx.db.set_form_status(form_id, FormStatus::Accepted).await? {
        StatusUpdate::Changed(form) => form,
        StatusUpdate::Unchanged(form) => {
            info!(form_id, status = %form.status, "Form already decided");
            return Ok(());
        }
    };
    remove_decision_buttons(ctx, origin).await?;

    let owner = ctx.db
        .get_user_by_telegram_id(form.user_telegram_id)
        .await?
        .ok_or(ClubGateError::UserNotFound { telegram_id: form.user_telegram_id })?;

    if owner.status == UserStatus::Active {
        return ctx.send_text(owner.telegram_id, ctx.templates.accept_form_reply(owner.status)).await;
    }

    if !owner.status.can_become(UserStatus::Accepted) {
        info!(form_id, telegram_id = owner.telegram_id, status = %owner.status, "Owner cannot be put to a vote");
        if owner.status == UserStatus::Accepted {
            // Voted in before but never joined
            ctx.send_text(owner.telegram_id, ctx.templates.accept_user_reply(&ctx.config.invite_link)).await?;
        }
        return ctx.notifier.notify(ctx.templates.vote_not_started(&owner)).await;
    }

    let group_id = ctx.config.group_id;
    ctx.send_text(group_id, ctx.templates.new_form_message(&owner, &form)).await?;
    ctx.send(Outgoing::Poll(PollRequest {
        chat_id: group_id,
        question: ctx.templates.poll_question().to_string(),
        options: ctx.templates.poll_options(),
        is_anonymous: false,
        keyboard: Some(AdminCallback::decision_keyboard(
            AdminEntity::User,
            owner.telegram_id,
            ctx.templates.accept_button(),
            ctx.templates.reject_button(),
        )),
    }))
    .await?;
    info!(form_id, telegram_id = owner.telegram_id, "Form sent to group vote");

    ctx.send_text(owner.telegram_id, ctx.templates.accept_form_reply(owner.status)).await
}

async fn reject_form(ctx: &HandlerContext, form_id: i64, origin: CallbackOrigin) -> Result<()> {
    let form = match ctx.db.set_form_status(form_id, FormStatus::Rejected).await? {
        StatusUpdate::Changed(form) => form,
        StatusUpdate::Unchanged(form) => {
            info!(form_id, status = %form.status, "Form already decided");
            return Ok(());
        }
    };
    remove_decision_buttons(ctx, origin).await?;

    let owner = ctx.db
        .get_user_by_telegram_id(form.user_telegram_id)
        .await?
        .ok_or(ClubGateError::UserNotFound { telegram_id: form.user_telegram_id })?;

    ctx.send_text(owner.telegram_id, ctx.templates.reject_form_reply(owner.status)).await
}

/// Accept a member after the vote and send the invite link
async fn accept_user(ctx: &HandlerContext, telegram_id: i64, origin: CallbackOrigin) -> Result<()> {
    let user = match ctx.db.set_user_status(telegram_id, UserStatus::Accepted).await? {
        StatusUpdate::Changed(user) => user,
        StatusUpdate::Unchanged(user) => return decision_not_applied(ctx, user, UserStatus::Accepted, origin).await,
    };

    ctx.send_text(user.telegram_id, ctx.templates.accept_user_reply(&ctx.config.invite_link)).await?;
    close_vote(ctx, origin).await?;
    ctx.send_text(ctx.config.group_id, ctx.templates.accept_user_group_reply()).await
}

async fn reject_user(ctx: &HandlerContext, telegram_id: i64, origin: CallbackOrigin) -> Result<()> {
    let user = match ctx.db.set_user_status(telegram_id, UserStatus::Rejected).await? {
        StatusUpdate::Changed(user) => user,
        StatusUpdate::Unchanged(user) => return decision_not_applied(ctx, user, UserStatus::Rejected, origin).await,
    };

    ctx.send_text(user.telegram_id, ctx.templates.reject_user_reply()).await?;
    close_vote(ctx, origin).await?;
    ctx.send_text(ctx.config.group_id, ctx.templates.reject_user_group_reply()).await
}

/// A replayed press leaves no trace. Any other status the member moved to
/// in the meantime closes the vote and tells the admin.
async fn decision_not_applied(ctx: &HandlerContext, user: User, requested: UserStatus, origin: CallbackOrigin) -> Result<()> {
    info!(telegram_id = user.telegram_id, status = %user.status, requested = %requested, "User decision not applied");
    if user.status == requested {
        return Ok(());
    }
    close_vote(ctx, origin).await?;
    ctx.notifier.notify(ctx.templates.user_decision_not_applied(&user)).await
}

async fn remove_decision_buttons(ctx: &HandlerContext, origin: CallbackOrigin) -> Result<()> {
    ctx.send(Outgoing::RemoveKeyboard {
        chat_id: origin.chat_id,
        message_id: origin.message_id,
    })
    .await
}

async fn close_vote(ctx: &HandlerContext, origin: CallbackOrigin) -> Result<()> {
    ctx.send(Outgoing::StopPoll {
        chat_id: origin.chat_id,
        message_id: origin.message_id,
    })
    .await
}
