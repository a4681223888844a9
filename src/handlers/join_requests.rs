//! Join request handler
//!
//! Only known users with a member-like status get into the community group.

use tracing::{debug, info};

use crate::handlers::HandlerContext;
use crate::telegram::outgoing::Outgoing;
use crate::telegram::update::IncomingJoinRequest;
use crate::utils::errors::Result;

/// Approve or decline a request to join the community group and tell the admin
pub async fn handle_join_request(ctx: &HandlerContext, request: IncomingJoinRequest) -> Result<()> {
    if !ctx.is_community_group(request.chat.id) {
        debug!(chat_id = request.chat.id, "Ignoring join request for another chat");
        return Ok(());
    }

    let chat_id = request.chat.id;
    let user_id = request.from.id;

    let (decision, note) = match ctx.db.get_user_by_telegram_id(user_id).await? {
        None => (
            Outgoing::DeclineJoinRequest { chat_id, user_id },
            ctx.templates.join_request_unknown(&request.from),
        ),
        Some(user) if !user.status.may_join_group() => (
            Outgoing::DeclineJoinRequest { chat_id, user_id },
            ctx.templates.join_request_declined(&user),
        ),
        Some(user) => (
            Outgoing::ApproveJoinRequest { chat_id, user_id },
            ctx.templates.join_request_approved(&user),
        ),
    };

    info!(user_id, decision = decision.kind(), "Answering join request");
    ctx.send(decision).await?;
    ctx.notifier.notify(note).await
}
