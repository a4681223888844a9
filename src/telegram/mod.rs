//! Telegram platform module
//!
//! Adapter to the Bot API, update classification, the ingestion loop and the
//! rate-limited sender.

pub mod api;
pub mod callback_data;
pub mod outgoing;
pub mod poller;
pub mod runtime;
pub mod sender;
pub mod update;

pub use api::{BotApi, TeloxideApi};
pub use callback_data::{AdminAction, AdminCallback, AdminEntity};
pub use outgoing::{InlineButton, InlineKeyboard, Outgoing, PollRequest};
pub use poller::UpdatePoller;
pub use runtime::BotRuntime;
pub use sender::{Envelope, OutboundSender, SenderHandle};
pub use update::{IncomingUpdate, UpdatePayload};
