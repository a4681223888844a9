//! Recording platform fake
//!
//! `RecordingApi` implements `BotApi` in memory. Deliveries are recorded as
//! `Outgoing` values with a timestamp, updates and failures are scripted.

use std::collections::{HashSet, VecDeque};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use ClubGate::telegram::{BotApi, InlineKeyboard, IncomingUpdate, Outgoing, PollRequest};
use ClubGate::utils::errors::TelegramError;

/// One scripted answer to `get_updates`
#[derive(Debug, Clone)]
pub enum UpdatesReply {
    Batch(Vec<IncomingUpdate>),
    Fail,
}

#[derive(Debug, Clone)]
pub struct Delivery {
    pub at: Instant,
    pub outgoing: Outgoing,
}

#[derive(Default)]
pub struct RecordingApi {
    delivered: Mutex<Vec<Delivery>>,
    attempts: Mutex<Vec<Outgoing>>,
    /// Next deliveries answer 429 with these retry-after values
    throttle_next: Mutex<VecDeque<Duration>>,
    /// Messages to these chats are always throttled
    throttled_chats: Mutex<HashSet<i64>>,
    updates: Mutex<VecDeque<UpdatesReply>>,
    offsets: Mutex<Vec<i64>>,
}

impl RecordingApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script_updates(&self, reply: UpdatesReply) {
        self.updates.lock().unwrap().push_back(reply);
    }

    pub fn throttle_next(&self, times: usize, retry_after: Duration) {
        let mut queue = self.throttle_next.lock().unwrap();
        queue.extend(std::iter::repeat(retry_after).take(times));
    }

    pub fn throttle_chat(&self, chat_id: i64) {
        self.throttled_chats.lock().unwrap().insert(chat_id);
    }

    pub fn delivered(&self) -> Vec<Delivery> {
        self.delivered.lock().unwrap().clone()
    }

    pub fn delivered_outgoing(&self) -> Vec<Outgoing> {
        self.delivered().into_iter().map(|d| d.outgoing).collect()
    }

    pub fn delivered_count(&self) -> usize {
        self.delivered.lock().unwrap().len()
    }

    /// Every delivery attempt, throttled ones included
    pub fn attempts(&self) -> Vec<Outgoing> {
        self.attempts.lock().unwrap().clone()
    }

    /// Offsets passed to `get_updates`, in call order
    pub fn offsets(&self) -> Vec<i64> {
        self.offsets.lock().unwrap().clone()
    }

    fn record(&self, outgoing: Outgoing) -> Result<(), TelegramError> {
        self.attempts.lock().unwrap().push(outgoing.clone());

        let chat_throttled = match &outgoing {
            Outgoing::Message { chat_id, .. } => self.throttled_chats.lock().unwrap().contains(chat_id),
            _ => false,
        };
        if chat_throttled {
            return Err(TelegramError::TooManyRequests { retry_after: Duration::ZERO });
        }
        if let Some(retry_after) = self.throttle_next.lock().unwrap().pop_front() {
            return Err(TelegramError::TooManyRequests { retry_after });
        }

        self.delivered.lock().unwrap().push(Delivery {
            at: Instant::now(),
            outgoing,
        });
        Ok(())
    }
}

#[async_trait]
impl BotApi for RecordingApi {
    async fn get_updates(&self, offset: i64, _timeout: Duration) -> Result<Vec<IncomingUpdate>, TelegramError> {
        self.offsets.lock().unwrap().push(offset);
        let reply = self.updates.lock().unwrap().pop_front();

        match reply {
            Some(UpdatesReply::Batch(updates)) => Ok(updates),
            Some(UpdatesReply::Fail) => Err(TelegramError::Rejected("scripted failure".to_string())),
            None => {
                // An idle long poll
                tokio::time::sleep(Duration::from_millis(20)).await;
                Ok(Vec::new())
            }
        }
    }

    async fn send_message(&self, chat_id: i64, text: &str, keyboard: Option<&InlineKeyboard>) -> Result<(), TelegramError> {
        self.record(Outgoing::Message {
            chat_id,
            text: text.to_string(),
            keyboard: keyboard.cloned(),
        })
    }

    async fn send_poll(&self, poll: &PollRequest) -> Result<(), TelegramError> {
        self.record(Outgoing::Poll(poll.clone()))
    }

    async fn edit_reply_markup(&self, chat_id: i64, message_id: i32, _keyboard: Option<&InlineKeyboard>) -> Result<(), TelegramError> {
        self.record(Outgoing::RemoveKeyboard { chat_id, message_id })
    }

    async fn stop_poll(&self, chat_id: i64, message_id: i32) -> Result<(), TelegramError> {
        self.record(Outgoing::StopPoll { chat_id, message_id })
    }

    async fn approve_join_request(&self, chat_id: i64, user_id: i64) -> Result<(), TelegramError> {
        self.record(Outgoing::ApproveJoinRequest { chat_id, user_id })
    }

    async fn decline_join_request(&self, chat_id: i64, user_id: i64) -> Result<(), TelegramError> {
        self.record(Outgoing::DeclineJoinRequest { chat_id, user_id })
    }

    async fn answer_callback_query(&self, callback_id: &str) -> Result<(), TelegramError> {
        self.record(Outgoing::AnswerCallback {
            callback_id: callback_id.to_string(),
        })
    }
}
