//! Rate-limited outbound sender
//!
//! A single task drains the outbound queue and performs every platform call
//! under one process-wide token bucket. Throttled calls go back to the tail
//! of the queue.

use std::collections::VecDeque;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::api::BotApi;
use super::outgoing::Outgoing;
use crate::config::SenderConfig;
use crate::utils::errors::{ClubGateError, Result, TelegramError};

/// Queued call together with how many times it was throttled
#[derive(Debug, Clone)]
pub struct Envelope {
    pub outgoing: Outgoing,
    pub attempts: u32,
}

impl Envelope {
    fn new(outgoing: Outgoing) -> Self {
        Self { outgoing, attempts: 0 }
    }
}

/// Entry point for everything that wants to talk to the platform
#[derive(Debug, Clone)]
pub struct SenderHandle {
    tx: mpsc::Sender<Envelope>,
}

impl SenderHandle {
    /// Create the outbound queue
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<Envelope>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }

    /// Enqueue a call, waiting while the queue is full
    pub async fn send(&self, outgoing: Outgoing) -> Result<()> {
        self.tx
            .send(Envelope::new(outgoing))
            .await
            .map_err(|_| ClubGateError::QueueClosed)
    }

    /// Enqueue a call without waiting
    pub fn try_send(&self, outgoing: Outgoing) -> Result<()> {
        self.tx
            .try_send(Envelope::new(outgoing))
            .map_err(|e| match e {
                mpsc::error::TrySendError::Full(_) => ClubGateError::QueueFull,
                mpsc::error::TrySendError::Closed(_) => ClubGateError::QueueClosed,
            })
    }

    fn downgrade(&self) -> mpsc::WeakSender<Envelope> {
        self.tx.downgrade()
    }
}

pub struct OutboundSender {
    api: Arc<dyn BotApi>,
    rx: mpsc::Receiver<Envelope>,
    requeue: mpsc::WeakSender<Envelope>,
    /// Throttled calls that did not fit back into a full queue
    overflow: VecDeque<Envelope>,
    limiter: DefaultDirectRateLimiter,
    backoff: Duration,
    max_attempts: u32,
}

impl OutboundSender {
    pub fn new(
        api: Arc<dyn BotApi>,
        handle: &SenderHandle,
        rx: mpsc::Receiver<Envelope>,
        config: &SenderConfig,
    ) -> Result<Self> {
        let per_second = NonZeroU32::new(config.per_second)
            .ok_or_else(|| ClubGateError::Config("sender rate must be greater than 0".to_string()))?;
        let burst = NonZeroU32::new(config.burst)
            .ok_or_else(|| ClubGateError::Config("sender burst must be greater than 0".to_string()))?;

        Ok(Self {
            api,
            rx,
            requeue: handle.downgrade(),
            overflow: VecDeque::new(),
            limiter: RateLimiter::direct(Quota::per_second(per_second).allow_burst(burst)),
            backoff: config.throttle_backoff(),
            max_attempts: config.max_attempts,
        })
    }

    /// Deliver queued calls until cancelled or every handle is dropped
    pub async fn run(mut self, cancel: CancellationToken) {
        info!("Outbound sender started");

        while let Some(envelope) = self.next(&cancel).await {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = self.limiter.until_ready() => {}
            }

            let kind = envelope.outgoing.kind();
            match envelope.outgoing.deliver(self.api.as_ref()).await {
                Ok(()) => debug!(kind, "Outbound call delivered"),
                Err(TelegramError::TooManyRequests { retry_after }) => {
                    let delay = retry_after.max(self.backoff);
                    warn!(kind, attempts = envelope.attempts + 1, ?delay, "Throttled by platform, requeueing");
                    self.requeue(envelope);

                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
                Err(e) => error!(kind, error = %e, "Outbound call failed, dropping it"),
            }
        }

        let pending = self.overflow.len();
        info!(pending, "Outbound sender stopped");
    }

    async fn next(&mut self, cancel: &CancellationToken) -> Option<Envelope> {
        if let Ok(envelope) = self.rx.try_recv() {
            return Some(envelope);
        }
        if let Some(envelope) = self.overflow.pop_front() {
            return Some(envelope);
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            envelope = self.rx.recv() => envelope,
        }
    }

    fn requeue(&mut self, mut envelope: Envelope) {
        envelope.attempts += 1;
        if envelope.attempts >= self.max_attempts {
            error!(
                kind = envelope.outgoing.kind(),
                attempts = envelope.attempts,
                "Giving up on throttled outbound call"
            );
            return;
        }

        let envelope = match self.requeue.upgrade() {
            Some(tx) => match tx.try_send(envelope) {
                Ok(()) => return,
                Err(mpsc::error::TrySendError::Full(envelope))
                | Err(mpsc::error::TrySendError::Closed(envelope)) => envelope,
            },
            None => envelope,
        };
        self.overflow.push_back(envelope);
    }
}
