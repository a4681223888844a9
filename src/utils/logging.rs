//! Logging configuration and setup
//!
//! This module installs the tracing subscriber and the layer that forwards
//! warnings and errors to the admin chat.

use std::fmt::Write as _;
use std::sync::{Arc, OnceLock};

use teloxide::utils::html::escape;
use tracing::field::{Field, Visit};
use tracing::{info, Event, Level, Subscriber};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;
use crate::services::AdminNotifier;
use crate::utils::errors::{ClubGateError, Result};

/// Modules whose events are never forwarded. They talk to the platform
/// themselves, so an outage would only produce more alerts.
const ALERT_EXCLUDED_TARGETS: &[&str] = &["::telegram::sender", "::telegram::poller"];

/// Only events from this crate are forwarded, dependency logs stay local
const ALERT_CRATE_TARGET: &str = env!("CARGO_CRATE_NAME");

/// Keeps logging resources alive for the lifetime of the process
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
    alerts: AlertHandle,
}

impl LoggingGuard {
    /// Start forwarding alerts once the bot can send messages
    pub fn attach_alerts(&self, notifier: AdminNotifier) {
        self.alerts.attach(notifier);
    }
}

/// Late binding between the alert layer and the admin notifier
#[derive(Clone, Default)]
pub struct AlertHandle {
    notifier: Arc<OnceLock<AdminNotifier>>,
}

impl AlertHandle {
    pub fn attach(&self, notifier: AdminNotifier) {
        if self.notifier.set(notifier).is_err() {
            info!("Admin alerts already attached");
        }
    }

    pub fn is_attached(&self) -> bool {
        self.notifier.get().is_some()
    }
}

/// Forwards WARN and ERROR events to the admin chat
pub struct AdminAlertLayer {
    handle: AlertHandle,
}

impl AdminAlertLayer {
    pub fn new(handle: AlertHandle) -> Self {
        Self { handle }
    }

    fn is_forwarded(target: &str) -> bool {
        let own = target
            .strip_prefix(ALERT_CRATE_TARGET)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with("::"));
        own && !ALERT_EXCLUDED_TARGETS.iter().any(|suffix| target.ends_with(suffix))
    }
}

impl<S: Subscriber> Layer<S> for AdminAlertLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if *metadata.level() > Level::WARN || !Self::is_forwarded(metadata.target()) {
            return;
        }
        let Some(notifier) = self.handle.notifier.get() else {
            return;
        };

        let mut visitor = AlertVisitor::default();
        event.record(&mut visitor);

        // Never log from here, a failed alert would raise another one
        let _ = notifier.try_notify(visitor.render(metadata.level(), metadata.target()));
    }
}

#[derive(Default)]
struct AlertVisitor {
    message: String,
    fields: String,
}

impl AlertVisitor {
    fn render(&self, level: &Level, target: &str) -> String {
        format!(
            "<b>{}</b>: {}{} <i>({})</i>",
            level,
            escape(&self.message),
            escape(&self.fields),
            escape(target)
        )
    }
}

impl Visit for AlertVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            let _ = write!(self.fields, " {}={}", field.name(), value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{:?}", value);
        } else {
            let _ = write!(self.fields, " {}={:?}", field.name(), value);
        }
    }
}

/// Initialize logging based on configuration
pub fn init_logging(config: &LoggingConfig) -> Result<LoggingGuard> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| ClubGateError::Config(format!("Invalid log filter: {}", e)))?;

    let (file_layer, file_guard) = match &config.file_path {
        Some(directory) => {
            let file_appender = tracing_appender::rolling::daily(directory, "clubgate.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let alerts = AlertHandle::default();
    let alert_layer = config.admin_alerts.then(|| AdminAlertLayer::new(alerts.clone()));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stdout))
        .with(file_layer)
        .with(alert_layer)
        .try_init()
        .map_err(|e| ClubGateError::Config(format!("Logging already initialized: {}", e)))?;

    info!("Logging initialized with level: {}", config.level);
    Ok(LoggingGuard {
        _file_guard: file_guard,
        alerts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telegram::outgoing::Outgoing;
    use crate::telegram::sender::SenderHandle;

    fn capture() -> (AlertHandle, tokio::sync::mpsc::Receiver<crate::telegram::sender::Envelope>, tracing::Dispatch) {
        let handle = AlertHandle::default();
        let (sender, rx) = SenderHandle::channel(8);
        handle.attach(AdminNotifier::new(sender, 99));
        let subscriber = tracing_subscriber::registry().with(AdminAlertLayer::new(handle.clone()));
        (handle, rx, tracing::Dispatch::new(subscriber))
    }

    #[test]
    fn test_warnings_are_forwarded() {
        let (_handle, mut rx, dispatch) = capture();
        tracing::dispatcher::with_default(&dispatch, || {
            tracing::info!("just info");
            tracing::warn!(user_id = 5, "disk <almost> full");
        });

        let envelope = rx.try_recv().unwrap();
        match envelope.outgoing {
            Outgoing::Message { chat_id, text, .. } => {
                assert_eq!(chat_id, 99);
                assert!(text.starts_with("<b>WARN</b>: disk &lt;almost&gt; full user_id=5"));
            }
            other => panic!("unexpected outgoing {:?}", other),
        }
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_transport_targets_are_not_forwarded() {
        let (_handle, mut rx, dispatch) = capture();
        tracing::dispatcher::with_default(&dispatch, || {
            tracing::error!(target: "ClubGate::telegram::sender", "send failed");
            tracing::error!(target: "ClubGate::telegram::poller", "poll failed");
        });

        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_dependency_targets_are_not_forwarded() {
        let (_handle, mut rx, dispatch) = capture();
        tracing::dispatcher::with_default(&dispatch, || {
            tracing::warn!(target: "sqlx::query", "slow statement");
            tracing::error!(target: "hyper::proto", "connection reset");
            tracing::error!(target: "ClubGateExtra::jobs", "lookalike crate");
        });
        assert!(rx.try_recv().is_err());

        tracing::dispatcher::with_default(&dispatch, || {
            tracing::error!(target: "ClubGate::handlers", "handler failed");
        });
        assert!(rx.try_recv().is_ok());
    }

    #[test]
    fn test_nothing_is_sent_before_attach() {
        let handle = AlertHandle::default();
        assert!(!handle.is_attached());
        let dispatch = tracing::Dispatch::new(
            tracing_subscriber::registry().with(AdminAlertLayer::new(handle)),
        );
        tracing::dispatcher::with_default(&dispatch, || {
            tracing::error!("early failure");
        });
    }
}
