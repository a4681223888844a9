//! Bot runtime tests
//!
//! Poller, dispatcher and sender running together against the recording
//! platform fake.

mod helpers;

use std::sync::Arc;
use std::time::Duration;

use helpers::*;
use tokio_util::sync::CancellationToken;
use ClubGate::telegram::{BotRuntime, Outgoing};
use ClubGate::MemoryDatabase;

#[tokio::test]
async fn test_update_flows_from_poll_to_delivery() {
    let api = Arc::new(RecordingApi::new());
    api.script_updates(UpdatesReply::Batch(vec![private_message(1, user(5, "Anna"), "ping")]));
    let db = Arc::new(MemoryDatabase::default());

    let runtime = BotRuntime::start(api.clone(), db.clone(), &test_settings(), CancellationToken::new()).unwrap();

    assert!(wait_until(Duration::from_secs(3), || api.delivered_count() == 1).await);
    assert_eq!(api.delivered_outgoing(), vec![Outgoing::text(5, "pong")]);
    assert_eq!(db.user_count().await, 1);

    runtime.shutdown(Duration::from_secs(2)).await;
}

#[tokio::test]
async fn test_admin_notifier_and_shared_sender() {
    let api = Arc::new(RecordingApi::new());
    let runtime = BotRuntime::start(
        api.clone(),
        Arc::new(MemoryDatabase::default()),
        &test_settings(),
        CancellationToken::new(),
    )
    .unwrap();

    runtime.notifier().notify("disk is full").await.unwrap();
    runtime.sender().send(Outgoing::text(42, "from the website")).await.unwrap();

    assert!(wait_until(Duration::from_secs(3), || api.delivered_count() == 2).await);
    assert_eq!(
        api.delivered_outgoing(),
        vec![Outgoing::text(ADMIN_ID, "disk is full"), Outgoing::text(42, "from the website")]
    );

    runtime.shutdown(Duration::from_secs(2)).await;
}

#[tokio::test]
async fn test_shutdown_through_external_token() {
    let api = Arc::new(RecordingApi::new());
    let cancel = CancellationToken::new();
    let runtime = BotRuntime::start(api.clone(), Arc::new(MemoryDatabase::default()), &test_settings(), cancel.clone()).unwrap();

    assert!(wait_until(Duration::from_secs(2), || !api.offsets().is_empty()).await);
    cancel.cancel();
    assert!(runtime.cancellation_token().is_cancelled());

    tokio::time::timeout(Duration::from_secs(3), runtime.shutdown(Duration::from_secs(1)))
        .await
        .unwrap();
}

#[test]
fn test_invalid_sender_settings_fail_start() {
    let mut settings = test_settings();
    settings.sender.per_second = 0;

    let runtime = tokio::runtime::Runtime::new().unwrap();
    let _guard = runtime.enter();
    let result = BotRuntime::start(
        Arc::new(RecordingApi::new()),
        Arc::new(MemoryDatabase::default()),
        &settings,
        CancellationToken::new(),
    );
    assert!(result.is_err());
}
