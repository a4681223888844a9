//! Teloxide adapter tests against the mock Bot API server

mod helpers;

use std::time::Duration;

use assert_matches::assert_matches;
use helpers::*;
use serde_json::json;
use ClubGate::telegram::{BotApi, InlineButton, TeloxideApi, UpdatePayload};
use ClubGate::utils::errors::TelegramError;

async fn api_for(mock: &TelegramMockServer) -> TeloxideApi {
    TeloxideApi::from_config(&mock.bot_config()).expect("adapter builds")
}

#[tokio::test]
async fn test_send_message_uses_html_and_keyboard() {
    let mock = TelegramMockServer::new().await;
    mock.mock_send_message(MockResponseConfig::default()).await;
    let api = api_for(&mock).await;

    let keyboard = vec![vec![
        InlineButton::callback("Принять", "admin:form:accept:1"),
        InlineButton::callback("Отклонить", "admin:form:reject:1"),
    ]];
    api.send_message(GROUP_ID, "<b>Новая анкета!</b>", Some(&keyboard))
        .await
        .unwrap();

    let requests = mock.requests_to("sendMessage").await;
    assert_eq!(requests.len(), 1);
    let body = &requests[0];
    assert_eq!(body["chat_id"], json!(GROUP_ID));
    assert_eq!(body["text"], json!("<b>Новая анкета!</b>"));
    assert_eq!(body["parse_mode"], json!("HTML"));
    assert_eq!(
        body["reply_markup"]["inline_keyboard"][0][1]["callback_data"],
        json!("admin:form:reject:1")
    );
}

#[tokio::test]
async fn test_flood_control_maps_to_too_many_requests() {
    let mock = TelegramMockServer::new().await;
    mock.mock_throttled("sendMessage", 3).await;
    let api = api_for(&mock).await;

    let result = api.send_message(1, "hi", None).await;

    assert_matches!(result, Err(TelegramError::TooManyRequests { retry_after }) => {
        assert_eq!(retry_after, Duration::from_secs(3));
    });
}

#[tokio::test]
async fn test_rejected_request_is_an_error() {
    let mock = TelegramMockServer::new().await;
    mock.mock_send_message(MockResponseConfig {
        success: false,
        ..Default::default()
    })
    .await;
    let api = api_for(&mock).await;

    let result = api.send_message(1, "hi", None).await;

    assert_matches!(result, Err(TelegramError::Request(_)));
}

#[tokio::test]
async fn test_get_updates_classifies_payloads() {
    let mock = TelegramMockServer::new().await;
    mock.mock_get_updates(json!([
        {
            "update_id": 100,
            "message": {
                "message_id": 1,
                "date": 1700000000,
                "chat": {"id": 5, "type": "private", "first_name": "Anna"},
                "from": {"id": 5, "is_bot": false, "first_name": "Anna"},
                "text": "ping"
            }
        },
        {
            "update_id": 101,
            "chat_join_request": {
                "chat": {"id": GROUP_ID, "type": "supergroup", "title": "Club"},
                "from": {"id": 6, "is_bot": false, "first_name": "Boris"},
                "user_chat_id": 6,
                "date": 1700000000
            }
        }
    ]))
    .await;
    let api = api_for(&mock).await;

    let updates = api.get_updates(100, Duration::ZERO).await.unwrap();

    assert_eq!(updates.iter().map(|u| u.id).collect::<Vec<_>>(), vec![100, 101]);
    assert_matches!(&updates[0].payload, UpdatePayload::Message(message) => {
        assert_eq!(message.text(), Some("ping"));
    });
    assert_matches!(&updates[1].payload, UpdatePayload::JoinRequest(request) => {
        assert_eq!(request.chat.id, GROUP_ID);
        assert_eq!(request.from.id, 6);
    });

    let body = &mock.requests_to("getUpdates").await[0];
    assert_eq!(body["offset"], json!(100));
    let allowed = body["allowed_updates"].as_array().unwrap();
    assert!(allowed.contains(&json!("chat_join_request")));
}

#[tokio::test]
async fn test_callback_answer_and_join_decisions() {
    let mock = TelegramMockServer::new().await;
    mock.mock_true("answerCallbackQuery").await;
    mock.mock_true("approveChatJoinRequest").await;
    mock.mock_true("declineChatJoinRequest").await;
    let api = api_for(&mock).await;

    api.answer_callback_query("cb-1").await.unwrap();
    api.approve_join_request(GROUP_ID, 6).await.unwrap();
    api.decline_join_request(GROUP_ID, 7).await.unwrap();

    assert_eq!(mock.requests_to("answerCallbackQuery").await[0]["callback_query_id"], json!("cb-1"));
    assert_eq!(mock.requests_to("approveChatJoinRequest").await[0]["user_id"], json!(6));
    mock.verify_endpoint_called("declineChatJoinRequest", 1).await;
}

#[tokio::test]
async fn test_negative_user_id_is_rejected_locally() {
    let mock = TelegramMockServer::new().await;
    let api = api_for(&mock).await;

    let result = api.approve_join_request(GROUP_ID, -1).await;

    assert_matches!(result, Err(TelegramError::Rejected(_)));
    mock.verify_endpoint_called("approveChatJoinRequest", 0).await;
}

#[test]
fn test_invalid_api_url_fails_construction() {
    let mut config = test_bot_config();
    config.api_url = Some("not a url".to_string());

    assert!(TeloxideApi::from_config(&config).is_err());
}
