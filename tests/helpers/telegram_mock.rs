//! Mock Telegram API Server for testing
//!
//! This module provides a mock HTTP server that simulates the Telegram Bot API
//! for testing purposes. It uses wiremock to create configurable mock responses.
//! Method names are matched case-insensitively, the Bot API accepts both
//! `sendMessage` and `SendMessage`.

use serde_json::{json, Value};
use wiremock::{
    matchers::{method, path_regex},
    Mock, MockServer, ResponseTemplate,
};
use ClubGate::config::BotConfig;

/// Mock Telegram API server for testing
pub struct TelegramMockServer {
    pub server: MockServer,
    pub base_url: String,
}

/// Configuration for mock responses
#[derive(Debug, Clone)]
pub struct MockResponseConfig {
    pub success: bool,
    pub delay_ms: Option<u64>,
    pub custom_response: Option<Value>,
}

impl Default for MockResponseConfig {
    fn default() -> Self {
        Self {
            success: true,
            delay_ms: None,
            custom_response: None,
        }
    }
}

fn method_path(api_method: &str) -> String {
    format!("(?i)^/bot[^/]+/{}$", api_method)
}

impl TelegramMockServer {
    /// Create a new mock Telegram API server
    pub async fn new() -> Self {
        let server = MockServer::start().await;
        let base_url = server.uri();

        Self { server, base_url }
    }

    /// Bot configuration talking to this server
    pub fn bot_config(&self) -> BotConfig {
        let mut config = super::test_bot_config();
        config.api_url = Some(self.base_url.clone());
        config.poll_timeout_seconds = 0;
        config
    }

    /// Answer `api_method` with `body` and HTTP `status`
    pub async fn mock_method(&self, api_method: &str, status: u16, body: Value, delay_ms: Option<u64>) {
        let mut response = ResponseTemplate::new(status).set_body_json(body);
        if let Some(delay) = delay_ms {
            response = response.set_delay(std::time::Duration::from_millis(delay));
        }

        Mock::given(method("POST"))
            .and(path_regex(method_path(api_method)))
            .respond_with(response)
            .mount(&self.server)
            .await;
    }

    /// Setup mock for sendMessage endpoint
    pub async fn mock_send_message(&self, config: MockResponseConfig) {
        let body = config.custom_response.unwrap_or_else(|| {
            if config.success {
                json!({
                    "ok": true,
                    "result": {
                        "message_id": 123,
                        "from": {
                            "id": 12345,
                            "is_bot": true,
                            "first_name": "TestBot",
                            "username": "test_bot"
                        },
                        "chat": {
                            "id": super::GROUP_ID,
                            "title": "Test Group",
                            "type": "supergroup"
                        },
                        "date": 1640995200,
                        "text": "Test message"
                    }
                })
            } else {
                json!({
                    "ok": false,
                    "error_code": 400,
                    "description": "Bad Request: chat not found"
                })
            }
        });

        let status = if config.success { 200 } else { 400 };
        self.mock_method("sendMessage", status, body, config.delay_ms).await;
    }

    /// Setup mock for getUpdates endpoint returning `updates` once per call
    pub async fn mock_get_updates(&self, updates: Value) {
        self.mock_method("getUpdates", 200, json!({ "ok": true, "result": updates }), None).await;
    }

    /// Setup a `true` result for methods that return nothing useful
    pub async fn mock_true(&self, api_method: &str) {
        self.mock_method(api_method, 200, json!({ "ok": true, "result": true }), None).await;
    }

    /// Setup a flood control answer for `api_method`
    pub async fn mock_throttled(&self, api_method: &str, retry_after: u64) {
        let body = json!({
            "ok": false,
            "error_code": 429,
            "description": format!("Too Many Requests: retry after {}", retry_after),
            "parameters": { "retry_after": retry_after }
        });
        self.mock_method(api_method, 429, body, None).await;
    }

    /// Reset all mocks
    pub async fn reset(&self) {
        self.server.reset().await;
    }

    /// JSON bodies of the requests made to `api_method`
    pub async fn requests_to(&self, api_method: &str) -> Vec<Value> {
        let suffix = format!("/{}", api_method.to_lowercase());
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|req| req.url.path().to_lowercase().ends_with(&suffix))
            .map(|req| serde_json::from_slice(&req.body).unwrap_or(Value::Null))
            .collect()
    }

    /// Verify that a specific endpoint was called
    pub async fn verify_endpoint_called(&self, api_method: &str, times: usize) {
        let matching_requests = self.requests_to(api_method).await.len();
        assert_eq!(
            matching_requests, times,
            "Expected {} calls to {}, but got {}",
            times, api_method, matching_requests
        );
    }
}

/// Helper function to create a test bot token
pub fn test_bot_token() -> String {
    "12345:test_token".to_string()
}
