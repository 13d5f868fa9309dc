//! Test utilities for integration tests
#![allow(dead_code)]

use std::sync::{Arc, RwLock};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use axum::{Router, body::Body};
use tokio::sync::Notify;

use ultrachat::api::app;
use ultrachat::api::{AppState, SharedCompleter};
use ultrachat::chat::HistoryRoles;
use ultrachat::core::AppConfig;
use ultrachat::mistral::{Completer, Message};

pub type SharedState = Arc<RwLock<AppState>>;

pub fn test_config(api_hostname: &str) -> AppConfig {
    AppConfig {
        api_hostname: api_hostname.to_string(),
        api_key: String::from("test-api-key"),
        model: String::from("mistral-tiny"),
        request_timeout_secs: 5,
        history_roles: HistoryRoles::BySpeaker,
        web_ui_path: String::from("./web-ui/src"),
        session_idle_secs: 3600,
    }
}

/// Creates a test application router whose completion calls go to
/// `api_hostname`, usually a `mockito` server. Also returns the shared
/// state so tests can inspect or seed sessions directly.
pub fn test_app_with_state(api_hostname: &str) -> (Router, SharedState) {
    let app_state = AppState::new(test_config(api_hostname));
    let shared_state = Arc::new(RwLock::new(app_state));
    (app(Arc::clone(&shared_state)), shared_state)
}

pub fn test_app(api_hostname: &str) -> Router {
    test_app_with_state(api_hostname).0
}

/// Creates a test application router that completes with `completer`
/// instead of calling out over HTTP.
pub fn test_app_with_completer(completer: SharedCompleter) -> (Router, SharedState) {
    let app_state = AppState::new_with_completer(test_config("http://127.0.0.1:1"), completer);
    let shared_state = Arc::new(RwLock::new(app_state));
    (app(Arc::clone(&shared_state)), shared_state)
}

/// Holds every completion until `gate` is notified, then replies with
/// "reply to <last message>".
pub struct GatedCompleter {
    pub gate: Arc<Notify>,
}

#[async_trait]
impl Completer for GatedCompleter {
    async fn complete(&self, messages: &[Message]) -> Result<String> {
        self.gate.notified().await;
        let last = messages
            .last()
            .map(|m| m.content.as_str())
            .unwrap_or_default();
        Ok(format!("reply to {}", last))
    }
}

/// Waits until the session `id` has a completion in flight.
pub async fn wait_until_pending(state: &SharedState, id: &str) {
    for _ in 0..1000 {
        if state
            .read()
            .unwrap()
            .sessions
            .get(id)
            .is_some_and(|s| s.is_pending())
        {
            return;
        }
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
    panic!("Session {} never became pending", id);
}

pub async fn body_to_string(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Failed to read body");
    String::from_utf8(bytes.to_vec()).expect("Body is not valid UTF-8")
}

/// A successful chat completion response with `content` as the reply
pub fn completion_body(content: &str) -> String {
    serde_json::json!({
        "id": "cmpl-123",
        "object": "chat.completion",
        "created": 1694268190,
        "model": "mistral-tiny",
        "choices": [{
            "index": 0,
            "message": {
                "role": "assistant",
                "content": content
            },
            "finish_reason": "stop"
        }]
    })
    .to_string()
}
