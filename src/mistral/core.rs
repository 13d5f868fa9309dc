use std::time::Duration;

use anyhow::{Error, Result, anyhow};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::core::AppConfig;

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub enum Role {
    #[serde(rename = "assistant")]
    Assistant,
    #[serde(rename = "user")]
    User,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: &str) -> Self {
        Message {
            role,
            content: content.to_string(),
        }
    }
}

/// Sends `messages` to an OpenAI compatible chat completion endpoint
/// and returns the raw JSON response. Non-2xx responses are errors.
pub async fn completion(
    messages: &[Message],
    api_hostname: &str,
    api_key: &str,
    model: &str,
    timeout: Duration,
) -> Result<Value, Error> {
    let payload = json!({
        "model": model,
        "messages": messages,
    });
    let url = format!("{}/v1/chat/completions", api_hostname.trim_end_matches("/"));
    let response = reqwest::Client::new()
        .post(url)
        .bearer_auth(api_key)
        .header("Content-Type", "application/json")
        .timeout(timeout)
        .json(&payload)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    Ok(response)
}

/// Pulls the assistant's reply out of a completion response.
pub fn reply_content(resp: &Value) -> Result<String, Error> {
    resp["choices"][0]["message"]["content"]
        .as_str()
        .map(String::from)
        .ok_or(anyhow!("No message received. Resp:\n\n {}", resp))
}

/// Anything that can turn an ordered message list into the next
/// assistant reply.
#[async_trait]
pub trait Completer {
    async fn complete(&self, messages: &[Message]) -> Result<String, Error>;
}

#[derive(Clone, Debug)]
pub struct MistralClient {
    api_hostname: String,
    api_key: String,
    model: String,
    timeout: Duration,
}

impl MistralClient {
    pub fn new(api_hostname: &str, api_key: &str, model: &str, timeout: Duration) -> Self {
        Self {
            api_hostname: api_hostname.to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            timeout,
        }
    }
}

impl From<&AppConfig> for MistralClient {
    fn from(config: &AppConfig) -> Self {
        Self::new(
            &config.api_hostname,
            &config.api_key,
            &config.model,
            Duration::from_secs(config.request_timeout_secs),
        )
    }
}

#[async_trait]
impl Completer for MistralClient {
    async fn complete(&self, messages: &[Message]) -> Result<String, Error> {
        tracing::debug!(
            "Requesting completion from {} with {} messages",
            self.model,
            messages.len()
        );
        let resp = completion(
            messages,
            &self.api_hostname,
            &self.api_key,
            &self.model,
            self.timeout,
        )
        .await?;
        reply_content(&resp)
    }
}
