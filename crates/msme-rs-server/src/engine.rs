//! Chat engines that turn a user message into a reply.

use async_trait::async_trait;
use log::debug;
use msme_rs_protocol::ChatRequest;
use serde::Serialize;
use serde_json::{Value, json};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChatEngineError {
    #[error("Ollama Error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Ollama HTTP Error: {status} - {body}")]
    Status { status: u16, body: String },
}

/// Request defaults applied when the caller leaves a field blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatDefaults {
    pub model: String,
    pub feature: String,
    pub version: String,
}

impl Default for ChatDefaults {
    fn default() -> Self {
        Self {
            model: "gemma2:2b".to_string(),
            feature: "rag".to_string(),
            version: "default".to_string(),
        }
    }
}

/// One chat turn with its routing fields resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatPrompt {
    pub message: String,
    pub model: String,
    pub feature: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

impl ChatPrompt {
    /// Trim the request and fill blank fields from `defaults`.
    pub fn resolve(request: &ChatRequest, defaults: &ChatDefaults) -> Self {
        fn pick(value: Option<&String>, fallback: &str) -> String {
            value
                .map(|value| value.trim())
                .filter(|value| !value.is_empty())
                .unwrap_or(fallback)
                .to_string()
        }
        Self {
            message: request.message.trim().to_string(),
            model: pick(request.model.as_ref(), &defaults.model),
            feature: pick(request.feature.as_ref(), &defaults.feature),
            version: pick(request.version.as_ref(), &defaults.version),
        }
    }

    /// System instruction derived from the feature and version, if any.
    pub fn system_preamble(&self) -> Option<String> {
        let mut lines = Vec::new();
        match self.feature.as_str() {
            "rag" => lines.push("You are a precise RAG assistant.".to_string()),
            "lora" => lines.push("You are a LoRA fine-tuned assistant.".to_string()),
            _ => {}
        }
        if self.version != "default" {
            lines.push(format!("[Version: {}]", self.version));
        }
        (!lines.is_empty()).then(|| lines.join("\n"))
    }

    pub fn messages(&self) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(2);
        if let Some(preamble) = self.system_preamble() {
            messages.push(ChatMessage {
                role: "system",
                content: preamble,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: self.message.clone(),
        });
        messages
    }
}

#[async_trait]
pub trait ChatEngine: Send + Sync {
    async fn reply(&self, prompt: &ChatPrompt) -> Result<String, ChatEngineError>;
}

/// Placeholder engine that repeats the message back.
#[derive(Debug, Default, Clone, Copy)]
pub struct EchoEngine;

#[async_trait]
impl ChatEngine for EchoEngine {
    async fn reply(&self, prompt: &ChatPrompt) -> Result<String, ChatEngineError> {
        Ok(format!("Bot reply to: \"{}\"", prompt.message))
    }
}

/// Non-streaming client for an Ollama `/api/chat` endpoint.
#[derive(Debug, Clone)]
pub struct OllamaEngine {
    client: reqwest::Client,
    endpoint: String,
}

impl OllamaEngine {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ChatEngineError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: format!("{}/api/chat", base_url.trim_end_matches('/')),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ChatEngine for OllamaEngine {
    async fn reply(&self, prompt: &ChatPrompt) -> Result<String, ChatEngineError> {
        let payload = json!({
            "model": prompt.model,
            "messages": prompt.messages(),
            "stream": false,
        });
        debug!(
            "calling ollama (endpoint={}, model={})",
            self.endpoint, prompt.model
        );
        let response = self.client.post(&self.endpoint).json(&payload).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChatEngineError::Status {
                status: status.as_u16(),
                body,
            });
        }
        let data: Value = response.json().await?;
        Ok(extract_reply(&data))
    }
}

/// Pull the reply text out of the response shapes Ollama-compatible servers
/// return; anything unrecognised is rendered as raw JSON.
pub fn extract_reply(data: &Value) -> String {
    if let Some(content) = data.pointer("/message/content").and_then(Value::as_str) {
        return content.to_string();
    }
    if let Some(first) = data.pointer("/choices/0") {
        let inner = ["message", "content", "text"]
            .iter()
            .filter_map(|key| first.get(*key))
            .find(|value| is_truthy(value));
        match inner {
            Some(Value::String(text)) => return text.clone(),
            Some(object) if object.is_object() => {
                let text = ["content", "text"]
                    .iter()
                    .filter_map(|key| object.get(*key))
                    .find(|value| is_truthy(value))
                    .and_then(Value::as_str);
                if let Some(text) = text {
                    return text.to_string();
                }
            }
            _ => {}
        }
    }
    for key in ["response", "text"] {
        if let Some(text) = data.get(key).and_then(Value::as_str) {
            return text.to_string();
        }
    }
    data.to_string()
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
        Value::Number(_) => true,
    }
}
