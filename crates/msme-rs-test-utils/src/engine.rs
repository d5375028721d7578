use async_trait::async_trait;
use msme_rs_server::{ChatEngine, ChatEngineError, ChatPrompt};
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct FixedChatEngine {
    reply: String,
}

impl FixedChatEngine {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
        }
    }
}

#[async_trait]
impl ChatEngine for FixedChatEngine {
    async fn reply(&self, _prompt: &ChatPrompt) -> Result<String, ChatEngineError> {
        Ok(self.reply.clone())
    }
}

/// Answers with a fixed reply and keeps every prompt it was asked.
#[derive(Debug, Clone)]
pub struct RecordingChatEngine {
    reply: String,
    seen: Arc<Mutex<Vec<ChatPrompt>>>,
}

impl RecordingChatEngine {
    pub fn new(reply: impl Into<String>) -> (Self, Arc<Mutex<Vec<ChatPrompt>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                reply: reply.into(),
                seen: seen.clone(),
            },
            seen,
        )
    }
}

#[async_trait]
impl ChatEngine for RecordingChatEngine {
    async fn reply(&self, prompt: &ChatPrompt) -> Result<String, ChatEngineError> {
        self.seen.lock().push(prompt.clone());
        Ok(self.reply.clone())
    }
}

/// Always fails as an unreachable upstream would.
#[derive(Debug, Clone, Default)]
pub struct FailingChatEngine;

#[async_trait]
impl ChatEngine for FailingChatEngine {
    async fn reply(&self, _prompt: &ChatPrompt) -> Result<String, ChatEngineError> {
        Err(ChatEngineError::Status {
            status: 503,
            body: "model not loaded".to_string(),
        })
    }
}
