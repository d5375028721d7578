//! Chat-log record model shared by stores, queries, and the HTTP layer.

use crate::error::ChatLogError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// User id recorded when the caller does not identify itself.
pub const DEFAULT_USER_ID: &str = "anonymous";

/// Feedback attached to a chat exchange by a moderator.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Feedback {
    Positive,
    Negative,
}

impl Feedback {
    /// Return the feedback as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Feedback::Positive => "positive",
            Feedback::Negative => "negative",
        }
    }
}

impl fmt::Display for Feedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Feedback value accepted by the annotator; `None` clears the label.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackLabel {
    Positive,
    Negative,
    None,
}

impl FeedbackLabel {
    /// Return the label as its lowercase wire value.
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackLabel::Positive => "positive",
            FeedbackLabel::Negative => "negative",
            FeedbackLabel::None => "none",
        }
    }

    /// Resolve the label to the value stored on a record.
    pub fn into_feedback(self) -> Option<Feedback> {
        match self {
            FeedbackLabel::Positive => Some(Feedback::Positive),
            FeedbackLabel::Negative => Some(Feedback::Negative),
            FeedbackLabel::None => None,
        }
    }
}

impl fmt::Display for FeedbackLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Option<Feedback>> for FeedbackLabel {
    fn from(value: Option<Feedback>) -> Self {
        match value {
            Some(Feedback::Positive) => FeedbackLabel::Positive,
            Some(Feedback::Negative) => FeedbackLabel::Negative,
            None => FeedbackLabel::None,
        }
    }
}

impl FromStr for FeedbackLabel {
    type Err = ChatLogError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "positive" => Ok(FeedbackLabel::Positive),
            "negative" => Ok(FeedbackLabel::Negative),
            "none" => Ok(FeedbackLabel::None),
            other => Err(ChatLogError::Invalid(format!(
                "unknown feedback value: {other}"
            ))),
        }
    }
}

/// One persisted user/bot exchange.
///
/// `ts` is the primary key. It is assigned by the store on append and never
/// rewritten; only `feedback` changes after creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatLogRecord {
    /// Seconds since the Unix epoch, unique within a store.
    #[serde(alias = "timestamp")]
    pub ts: i64,
    /// Store-assigned sequence number.
    #[serde(default)]
    pub id: u64,
    /// Caller identifier.
    #[serde(default = "default_user_id")]
    pub user_id: String,
    /// User input, possibly transcribed speech.
    #[serde(default)]
    pub question: String,
    /// Reply produced by the chat engine.
    #[serde(default)]
    pub reply: String,
    /// Backing model identifier, e.g. `gemma2:2b`.
    #[serde(default)]
    pub model: String,
    /// Response mode, e.g. `rag` or `lora`.
    #[serde(default)]
    pub feature: String,
    /// Knowledge snapshot that was active.
    #[serde(default)]
    pub version: String,
    /// Moderator feedback, if any.
    #[serde(default)]
    pub feedback: Option<Feedback>,
}

fn default_user_id() -> String {
    DEFAULT_USER_ID.to_string()
}

/// Fields supplied by the caller when appending a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewChatLog {
    pub question: String,
    pub reply: String,
    pub model: String,
    pub feature: String,
    pub version: String,
    pub user_id: Option<String>,
    pub feedback: Option<Feedback>,
}

impl NewChatLog {
    /// Build an entry without user id or initial feedback.
    pub fn new(
        question: impl Into<String>,
        reply: impl Into<String>,
        model: impl Into<String>,
        feature: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            question: question.into(),
            reply: reply.into(),
            model: model.into(),
            feature: feature.into(),
            version: version.into(),
            user_id: None,
            feedback: None,
        }
    }

    /// Attach the caller identifier.
    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Attach feedback known at creation time.
    pub fn with_feedback(mut self, feedback: Option<Feedback>) -> Self {
        self.feedback = feedback;
        self
    }

    /// Reject entries missing the identifiers moderation filters rely on.
    pub fn validate(&self) -> Result<(), ChatLogError> {
        for (name, value) in [
            ("model", &self.model),
            ("feature", &self.feature),
            ("version", &self.version),
        ] {
            if value.trim().is_empty() {
                return Err(ChatLogError::Invalid(format!("{name} must not be empty")));
            }
        }
        Ok(())
    }

    /// Materialize the record under the given key and sequence number.
    pub(crate) fn into_record(self, ts: i64, id: u64) -> ChatLogRecord {
        let user_id = self
            .user_id
            .filter(|user| !user.trim().is_empty())
            .unwrap_or_else(default_user_id);
        ChatLogRecord {
            ts,
            id,
            user_id,
            question: self.question,
            reply: self.reply,
            model: self.model,
            feature: self.feature,
            version: self.version,
            feedback: self.feedback,
        }
    }
}
