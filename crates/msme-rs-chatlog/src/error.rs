//! Error types for chat-log operations.

/// Errors returned by chat-log stores and helpers.
#[derive(Debug, thiserror::Error)]
pub enum ChatLogError {
    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization error.
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    /// The persisted store exists but cannot be decoded.
    #[error("corrupt chat log store at {path}: {message}")]
    Corrupt { path: String, message: String },
    /// The persisted store was written by a newer schema.
    #[error("unsupported schema version: {0}")]
    UnsupportedSchema(u32),
    /// No record carries the requested timestamp.
    #[error("chat log not found (ts={0})")]
    NotFound(i64),
    /// No timestamp key remains after the given one.
    #[error("chat log keys exhausted (last ts={0})")]
    KeysExhausted(i64),
    /// A new record or feedback label failed validation.
    #[error("invalid chat log: {0}")]
    Invalid(String),
}

impl ChatLogError {
    /// True when the error reports a missing record.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ChatLogError::NotFound(_))
    }
}
