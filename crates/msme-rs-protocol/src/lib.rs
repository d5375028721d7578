//! Wire types shared by the HTTP server, its clients, and tests.

use chrono::{DateTime, Utc};
use msme_rs_chatlog::{
    ChatLogError, ChatLogRecord, Feedback, FeedbackFilter, FeedbackLabel, LogQuery, ModelFilter,
    NewChatLog,
};
use serde::{Deserialize, Serialize};

/// Body of `POST /api/chat/log`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppendLogRequest {
    pub question: String,
    pub reply: String,
    pub model: String,
    pub feature: String,
    pub version: String,
    #[serde(default)]
    pub feedback: Option<Feedback>,
    #[serde(default)]
    pub user_id: Option<String>,
}

impl From<AppendLogRequest> for NewChatLog {
    fn from(request: AppendLogRequest) -> Self {
        NewChatLog {
            question: request.question,
            reply: request.reply,
            model: request.model,
            feature: request.feature,
            version: request.version,
            user_id: request.user_id,
            feedback: request.feedback,
        }
    }
}

/// Acknowledgement carrying the key assigned to a new record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppendLogResponse {
    pub success: bool,
    pub ts: i64,
    pub id: u64,
}

/// Body of `POST /api/chat/feedback`. A null or absent `feedback` clears it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SetFeedbackRequest {
    pub ts: i64,
    #[serde(default)]
    pub feedback: Option<FeedbackLabel>,
}

impl SetFeedbackRequest {
    pub fn label(&self) -> FeedbackLabel {
        self.feedback.unwrap_or(FeedbackLabel::None)
    }
}

/// Bare success flag.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

/// Error payload used for every non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub success: bool,
    pub msg: String,
}

impl ErrorBody {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            msg: msg.into(),
        }
    }
}

/// Query string of `GET /api/admin/chat/logs`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogListParams {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub feedback: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub skip: Option<usize>,
    #[serde(default)]
    pub limit: Option<usize>,
}

impl LogListParams {
    /// Translate the raw parameters into a store query.
    pub fn to_query(&self) -> Result<LogQuery, ChatLogError> {
        let feedback = match self.feedback.as_deref() {
            Some(value) => value.parse::<FeedbackFilter>()?,
            None => FeedbackFilter::All,
        };
        let user_id = self
            .user_id
            .as_deref()
            .map(str::trim)
            .filter(|user| !user.is_empty())
            .map(str::to_string);
        Ok(LogQuery {
            model: ModelFilter::parse(self.model.as_deref()),
            feedback,
            user_id,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogsResponse {
    pub logs: Vec<ChatLogRecord>,
}

/// Body of `POST /api/chat`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub feature: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatResponse {
    pub reply: String,
    pub ts: i64,
    pub id: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginResponse {
    pub success: bool,
    pub token: String,
    /// Session expiry.
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CheckResponse {
    pub authenticated: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthResponse {
    pub status: String,
    pub time: DateTime<Utc>,
}

/// One published knowledge snapshot of a model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VersionMetadata {
    pub model: String,
    pub version: String,
    /// Training time as published by the training service.
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub files: Vec<String>,
}

/// Response of `GET /api/admin/train/history`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct VersionHistoryResponse {
    pub versions: Vec<VersionMetadata>,
}

/// Response of `GET /api/admin/train/info`.
///
/// The active version's fields are inlined so dashboards can read
/// `version`/`timestamp`/`files` directly; `trained` is false when the model
/// has no active version.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VersionInfoResponse {
    pub trained: bool,
    #[serde(flatten)]
    pub active: Option<VersionMetadata>,
    pub versions: Vec<VersionMetadata>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct VersionInfoParams {
    #[serde(default)]
    pub model: Option<String>,
}
