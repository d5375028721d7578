//! Chat-log storage, feedback annotation, and moderation queries.
//!
//! Every user/bot exchange is appended to a [`ChatLogStore`] keyed by a
//! store-assigned timestamp. Admin tooling reads the full set back through
//! [`LogQuery`] and labels individual records with [`FeedbackAnnotator`].

pub mod error;
pub mod export;
pub mod feedback;
pub mod memory;
pub mod model;
pub mod query;
pub mod store;

/// Chat-log error type.
pub use error::ChatLogError;
/// Stats and CSV export helpers.
pub use export::{ChatLogStats, to_csv};
/// Feedback annotation wrapper.
pub use feedback::FeedbackAnnotator;
/// In-memory store implementation.
pub use memory::MemoryChatLogStore;
/// Record and feedback models.
pub use model::{ChatLogRecord, DEFAULT_USER_ID, Feedback, FeedbackLabel, NewChatLog};
/// Moderation filters.
pub use query::{FeedbackFilter, LogQuery, ModelFilter, paginate};
/// Store interface and default file implementation.
pub use store::{ChatLogStore, FileChatLogStore, STORE_SCHEMA_VERSION};
