//! HTTP surface of the MSME assistant: chat, chat-log capture, and the
//! admin moderation console.

pub mod catalog;
pub mod engine;
pub mod error;
pub mod gate;
pub mod http;
pub mod state;

pub use catalog::{CatalogError, FileVersionCatalog, StaticVersionCatalog, VersionCatalog};
pub use engine::{
    ChatDefaults, ChatEngine, ChatEngineError, ChatMessage, ChatPrompt, EchoEngine, OllamaEngine,
};
pub use error::{ApiError, LOG_NOT_FOUND, ServerError};
pub use gate::{AdminGate, AdminSession, AuthError, IssuedSession, SESSION_COOKIE, TokenSessionGate};
pub use http::build_router;
pub use state::AppState;
