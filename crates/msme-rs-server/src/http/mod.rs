//! HTTP router and handlers.

use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    Json, Router,
    routing::{get, post},
};
use chrono::Utc;
use msme_rs_chatlog::{ChatLogError, ChatLogStore};
use msme_rs_protocol::HealthResponse;

pub mod chat;
pub mod logs;
pub mod session;
pub mod train;

/// Assemble the HTTP router with all routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health))
        .route("/api/chat", post(chat::chat))
        .route("/api/chat/log", post(logs::append_log))
        .route("/api/chat/feedback", post(logs::set_feedback))
        .route("/api/admin/login", post(session::login))
        .route("/api/admin/check", get(session::check))
        .route("/api/admin/logout", post(session::logout))
        .route("/api/admin/chat/logs", get(logs::list_logs))
        .route("/api/admin/chat/logs/{ts}", get(logs::get_log))
        .route("/api/admin/chat/stats", get(logs::stats))
        .route("/api/admin/chat/export.csv", get(logs::export_csv))
        .route("/api/admin/train/history", get(train::history))
        .route("/api/admin/train/info", get(train::info))
        .with_state(state)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        time: Utc::now(),
    })
}

/// Run a store operation on the blocking pool; file stores do disk IO.
pub(crate) async fn with_store<T, F>(state: &AppState, op: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&dyn ChatLogStore) -> Result<T, ChatLogError> + Send + 'static,
{
    let store = state.store.clone();
    blocking(move || op(store.as_ref())).await
}

pub(crate) async fn blocking<T, F>(op: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, ChatLogError> + Send + 'static,
{
    let result = tokio::task::spawn_blocking(op)
        .await
        .map_err(|err| ApiError::Internal(format!("store task failed: {err}")))?;
    Ok(result?)
}
