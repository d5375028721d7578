//! Chat endpoint: ask the engine, then log the exchange.

use super::with_store;
use crate::engine::ChatPrompt;
use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use log::{info, warn};
use msme_rs_chatlog::NewChatLog;
use msme_rs_protocol::{ChatRequest, ChatResponse};

/// `POST /api/chat`.
///
/// Engine failures become the reply text so the exchange is still logged.
pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(request) = payload?;
    let prompt = ChatPrompt::resolve(&request, &state.defaults);
    if prompt.message.is_empty() {
        return Err(ApiError::Validation("Empty message".to_string()));
    }

    let reply = match state.engine.reply(&prompt).await {
        Ok(reply) => reply,
        Err(err) => {
            warn!("chat engine failed (model={}, error={})", prompt.model, err);
            format!("[{err}]")
        }
    };

    let entry = NewChatLog {
        question: prompt.message,
        reply: reply.clone(),
        model: prompt.model,
        feature: prompt.feature,
        version: prompt.version,
        user_id: request.user_id,
        feedback: None,
    };
    let record = with_store(&state, move |store| store.append(entry)).await?;
    info!(
        "chat answered (ts={}, id={}, model={})",
        record.ts, record.id, record.model
    );
    Ok(Json(ChatResponse {
        reply,
        ts: record.ts,
        id: record.id,
    }))
}
