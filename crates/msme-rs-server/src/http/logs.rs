//! Chat-log capture and moderation endpoints.

use super::{blocking, with_store};
use crate::error::{ApiError, LOG_NOT_FOUND};
use crate::gate::AdminSession;
use crate::state::AppState;
use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::header,
    response::IntoResponse,
};
use log::info;
use msme_rs_chatlog::{
    ChatLogRecord, ChatLogStats, FeedbackAnnotator, NewChatLog, paginate, to_csv,
};
use msme_rs_protocol::{
    AppendLogRequest, AppendLogResponse, LogListParams, LogsResponse, SetFeedbackRequest,
    SuccessResponse,
};

/// `POST /api/chat/log`: record an exchange produced elsewhere.
pub async fn append_log(
    State(state): State<AppState>,
    payload: Result<Json<AppendLogRequest>, JsonRejection>,
) -> Result<Json<AppendLogResponse>, ApiError> {
    let Json(request) = payload?;
    let entry = NewChatLog::from(request);
    let record = with_store(&state, move |store| store.append(entry)).await?;
    Ok(Json(AppendLogResponse {
        success: true,
        ts: record.ts,
        id: record.id,
    }))
}

/// `POST /api/chat/feedback`: label or clear one exchange.
pub async fn set_feedback(
    _session: AdminSession,
    State(state): State<AppState>,
    payload: Result<Json<SetFeedbackRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let Json(request) = payload?;
    let annotator = FeedbackAnnotator::new(state.store.clone());
    let label = request.label();
    blocking(move || annotator.set_feedback(request.ts, label)).await?;
    Ok(Json(SuccessResponse::ok()))
}

/// `GET /api/admin/chat/logs`: filtered view in insertion order.
pub async fn list_logs(
    _session: AdminSession,
    State(state): State<AppState>,
    params: Result<Query<LogListParams>, QueryRejection>,
) -> Result<Json<LogsResponse>, ApiError> {
    let Query(params) = params?;
    let query = params.to_query()?;
    let records = with_store(&state, |store| store.list_all()).await?;
    let total = records.len();
    let logs = paginate(query.apply(records), params.skip.unwrap_or(0), params.limit);
    info!(
        "listed chat logs (total={}, returned={}, model={:?}, feedback={:?})",
        total,
        logs.len(),
        query.model,
        query.feedback
    );
    Ok(Json(LogsResponse { logs }))
}

/// `GET /api/admin/chat/logs/{ts}`.
pub async fn get_log(
    _session: AdminSession,
    State(state): State<AppState>,
    ts: Result<Path<i64>, PathRejection>,
) -> Result<Json<ChatLogRecord>, ApiError> {
    let Path(ts) = ts?;
    with_store(&state, move |store| store.get(ts))
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(LOG_NOT_FOUND.to_string()))
}

/// `GET /api/admin/chat/stats`.
pub async fn stats(
    _session: AdminSession,
    State(state): State<AppState>,
) -> Result<Json<ChatLogStats>, ApiError> {
    let records = with_store(&state, |store| store.list_all()).await?;
    Ok(Json(ChatLogStats::from_records(&records)))
}

/// `GET /api/admin/chat/export.csv`: every record, newest first.
pub async fn export_csv(
    _session: AdminSession,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let records = with_store(&state, |store| store.list_all()).await?;
    let body = to_csv(&records);
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"chatlogs.csv\"",
            ),
        ],
        body,
    ))
}
