//! Read-only model version metadata for the admin dashboard.

use crate::error::ApiError;
use crate::gate::AdminSession;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
};
use msme_rs_protocol::{VersionHistoryResponse, VersionInfoParams, VersionInfoResponse};

/// `GET /api/admin/train/history`.
pub async fn history(
    _session: AdminSession,
    State(state): State<AppState>,
) -> Result<Json<VersionHistoryResponse>, ApiError> {
    let versions = state.catalog.versions()?;
    Ok(Json(VersionHistoryResponse { versions }))
}

/// `GET /api/admin/train/info?model=`.
pub async fn info(
    _session: AdminSession,
    State(state): State<AppState>,
    params: Result<Query<VersionInfoParams>, QueryRejection>,
) -> Result<Json<VersionInfoResponse>, ApiError> {
    let Query(params) = params?;
    let model = params
        .model
        .as_deref()
        .map(str::trim)
        .filter(|model| !model.is_empty())
        .ok_or_else(|| ApiError::Validation("model is required".to_string()))?;
    Ok(Json(state.catalog.model_info(model)?))
}
