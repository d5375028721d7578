//! Admin login, session check, and logout.

use crate::error::ApiError;
use crate::gate::{AdminSession, SESSION_COOKIE};
use crate::state::AppState;
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::header::SET_COOKIE,
    response::IntoResponse,
};
use chrono::Utc;
use msme_rs_protocol::{CheckResponse, LoginRequest, LoginResponse, SuccessResponse};

/// `POST /api/admin/login`: returns the token and sets the session cookie.
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload?;
    let session = state.gate.login(&request.username, &request.password)?;
    let max_age = (session.expires_at - Utc::now()).num_seconds().max(0);
    let cookie = format!(
        "{SESSION_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}",
        session.token
    );
    Ok((
        [(SET_COOKIE, cookie)],
        Json(LoginResponse {
            success: true,
            token: session.token,
            expires_at: session.expires_at,
        }),
    ))
}

/// `GET /api/admin/check`: 200 only with a live session.
pub async fn check(_session: AdminSession) -> Json<CheckResponse> {
    Json(CheckResponse {
        authenticated: true,
    })
}

/// `POST /api/admin/logout`: revoke the session and expire the cookie.
pub async fn logout(session: AdminSession, State(state): State<AppState>) -> impl IntoResponse {
    state.gate.logout(&session.token);
    (
        [(
            SET_COOKIE,
            format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0"),
        )],
        Json(SuccessResponse::ok()),
    )
}
