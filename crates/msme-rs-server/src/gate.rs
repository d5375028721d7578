//! Admin session gate.
//!
//! Administrative routes take an [`AdminSession`] extractor, which asks the
//! configured [`AdminGate`] to verify the caller's token. Tokens are read from
//! an `Authorization: Bearer` header first, then from the session cookie.

use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::request::Parts;
use chrono::{DateTime, TimeDelta, Utc};
use log::{debug, info};
use parking_lot::Mutex;
use std::collections::HashMap;
use thiserror::Error;
use uuid::Uuid;

/// Cookie carrying the admin session token.
pub const SESSION_COOKIE: &str = "msme_admin";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Missing token")]
    MissingToken,
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token expired")]
    Expired,
}

/// Token handed out by a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedSession {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Authentication strategy for the admin console.
pub trait AdminGate: Send + Sync {
    /// Exchange credentials for a session token.
    fn login(&self, username: &str, password: &str) -> Result<IssuedSession, AuthError>;
    /// Accept or refuse a presented token.
    fn verify(&self, token: &str) -> Result<(), AuthError>;
    /// Forget a token; unknown tokens are ignored.
    fn logout(&self, token: &str);
}

/// Opaque random tokens held in memory until they expire.
pub struct TokenSessionGate {
    username: String,
    password: String,
    ttl: TimeDelta,
    sessions: Mutex<HashMap<String, DateTime<Utc>>>,
}

impl TokenSessionGate {
    /// Credentials are compared trimmed, on both sides.
    pub fn new(username: impl Into<String>, password: impl Into<String>, ttl: TimeDelta) -> Self {
        Self {
            username: username.into().trim().to_string(),
            password: password.into().trim().to_string(),
            ttl,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub(crate) fn login_at(
        &self,
        username: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<IssuedSession, AuthError> {
        if username.trim() != self.username || password.trim() != self.password {
            info!("admin login refused (username={})", username.trim());
            return Err(AuthError::InvalidCredentials);
        }
        let token = Uuid::new_v4().simple().to_string();
        let expires_at = now + self.ttl;
        let mut sessions = self.sessions.lock();
        sessions.retain(|_, expiry| *expiry > now);
        sessions.insert(token.clone(), expires_at);
        info!("admin session issued (active_sessions={})", sessions.len());
        Ok(IssuedSession { token, expires_at })
    }

    pub(crate) fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<(), AuthError> {
        let mut sessions = self.sessions.lock();
        match sessions.get(token).copied() {
            None => Err(AuthError::InvalidToken),
            Some(expiry) if expiry <= now => {
                sessions.remove(token);
                Err(AuthError::Expired)
            }
            Some(_) => Ok(()),
        }
    }
}

impl AdminGate for TokenSessionGate {
    fn login(&self, username: &str, password: &str) -> Result<IssuedSession, AuthError> {
        self.login_at(username, password, Utc::now())
    }

    fn verify(&self, token: &str) -> Result<(), AuthError> {
        self.verify_at(token, Utc::now())
    }

    fn logout(&self, token: &str) {
        if self.sessions.lock().remove(token).is_some() {
            info!("admin session revoked");
        }
    }
}

/// Extract the session token from the request headers.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().split_once(' '))
        .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("bearer"))
        .map(|(_, token)| token.trim())
        .filter(|token| !token.is_empty());
    if let Some(token) = bearer {
        return Some(token.to_string());
    }
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, token)| *name == SESSION_COOKIE && !token.is_empty())
        .map(|(_, token)| token.to_string())
}

/// Proof that the request carries a live admin session.
#[derive(Debug, Clone)]
pub struct AdminSession {
    pub token: String,
}

impl FromRequestParts<AppState> for AdminSession {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = session_token(&parts.headers).ok_or(AuthError::MissingToken)?;
        if let Err(err) = state.gate.verify(&token) {
            debug!("admin gate denied request (path={}, reason={})", parts.uri.path(), err);
            return Err(err.into());
        }
        Ok(AdminSession { token })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use pretty_assertions::assert_eq;

    fn gate() -> TokenSessionGate {
        TokenSessionGate::new("admin", "secret", TimeDelta::hours(12))
    }

    #[test]
    fn login_rejects_bad_credentials() {
        let gate = gate();
        assert_eq!(
            gate.login("admin", "wrong").unwrap_err(),
            AuthError::InvalidCredentials
        );
        assert_eq!(
            gate.login("root", "secret").unwrap_err(),
            AuthError::InvalidCredentials
        );
    }

    #[test]
    fn issued_token_verifies_until_logout() {
        let gate = gate();
        let session = gate.login(" admin ", "secret").expect("login");
        gate.verify(&session.token).expect("verify");
        gate.logout(&session.token);
        assert_eq!(
            gate.verify(&session.token).unwrap_err(),
            AuthError::InvalidToken
        );
    }

    #[test]
    fn tokens_expire_after_ttl() {
        let gate = gate();
        let now = Utc::now();
        let session = gate.login_at("admin", "secret", now).expect("login");
        gate.verify_at(&session.token, now + TimeDelta::hours(11))
            .expect("still valid");
        assert_eq!(
            gate.verify_at(&session.token, now + TimeDelta::hours(12))
                .unwrap_err(),
            AuthError::Expired
        );
        assert_eq!(
            gate.verify_at(&session.token, now).unwrap_err(),
            AuthError::InvalidToken
        );
    }

    #[test]
    fn token_read_from_bearer_or_cookie() {
        let mut headers = HeaderMap::new();
        assert_eq!(session_token(&headers), None);

        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; msme_admin=abc123"),
        );
        assert_eq!(session_token(&headers), Some("abc123".to_string()));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer xyz"));
        assert_eq!(session_token(&headers), Some("xyz".to_string()));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("bearer lower"));
        assert_eq!(session_token(&headers), Some("lower".to_string()));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("BEARER  upper"));
        assert_eq!(session_token(&headers), Some("upper".to_string()));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic YWRtaW4="));
        assert_eq!(session_token(&headers), Some("abc123".to_string()));
    }

    #[test]
    fn configured_credentials_are_trimmed() {
        let gate = TokenSessionGate::new(" ops \n", "\tsecret ", TimeDelta::hours(1));
        let session = gate.login("ops", "secret").expect("login");
        gate.verify(&session.token).expect("verify");
    }
}
