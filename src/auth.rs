//! Administrator sessions.
//!
//! A successful login stores a random token with an expiry and hands it to
//! the browser in the `admin-session` HttpOnly cookie. Admin routes take an
//! [`AdminSession`] argument, which rejects the request with 401 before the
//! handler runs when the cookie is missing, unknown or expired.

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts, HeaderMap};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

pub const SESSION_COOKIE: &str = "admin-session";

#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, DateTime<Utc>>>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl_hours: i64) -> Self {
        Self {
            sessions: Arc::default(),
            ttl: Duration::hours(ttl_hours),
        }
    }

    pub fn ttl_seconds(&self) -> i64 {
        self.ttl.num_seconds()
    }

    /// Opens a session and returns its token.
    pub async fn create(&self) -> String {
        let token = format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple());
        let expires_at = Utc::now() + self.ttl;

        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, expiry| *expiry > Utc::now());
        sessions.insert(token.clone(), expires_at);
        token
    }

    pub async fn is_valid(&self, token: &str) -> bool {
        let sessions = self.sessions.read().await;
        matches!(sessions.get(token), Some(expiry) if *expiry > Utc::now())
    }

    pub async fn revoke(&self, token: &str) {
        self.sessions.write().await.remove(token);
    }

    #[cfg(test)]
    async fn expire(&self, token: &str) {
        if let Some(expiry) = self.sessions.write().await.get_mut(token) {
            *expiry = Utc::now() - Duration::seconds(1);
        }
    }
}

/// Extract cookie value from Cookie header
pub fn extract_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    let prefix = format!("{}=", name);
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .map(str::trim)
        .find_map(|pair| pair.strip_prefix(&prefix))
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

pub fn session_cookie(token: &str, max_age_secs: i64, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; HttpOnly; SameSite=Strict; Path=/; Max-Age={}",
        SESSION_COOKIE, token, max_age_secs
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

pub fn cleared_cookie() -> String {
    format!("{}=; HttpOnly; SameSite=Strict; Path=/; Max-Age=0", SESSION_COOKIE)
}

/// Proof that the request carries a live administrator session.
#[derive(Debug)]
pub struct AdminSession {
    pub token: String,
}

#[axum::async_trait]
impl FromRequestParts<Arc<AppState>> for AdminSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_cookie(&parts.headers, SESSION_COOKIE)
            .ok_or(AppError::Unauthorized("Unauthorized"))?;

        if !state.sessions.is_valid(&token).await {
            tracing::debug!("rejected unknown or expired admin session");
            return Err(AppError::Unauthorized("Unauthorized"));
        }
        Ok(AdminSession { token })
    }
}
