use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderMap},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::auth::{cleared_cookie, extract_cookie, session_cookie, SESSION_COOKIE};
use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    email: Option<String>,
    password: Option<String>,
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let (email, password) = match (payload.email, payload.password) {
        (Some(email), Some(password)) if !email.is_empty() && !password.is_empty() => {
            (email, password)
        }
        _ => return Err(AppError::BadRequest("Email and password are required".to_string())),
    };

    if email != state.config.admin_email || password != state.config.admin_password {
        tracing::warn!("failed admin login attempt");
        return Err(AppError::Unauthorized("Invalid credentials"));
    }

    let token = state.sessions.create().await;
    let cookie = session_cookie(
        &token,
        state.sessions.ttl_seconds(),
        state.config.secure_cookies,
    );
    tracing::info!("admin session opened");

    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(json!({
            "message": "Authentication successful",
            "user": {"isAuthenticated": true, "email": email},
        })),
    ))
}

pub async fn logout(State(state): State<Arc<AppState>>, headers: HeaderMap) -> impl IntoResponse {
    if let Some(token) = extract_cookie(&headers, SESSION_COOKIE) {
        state.sessions.revoke(&token).await;
    }
    (
        [(header::SET_COOKIE, cleared_cookie())],
        Json(json!({"message": "Logged out"})),
    )
}
