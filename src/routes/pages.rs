use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use std::sync::Arc;
use tera::Context;

use crate::layout;
use crate::service::ServiceError;
use crate::state::AppState;

pub async fn index() -> impl IntoResponse {
    render_template("index.html", &Context::new())
}

#[derive(Debug, Deserialize)]
pub struct LookupQuery {
    code: Option<String>,
}

pub async fn verify_lookup(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LookupQuery>,
) -> Response {
    let code = query.code.unwrap_or_default();
    let code = code.trim();
    if code.is_empty() {
        return Redirect::to("/").into_response();
    }
    if !code.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return not_found(&state, code);
    }
    Redirect::to(&format!("/verify/{}", code)).into_response()
}

pub async fn verify_page(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> Response {
    let certificate = match state.service.get_by_code(&code).await {
        Ok(c) => c,
        Err(ServiceError::NotFound) => return not_found(&state, &code),
        Err(e) => {
            tracing::error!("Failed to verify certificate: {}", e);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Verification is unavailable")
                .into_response();
        }
    };

    let document = layout::render(&certificate, &state.branding);
    let mut ctx = Context::new();
    ctx.insert("certificate", &certificate);
    ctx.insert("document", &document);
    ctx.insert("issued", &certificate.issue_date.format("%d.%m.%Y").to_string());

    render_template("verify.html", &ctx).into_response()
}

fn not_found(state: &AppState, code: &str) -> Response {
    let mut ctx = Context::new();
    ctx.insert("code", code);
    ctx.insert("contact_email", &state.config.contact_email);
    (StatusCode::NOT_FOUND, render_template("not_found.html", &ctx)).into_response()
}

fn render_template(name: &str, ctx: &Context) -> Html<String> {
    let tera = crate::templates::get_tera();
    let rendered = tera.render(name, ctx).unwrap_or_else(|e| {
        tracing::error!("Template error in {}: {}", name, e);
        format!("Template error: {}", name)
    });
    Html(rendered)
}
