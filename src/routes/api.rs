use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::AdminSession;
use crate::db::Certificate;
use crate::error::AppError;
use crate::layout;
use crate::pdf;
use crate::state::AppState;
use crate::validation::CreateCertificateRequest;

type ApiResult<T> = Result<T, AppError>;

/// Ids that are not UUIDs cannot name a certificate.
fn certificate_id(raw: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound("Certificate not found"))
}

pub async fn create_certificate(
    _admin: AdminSession,
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateCertificateRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Certificate>)> {
    let Json(payload) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let fields = payload.validate()?;

    let certificate = state
        .service
        .create(fields)
        .await
        .map_err(|e| AppError::from_service(e, "Failed to create certificate"))?;
    Ok((StatusCode::CREATED, Json(certificate)))
}

pub async fn list_certificates(
    _admin: AdminSession,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<Certificate>>> {
    let certificates = state
        .service
        .list_all()
        .await
        .map_err(|e| AppError::from_service(e, "Failed to fetch certificates"))?;
    Ok(Json(certificates))
}

pub async fn get_certificate(
    _admin: AdminSession,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Certificate>> {
    let id = certificate_id(&id)?;
    let certificate = state
        .service
        .get(id)
        .await
        .map_err(|e| AppError::from_service(e, "Failed to fetch certificate"))?;
    Ok(Json(certificate))
}

#[derive(Debug, Deserialize)]
pub struct UpdateRequest {
    action: Option<String>,
}

pub async fn update_certificate(
    _admin: AdminSession,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateRequest>, JsonRejection>,
) -> ApiResult<Json<serde_json::Value>> {
    let id = certificate_id(&id)?;
    let Json(payload) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;

    match payload.action.as_deref() {
        Some("deactivate") => {
            state
                .service
                .deactivate(id)
                .await
                .map_err(|e| AppError::from_service(e, "Failed to update certificate"))?;
            Ok(Json(json!({"message": "Certificate deactivated successfully"})))
        }
        _ => Err(AppError::BadRequest("Invalid action".to_string())),
    }
}

pub async fn delete_certificate(
    _admin: AdminSession,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    let id = certificate_id(&id)?;
    state
        .service
        .delete(id)
        .await
        .map_err(|e| AppError::from_service(e, "Failed to delete certificate"))?;
    Ok(Json(json!({"message": "Certificate deleted successfully"})))
}

pub async fn download_certificate(
    _admin: AdminSession,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let id = certificate_id(&id)?;
    let certificate = state
        .service
        .get(id)
        .await
        .map_err(|e| AppError::from_service(e, "Failed to fetch certificate"))?;

    let document = layout::render(&certificate, &state.branding);
    let font_dir = state.config.font_dir.clone();
    let bytes = tokio::task::spawn_blocking(move || {
        let fonts = pdf::load_fonts(font_dir.as_deref())?;
        pdf::render_pdf(&document, fonts)
    })
    .await
    .map_err(|e| {
        tracing::error!("PDF task panicked: {}", e);
        AppError::Internal("Failed to generate PDF")
    })?
    .map_err(|e| {
        tracing::error!(code = %certificate.certificate_code, "PDF generation failed: {}", e);
        AppError::Internal("Failed to generate PDF")
    })?;

    let disposition = format!(
        "attachment; filename=\"Certificate-{}.pdf\"",
        certificate.certificate_code
    );
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    ))
}

/// Public lookup; inactive and unknown codes are indistinguishable.
pub async fn verify_certificate(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> ApiResult<Json<Certificate>> {
    let certificate = state
        .service
        .get_by_code(&code)
        .await
        .map_err(|e| AppError::from_service(e, "Failed to verify certificate"))?;
    Ok(Json(certificate))
}
