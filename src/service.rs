use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::codes::{generate_certificate_code, verification_url};
use crate::db::{Certificate, CertificateRecord, CertificateStore, NewCertificate, StoreError};
use crate::qr::{generate_qr_code, EncodingError};
use crate::validation::ValidationError;

/// Insert attempts per creation: the first one plus a single retry with a
/// fresh code after a unique-index conflict.
const MAX_INSERT_ATTEMPTS: usize = 2;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("certificate not found")]
    NotFound,
    #[error("certificate code collided {0} times")]
    CodeConflict(usize),
    #[error("token encoding failed: {0}")]
    Encoding(#[from] EncodingError),
    #[error("store failure: {0}")]
    Store(StoreError),
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => ServiceError::NotFound,
            other => ServiceError::Store(other),
        }
    }
}

type CodeSource = Arc<dyn Fn() -> String + Send + Sync>;

/// Mediates every certificate state transition.
///
/// `Active --deactivate--> Inactive`, and either state `--delete--> gone`.
/// There is no way back to `Active`.
#[derive(Clone)]
pub struct CertificateService {
    store: Arc<dyn CertificateStore>,
    verification_base_url: String,
    next_code: CodeSource,
}

impl CertificateService {
    pub fn new(store: Arc<dyn CertificateStore>, verification_base_url: impl Into<String>) -> Self {
        Self {
            store,
            verification_base_url: verification_base_url.into(),
            next_code: Arc::new(generate_certificate_code),
        }
    }

    #[cfg(test)]
    fn with_code_source(mut self, source: impl Fn() -> String + Send + Sync + 'static) -> Self {
        self.next_code = Arc::new(source);
        self
    }

    pub fn verification_url(&self, code: &str) -> String {
        verification_url(&self.verification_base_url, code)
    }

    #[tracing::instrument(name = "Create certificate", skip_all, fields(recipient = %fields.recipient_name))]
    pub async fn create(&self, fields: NewCertificate) -> Result<Certificate, ServiceError> {
        if fields.recipient_name.trim().is_empty() {
            return Err(ValidationError::Required("recipient_name").into());
        }
        if fields.recipient_email.trim().is_empty() {
            return Err(ValidationError::Required("recipient_email").into());
        }

        for attempt in 1..=MAX_INSERT_ATTEMPTS {
            let code = (self.next_code)();
            let qr_code_url = generate_qr_code(&self.verification_url(&code))?;
            let record = CertificateRecord {
                fields: fields.clone(),
                certificate_code: code,
                qr_code_url,
                issue_date: Utc::now(),
            };

            match self.store.insert(record).await {
                Ok(certificate) => {
                    info!(id = %certificate.id, code = %certificate.certificate_code, "certificate issued");
                    return Ok(certificate);
                }
                Err(StoreError::UniqueViolation) => {
                    warn!(attempt, "certificate code collision");
                }
                Err(err) => return Err(err.into()),
            }
        }

        Err(ServiceError::CodeConflict(MAX_INSERT_ATTEMPTS))
    }

    /// Public lookup. Inactive and unknown codes both come back as `NotFound`.
    pub async fn get_by_code(&self, code: &str) -> Result<Certificate, ServiceError> {
        self.store
            .find_by_code(code, true)
            .await?
            .ok_or(ServiceError::NotFound)
    }

    pub async fn get(&self, id: Uuid) -> Result<Certificate, ServiceError> {
        self.store.find_by_id(id).await?.ok_or(ServiceError::NotFound)
    }

    pub async fn list_all(&self) -> Result<Vec<Certificate>, ServiceError> {
        Ok(self.store.find_all().await?)
    }

    /// Idempotent: deactivating an inactive certificate succeeds.
    #[tracing::instrument(name = "Deactivate certificate", skip(self))]
    pub async fn deactivate(&self, id: Uuid) -> Result<(), ServiceError> {
        self.store.update_active_flag(id, false).await?;
        info!("certificate deactivated");
        Ok(())
    }

    #[tracing::instrument(name = "Delete certificate", skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        self.store.delete_by_id(id).await?;
        info!("certificate deleted");
        Ok(())
    }
}
