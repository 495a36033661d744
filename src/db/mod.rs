mod models;
mod postgres;

#[cfg(test)]
pub mod memory;

pub use models::*;
pub use postgres::PgCertificateStore;

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

pub type DbPool = Arc<PgPool>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("certificate code already exists")]
    UniqueViolation,
    #[error("certificate not found")]
    NotFound,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Persistence boundary for certificate rows.
///
/// Every call is a single-row operation; the unique index on
/// `certificate_code` is the only cross-row guarantee.
#[async_trait]
pub trait CertificateStore: Send + Sync {
    /// Persists a new row, assigning its id and timestamps.
    async fn insert(&self, record: CertificateRecord) -> Result<Certificate, StoreError>;

    async fn find_by_code(
        &self,
        code: &str,
        active_only: bool,
    ) -> Result<Option<Certificate>, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Certificate>, StoreError>;

    /// All rows, newest first.
    async fn find_all(&self) -> Result<Vec<Certificate>, StoreError>;

    async fn update_active_flag(&self, id: Uuid, active: bool) -> Result<(), StoreError>;

    async fn delete_by_id(&self, id: Uuid) -> Result<(), StoreError>;
}

pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    Ok(Arc::new(pool))
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
