use async_trait::async_trait;
use uuid::Uuid;

use super::{Certificate, CertificateRecord, CertificateStore, DbPool, StoreError};

#[derive(Clone)]
pub struct PgCertificateStore {
    pool: DbPool,
}

impl PgCertificateStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_insert_error(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            StoreError::UniqueViolation
        }
        _ => StoreError::Database(err),
    }
}

#[async_trait]
impl CertificateStore for PgCertificateStore {
    #[tracing::instrument(name = "Insert certificate", skip_all, fields(code = %record.certificate_code))]
    async fn insert(&self, record: CertificateRecord) -> Result<Certificate, StoreError> {
        let fields = &record.fields;
        sqlx::query_as::<_, Certificate>(
            r#"
            INSERT INTO certificates (
                certificate_code, recipient_name, recipient_email, deutschlevel,
                geburtstag, geburtsort, pruefungsdatum, pruefungsort,
                hoeren, lesen, schreiben, sprechen,
                qr_code_url, is_active, issue_date
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, true, $14)
            RETURNING *
            "#,
        )
        .bind(&record.certificate_code)
        .bind(&fields.recipient_name)
        .bind(&fields.recipient_email)
        .bind(fields.deutschlevel)
        .bind(&fields.geburtstag)
        .bind(&fields.geburtsort)
        .bind(&fields.pruefungsdatum)
        .bind(&fields.pruefungsort)
        .bind(fields.hoeren)
        .bind(fields.lesen)
        .bind(fields.schreiben)
        .bind(fields.sprechen)
        .bind(&record.qr_code_url)
        .bind(record.issue_date)
        .fetch_one(self.pool.as_ref())
        .await
        .map_err(map_insert_error)
    }

    async fn find_by_code(
        &self,
        code: &str,
        active_only: bool,
    ) -> Result<Option<Certificate>, StoreError> {
        let certificate = sqlx::query_as::<_, Certificate>(
            "SELECT * FROM certificates WHERE certificate_code = $1 AND (is_active OR NOT $2)",
        )
        .bind(code)
        .bind(active_only)
        .fetch_optional(self.pool.as_ref())
        .await?;
        Ok(certificate)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Certificate>, StoreError> {
        let certificate =
            sqlx::query_as::<_, Certificate>("SELECT * FROM certificates WHERE id = $1")
                .bind(id)
                .fetch_optional(self.pool.as_ref())
                .await?;
        Ok(certificate)
    }

    async fn find_all(&self) -> Result<Vec<Certificate>, StoreError> {
        let certificates = sqlx::query_as::<_, Certificate>(
            "SELECT * FROM certificates ORDER BY created_at DESC",
        )
        .fetch_all(self.pool.as_ref())
        .await?;
        Ok(certificates)
    }

    async fn update_active_flag(&self, id: Uuid, active: bool) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE certificates SET is_active = $2, updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .bind(active)
        .execute(self.pool.as_ref())
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM certificates WHERE id = $1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
