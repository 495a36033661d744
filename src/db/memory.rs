//! In-process store with the same contract as the postgres one.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{Certificate, CertificateRecord, CertificateStore, StoreError};

#[derive(Default)]
pub struct MemoryStore {
    rows: Mutex<Vec<Certificate>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.rows.lock().await.len()
    }
}

#[async_trait]
impl CertificateStore for MemoryStore {
    async fn insert(&self, record: CertificateRecord) -> Result<Certificate, StoreError> {
        let mut rows = self.rows.lock().await;
        if rows
            .iter()
            .any(|row| row.certificate_code == record.certificate_code)
        {
            return Err(StoreError::UniqueViolation);
        }

        let now = Utc::now();
        let fields = record.fields;
        let certificate = Certificate {
            id: Uuid::new_v4(),
            certificate_code: record.certificate_code,
            recipient_name: fields.recipient_name,
            recipient_email: fields.recipient_email,
            deutschlevel: fields.deutschlevel,
            geburtstag: fields.geburtstag,
            geburtsort: fields.geburtsort,
            pruefungsdatum: fields.pruefungsdatum,
            pruefungsort: fields.pruefungsort,
            hoeren: fields.hoeren,
            lesen: fields.lesen,
            schreiben: fields.schreiben,
            sprechen: fields.sprechen,
            qr_code_url: record.qr_code_url,
            is_active: true,
            issue_date: record.issue_date,
            created_at: now,
            updated_at: now,
        };
        rows.push(certificate.clone());
        Ok(certificate)
    }

    async fn find_by_code(
        &self,
        code: &str,
        active_only: bool,
    ) -> Result<Option<Certificate>, StoreError> {
        let rows = self.rows.lock().await;
        Ok(rows
            .iter()
            .find(|row| row.certificate_code == code && (row.is_active || !active_only))
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Certificate>, StoreError> {
        let rows = self.rows.lock().await;
        Ok(rows.iter().find(|row| row.id == id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Certificate>, StoreError> {
        let rows = self.rows.lock().await;
        let mut all: Vec<Certificate> = rows.iter().rev().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }

    async fn update_active_flag(&self, id: Uuid, active: bool) -> Result<(), StoreError> {
        let mut rows = self.rows.lock().await;
        let row = rows
            .iter_mut()
            .find(|row| row.id == id)
            .ok_or(StoreError::NotFound)?;
        row.is_active = active;
        row.updated_at = Utc::now();
        Ok(())
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<(), StoreError> {
        let mut rows = self.rows.lock().await;
        let before = rows.len();
        rows.retain(|row| row.id != id);
        if rows.len() == before {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
