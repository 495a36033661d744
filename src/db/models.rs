use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// CEFR level printed on the certificate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "deutsch_level")]
pub enum DeutschLevel {
    A1,
    A2,
    B1,
    B2,
    C1,
    C2,
}

impl DeutschLevel {
    pub const ALL: [DeutschLevel; 6] = [
        DeutschLevel::A1,
        DeutschLevel::A2,
        DeutschLevel::B1,
        DeutschLevel::B2,
        DeutschLevel::C1,
        DeutschLevel::C2,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DeutschLevel::A1 => "A1",
            DeutschLevel::A2 => "A2",
            DeutschLevel::B1 => "B1",
            DeutschLevel::B2 => "B2",
            DeutschLevel::C1 => "C1",
            DeutschLevel::C2 => "C2",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(value.trim()))
    }
}

impl std::fmt::Display for DeutschLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Certificate {
    pub id: Uuid,
    pub certificate_code: String,
    pub recipient_name: String,
    pub recipient_email: String,
    pub deutschlevel: Option<DeutschLevel>,
    pub geburtstag: Option<String>,
    pub geburtsort: Option<String>,
    pub pruefungsdatum: Option<String>,
    pub pruefungsort: Option<String>,
    pub hoeren: Option<i32>,
    pub lesen: Option<i32>,
    pub schreiben: Option<i32>,
    pub sprechen: Option<i32>,
    pub qr_code_url: String,
    pub is_active: bool,
    pub issue_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated certificate fields supplied by an administrator.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NewCertificate {
    pub recipient_name: String,
    pub recipient_email: String,
    pub deutschlevel: Option<DeutschLevel>,
    pub geburtstag: Option<String>,
    pub geburtsort: Option<String>,
    pub pruefungsdatum: Option<String>,
    pub pruefungsort: Option<String>,
    pub hoeren: Option<i32>,
    pub lesen: Option<i32>,
    pub schreiben: Option<i32>,
    pub sprechen: Option<i32>,
}

/// A fully composed row ready for insertion: fields plus the generated code,
/// its token and the issue timestamp.
#[derive(Debug, Clone)]
pub struct CertificateRecord {
    pub fields: NewCertificate,
    pub certificate_code: String,
    pub qr_code_url: String,
    pub issue_date: DateTime<Utc>,
}
