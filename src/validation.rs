//! Input schema for certificate creation, checked once at the HTTP boundary.

use chrono::NaiveDate;
use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;
use thiserror::Error;

use crate::db::{DeutschLevel, NewCertificate};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(&'static str),
    #[error("recipient_email is not a valid email address")]
    InvalidEmail,
    #[error("deutschlevel must be one of A1, A2, B1, B2, C1, C2")]
    InvalidLevel,
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateCertificateRequest {
    pub recipient_name: Option<String>,
    pub recipient_email: Option<String>,
    pub deutschlevel: Option<String>,
    pub geburtstag: Option<String>,
    pub geburtsort: Option<String>,
    pub pruefungsdatum: Option<String>,
    pub pruefungsort: Option<String>,
    pub hoeren: Option<i32>,
    pub lesen: Option<i32>,
    pub schreiben: Option<i32>,
    pub sprechen: Option<i32>,
}

impl CreateCertificateRequest {
    pub fn validate(self) -> Result<NewCertificate, ValidationError> {
        let recipient_name =
            optional(self.recipient_name).ok_or(ValidationError::Required("recipient_name"))?;
        let recipient_email =
            optional(self.recipient_email).ok_or(ValidationError::Required("recipient_email"))?;
        if !looks_like_email(&recipient_email) {
            return Err(ValidationError::InvalidEmail);
        }

        let deutschlevel = match optional(self.deutschlevel) {
            Some(level) => Some(DeutschLevel::parse(&level).ok_or(ValidationError::InvalidLevel)?),
            None => None,
        };

        Ok(NewCertificate {
            recipient_name,
            recipient_email,
            deutschlevel,
            geburtstag: optional(self.geburtstag).map(|d| to_calendar_date(&d)),
            geburtsort: optional(self.geburtsort),
            pruefungsdatum: optional(self.pruefungsdatum).map(|d| to_calendar_date(&d)),
            pruefungsort: optional(self.pruefungsort),
            hoeren: self.hoeren,
            lesen: self.lesen,
            schreiben: self.schreiben,
            sprechen: self.sprechen,
        })
    }
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn looks_like_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !value.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

fn display_date_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(\d{1,2})\.(\d{1,2})\.(\d{4})$").expect("display date pattern is valid")
    })
}

/// Converts `D.M.YYYY` input into sortable `YYYY-MM-DD`. Impossible dates
/// such as `31.02.2024` and anything else are kept verbatim.
pub fn to_calendar_date(value: &str) -> String {
    display_date_pattern()
        .captures(value)
        .and_then(|caps| {
            let day = caps[1].parse().ok()?;
            let month = caps[2].parse().ok()?;
            let year = caps[3].parse().ok()?;
            NaiveDate::from_ymd_opt(year, month, day)
        })
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| value.to_string())
}
