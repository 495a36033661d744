use super::palette::{
    BORDER, DEEP_ACCENT, MUTED, PRIMARY_TEXT, SIGNAL_RED, TABLE_HEADER_BG, TABLE_ROW_BG,
};
use super::{format_display, run, Anchor, Document, Page, TextStyle, PAGE_WIDTH};
use crate::config::Config;
use crate::db::{Certificate, DeutschLevel};

const MARGIN: f64 = 15.0;
const MISSING: &str = "—";
const MAX_SCORE: &str = "100";
const LOGO_SIZE: f64 = 35.0;

/// School-specific text printed on every certificate.
#[derive(Debug, Clone, PartialEq)]
pub struct Branding {
    pub city: String,
    pub verification_host: String,
    pub contact_email: String,
    /// PNG data URL drawn in the top right corner of both pages.
    pub logo: Option<String>,
}

impl Branding {
    pub fn from_config(config: &Config) -> Self {
        Self {
            city: config.city.clone(),
            verification_host: config.verification_host().to_string(),
            contact_email: config.contact_email.clone(),
            logo: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Skill {
    Hoeren,
    Lesen,
    Schreiben,
    Sprechen,
}

pub const SKILLS: [Skill; 4] = [Skill::Hoeren, Skill::Lesen, Skill::Schreiben, Skill::Sprechen];

impl Skill {
    pub fn label(self) -> &'static str {
        match self {
            Skill::Hoeren => "Hören- Listening",
            Skill::Lesen => "Lesen- Reading",
            Skill::Schreiben => "Schreiben- Writing",
            Skill::Sprechen => "Sprechen- Speaking",
        }
    }

    /// Attained score; absent scores count as zero.
    pub fn score(self, certificate: &Certificate) -> i32 {
        let score = match self {
            Skill::Hoeren => certificate.hoeren,
            Skill::Lesen => certificate.lesen,
            Skill::Schreiben => certificate.schreiben,
            Skill::Sprechen => certificate.sprechen,
        };
        score.unwrap_or(0)
    }
}

/// One row of the static rating scale on page two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatingBand {
    pub min: u8,
    pub max: u8,
    pub rating: &'static str,
}

pub const RATING_SCALE: [RatingBand; 5] = [
    RatingBand { min: 90, max: 100, rating: "SEHR GUT · VERY GOOD" },
    RatingBand { min: 80, max: 89, rating: "GUT · GOOD" },
    RatingBand { min: 70, max: 79, rating: "BEFRIEDIGEND · SATISFACTORY" },
    RatingBand { min: 60, max: 69, rating: "AUSREICHEND · PASS" },
    RatingBand { min: 0, max: 59, rating: "NICHT BESTANDEN · FAIL" },
];

impl RatingBand {
    pub fn points_label(&self) -> String {
        format!("{} – {}", self.max, self.min)
    }
}

fn or_missing(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => MISSING.to_string(),
    }
}

fn display_date(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.is_empty() => format_display(v),
        _ => MISSING.to_string(),
    }
}

/// Lays out both pages of `certificate`. Pure: no I/O, same output for the
/// same input.
pub fn render(certificate: &Certificate, branding: &Branding) -> Document {
    Document {
        title: format!("Certificate {}", certificate.certificate_code),
        pages: [
            certificate_page(certificate, branding),
            rating_scale_page(branding),
        ],
    }
}

fn push_logo(page: &mut Page, branding: &Branding) {
    if let Some(logo) = &branding.logo {
        page.push_image(PAGE_WIDTH - 50.0, MARGIN + 10.0, LOGO_SIZE, LOGO_SIZE, logo);
    }
}

fn certificate_page(certificate: &Certificate, branding: &Branding) -> Page {
    let mut page = Page::new();
    let mut y = MARGIN + 10.0;
    push_logo(&mut page, branding);

    page.push_runs(
        MARGIN,
        y,
        TextStyle::bold(26),
        Anchor::Left,
        vec![
            run("KIGALI ", PRIMARY_TEXT),
            run("DEUTSCH", DEEP_ACCENT),
            run(" ACADEMY", PRIMARY_TEXT),
        ],
    );
    y += 18.0;

    let level = certificate.deutschlevel.unwrap_or(DeutschLevel::A1);
    page.push_text(
        MARGIN,
        y,
        TextStyle::bold(14),
        &format!("{} - DEUTSCH - ZERTIFIKAT", level),
        SIGNAL_RED,
    );
    y += 14.0;

    for (index, candidate) in DeutschLevel::ALL.into_iter().enumerate() {
        let color = if candidate == level { PRIMARY_TEXT } else { SIGNAL_RED };
        page.push_text(
            MARGIN + index as f64 * 20.0,
            y,
            TextStyle::bold(18),
            candidate.as_str(),
            color,
        );
    }
    y += 35.0;

    // two label columns, German label over English sublabel
    let left_x = MARGIN + 15.0;
    let right_x = PAGE_WIDTH / 2.0 + 10.0;
    let mut left_y = y;
    let mut right_y = y;

    let left = [
        ("Vorname und Name", "First and Surname", or_missing(Some(certificate.recipient_name.as_str()))),
        ("Geburtsdatum", "Date of Birth", display_date(certificate.geburtstag.as_deref())),
        ("Geburtsort", "Place of Birth", or_missing(certificate.geburtsort.as_deref())),
    ];
    for (label, sublabel, value) in &left {
        field(&mut page, left_x, &mut left_y, label, sublabel, value);
    }

    let right = [
        ("Prüfungsdatum", "Exam date", display_date(certificate.pruefungsdatum.as_deref())),
        ("Prüfungsort", "Place of exam", or_missing(certificate.pruefungsort.as_deref())),
    ];
    for (label, sublabel, value) in &right {
        field(&mut page, right_x, &mut right_y, label, sublabel, value);
    }

    y = left_y.max(right_y) + 8.0;

    page.push_text(left_x, y, TextStyle::bold(13), "Ergebnis - Results", DEEP_ACCENT);
    y += 10.0;
    y = results_table(&mut page, certificate, left_x, y);
    y += 12.0;

    page.push_text(MARGIN, y, TextStyle::regular(10), &format!("{},", branding.city), PRIMARY_TEXT);
    page.push_text(
        MARGIN + 25.0,
        y,
        TextStyle::regular(10),
        &display_date(certificate.pruefungsdatum.as_deref()),
        PRIMARY_TEXT,
    );
    y += 6.0;
    page.push_text(MARGIN, y, TextStyle::regular(8), "Ort Datum - Location, date", MUTED);
    y += 4.0;

    let token_size = 50.0;
    let token_x = PAGE_WIDTH - MARGIN - token_size;
    if !certificate.qr_code_url.is_empty() {
        page.push_token(token_x, y, token_size, &certificate.qr_code_url);
    }

    let footer = TextStyle::regular(8);
    page.push_text(
        MARGIN,
        y + 8.0,
        TextStyle::regular(9),
        "Please verify this certificate with code:",
        PRIMARY_TEXT,
    );
    page.push_text(
        MARGIN,
        y + 16.0,
        TextStyle::bold(13),
        &or_missing(Some(certificate.certificate_code.as_str())),
        PRIMARY_TEXT,
    );
    page.push_text(
        MARGIN,
        y + 28.0,
        footer,
        &format!("Visit: {}", branding.verification_host),
        PRIMARY_TEXT,
    );
    page.push_text(
        MARGIN,
        y + 33.0,
        footer,
        &format!("Email: {}", branding.contact_email),
        PRIMARY_TEXT,
    );
    page.push_text(MARGIN, y + 38.0, footer, "Or scan the QR code", PRIMARY_TEXT);

    page
}

fn field(page: &mut Page, x: f64, y: &mut f64, label: &str, sublabel: &str, value: &str) {
    page.push_text(x, *y, TextStyle::bold(10), label, DEEP_ACCENT);
    page.push_text(x + 50.0, *y, TextStyle::regular(10), value, PRIMARY_TEXT);
    *y += 4.0;
    page.push_text(x, *y, TextStyle::italic(8), sublabel, MUTED);
    *y += 10.0;
}

/// Draws the header plus one row per skill and returns the y below the table.
fn results_table(page: &mut Page, certificate: &Certificate, x: f64, mut y: f64) -> f64 {
    const SKILL_COL: f64 = 70.0;
    const SCORE_COL: f64 = 50.0;
    const MAX_COL: f64 = 40.0;
    const ROW_HEIGHT: f64 = 11.0;
    let width = SKILL_COL + SCORE_COL + MAX_COL;

    page.push_rect(x, y, width, ROW_HEIGHT, Some(TABLE_HEADER_BG), Some(BORDER));
    page.push_text(x + SKILL_COL + 3.0, y + 4.0, TextStyle::bold(9), "Erreichte Punktstand", PRIMARY_TEXT);
    page.push_text(
        x + SKILL_COL + SCORE_COL + 3.0,
        y + 4.0,
        TextStyle::bold(9),
        "maximale Punktzahl",
        PRIMARY_TEXT,
    );
    page.push_text(x + SKILL_COL + 3.0, y + 8.0, TextStyle::bold(8), "Attained score", PRIMARY_TEXT);
    page.push_text(
        x + SKILL_COL + SCORE_COL + 3.0,
        y + 8.0,
        TextStyle::bold(8),
        "maximum score",
        PRIMARY_TEXT,
    );
    y += ROW_HEIGHT;

    for (index, skill) in SKILLS.into_iter().enumerate() {
        let fill = (index % 2 == 0).then_some(TABLE_ROW_BG);
        page.push_rect(x, y, width, ROW_HEIGHT, fill, Some(BORDER));

        let body = TextStyle::regular(10);
        page.push_text(x + 3.0, y + 7.0, body, skill.label(), PRIMARY_TEXT);
        page.push_text(
            x + SKILL_COL + 20.0,
            y + 7.0,
            body,
            &skill.score(certificate).to_string(),
            PRIMARY_TEXT,
        );
        page.push_text(x + SKILL_COL + SCORE_COL + 15.0, y + 7.0, body, MAX_SCORE, PRIMARY_TEXT);
        y += ROW_HEIGHT;
    }

    y
}

fn rating_scale_page(branding: &Branding) -> Page {
    const TABLE_WIDTH: f64 = 150.0;
    const POINTS_COL: f64 = 75.0;
    const ROW_HEIGHT: f64 = 12.0;

    let mut page = Page::new();
    let mut y = MARGIN + 10.0;
    push_logo(&mut page, branding);

    page.push_text(MARGIN, y, TextStyle::bold(28), "KIGALI DEUTSCH ACADEMY", PRIMARY_TEXT);
    y += 15.0;

    page.push_runs(
        PAGE_WIDTH / 2.0,
        y,
        TextStyle::bold(14),
        Anchor::Center,
        vec![run("Bewertungsskala – Rating Scale", DEEP_ACCENT)],
    );
    y += 12.0;

    let x = (PAGE_WIDTH - TABLE_WIDTH) / 2.0;
    let cell = TextStyle::bold(10);

    page.push_rect(x, y, TABLE_WIDTH, ROW_HEIGHT, Some(TABLE_HEADER_BG), Some(BORDER));
    page.push_text(x + 5.0, y + 8.0, cell, "PUNKTE · POINTS", PRIMARY_TEXT);
    page.push_text(x + POINTS_COL + 5.0, y + 8.0, cell, "PRÄDIKAT · RATING", PRIMARY_TEXT);
    y += ROW_HEIGHT;

    for (index, band) in RATING_SCALE.iter().enumerate() {
        let fill = (index % 2 == 0).then_some(TABLE_ROW_BG);
        page.push_rect(x, y, TABLE_WIDTH, ROW_HEIGHT, fill, Some(BORDER));
        page.push_text(x + 5.0, y + 8.0, cell, &band.points_label(), PRIMARY_TEXT);
        page.push_text(x + POINTS_COL + 5.0, y + 8.0, cell, band.rating, PRIMARY_TEXT);
        y += ROW_HEIGHT;
    }

    page
}
