use regex::Regex;
use std::sync::OnceLock;

fn calendar_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(\d{4})-(\d{2})-(\d{2})$").expect("calendar date pattern is valid")
    })
}

/// `YYYY-MM-DD` becomes `DD.MM.YYYY`; any other value is returned unchanged.
pub fn format_display(value: &str) -> String {
    match calendar_pattern().captures(value) {
        Some(caps) => format!("{}.{}.{}", &caps[3], &caps[2], &caps[1]),
        None => value.to_string(),
    }
}
