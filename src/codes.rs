use chrono::Utc;
use rand::Rng;

const CODE_PREFIX: &str = "CERT";
const ALPHABET: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const RANDOM_LEN: usize = 8;

/// Generates a certificate code such as `CERT-MH6Y1Z2K-4QX0T9AB`.
///
/// The first segment is the current time in milliseconds, the second is
/// random. Uniqueness is probabilistic; the store's unique index decides.
pub fn generate_certificate_code() -> String {
    let millis = Utc::now().timestamp_millis().max(0) as u64;
    let mut rng = rand::rng();
    let random: String = (0..RANDOM_LEN)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect();

    format!("{}-{}-{}", CODE_PREFIX, to_base36(millis), random)
}

/// Public page where a certificate can be checked by its code.
pub fn verification_url(base_url: &str, code: &str) -> String {
    format!("{}/verify/{}", base_url.trim_end_matches('/'), code)
}

fn to_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(ALPHABET[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    String::from_utf8(digits).unwrap_or_default()
}
