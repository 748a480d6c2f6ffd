//! Owner identity normalization.
//!
//! Tokens minted by different clients carry the same subject with stray
//! whitespace, zero-width characters or different casing. Every stored owner
//! and every ownership comparison goes through [`normalize`].

const ZERO_WIDTH: [char; 5] = ['\u{200B}', '\u{200C}', '\u{200D}', '\u{2060}', '\u{FEFF}'];

/// Strips zero-width characters, then trims.
///
/// This is what the authentication filter applies to the token subject.
pub fn clean(raw: &str) -> String {
    let stripped: String = raw.chars().filter(|c| !ZERO_WIDTH.contains(c)).collect();
    stripped.trim().to_string()
}

/// `clean` + case folding. Idempotent.
pub fn normalize(raw: &str) -> String {
    clean(raw).to_lowercase()
}

pub fn same_identity(a: &str, b: &str) -> bool {
    normalize(a) == normalize(b)
}
