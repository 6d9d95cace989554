use deunicode::deunicode_char;

use super::string_value;

/// URL path segment from free text (`"Jürg Müller"` becomes `juerg-mueller`).
///
/// German umlauts get their two-letter spelling, every other non-ASCII
/// character is transliterated, so non-Latin labels still yield a segment.
pub fn slugify(raw: &str) -> String {
    let text = string_value(raw).to_lowercase();
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;

    for c in text.chars() {
        let ascii = german_umlaut(c).or_else(|| deunicode_char(c)).unwrap_or("");
        for a in ascii.chars() {
            if a.is_ascii_alphanumeric() {
                if pending_dash && !slug.is_empty() {
                    slug.push('-');
                }
                pending_dash = false;
                slug.push(a.to_ascii_lowercase());
            } else {
                pending_dash = true;
            }
        }
        if ascii.is_empty() {
            pending_dash = true;
        }
    }
    slug
}

fn german_umlaut(c: char) -> Option<&'static str> {
    match c {
        'ä' => Some("ae"),
        'ö' => Some("oe"),
        'ü' => Some("ue"),
        'ß' => Some("ss"),
        _ => None,
    }
}
