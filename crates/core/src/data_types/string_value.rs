use regex::Regex;
use std::sync::LazyLock;

static TAG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("Invalid regex pattern"));

static WHITESPACE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("Invalid regex pattern"));

/// Plain text value: tags stripped, whitespace collapsed, trimmed.
pub fn string_value(raw: &str) -> String {
    let stripped = TAG_REGEX.replace_all(raw, "");
    WHITESPACE_REGEX
        .replace_all(stripped.trim(), " ")
        .into_owned()
}

/// Leading integer of the plain text value, 0 when there is none.
pub fn integer(raw: &str) -> i64 {
    let text = string_value(raw);
    let mut end = 0;
    for (idx, c) in text.char_indices() {
        if c.is_ascii_digit() || (idx == 0 && (c == '-' || c == '+')) {
            end = idx + c.len_utf8();
        } else {
            break;
        }
    }
    text[..end].parse().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_value_strips_markup() {
        assert_eq!(
            string_value("  <b>Jane</b>\n\t Doe  "),
            "Jane Doe".to_string()
        );
        assert_eq!(string_value(""), "");
    }

    #[test]
    fn test_integer_uses_leading_digits() {
        assert_eq!(integer(" 42 apples"), 42);
        assert_eq!(integer("-7"), -7);
        assert_eq!(integer("<i>12</i>"), 12);
        assert_eq!(integer("abc"), 0);
        assert_eq!(integer("-"), 0);
    }
}
