use ego_tree::NodeRef;
use regex::Regex;
use scraper::{Html, Node};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::errors::{DataTypeError, Result};

static EMPTY_LINES_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(^[\r\n]*|[\r\n]+)[\s\t]*[\r\n]+").expect("Invalid regex pattern")
});

static LINE_SPLIT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\r\n|\r|\n").expect("Invalid regex pattern"));

static WHITESPACE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("Invalid regex pattern"));

const VOID_TAGS: &[&str] = &["br", "hr", "img"];

const URL_ATTRIBUTES: &[&str] = &["href", "src", "cite", "action"];

const SAFE_URL_SCHEMES: &[&str] = &["http", "https", "mailto"];

/// A regex replacement applied to the HTML text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternReplacement {
    pub pattern: String,
    #[serde(default)]
    pub replacement: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HtmlContentOptions {
    #[serde(default = "default_allowed_tags")]
    pub allowed_tags: Vec<String>,
    #[serde(default = "default_allowed_attributes")]
    pub allowed_attributes: Vec<String>,
    #[serde(default)]
    pub pre_processing: Vec<PatternReplacement>,
    #[serde(default)]
    pub processing_per_line: Vec<PatternReplacement>,
    #[serde(default)]
    pub post_processing: Vec<PatternReplacement>,
}

impl Default for HtmlContentOptions {
    fn default() -> Self {
        Self {
            allowed_tags: default_allowed_tags(),
            allowed_attributes: default_allowed_attributes(),
            pre_processing: Vec::new(),
            processing_per_line: Vec::new(),
            post_processing: Vec::new(),
        }
    }
}

fn default_allowed_tags() -> Vec<String> {
    [
        "p", "br", "strong", "b", "em", "i", "u", "a", "ul", "ol", "li", "h1", "h2", "h3", "h4",
        "h5", "h6", "blockquote", "sub", "sup",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_allowed_attributes() -> Vec<String> {
    vec!["href".to_string(), "title".to_string()]
}

/// Normalised rich text: purified against an allow-list and flattened onto one line.
pub struct HtmlContent {
    options: HtmlContentOptions,
    pre_processing: Vec<(Regex, String)>,
    processing_per_line: Vec<(Regex, String)>,
    post_processing: Vec<(Regex, String)>,
}

impl HtmlContent {
    pub fn new(options: &HtmlContentOptions) -> Result<Self> {
        Ok(Self {
            pre_processing: compile(&options.pre_processing)?,
            processing_per_line: compile(&options.processing_per_line)?,
            post_processing: compile(&options.post_processing)?,
            options: options.clone(),
        })
    }

    pub fn convert(&self, raw: &str) -> String {
        let mut value = self.purify(raw.trim());

        for tag in ["<ul>", "</ul>", "<ol>", "</ol>"] {
            value = value.replace(tag, &format!("\n{}\n", tag));
        }
        value = value.replace("&nbsp;", " ").replace('\u{a0}', " ");

        value = apply(&self.pre_processing, value);
        value = EMPTY_LINES_REGEX.replace_all(&value, "\n").into_owned();

        let lines: Vec<String> = LINE_SPLIT_REGEX
            .split(&value)
            .map(|line| apply(&self.processing_per_line, line.trim().to_string()))
            .collect();
        value = lines.join(" \n");

        value = apply(&self.post_processing, value);
        value = value.replace('\n', "");
        WHITESPACE_REGEX.replace_all(&value, " ").trim().to_string()
    }

    fn purify(&self, html: &str) -> String {
        let fragment = Html::parse_fragment(html);
        let mut out = String::with_capacity(html.len());
        self.write_node(*fragment.root_element(), &mut out);
        out
    }

    fn write_node(&self, node: NodeRef<'_, Node>, out: &mut String) {
        match node.value() {
            Node::Text(text) => out.push_str(&escape(text)),
            Node::Element(element) => {
                let name = element.name();
                if matches!(name, "script" | "style") {
                    return;
                }
                let allowed = self.options.allowed_tags.iter().any(|t| t == name);
                if allowed {
                    out.push('<');
                    out.push_str(name);
                    for (attribute, value) in element.attrs() {
                        if self.options.allowed_attributes.iter().any(|a| a == attribute)
                            && (!URL_ATTRIBUTES.contains(&attribute) || is_safe_url(value))
                        {
                            out.push_str(&format!(" {}=\"{}\"", attribute, escape(value)));
                        }
                    }
                    out.push('>');
                }
                for child in node.children() {
                    self.write_node(child, out);
                }
                if allowed && !VOID_TAGS.contains(&name) {
                    out.push_str(&format!("</{}>", name));
                }
            }
            _ => {
                for child in node.children() {
                    self.write_node(child, out);
                }
            }
        }
    }
}

fn compile(replacements: &[PatternReplacement]) -> Result<Vec<(Regex, String)>> {
    replacements
        .iter()
        .map(|r| {
            Regex::new(&r.pattern)
                .map(|regex| (regex, r.replacement.clone()))
                .map_err(|e| {
                    DataTypeError::InvalidPattern {
                        pattern: r.pattern.clone(),
                        message: e.to_string(),
                    }
                    .into()
                })
        })
        .collect()
}

fn apply(replacements: &[(Regex, String)], value: String) -> String {
    replacements.iter().fold(value, |acc, (regex, replacement)| {
        regex.replace_all(&acc, replacement.as_str()).into_owned()
    })
}

/// Relative URLs and the schemes in `SAFE_URL_SCHEMES` only.
///
/// Browsers ignore control characters and whitespace inside a scheme, so they
/// are dropped before the scheme is read.
fn is_safe_url(value: &str) -> bool {
    let normalized: String = value
        .chars()
        .filter(|c| !c.is_control() && !c.is_whitespace())
        .collect();
    match normalized.find([':', '/', '?', '#']) {
        Some(index) if normalized[index..].starts_with(':') => {
            let scheme = normalized[..index].to_ascii_lowercase();
            SAFE_URL_SCHEMES.contains(&scheme.as_str())
        }
        _ => true,
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_purifies_and_flattens() {
        let html = HtmlContent::new(&HtmlContentOptions::default()).unwrap();
        let value = html.convert(
            "<p onclick=\"x()\">Hello&nbsp;<script>alert(1)</script><strong>World</strong></p><ul><li>a</li></ul>",
        );
        assert_eq!(
            value,
            "<p>Hello <strong>World</strong></p> <ul> <li>a</li> </ul>"
        );
    }

    #[test]
    fn test_disallowed_tags_keep_their_text() {
        let html = HtmlContent::new(&HtmlContentOptions::default()).unwrap();
        assert_eq!(
            html.convert("<div><a href=\"/x\" target=\"_blank\">Link</a>  <span>text</span></div>"),
            "<a href=\"/x\">Link</a> text"
        );
    }

    #[test]
    fn test_unsafe_link_schemes_are_dropped() {
        let html = HtmlContent::new(&HtmlContentOptions::default()).unwrap();

        let value = html.convert(r#"<p><a href="javascript:alert(document.cookie)">x</a></p>"#);
        assert_eq!(value, "<p><a>x</a></p>");

        let value = html.convert("<a href=\" JaVa\tScRiPt:alert(1)\">x</a>");
        assert!(!value.to_lowercase().contains("script"));

        let value = html.convert(r#"<a href="data:text/html;base64,PHNjcmlwdD4=">x</a>"#);
        assert_eq!(value, "<a>x</a>");
    }

    #[test]
    fn test_safe_link_schemes_are_kept() {
        let html = HtmlContent::new(&HtmlContentOptions::default()).unwrap();
        assert_eq!(
            html.convert(r#"<a href="https://example.com/a?b=c:d">x</a>"#),
            r#"<a href="https://example.com/a?b=c:d">x</a>"#
        );
        assert_eq!(
            html.convert(r#"<a href="mailto:ada@example.com">x</a>"#),
            r#"<a href="mailto:ada@example.com">x</a>"#
        );
        assert_eq!(
            html.convert(r#"<a href="../team/ada#bio">x</a>"#),
            r#"<a href="../team/ada#bio">x</a>"#
        );
    }

    #[test]
    fn test_replacement_tables() {
        let options = HtmlContentOptions {
            post_processing: vec![PatternReplacement {
                pattern: "<b>(.*?)</b>".to_string(),
                replacement: "<strong>$1</strong>".to_string(),
            }],
            ..HtmlContentOptions::default()
        };
        let html = HtmlContent::new(&options).unwrap();
        assert_eq!(html.convert("<b>bold</b>"), "<strong>bold</strong>");
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let options = HtmlContentOptions {
            pre_processing: vec![PatternReplacement {
                pattern: "(".to_string(),
                replacement: String::new(),
            }],
            ..HtmlContentOptions::default()
        };
        assert!(HtmlContent::new(&options).is_err());
    }
}
