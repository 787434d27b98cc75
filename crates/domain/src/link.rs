// crates/domain/src/link.rs

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkType {
    Url,
    Page,
    File,
    Tel,
    Email,
    Anchor,
    Custom,
}

impl LinkType {
    pub fn as_str(self) -> &'static str {
        match self {
            LinkType::Url => "url",
            LinkType::Page => "page",
            LinkType::File => "file",
            LinkType::Tel => "tel",
            LinkType::Email => "email",
            LinkType::Anchor => "anchor",
            LinkType::Custom => "custom",
        }
    }

    /// Only these types carry an `href`.
    pub fn has_href(self) -> bool {
        matches!(self, LinkType::Url | LinkType::Tel | LinkType::Email)
    }
}

impl fmt::Display for LinkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const PAGE_PREFIXES: [&str; 2] = ["page://", "/@/page/"];
pub const FILE_PREFIXES: [&str; 2] = ["file://", "/@/file/"];

type Rule = (LinkType, fn(&str) -> bool);

fn is_empty(v: &str) -> bool {
    v.is_empty()
}

fn is_url(v: &str) -> bool {
    v.starts_with("http://") || v.starts_with("https://")
}

fn is_page(v: &str) -> bool {
    PAGE_PREFIXES.iter().any(|p| v.starts_with(p))
}

fn is_file(v: &str) -> bool {
    FILE_PREFIXES.iter().any(|p| v.starts_with(p))
}

fn is_tel(v: &str) -> bool {
    v.starts_with("tel:")
}

fn is_email(v: &str) -> bool {
    v.starts_with("mailto:")
}

fn is_anchor(v: &str) -> bool {
    v.starts_with('#')
}

/// Ordered classification rules; the first match wins.
const RULES: [Rule; 7] = [
    (LinkType::Custom, is_empty),
    (LinkType::Url, is_url),
    (LinkType::Page, is_page),
    (LinkType::File, is_file),
    (LinkType::Tel, is_tel),
    (LinkType::Email, is_email),
    (LinkType::Anchor, is_anchor),
];

/// Classify a raw link value. Total: anything unmatched is `Custom`.
pub fn classify(raw: &str) -> LinkType {
    RULES
        .iter()
        .find(|(_, test)| test(raw))
        .map(|(kind, _)| *kind)
        .unwrap_or(LinkType::Custom)
}

/// Remove `prefix` once from the start of `s`.
pub fn strip_prefix<'a>(s: &'a str, prefix: &str) -> &'a str {
    s.strip_prefix(prefix).unwrap_or(s)
}

/// Normalized link, as the frontend receives it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkDescriptor {
    pub href: Option<String>,
    pub title: Option<String>,
    pub popup: bool,
    pub hash: Option<String>,
    #[serde(rename = "type")]
    pub kind: LinkType,
    pub uri: Option<String>,
    pub classes: Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_table() {
        let cases = [
            ("", LinkType::Custom),
            ("https://example.com", LinkType::Url),
            ("http://example.com", LinkType::Url),
            ("page://abc", LinkType::Page),
            ("/@/page/abc", LinkType::Page),
            ("file://abc", LinkType::File),
            ("/@/file/abc", LinkType::File),
            ("tel:+43123", LinkType::Tel),
            ("mailto:a@b.c", LinkType::Email),
            ("#section", LinkType::Anchor),
            ("ftp://x", LinkType::Custom),
            ("HTTPS://upper", LinkType::Custom),
            ("about/team", LinkType::Custom),
        ];
        for (raw, expected) in cases {
            assert_eq!(classify(raw), expected, "{raw:?}");
        }
    }

    #[test]
    fn classification_is_idempotent_and_total() {
        let inputs = ["", " ", "#", "tel:", "mailto:", "page://", "x", "https://", "🦀", "/@/"];
        for raw in inputs {
            let first = classify(raw);
            assert_eq!(first, classify(raw));
            assert!(matches!(
                first,
                LinkType::Url
                    | LinkType::Page
                    | LinkType::File
                    | LinkType::Tel
                    | LinkType::Email
                    | LinkType::Anchor
                    | LinkType::Custom
            ));
        }
    }

    #[test]
    fn earlier_rules_win() {
        // An http URL that looks like an anchor or mail link later on is still a URL.
        assert_eq!(classify("https://x.test/#mailto:"), LinkType::Url);
        assert_eq!(classify("#tel:123"), LinkType::Anchor);
    }

    #[test]
    fn prefixes_are_stripped_once() {
        assert_eq!(strip_prefix("tel:123", "tel:"), "123");
        assert_eq!(strip_prefix("tel:tel:1", "tel:"), "tel:1");
        assert_eq!(strip_prefix("#a", "tel:"), "#a");
    }

    #[test]
    fn type_serializes_lowercase() {
        assert_eq!(serde_json::to_value(LinkType::Email).unwrap(), "email");
    }
}
