#![forbid(unsafe_code)]

//! `{{ key }}` markers in template text.

use crate::value::Value;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// A text node holding exactly one interpolation marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interpolation {
    prefix: String,
    key: String,
    suffix: String,
}

impl Interpolation {
    /// Scan `text` for a single `{{ identifier }}` marker.
    ///
    /// Returns `None` for text with no marker, more than one marker, an empty
    /// or non-identifier key, or an unterminated marker. Whitespace inside the
    /// braces is trimmed.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let start = text.find(OPEN)?;
        let after_open = &text[start + OPEN.len()..];
        let close = after_open.find(CLOSE)?;
        let inner = &after_open[..close];
        if inner.contains(OPEN) {
            return None;
        }
        let key = inner.trim();
        if !is_identifier(key) {
            return None;
        }
        let suffix = &after_open[close + CLOSE.len()..];
        if suffix.contains(OPEN) {
            return None;
        }
        Some(Self {
            prefix: text[..start].to_string(),
            key: key.to_string(),
            suffix: suffix.to_string(),
        })
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    #[must_use]
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Text with the marker replaced by `value`'s render string.
    #[must_use]
    pub fn render(&self, value: &Value) -> String {
        let rendered = value.to_render_string();
        let mut out = String::with_capacity(self.prefix.len() + rendered.len() + self.suffix.len());
        out.push_str(&self.prefix);
        out.push_str(&rendered);
        out.push_str(&self.suffix);
        out
    }
}

/// `[A-Za-z_$][A-Za-z0-9_$]*`, Unicode letters allowed.
#[must_use]
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}
