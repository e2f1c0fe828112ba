#![forbid(unsafe_code)]

//! Compound selectors: `tag`, `#id`, `.class`, `*`, and combinations such as
//! `input#name.wide`. Combinators, attribute selectors, and pseudo-classes
//! are rejected.

use std::str::FromStr;

use crate::error::{DomError, Result};
use crate::node::Node;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selector {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

impl Selector {
    pub fn parse(source: &str) -> Result<Self> {
        let trimmed = source.trim();
        let invalid = || DomError::invalid_selector(source);
        if trimmed.is_empty() {
            return Err(invalid());
        }

        let mut selector = Selector::default();
        let mut rest = trimmed;

        if let Some(after) = rest.strip_prefix('*') {
            rest = after;
        } else {
            let end = rest.find(|c: char| !is_ident_char(c)).unwrap_or(rest.len());
            if end > 0 {
                selector.tag = Some(rest[..end].to_ascii_lowercase());
                rest = &rest[end..];
            }
        }

        while let Some(marker) = rest.chars().next() {
            let body = &rest[marker.len_utf8()..];
            let end = body.find(|c: char| !is_ident_char(c)).unwrap_or(body.len());
            if end == 0 {
                return Err(invalid());
            }
            let name = body[..end].to_string();
            match marker {
                '#' if selector.id.is_none() => selector.id = Some(name),
                '.' => selector.classes.push(name),
                _ => return Err(invalid()),
            }
            rest = &body[end..];
        }

        Ok(selector)
    }

    /// Whether `node` is an element satisfying every part of the selector.
    #[must_use]
    pub fn matches(&self, node: &Node) -> bool {
        let Some(tag) = node.tag_name() else {
            return false;
        };
        if self.tag.as_ref().is_some_and(|t| *t != tag) {
            return false;
        }
        if let Some(id) = &self.id {
            if node.id().as_deref() != Some(id.as_str()) {
                return false;
            }
        }
        if self.classes.is_empty() {
            return true;
        }
        let classes = node.class_list();
        self.classes.iter().all(|c| classes.contains(c))
    }
}

impl FromStr for Selector {
    type Err = DomError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
