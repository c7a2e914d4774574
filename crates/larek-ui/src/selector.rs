//! # Selectors
//!
//! The compound selector subset the views use to find their child nodes.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Supported                           Example                            │
//! │  ─────────                           ───────                            │
//! │  tag                                 p                                  │
//! │  .class (repeatable)                 .card.card_full                    │
//! │  #id                                 #card-catalog                      │
//! │  [attr]                              [disabled]                         │
//! │  [attr=value], quoted or bare        button[name="card"]                │
//! │  any compound of the above           template#success                   │
//! │                                                                         │
//! │  Combinators (descendant, child, sibling) are not supported; every    │
//! │  query already searches all descendants of its root.                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::BTreeMap;

const DELIMITERS: &[char] = &['.', '#', '['];

/// A parsed compound selector.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selector {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<(String, Option<String>)>,
}

impl Selector {
    /// Parses `input`, returning `None` for anything outside the subset.
    pub fn parse(input: &str) -> Option<Selector> {
        let mut rest = input.trim();
        if rest.is_empty() {
            return None;
        }

        let mut selector = Selector::default();

        let tag_end = rest.find(DELIMITERS).unwrap_or(rest.len());
        if tag_end > 0 {
            let tag = &rest[..tag_end];
            if !is_ident(tag) {
                return None;
            }
            selector.tag = Some(tag.to_ascii_lowercase());
        }
        rest = &rest[tag_end..];

        while let Some(c) = rest.chars().next() {
            match c {
                '.' | '#' => {
                    let body = &rest[1..];
                    let end = body.find(DELIMITERS).unwrap_or(body.len());
                    let name = &body[..end];
                    if !is_ident(name) {
                        return None;
                    }
                    if c == '.' {
                        selector.classes.push(name.to_string());
                    } else {
                        selector.id = Some(name.to_string());
                    }
                    rest = &body[end..];
                }
                '[' => {
                    let close = rest.find(']')?;
                    let inner = &rest[1..close];
                    let (name, value) = match inner.split_once('=') {
                        Some((name, value)) => (name.trim(), Some(unquote(value.trim()))),
                        None => (inner.trim(), None),
                    };
                    if !is_ident(name) {
                        return None;
                    }
                    selector
                        .attrs
                        .push((name.to_string(), value.map(str::to_string)));
                    rest = &rest[close + 1..];
                }
                _ => return None,
            }
        }

        Some(selector)
    }

    /// Tests an element described by its tag, classes and attributes.
    pub fn matches(&self, tag: &str, classes: &[String], attrs: &BTreeMap<String, String>) -> bool {
        if let Some(expected) = &self.tag {
            if !expected.eq_ignore_ascii_case(tag) {
                return false;
            }
        }

        if let Some(id) = &self.id {
            if attrs.get("id") != Some(id) {
                return false;
            }
        }

        if !self.classes.iter().all(|c| classes.contains(c)) {
            return false;
        }

        self.attrs.iter().all(|(name, value)| match (attrs.get(name), value) {
            (Some(actual), Some(expected)) => actual == expected,
            (Some(_), None) => true,
            (None, _) => false,
        })
    }
}

fn is_ident(s: &str) -> bool {
    !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn unquote(s: &str) -> &str {
    let bytes = s.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if (first == b'"' && last == b'"') || (first == b'\'' && last == b'\'') {
            return &s[1..s.len() - 1];
        }
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_parse_compound() {
        let sel = Selector::parse(r#"button[name="card"]"#).unwrap();
        assert!(sel.matches("button", &[], &attrs(&[("name", "card")])));
        assert!(!sel.matches("button", &[], &attrs(&[("name", "cash")])));
        assert!(!sel.matches("input", &[], &attrs(&[("name", "card")])));
    }

    #[test]
    fn test_class_and_id() {
        let classes = vec!["card".to_string(), "card_full".to_string()];
        assert!(Selector::parse(".card").unwrap().matches("div", &classes, &attrs(&[])));
        assert!(Selector::parse(".card.card_full")
            .unwrap()
            .matches("div", &classes, &attrs(&[])));
        assert!(!Selector::parse(".modal").unwrap().matches("div", &classes, &attrs(&[])));

        let sel = Selector::parse("template#success").unwrap();
        assert!(sel.matches("template", &[], &attrs(&[("id", "success")])));
        assert!(!sel.matches("template", &[], &attrs(&[("id", "order")])));
    }

    #[test]
    fn test_bare_and_presence_attributes() {
        let sel = Selector::parse("button[type=submit]").unwrap();
        assert!(sel.matches("button", &[], &attrs(&[("type", "submit")])));

        let sel = Selector::parse("[disabled]").unwrap();
        assert!(sel.matches("button", &[], &attrs(&[("disabled", "disabled")])));
        assert!(!sel.matches("button", &[], &attrs(&[])));
    }

    #[test]
    fn test_rejects_unsupported() {
        assert!(Selector::parse("").is_none());
        assert!(Selector::parse(".modal .modal__content").is_none());
        assert!(Selector::parse("div > p").is_none());
        assert!(Selector::parse("[name=\"x\"").is_none());
        assert!(Selector::parse(".").is_none());
    }
}
