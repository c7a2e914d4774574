//! # UI Error Types
//!
//! A view that cannot find one of its required child nodes is a
//! configuration error: the template and the code disagree, and the view
//! must not come up half-wired. Every view constructor returns
//! [`UiResult`] for exactly this reason.

use thiserror::Error;

/// Result type alias for view construction.
pub type UiResult<T> = Result<T, UiError>;

/// UI configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UiError {
    /// A required node is missing from a template or container.
    #[error("Element '{selector}' not found in {context}")]
    MissingElement { selector: String, context: String },
}

impl UiError {
    pub fn missing(selector: &str, context: impl Into<String>) -> Self {
        UiError::MissingElement {
            selector: selector.to_string(),
            context: context.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_element_message() {
        let err = UiError::missing(".card__title", "<template#card-catalog>");
        assert_eq!(
            err.to_string(),
            "Element '.card__title' not found in <template#card-catalog>"
        );
    }
}
