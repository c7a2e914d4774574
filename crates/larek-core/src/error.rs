//! # Error Types
//!
//! Domain-specific error types for larek-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  larek-core errors (this file)                                         │
//! │  ├── CoreError        - Unknown fields, bad transitions, storage       │
//! │  └── ValidationError  - Order field rule failures                      │
//! │                                                                         │
//! │  larek-ui errors (separate crate)                                      │
//! │  └── UiError          - Missing template nodes (fatal)                 │
//! │                                                                         │
//! │  larek-client errors (separate crate)                                  │
//! │  └── ClientError      - Network / file failures                        │
//! │                                                                         │
//! │  ValidationError never escapes as an Err from AppState: it is turned   │
//! │  into a FormErrors message and published as FormInvalid.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core storefront errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A form reported a field name the order does not have.
    #[error("Unknown order field: {0}")]
    UnknownField(String),

    /// Payment value is neither `card`, `cash` nor empty.
    #[error("Unknown payment method: {0}")]
    UnknownPaymentMethod(String),

    /// The checkout flow cannot move from its current step.
    ///
    /// ## When This Occurs
    /// - Submitting contacts while still on the address step
    /// - Submitting again while a request is in flight
    #[error("Cannot {action} while checkout is at {step}")]
    InvalidTransition { step: String, action: String },

    /// Key/value storage failed to read or write.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates an invalid transition error.
    pub fn invalid_transition(step: impl std::fmt::Display, action: &str) -> Self {
        CoreError::InvalidTransition {
            step: step.to_string(),
            action: action.to_string(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Order field validation failures.
///
/// The `Display` output is the message shown under the form, so every
/// variant reads as an instruction to the shopper.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// A choice must be made (payment method).
    #[error("Select a {field}")]
    NotSelected { field: String },

    /// Invalid format (email shape, phone shape).
    #[error("Enter a valid {field}: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "Address".to_string(),
        };
        assert_eq!(err.to_string(), "Address is required");

        let err = ValidationError::NotSelected {
            field: "payment method".to_string(),
        };
        assert_eq!(err.to_string(), "Select a payment method");

        let err = ValidationError::InvalidFormat {
            field: "phone".to_string(),
            reason: "expected +7 and 10 digits".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Enter a valid phone: expected +7 and 10 digits"
        );
    }

    #[test]
    fn test_invalid_transition_message() {
        let err = CoreError::invalid_transition("submitting", "submit the order");
        assert_eq!(
            err.to_string(),
            "Cannot submit the order while checkout is at submitting"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "Address".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
