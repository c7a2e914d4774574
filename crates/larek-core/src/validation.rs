//! # Validation Module
//!
//! Field rules for the checkout draft.
//!
//! ## Field-Scoped Validation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   Which rules run for which field                       │
//! │                                                                         │
//! │  field changed         rules checked               errors produced      │
//! │  ─────────────         ─────────────               ───────────────      │
//! │  email            ──►  local@domain.tld shape  ──► { email }  or {}     │
//! │  phone            ──►  +7 and 10 digits        ──► { phone }  or {}     │
//! │  address/payment  ──►  address non-empty,      ──► { address } or       │
//! │                        then payment selected       { payment } or {}    │
//! │                                                                         │
//! │  The address/payment branch reports at most ONE error: the address     │
//! │  is checked first and the payment rule only runs once it passes.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use larek_core::validation::{validate_email, validate_phone};
//!
//! assert!(validate_email("a@b.co").is_ok());
//! assert!(validate_email("not-an-email").is_err());
//! assert!(validate_phone("+71234567890").is_ok());
//! assert!(validate_phone("123").is_err());
//! ```

use std::sync::LazyLock;

use regex::Regex;

use crate::error::ValidationError;
use crate::types::{FormErrors, Order, OrderField};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\S+@\S+\.\S+$").expect("email pattern compiles"));

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+7[0-9]{10}$").expect("phone pattern compiles"));

// =============================================================================
// Single-Field Rules
// =============================================================================

/// Validates an email address.
///
/// ## Rules
/// - Must not be empty
/// - Must look like `local@domain.tld`: a non-space run, `@`, a non-space
///   run, `.`, a non-space run
pub fn validate_email(email: &str) -> ValidationResult<()> {
    if email.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "Email".to_string(),
        });
    }

    if !EMAIL_RE.is_match(email) {
        return Err(ValidationError::InvalidFormat {
            field: "email".to_string(),
            reason: "expected name@domain.tld".to_string(),
        });
    }

    Ok(())
}

/// Validates a phone number.
///
/// ## Rules
/// - Must not be empty
/// - Must be `+7` followed by exactly 10 digits, nothing else
pub fn validate_phone(phone: &str) -> ValidationResult<()> {
    if phone.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "Phone".to_string(),
        });
    }

    if !PHONE_RE.is_match(phone) {
        return Err(ValidationError::InvalidFormat {
            field: "phone".to_string(),
            reason: "expected +7 and 10 digits".to_string(),
        });
    }

    Ok(())
}

/// Validates the address/payment step.
///
/// Only an empty address counts as missing; whitespace is kept as typed.
/// Returns the first failing field together with its error.
pub fn validate_address_step(order: &Order) -> Result<(), (OrderField, ValidationError)> {
    if order.address.is_empty() {
        return Err((
            OrderField::Address,
            ValidationError::Required {
                field: "Address".to_string(),
            },
        ));
    }

    if order.payment.is_none() {
        return Err((
            OrderField::Payment,
            ValidationError::NotSelected {
                field: "payment method".to_string(),
            },
        ));
    }

    Ok(())
}

// =============================================================================
// Field-Scoped Form Validation
// =============================================================================

/// Runs the rules relevant to `field` against the draft order.
///
/// The result is the complete error mapping for this validation pass;
/// an empty mapping means the field (or step) is valid.
pub fn validate_order_field(order: &Order, field: OrderField) -> FormErrors {
    let mut errors = FormErrors::new();

    match field {
        OrderField::Email => {
            if let Err(e) = validate_email(&order.email) {
                errors.insert(OrderField::Email, e.to_string());
            }
        }
        OrderField::Phone => {
            if let Err(e) = validate_phone(&order.phone) {
                errors.insert(OrderField::Phone, e.to_string());
            }
        }
        OrderField::Address | OrderField::Payment => {
            if let Err((failed, e)) = validate_address_step(order) {
                errors.insert(failed, e.to_string());
            }
        }
    }

    errors
}

/// True if both contact fields satisfy their rules.
pub fn contacts_valid(order: &Order) -> bool {
    validate_email(&order.email).is_ok() && validate_phone(&order.phone).is_ok()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PaymentMethod;

    #[test]
    fn test_validate_email() {
        assert!(validate_email("a@b.co").is_ok());
        assert!(validate_email("shopper@example.com").is_ok());

        assert!(validate_email("").is_err());
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("a@b").is_err());
        assert!(validate_email("a b@c.d e").is_err());
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("+71234567890").is_ok());

        assert!(validate_phone("123").is_err());
        assert!(validate_phone("").is_err());
        assert!(validate_phone("81234567890").is_err());
        assert!(validate_phone("+712345678901").is_err());
        assert!(validate_phone("+7123456789a").is_err());
    }

    #[test]
    fn test_address_step_reports_single_error() {
        let order = Order::default();
        let errors = validate_order_field(&order, OrderField::Payment);
        assert_eq!(errors.len(), 1);
        assert!(errors.contains(OrderField::Address));

        let order = Order {
            address: "123 Main St".into(),
            ..Order::default()
        };
        let errors = validate_order_field(&order, OrderField::Address);
        assert_eq!(errors.len(), 1);
        assert!(errors.contains(OrderField::Payment));

        let order = Order {
            address: "123 Main St".into(),
            payment: Some(PaymentMethod::Cash),
            ..Order::default()
        };
        assert!(validate_order_field(&order, OrderField::Address).is_empty());
    }

    #[test]
    fn test_whitespace_address_is_not_empty() {
        let order = Order {
            address: "   ".into(),
            payment: Some(PaymentMethod::Cash),
            ..Order::default()
        };
        assert!(validate_address_step(&order).is_ok());
        assert!(validate_order_field(&order, OrderField::Address).is_empty());
    }

    #[test]
    fn test_field_scope_ignores_other_fields() {
        // Phone is invalid but only email is checked
        let order = Order {
            email: "a@b.co".into(),
            phone: "123".into(),
            ..Order::default()
        };
        assert!(validate_order_field(&order, OrderField::Email).is_empty());
        assert!(!validate_order_field(&order, OrderField::Phone).is_empty());
        assert!(!contacts_valid(&order));
    }
}
