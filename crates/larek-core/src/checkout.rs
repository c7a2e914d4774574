//! # Checkout Flow
//!
//! Tracks which checkout step the shopper is on.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Checkout steps                                    │
//! │                                                                         │
//! │            start(false)            address_completed({})                │
//! │  Browsing ─────────────► Address ─────────────────────► Contacts        │
//! │     │                                                      ▲  │        │
//! │     └──────────────── start(true) ─────────────────────────┘  │        │
//! │                                                  begin_submit(true)    │
//! │                                                               ▼        │
//! │                    complete(Ok) ◄───────────────────── Submitting      │
//! │                         │          complete(Err)           │           │
//! │                         ▼                                  ▼           │
//! │                      Success                            Failure        │
//! │                                                            │           │
//! │                                  begin_submit(true) ◄──────┘  (retry)  │
//! │                                                                         │
//! │  dismiss(): any step except Submitting ──► Browsing                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The flow is cyclic: after `Success` or `Failure` a fresh `start` lands on
//! `Address` or `Contacts` depending on whether the address step is still
//! valid.

use std::fmt;

use tracing::debug;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{FormErrors, OrderField, OrderResult};

/// Where the shopper is in the checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CheckoutStep {
    /// No checkout modal is open.
    #[default]
    Browsing,
    /// Address and payment form is shown.
    Address,
    /// Email and phone form is shown.
    Contacts,
    /// The order request is in flight.
    Submitting,
    /// The backend accepted the order.
    Success { id: String, total: Money },
    /// The order request failed; the contacts form stays open for a retry.
    Failure { message: String },
}

impl CheckoutStep {
    pub fn name(&self) -> &'static str {
        match self {
            CheckoutStep::Browsing => "browsing",
            CheckoutStep::Address => "address",
            CheckoutStep::Contacts => "contacts",
            CheckoutStep::Submitting => "submitting",
            CheckoutStep::Success { .. } => "success",
            CheckoutStep::Failure { .. } => "failure",
        }
    }
}

impl fmt::Display for CheckoutStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Checkout step holder with checked transitions.
#[derive(Debug, Clone, Default)]
pub struct CheckoutFlow {
    step: CheckoutStep,
}

impl CheckoutFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> &CheckoutStep {
        &self.step
    }

    /// True while an order request is in flight.
    pub fn is_submitting(&self) -> bool {
        self.step == CheckoutStep::Submitting
    }

    /// Opens the checkout.
    ///
    /// Lands on `Contacts` when the address step is already valid, so a
    /// returning shopper does not re-enter it.
    pub fn start(&mut self, previous_valid: bool) -> CoreResult<&CheckoutStep> {
        match self.step {
            CheckoutStep::Browsing | CheckoutStep::Success { .. } | CheckoutStep::Failure { .. } => {
                let next = if previous_valid {
                    CheckoutStep::Contacts
                } else {
                    CheckoutStep::Address
                };
                Ok(self.go(next))
            }
            _ => Err(CoreError::invalid_transition(&self.step, "start checkout")),
        }
    }

    /// Reports an address step validation pass.
    ///
    /// Moves to `Contacts` once neither address nor payment has an error.
    /// Returns true if the step changed.
    pub fn address_completed(&mut self, errors: &FormErrors) -> CoreResult<bool> {
        if self.step != CheckoutStep::Address {
            return Err(CoreError::invalid_transition(&self.step, "complete address"));
        }
        if errors.any_of(&[OrderField::Address, OrderField::Payment]) {
            return Ok(false);
        }
        self.go(CheckoutStep::Contacts);
        Ok(true)
    }

    /// Starts an order request.
    ///
    /// `ready` is true iff both the address step and the contacts are valid.
    /// Returns false (and stays put) when they are not.
    pub fn begin_submit(&mut self, ready: bool) -> CoreResult<bool> {
        match self.step {
            CheckoutStep::Contacts | CheckoutStep::Failure { .. } => {
                if !ready {
                    return Ok(false);
                }
                self.go(CheckoutStep::Submitting);
                Ok(true)
            }
            _ => Err(CoreError::invalid_transition(&self.step, "submit order")),
        }
    }

    /// Records the outcome of the order request.
    pub fn complete(&mut self, result: Result<OrderResult, String>) -> CoreResult<&CheckoutStep> {
        if self.step != CheckoutStep::Submitting {
            return Err(CoreError::invalid_transition(&self.step, "complete order"));
        }
        let next = match result {
            Ok(placed) => CheckoutStep::Success {
                id: placed.id,
                total: placed.total,
            },
            Err(message) => CheckoutStep::Failure { message },
        };
        Ok(self.go(next))
    }

    /// Closes the checkout. Ignored while an order is in flight.
    ///
    /// Returns true if the step changed.
    pub fn dismiss(&mut self) -> bool {
        match self.step {
            CheckoutStep::Submitting | CheckoutStep::Browsing => false,
            _ => {
                self.go(CheckoutStep::Browsing);
                true
            }
        }
    }

    fn go(&mut self, next: CheckoutStep) -> &CheckoutStep {
        debug!(from = %self.step, to = %next, "Checkout step");
        self.step = next;
        &self.step
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn errors(fields: &[OrderField]) -> FormErrors {
        let mut errors = FormErrors::new();
        for f in fields {
            errors.insert(*f, "bad");
        }
        errors
    }

    #[test]
    fn test_start_without_cached_address_goes_to_address() {
        let mut flow = CheckoutFlow::new();
        assert_eq!(flow.start(false).unwrap(), &CheckoutStep::Address);
    }

    #[test]
    fn test_start_with_cached_address_skips_to_contacts() {
        let mut flow = CheckoutFlow::new();
        assert_eq!(flow.start(true).unwrap(), &CheckoutStep::Contacts);
    }

    #[test]
    fn test_address_step_waits_for_clean_errors() {
        let mut flow = CheckoutFlow::new();
        flow.start(false).unwrap();

        assert!(!flow.address_completed(&errors(&[OrderField::Payment])).unwrap());
        assert_eq!(flow.step(), &CheckoutStep::Address);

        assert!(flow.address_completed(&FormErrors::new()).unwrap());
        assert_eq!(flow.step(), &CheckoutStep::Contacts);
    }

    #[test]
    fn test_submit_requires_ready() {
        let mut flow = CheckoutFlow::new();
        flow.start(true).unwrap();

        assert!(!flow.begin_submit(false).unwrap());
        assert_eq!(flow.step(), &CheckoutStep::Contacts);

        assert!(flow.begin_submit(true).unwrap());
        assert!(flow.is_submitting());
    }

    #[test]
    fn test_second_submit_while_in_flight_is_rejected() {
        let mut flow = CheckoutFlow::new();
        flow.start(true).unwrap();
        flow.begin_submit(true).unwrap();

        let err = flow.begin_submit(true).unwrap_err();
        assert!(matches!(err, CoreError::InvalidTransition { .. }));
        assert!(flow.is_submitting());
    }

    #[test]
    fn test_success_and_failure() {
        let mut flow = CheckoutFlow::new();
        flow.start(true).unwrap();
        flow.begin_submit(true).unwrap();
        let step = flow
            .complete(Ok(OrderResult {
                id: "ord-1".into(),
                total: Money::from_units(30),
            }))
            .unwrap()
            .clone();
        assert_eq!(
            step,
            CheckoutStep::Success {
                id: "ord-1".into(),
                total: Money::from_units(30)
            }
        );

        flow.start(true).unwrap();
        flow.begin_submit(true).unwrap();
        flow.complete(Err("timeout".into())).unwrap();
        assert_eq!(
            flow.step(),
            &CheckoutStep::Failure {
                message: "timeout".into()
            }
        );
    }

    #[test]
    fn test_retry_from_failure() {
        let mut flow = CheckoutFlow::new();
        flow.start(true).unwrap();
        flow.begin_submit(true).unwrap();
        flow.complete(Err("offline".into())).unwrap();

        assert!(flow.begin_submit(true).unwrap());
        assert!(flow.is_submitting());
    }

    #[test]
    fn test_dismiss() {
        let mut flow = CheckoutFlow::new();
        assert!(!flow.dismiss());

        flow.start(false).unwrap();
        assert!(flow.dismiss());
        assert_eq!(flow.step(), &CheckoutStep::Browsing);

        flow.start(true).unwrap();
        flow.begin_submit(true).unwrap();
        assert!(!flow.dismiss());
        assert!(flow.is_submitting());
    }

    #[test]
    fn test_invalid_transitions() {
        let mut flow = CheckoutFlow::new();
        assert!(flow.address_completed(&FormErrors::new()).is_err());
        assert!(flow.begin_submit(true).is_err());
        assert!(flow.complete(Err("x".into())).is_err());

        flow.start(false).unwrap();
        assert!(flow.start(false).is_err());
        assert!(flow.begin_submit(true).is_err());
    }
}
