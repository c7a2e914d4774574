//! # Forms
//!
//! [`FormBehavior`] is the capability every checkout form carries; the
//! concrete forms only add their own field setters on top of it.
//!
//! ## Form Events
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      What a form publishes                              │
//! │                                                                         │
//! │  <input name="address"> typed   ──► FieldChanged {                      │
//! │                                        form: Order,                     │
//! │                                        field: "address",                │
//! │                                        value: "..." }                   │
//! │                                                                         │
//! │  <form> submitted               ──► prevent_default()                   │
//! │                                     FormSubmit { form: Order }          │
//! │                                                                         │
//! │  card / cash button clicked     ──► PaymentMethod(Some(Card) | None)    │
//! │  (order form only)                                                      │
//! │                                                                         │
//! │  What it renders: `valid` toggles the submit button's disabled flag,    │
//! │  `errors` fills the `.form__errors` node.                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use larek_core::events::{EventBus, FormName, ShopEvent};
use larek_core::types::PaymentMethod;
use tracing::trace;

use crate::component::{set_disabled, set_text, Binder, View};
use crate::error::UiResult;
use crate::node::{DomEventKind, Node, WeakNode};

/// Class marking the selected payment button.
pub const PAYMENT_ACTIVE_CLASS: &str = "button_alt-active";

const SUBMIT_BUTTON: &str = "button[type=submit]";
const ERRORS: &str = ".form__errors";

// =============================================================================
// Form Behavior
// =============================================================================

/// Field-change and submit wiring plus the `valid` / `errors` setters.
#[derive(Debug, Clone)]
pub struct FormBehavior {
    name: FormName,
    binder: Binder,
    submit: Node,
    errors: Node,
}

/// State shared by every form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    pub valid: Option<bool>,
    pub errors: Option<String>,
}

impl FormBehavior {
    /// Wires `root` as the form called `name`.
    ///
    /// ## Errors
    /// `MissingElement` if the submit button or errors node is missing.
    pub fn attach(root: Node, name: FormName, events: EventBus) -> UiResult<Self> {
        let binder = Binder::new(root, &format!("{name} form"));
        let submit = binder.ensure(SUBMIT_BUTTON)?;
        let errors = binder.ensure(ERRORS)?;

        let bus = events.clone();
        binder.root().on(DomEventKind::Input, move |event| {
            let target = event.target();
            let Some(field) = target.attr("name") else {
                return;
            };
            trace!(form = %name, %field, "Form input");
            bus.emit(ShopEvent::FieldChanged {
                form: name,
                field,
                value: target.value(),
            });
        });

        let bus = events;
        binder.root().on(DomEventKind::Submit, move |event| {
            event.prevent_default();
            bus.emit(ShopEvent::FormSubmit { form: name });
        });

        Ok(FormBehavior {
            name,
            binder,
            submit,
            errors,
        })
    }

    pub fn name(&self) -> FormName {
        self.name
    }

    pub fn binder(&self) -> &Binder {
        &self.binder
    }

    pub fn root(&self) -> &Node {
        self.binder.root()
    }

    /// Enables the submit button iff `valid`.
    pub fn set_valid(&self, valid: bool) {
        set_disabled(&self.submit, !valid);
    }

    pub fn set_errors(&self, errors: &str) {
        set_text(&self.errors, errors);
    }

    pub fn submit_button(&self) -> &Node {
        &self.submit
    }

    pub fn errors_node(&self) -> &Node {
        &self.errors
    }

    pub fn apply(&self, state: FormState) {
        if let Some(valid) = state.valid {
            self.set_valid(valid);
        }
        if let Some(errors) = state.errors {
            self.set_errors(&errors);
        }
    }
}

// =============================================================================
// Order Form (address + payment)
// =============================================================================

/// The address and payment step.
#[derive(Debug, Clone)]
pub struct OrderForm {
    form: FormBehavior,
    address: Node,
    card: Node,
    cash: Node,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderFormState {
    pub form: FormState,
    pub address: Option<String>,
    /// Highlights the matching payment button without emitting.
    pub payment: Option<Option<PaymentMethod>>,
}

impl OrderForm {
    pub fn new(root: Node, events: EventBus) -> UiResult<Self> {
        let form = FormBehavior::attach(root, FormName::Order, events.clone())?;
        let address = form.binder().ensure(r#"input[name="address"]"#)?;
        let card = form.binder().ensure(r#"button[name="card"]"#)?;
        let cash = form.binder().ensure(r#"button[name="cash"]"#)?;

        wire_payment_button(&card, &cash, PaymentMethod::Card, &events);
        wire_payment_button(&cash, &card, PaymentMethod::Cash, &events);

        Ok(OrderForm {
            form,
            address,
            card,
            cash,
        })
    }

    pub fn form(&self) -> &FormBehavior {
        &self.form
    }

    pub fn set_address(&self, value: &str) {
        self.address.set_value(value);
    }

    /// Highlights the button for `method` (or none).
    pub fn show_payment(&self, method: Option<PaymentMethod>) {
        self.card
            .toggle_class(PAYMENT_ACTIVE_CLASS, Some(method == Some(PaymentMethod::Card)));
        self.cash
            .toggle_class(PAYMENT_ACTIVE_CLASS, Some(method == Some(PaymentMethod::Cash)));
    }

    pub fn reset_payment_buttons(&self) {
        self.show_payment(None);
    }

    pub fn address_input(&self) -> &Node {
        &self.address
    }

    pub fn payment_button(&self, method: PaymentMethod) -> &Node {
        match method {
            PaymentMethod::Card => &self.card,
            PaymentMethod::Cash => &self.cash,
        }
    }
}

/// Clicking a payment button selects it (deselecting the other) or, if
/// it was already selected, clears the selection.
fn wire_payment_button(button: &Node, other: &Node, method: PaymentMethod, events: &EventBus) {
    let this: WeakNode = button.downgrade();
    let other = other.downgrade();
    let bus = events.clone();

    button.on(DomEventKind::Click, move |_| {
        let Some(this) = this.upgrade() else {
            return;
        };
        let was_active = this.has_class(PAYMENT_ACTIVE_CLASS);
        this.toggle_class(PAYMENT_ACTIVE_CLASS, Some(!was_active));
        if !was_active {
            if let Some(other) = other.upgrade() {
                other.remove_class(PAYMENT_ACTIVE_CLASS);
            }
        }

        let selected = if was_active { None } else { Some(method) };
        bus.emit(ShopEvent::PaymentMethod(selected));
    });
}

impl View for OrderForm {
    type State = OrderFormState;

    fn root(&self) -> &Node {
        self.form.root()
    }

    fn apply(&self, state: OrderFormState) {
        self.form.apply(state.form);
        if let Some(address) = state.address {
            self.set_address(&address);
        }
        if let Some(payment) = state.payment {
            self.show_payment(payment);
        }
    }
}

// =============================================================================
// Contacts Form (email + phone)
// =============================================================================

/// The email and phone step.
#[derive(Debug, Clone)]
pub struct ContactsForm {
    form: FormBehavior,
    email: Node,
    phone: Node,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactsFormState {
    pub form: FormState,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl ContactsForm {
    pub fn new(root: Node, events: EventBus) -> UiResult<Self> {
        let form = FormBehavior::attach(root, FormName::Contacts, events)?;
        let email = form.binder().ensure(r#"input[name="email"]"#)?;
        let phone = form.binder().ensure(r#"input[name="phone"]"#)?;
        Ok(ContactsForm { form, email, phone })
    }

    pub fn form(&self) -> &FormBehavior {
        &self.form
    }

    pub fn set_email(&self, value: &str) {
        self.email.set_value(value);
    }

    pub fn set_phone(&self, value: &str) {
        self.phone.set_value(value);
    }

    pub fn email_input(&self) -> &Node {
        &self.email
    }

    pub fn phone_input(&self) -> &Node {
        &self.phone
    }
}

impl View for ContactsForm {
    type State = ContactsFormState;

    fn root(&self) -> &Node {
        self.form.root()
    }

    fn apply(&self, state: ContactsFormState) {
        self.form.apply(state.form);
        if let Some(email) = state.email {
            self.set_email(&email);
        }
        if let Some(phone) = state.phone {
            self.set_phone(&phone);
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use larek_core::events::{EventKind, EventPattern};
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn order_root() -> Node {
        Node::new("form")
            .with_attr("name", "order")
            .with_child(Node::new("button").with_attr("name", "card").with_attr("type", "button"))
            .with_child(Node::new("button").with_attr("name", "cash").with_attr("type", "button"))
            .with_child(Node::new("input").with_attr("name", "address"))
            .with_child(Node::new("button").with_attr("type", "submit"))
            .with_child(Node::new("span").with_class("form__errors"))
    }

    fn contacts_root() -> Node {
        Node::new("form")
            .with_attr("name", "contacts")
            .with_child(Node::new("input").with_attr("name", "email"))
            .with_child(Node::new("input").with_attr("name", "phone"))
            .with_child(Node::new("button").with_attr("type", "submit"))
            .with_child(Node::new("span").with_class("form__errors"))
    }

    fn record(bus: &EventBus, pattern: impl Into<EventPattern>) -> Arc<Mutex<Vec<ShopEvent>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        bus.on(pattern, move |e| {
            sink.lock().push(e.clone());
            Ok(())
        });
        seen
    }

    #[test]
    fn test_missing_submit_is_configuration_error() {
        let root = Node::new("form").with_child(Node::new("span").with_class("form__errors"));
        assert!(FormBehavior::attach(root, FormName::Order, EventBus::new()).is_err());
    }

    #[test]
    fn test_input_emits_field_changed() {
        let bus = EventBus::new();
        let seen = record(&bus, EventPattern::form_fields(FormName::Contacts));
        let form = ContactsForm::new(contacts_root(), bus).unwrap();

        form.email_input().input("a@b.co");

        assert_eq!(
            *seen.lock(),
            vec![ShopEvent::FieldChanged {
                form: FormName::Contacts,
                field: "email".into(),
                value: "a@b.co".into(),
            }]
        );
    }

    #[test]
    fn test_submit_prevents_default_and_emits() {
        let bus = EventBus::new();
        let seen = record(&bus, EventPattern::Submit(FormName::Order));
        let form = OrderForm::new(order_root(), bus).unwrap();

        assert!(!form.root().submit());
        assert_eq!(seen.lock().len(), 1);
    }

    #[test]
    fn test_valid_and_errors_setters() {
        let form = ContactsForm::new(contacts_root(), EventBus::new()).unwrap();
        form.render(Some(ContactsFormState {
            form: FormState {
                valid: Some(false),
                errors: Some("Email is required".into()),
            },
            ..ContactsFormState::default()
        }));

        assert!(form.form().submit_button().is_disabled());
        assert_eq!(form.form().errors_node().text(), "Email is required");

        form.form().set_valid(true);
        assert!(!form.form().submit_button().is_disabled());
    }

    #[test]
    fn test_payment_buttons_toggle() {
        let bus = EventBus::new();
        let seen = record(&bus, EventKind::PaymentMethod);
        let form = OrderForm::new(order_root(), bus).unwrap();
        let card = form.payment_button(PaymentMethod::Card).clone();
        let cash = form.payment_button(PaymentMethod::Cash).clone();

        card.click();
        assert!(card.has_class(PAYMENT_ACTIVE_CLASS));

        cash.click();
        assert!(cash.has_class(PAYMENT_ACTIVE_CLASS));
        assert!(!card.has_class(PAYMENT_ACTIVE_CLASS));

        cash.click();
        assert!(!cash.has_class(PAYMENT_ACTIVE_CLASS));

        assert_eq!(
            *seen.lock(),
            vec![
                ShopEvent::PaymentMethod(Some(PaymentMethod::Card)),
                ShopEvent::PaymentMethod(Some(PaymentMethod::Cash)),
                ShopEvent::PaymentMethod(None),
            ]
        );
    }

    #[test]
    fn test_payment_click_does_not_emit_field_change() {
        let bus = EventBus::new();
        let fields = record(&bus, EventPattern::any_field());
        let form = OrderForm::new(order_root(), bus).unwrap();

        form.payment_button(PaymentMethod::Card).click();
        assert!(fields.lock().is_empty());
    }

    #[test]
    fn test_render_restores_inputs_silently() {
        let bus = EventBus::new();
        let seen = record(&bus, EventKind::PaymentMethod);
        let form = OrderForm::new(order_root(), bus).unwrap();

        form.render(Some(OrderFormState {
            address: Some("Spb".into()),
            payment: Some(Some(PaymentMethod::Cash)),
            ..OrderFormState::default()
        }));

        assert_eq!(form.address_input().value(), "Spb");
        assert!(form
            .payment_button(PaymentMethod::Cash)
            .has_class(PAYMENT_ACTIVE_CLASS));
        assert!(seen.lock().is_empty());

        form.reset_payment_buttons();
        assert!(!form
            .payment_button(PaymentMethod::Cash)
            .has_class(PAYMENT_ACTIVE_CLASS));
    }
}
