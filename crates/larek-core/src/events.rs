//! # Event Bus
//!
//! Typed publish/subscribe hub connecting views, state and the presenter.
//!
//! ## Dispatch Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         EventBus dispatch                               │
//! │                                                                         │
//! │   emit(ShopEvent::FieldChanged { form: Order, field: "address", .. })   │
//! │        │                                                                │
//! │        ▼                                                                │
//! │   table[EventKind::FieldChanged]  ── registration order ──►             │
//! │        │                                                                │
//! │        ├── Field { form: None,        field: None }       ✓ called     │
//! │        ├── Field { form: Contacts,    field: None }       ✗ skipped    │
//! │        └── Field { form: Order, field: Some("address") }  ✓ called     │
//! │                                                                         │
//! │   A handler returning Err (or panicking) is logged and the remaining   │
//! │   handlers still run.                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Re-entrancy
//! Handlers may emit further events and may subscribe or unsubscribe while
//! a dispatch is running. The table lock is only held while the matching
//! subscriptions are collected, never while a handler runs. A subscription
//! removed mid-dispatch is skipped for the rest of that dispatch.

use std::collections::HashMap;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::types::{FormErrors, Order, OrderResult, PaymentMethod, Product};

// =============================================================================
// Form Name
// =============================================================================

/// The checkout forms that publish field and submit events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormName {
    /// Address and payment step.
    Order,
    /// Email and phone step.
    Contacts,
}

impl FormName {
    pub const fn as_str(&self) -> &'static str {
        match self {
            FormName::Order => "order",
            FormName::Contacts => "contacts",
        }
    }
}

impl fmt::Display for FormName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Events
// =============================================================================

/// Every message that travels over the bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShopEvent {
    /// Catalog replaced or basket markers changed.
    ProductsChanged { products: Vec<Product> },
    /// A gallery card was clicked.
    ProductSelected(Product),
    /// "Add to basket" pressed in the preview.
    BasketAdd(Product),
    /// Delete pressed on a basket row.
    BasketRemove(Product),
    /// The basket should be (re)rendered.
    BasketShow,
    /// "Checkout" pressed in the basket.
    OrderStart,
    /// An input changed inside a form.
    FieldChanged {
        form: FormName,
        field: String,
        value: String,
    },
    /// A form was submitted.
    FormSubmit { form: FormName },
    /// A payment toggle button changed the selected method.
    PaymentMethod(Option<PaymentMethod>),
    /// Result of a validation pass; empty errors mean "all clear".
    FormInvalid(FormErrors),
    /// A field passed validation; carries the draft snapshot.
    OrderReady(Order),
    /// The draft order was reset.
    OrderCleared,
    /// The backend accepted the order.
    OrderPlaced(OrderResult),
    /// The order request failed.
    OrderFailed { message: String },
    ModalOpen,
    ModalClose,
}

/// Discriminant of [`ShopEvent`], used as the dispatch table key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    ProductsChanged,
    ProductSelected,
    BasketAdd,
    BasketRemove,
    BasketShow,
    OrderStart,
    FieldChanged,
    FormSubmit,
    PaymentMethod,
    FormInvalid,
    OrderReady,
    OrderCleared,
    OrderPlaced,
    OrderFailed,
    ModalOpen,
    ModalClose,
}

impl ShopEvent {
    /// Returns the variant discriminant.
    pub fn kind(&self) -> EventKind {
        match self {
            ShopEvent::ProductsChanged { .. } => EventKind::ProductsChanged,
            ShopEvent::ProductSelected(_) => EventKind::ProductSelected,
            ShopEvent::BasketAdd(_) => EventKind::BasketAdd,
            ShopEvent::BasketRemove(_) => EventKind::BasketRemove,
            ShopEvent::BasketShow => EventKind::BasketShow,
            ShopEvent::OrderStart => EventKind::OrderStart,
            ShopEvent::FieldChanged { .. } => EventKind::FieldChanged,
            ShopEvent::FormSubmit { .. } => EventKind::FormSubmit,
            ShopEvent::PaymentMethod(_) => EventKind::PaymentMethod,
            ShopEvent::FormInvalid(_) => EventKind::FormInvalid,
            ShopEvent::OrderReady(_) => EventKind::OrderReady,
            ShopEvent::OrderCleared => EventKind::OrderCleared,
            ShopEvent::OrderPlaced(_) => EventKind::OrderPlaced,
            ShopEvent::OrderFailed { .. } => EventKind::OrderFailed,
            ShopEvent::ModalOpen => EventKind::ModalOpen,
            ShopEvent::ModalClose => EventKind::ModalClose,
        }
    }

    /// Human-readable event name, used in logs.
    ///
    /// Form events follow the `<form>.<field>:change` and `<form>:submit`
    /// conventions.
    pub fn name(&self) -> String {
        match self {
            ShopEvent::FieldChanged { form, field, .. } => format!("{form}.{field}:change"),
            ShopEvent::FormSubmit { form } => format!("{form}:submit"),
            other => other.kind().name().to_string(),
        }
    }
}

impl EventKind {
    pub const fn name(&self) -> &'static str {
        match self {
            EventKind::ProductsChanged => "products:changed",
            EventKind::ProductSelected => "product:select",
            EventKind::BasketAdd => "basket:add",
            EventKind::BasketRemove => "basket:remove",
            EventKind::BasketShow => "basket:show",
            EventKind::OrderStart => "order:start",
            EventKind::FieldChanged => "form:change",
            EventKind::FormSubmit => "form:submit",
            EventKind::PaymentMethod => "payment:change",
            EventKind::FormInvalid => "formErrors:change",
            EventKind::OrderReady => "order:ready",
            EventKind::OrderCleared => "order:cleared",
            EventKind::OrderPlaced => "order:placed",
            EventKind::OrderFailed => "order:failed",
            EventKind::ModalOpen => "modal:open",
            EventKind::ModalClose => "modal:close",
        }
    }
}

// =============================================================================
// Patterns
// =============================================================================

/// What a subscription listens for.
///
/// Family subscriptions ("any field on any form") are expressed as
/// [`EventPattern::Field`] with `None` filters instead of string patterns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventPattern {
    /// Every event of one kind.
    Kind(EventKind),
    /// Field changes, optionally narrowed to a form and/or a field.
    Field {
        form: Option<FormName>,
        field: Option<String>,
    },
    /// Submissions of one form.
    Submit(FormName),
}

impl EventPattern {
    /// Any field change on any form.
    pub fn any_field() -> Self {
        EventPattern::Field {
            form: None,
            field: None,
        }
    }

    /// Any field change on one form.
    pub fn form_fields(form: FormName) -> Self {
        EventPattern::Field {
            form: Some(form),
            field: None,
        }
    }

    /// The dispatch table slot this pattern lives in.
    pub fn kind(&self) -> EventKind {
        match self {
            EventPattern::Kind(kind) => *kind,
            EventPattern::Field { .. } => EventKind::FieldChanged,
            EventPattern::Submit(_) => EventKind::FormSubmit,
        }
    }

    /// Returns true if the event should be delivered to this pattern.
    pub fn matches(&self, event: &ShopEvent) -> bool {
        match (self, event) {
            (EventPattern::Kind(kind), event) => *kind == event.kind(),
            (
                EventPattern::Field { form, field },
                ShopEvent::FieldChanged {
                    form: event_form,
                    field: event_field,
                    ..
                },
            ) => {
                form.map_or(true, |f| f == *event_form)
                    && field.as_deref().map_or(true, |f| f == event_field.as_str())
            }
            (EventPattern::Submit(form), ShopEvent::FormSubmit { form: event_form }) => {
                form == event_form
            }
            _ => false,
        }
    }
}

impl From<EventKind> for EventPattern {
    fn from(kind: EventKind) -> Self {
        EventPattern::Kind(kind)
    }
}

// =============================================================================
// Subscriptions
// =============================================================================

/// Handle returned by [`EventBus::on`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// Event handler. Returning `Err` is logged and does not stop dispatch.
pub type Handler = Arc<dyn Fn(&ShopEvent) -> anyhow::Result<()> + Send + Sync>;

struct Subscription {
    id: SubscriptionId,
    pattern: EventPattern,
    handler: Handler,
    active: AtomicBool,
}

/// Outcome of a single `emit`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Handlers that were invoked.
    pub delivered: usize,
    /// Handlers that returned an error or panicked.
    pub failed: usize,
}

// =============================================================================
// Event Bus
// =============================================================================

#[derive(Default)]
struct BusInner {
    table: Mutex<HashMap<EventKind, Vec<Arc<Subscription>>>>,
    next_id: AtomicU64,
}

/// Shared publish/subscribe hub.
///
/// Cloning is cheap and every clone talks to the same subscriptions, so
/// the bus is handed to each component through its constructor.
#[derive(Clone, Default)]
pub struct EventBus {
    inner: Arc<BusInner>,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let table = self.inner.table.lock();
        let count: usize = table.values().map(Vec::len).sum();
        f.debug_struct("EventBus")
            .field("subscriptions", &count)
            .finish()
    }
}

impl EventBus {
    /// Creates an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for every future event matching `pattern`.
    ///
    /// Multiple registrations are independent; each gets its own id.
    pub fn on<F>(&self, pattern: impl Into<EventPattern>, handler: F) -> SubscriptionId
    where
        F: Fn(&ShopEvent) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let pattern = pattern.into();
        let id = SubscriptionId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        let subscription = Arc::new(Subscription {
            id,
            pattern: pattern.clone(),
            handler: Arc::new(handler),
            active: AtomicBool::new(true),
        });

        self.inner
            .table
            .lock()
            .entry(pattern.kind())
            .or_default()
            .push(subscription);

        trace!(?id, ?pattern, "Subscribed");
        id
    }

    /// Removes a subscription. Returns false if it was not registered.
    pub fn off(&self, id: SubscriptionId) -> bool {
        let mut table = self.inner.table.lock();
        for subscriptions in table.values_mut() {
            if let Some(pos) = subscriptions.iter().position(|s| s.id == id) {
                let removed = subscriptions.remove(pos);
                removed.active.store(false, Ordering::Release);
                trace!(?id, "Unsubscribed");
                return true;
            }
        }
        false
    }

    /// Synchronously delivers `event` to every matching handler, in
    /// registration order.
    pub fn emit(&self, event: ShopEvent) -> DispatchReport {
        let kind = event.kind();
        let targets: Vec<Arc<Subscription>> = {
            let table = self.inner.table.lock();
            table
                .get(&kind)
                .map(|subs| {
                    subs.iter()
                        .filter(|s| s.pattern.matches(&event))
                        .cloned()
                        .collect()
                })
                .unwrap_or_default()
        };

        let mut report = DispatchReport::default();
        if targets.is_empty() {
            trace!(event = %event.name(), "No subscribers");
            return report;
        }

        debug!(event = %event.name(), handlers = targets.len(), "Dispatching event");

        for subscription in targets {
            if !subscription.active.load(Ordering::Acquire) {
                continue;
            }

            report.delivered += 1;
            let handler = &subscription.handler;
            match catch_unwind(AssertUnwindSafe(|| handler(&event))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    report.failed += 1;
                    warn!(
                        event = %event.name(),
                        subscription = ?subscription.id,
                        error = %e,
                        "Event handler failed"
                    );
                }
                Err(_) => {
                    report.failed += 1;
                    warn!(
                        event = %event.name(),
                        subscription = ?subscription.id,
                        "Event handler panicked"
                    );
                }
            }
        }

        report
    }

    /// Returns a callback that emits a clone of `event` each time it runs.
    ///
    /// Used to turn UI callbacks (button clicks) into bus messages.
    pub fn trigger(&self, event: ShopEvent) -> impl Fn() + Send + Sync + 'static {
        let bus = self.clone();
        move || {
            bus.emit(event.clone());
        }
    }

    /// Like [`trigger`](Self::trigger) but builds the event at call time.
    pub fn trigger_with<F>(&self, factory: F) -> impl Fn() + Send + Sync + 'static
    where
        F: Fn() -> ShopEvent + Send + Sync + 'static,
    {
        let bus = self.clone();
        move || {
            bus.emit(factory());
        }
    }

    /// Number of live subscriptions for a kind.
    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        self.inner.table.lock().get(&kind).map_or(0, Vec::len)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder() -> (Arc<Mutex<Vec<String>>>, impl Fn(&str) -> Handler) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let log_for_factory = log.clone();
        let make = move |tag: &str| -> Handler {
            let log = log_for_factory.clone();
            let tag = tag.to_string();
            Arc::new(move |event: &ShopEvent| {
                log.lock().push(format!("{tag}:{}", event.name()));
                Ok(())
            })
        };
        (log, make)
    }

    fn field(form: FormName, field: &str, value: &str) -> ShopEvent {
        ShopEvent::FieldChanged {
            form,
            field: field.to_string(),
            value: value.to_string(),
        }
    }

    #[test]
    fn test_handlers_fire_in_registration_order() {
        let bus = EventBus::new();
        let (log, make) = recorder();

        for tag in ["a", "b", "c"] {
            let h = make(tag);
            bus.on(EventKind::BasketShow, move |e| h(e));
        }

        let report = bus.emit(ShopEvent::BasketShow);
        assert_eq!(report.delivered, 3);
        assert_eq!(
            *log.lock(),
            vec!["a:basket:show", "b:basket:show", "c:basket:show"]
        );
    }

    #[test]
    fn test_only_matching_handlers_fire() {
        let bus = EventBus::new();
        let (log, make) = recorder();

        let h = make("show");
        bus.on(EventKind::BasketShow, move |e| h(e));
        let h = make("start");
        bus.on(EventKind::OrderStart, move |e| h(e));

        bus.emit(ShopEvent::OrderStart);
        assert_eq!(*log.lock(), vec!["start:order:start"]);
    }

    #[test]
    fn test_off_stops_delivery() {
        let bus = EventBus::new();
        let (log, make) = recorder();

        let h = make("x");
        let id = bus.on(EventKind::ModalOpen, move |e| h(e));
        bus.emit(ShopEvent::ModalOpen);
        assert!(bus.off(id));
        bus.emit(ShopEvent::ModalOpen);
        assert!(!bus.off(id));

        assert_eq!(log.lock().len(), 1);
        assert_eq!(bus.subscriber_count(EventKind::ModalOpen), 0);
    }

    #[test]
    fn test_off_during_dispatch_skips_removed_handler() {
        let bus = EventBus::new();
        let (log, make) = recorder();

        let second_id = Arc::new(Mutex::new(None::<SubscriptionId>));
        let bus_for_first = bus.clone();
        let id_for_first = second_id.clone();
        bus.on(EventKind::ModalClose, move |_| {
            if let Some(id) = *id_for_first.lock() {
                bus_for_first.off(id);
            }
            Ok(())
        });
        let h = make("second");
        *second_id.lock() = Some(bus.on(EventKind::ModalClose, move |e| h(e)));

        bus.emit(ShopEvent::ModalClose);
        assert!(log.lock().is_empty());
    }

    #[test]
    fn test_field_family_patterns() {
        let bus = EventBus::new();
        let (log, make) = recorder();

        let h = make("any");
        bus.on(EventPattern::any_field(), move |e| h(e));
        let h = make("contacts");
        bus.on(EventPattern::form_fields(FormName::Contacts), move |e| h(e));
        let h = make("address");
        bus.on(
            EventPattern::Field {
                form: Some(FormName::Order),
                field: Some("address".into()),
            },
            move |e| h(e),
        );

        bus.emit(field(FormName::Order, "address", "Spb"));
        bus.emit(field(FormName::Contacts, "email", "a@b.co"));

        assert_eq!(
            *log.lock(),
            vec![
                "any:order.address:change",
                "address:order.address:change",
                "any:contacts.email:change",
                "contacts:contacts.email:change",
            ]
        );
    }

    #[test]
    fn test_submit_pattern_is_per_form() {
        let bus = EventBus::new();
        let (log, make) = recorder();

        let h = make("order");
        bus.on(EventPattern::Submit(FormName::Order), move |e| h(e));

        bus.emit(ShopEvent::FormSubmit {
            form: FormName::Contacts,
        });
        bus.emit(ShopEvent::FormSubmit {
            form: FormName::Order,
        });
        assert_eq!(*log.lock(), vec!["order:order:submit"]);
    }

    #[test]
    fn test_failing_handler_does_not_block_others() {
        let bus = EventBus::new();
        let (log, make) = recorder();

        bus.on(EventKind::BasketShow, |_| anyhow::bail!("render failed"));
        bus.on(EventKind::BasketShow, |_| panic!("boom"));
        let h = make("after");
        bus.on(EventKind::BasketShow, move |e| h(e));

        let report = bus.emit(ShopEvent::BasketShow);
        assert_eq!(report.delivered, 3);
        assert_eq!(report.failed, 2);
        assert_eq!(*log.lock(), vec!["after:basket:show"]);
    }

    #[test]
    fn test_handlers_may_emit_reentrantly() {
        let bus = EventBus::new();
        let (log, make) = recorder();

        let inner_bus = bus.clone();
        bus.on(EventKind::BasketRemove, move |_| {
            inner_bus.emit(ShopEvent::BasketShow);
            Ok(())
        });
        let h = make("show");
        bus.on(EventKind::BasketShow, move |e| h(e));

        bus.emit(ShopEvent::BasketRemove(Product {
            id: "a".into(),
            title: "A".into(),
            description: String::new(),
            image: String::new(),
            category: String::new(),
            price: None,
            in_basket: true,
        }));
        assert_eq!(*log.lock(), vec!["show:basket:show"]);
    }

    #[test]
    fn test_trigger_emits_on_each_call() {
        let bus = EventBus::new();
        let (log, make) = recorder();
        let h = make("t");
        bus.on(EventKind::OrderStart, move |e| h(e));

        let click = bus.trigger(ShopEvent::OrderStart);
        click();
        click();
        assert_eq!(log.lock().len(), 2);

        let h = make("f");
        bus.on(EventKind::FormSubmit, move |e| h(e));
        let submit = bus.trigger_with(|| ShopEvent::FormSubmit {
            form: FormName::Order,
        });
        submit();
        assert_eq!(log.lock().last().unwrap(), "f:order:submit");
    }
}
