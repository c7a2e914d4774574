//! # Observable Model
//!
//! Shared base for stateful models that announce their changes on the bus.
//! Models embed an [`Observable`] instead of inheriting from it.

use tracing::trace;

use crate::events::{DispatchReport, EventBus, ShopEvent};

/// Holds the shared bus and exposes the "notify" primitive.
#[derive(Debug, Clone)]
pub struct Observable {
    events: EventBus,
}

impl Observable {
    pub fn new(events: EventBus) -> Self {
        Observable { events }
    }

    /// Announces a change to every subscriber.
    pub fn emit_changes(&self, event: ShopEvent) -> DispatchReport {
        trace!(event = %event.name(), "Model changed");
        self.events.emit(event)
    }

    /// The bus this model publishes on.
    pub fn events(&self) -> &EventBus {
        &self.events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_emit_changes_reaches_bus_subscribers() {
        let bus = EventBus::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        bus.on(EventKind::OrderCleared, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        let model = Observable::new(bus);
        let report = model.emit_changes(ShopEvent::OrderCleared);
        assert_eq!(report.delivered, 1);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
