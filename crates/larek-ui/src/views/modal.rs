//! # Modal
//!
//! The single modal container every dialog is rendered into.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Closes on:                                                             │
//! │    • .modal__close clicked                                              │
//! │    • a click landing on the overlay itself (not on the content)         │
//! │    • Escape pressed anywhere in the document while open                 │
//! │                                                                         │
//! │  open()  ──► adds modal_active     ──► ModalOpen                        │
//! │  close() ──► removes modal_active  ──► ModalClose                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use larek_core::events::{EventBus, ShopEvent};

use crate::component::{Binder, View};
use crate::error::UiResult;
use crate::node::{DomEventKind, Node, WeakNode};

pub const ACTIVE_CLASS: &str = "modal_active";

#[derive(Debug, Clone)]
pub struct ModalView {
    binder: Binder,
    close: Node,
    content: Node,
    events: EventBus,
}

#[derive(Debug, Clone, Default)]
pub struct ModalState {
    pub content: Option<Node>,
}

impl ModalView {
    /// Binds the modal container. Escape is listened for on `document`.
    pub fn new(root: Node, document: &Node, events: EventBus) -> UiResult<Self> {
        let binder = Binder::new(root, "modal");
        let close = binder.ensure(".modal__close")?;
        let content = binder.ensure(".modal__content")?;

        let container = binder.root().downgrade();

        let (weak, bus) = (container.clone(), events.clone());
        close.on(DomEventKind::Click, move |_| close_modal(&weak, &bus));

        let (weak, bus) = (container.clone(), events.clone());
        binder.root().on(DomEventKind::Click, move |event| {
            if weak.is(event.target()) {
                close_modal(&weak, &bus);
            }
        });

        content.on(DomEventKind::Click, |event| event.stop_propagation());

        let (weak, bus) = (container, events.clone());
        document.on(DomEventKind::KeyDown, move |event| {
            let open = weak
                .upgrade()
                .is_some_and(|root| root.has_class(ACTIVE_CLASS));
            if event.key() == Some("Escape") && open {
                close_modal(&weak, &bus);
            }
        });

        Ok(ModalView {
            binder,
            close,
            content,
            events,
        })
    }

    pub fn set_content(&self, node: Node) {
        self.content.replace_children([node]);
    }

    pub fn open(&self) {
        self.root().add_class(ACTIVE_CLASS);
        self.events.emit(ShopEvent::ModalOpen);
    }

    pub fn close(&self) {
        close_modal(&self.root().downgrade(), &self.events);
    }

    pub fn is_open(&self) -> bool {
        self.root().has_class(ACTIVE_CLASS)
    }

    /// Replaces the content and opens the modal.
    pub fn show(&self, content: Node) -> Node {
        let root = self.render(Some(ModalState {
            content: Some(content),
        }));
        self.open();
        root
    }

    pub fn content(&self) -> &Node {
        &self.content
    }

    pub fn close_button(&self) -> &Node {
        &self.close
    }
}

fn close_modal(container: &WeakNode, events: &EventBus) {
    if let Some(root) = container.upgrade() {
        root.remove_class(ACTIVE_CLASS);
    }
    events.emit(ShopEvent::ModalClose);
}

impl View for ModalView {
    type State = ModalState;

    fn root(&self) -> &Node {
        self.binder.root()
    }

    fn apply(&self, state: ModalState) {
        if let Some(content) = state.content {
            self.set_content(content);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use larek_core::events::EventKind;
    use parking_lot::Mutex;
    use std::sync::Arc;

    struct Fixture {
        document: Node,
        modal: ModalView,
        log: Arc<Mutex<Vec<&'static str>>>,
    }

    fn fixture() -> Fixture {
        let root = Node::new("div").with_class("modal").with_child(
            Node::new("div")
                .with_class("modal__container")
                .with_child(Node::new("button").with_class("modal__close"))
                .with_child(Node::new("div").with_class("modal__content")),
        );
        let document = Node::new("body").with_child(root.clone());

        let bus = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = log.clone();
        bus.on(EventKind::ModalOpen, move |_| {
            sink.lock().push("open");
            Ok(())
        });
        let sink = log.clone();
        bus.on(EventKind::ModalClose, move |_| {
            sink.lock().push("close");
            Ok(())
        });

        let modal = ModalView::new(root, &document, bus).unwrap();
        Fixture {
            document,
            modal,
            log,
        }
    }

    #[test]
    fn test_show_replaces_content_and_opens() {
        let f = fixture();
        f.modal.show(Node::new("p").with_text("first"));
        f.modal.show(Node::new("p").with_text("second"));

        assert!(f.modal.is_open());
        assert_eq!(f.modal.content().text(), "second");
        assert_eq!(*f.log.lock(), vec!["open", "open"]);
    }

    #[test]
    fn test_close_button() {
        let f = fixture();
        f.modal.show(Node::new("p"));
        f.modal.close_button().click();

        assert!(!f.modal.is_open());
        assert_eq!(*f.log.lock(), vec!["open", "close"]);
    }

    #[test]
    fn test_click_outside_closes_but_inside_does_not() {
        let f = fixture();
        let inner = Node::new("button");
        f.modal.show(Node::new("div").with_child(inner.clone()));

        inner.click();
        assert!(f.modal.is_open());

        f.modal.root().click();
        assert!(!f.modal.is_open());
    }

    #[test]
    fn test_escape_closes_only_when_open() {
        let f = fixture();
        f.document.key_down("Escape");
        assert!(f.log.lock().is_empty());

        f.modal.show(Node::new("p"));
        f.document.key_down("Enter");
        assert!(f.modal.is_open());

        f.document.key_down("Escape");
        assert!(!f.modal.is_open());
        assert_eq!(*f.log.lock(), vec!["open", "close"]);
    }
}
