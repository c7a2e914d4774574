//! # Views
//!
//! Concrete components, one per template.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  View             Template / mount point        Publishes               │
//! │  ────             ──────────────────────        ─────────               │
//! │  PageView         .page (header + gallery)      BasketShow              │
//! │  ProductView      #card-catalog, #card-preview  (caller's callback)     │
//! │  BasketItemView   #card-basket                  (caller's callback)     │
//! │  BasketView       #basket                       OrderStart              │
//! │  ModalView        #modal-container              ModalOpen, ModalClose   │
//! │  SuccessView      #success                      (caller's callback)     │
//! │  OrderForm        #order    (crate::form)       field/submit/payment    │
//! │  ContactsForm     #contacts (crate::form)       field/submit            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod basket;
pub mod modal;
pub mod page;
pub mod product;
pub mod success;

pub use basket::{BasketState, BasketView};
pub use modal::{ModalState, ModalView};
pub use page::{PageState, PageView};
pub use product::{BasketItemState, BasketItemView, BuyStatus, ProductState, ProductView};
pub use success::{SuccessState, SuccessView};
