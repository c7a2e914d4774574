//! # Presenter
//!
//! Wires the event bus to `AppState`, the views and the checkout flow.
//!
//! ## Event Routing
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Presenter handlers                                   │
//! │                                                                         │
//! │  Event              Handler does                                        │
//! │  ─────              ────────────                                        │
//! │  ProductsChanged    re-render gallery cards, basket counter             │
//! │  ProductSelected    preview card into the modal                         │
//! │  BasketAdd          AppState::add_to_basket, counter, preview button    │
//! │  BasketRemove       AppState::remove_from_basket (→ BasketShow)         │
//! │  BasketShow         re-render basket rows + total, open if hidden       │
//! │  OrderStart         CheckoutFlow::start → order or contacts form        │
//! │  FieldChanged       AppState::set_order_field (→ FormInvalid)           │
//! │  PaymentMethod      AppState::set_order_field(payment)                  │
//! │  FormInvalid        errors + submit state on the visible form           │
//! │  FormSubmit         order: address_completed → contacts                 │
//! │                     contacts: begin_submit → order queue                │
//! │  OrderPlaced        clear basket + draft, success view                  │
//! │  OrderFailed        message into the contacts form, allow retry         │
//! │  OrderCleared       reset both forms                                    │
//! │  ModalOpen/Close    lock/unlock page; close dismisses the checkout      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Order Queue
//! Handlers run synchronously inside `EventBus::emit`, so the contacts
//! submit handler only queues the prepared order. [`Presenter::run`] (or
//! [`Presenter::process_pending`] in tests) awaits the API call outside any
//! handler and feeds the outcome back through the bus.
//!
//! ```text
//!  FormSubmit{contacts} ──► begin_submit ──► mpsc ──► run() ──► make_order
//!                                                                   │
//!        OrderPlaced / OrderFailed ◄── CheckoutFlow::complete ◄─────┘
//! ```

use std::sync::{Arc, Weak};

use anyhow::Context;
use larek_client::{ClientResult, ShopApi};
use larek_core::events::{EventBus, EventKind, EventPattern, FormName, ShopEvent, SubscriptionId};
use larek_core::types::{Order, OrderField, OrderResult, Product};
use larek_core::{AppState, CheckoutFlow, CheckoutStep};
use larek_ui::component::{clone_template, ensure_element};
use larek_ui::form::{ContactsFormState, OrderFormState};
use larek_ui::views::{
    BasketItemState, BasketItemView, BasketState, BasketView, BuyStatus, ModalView, PageView,
    ProductState, ProductView, SuccessState, SuccessView,
};
use larek_ui::{ContactsForm, FormState, Node, OrderForm, UiResult, View};
use parking_lot::Mutex;
use tokio::sync::{mpsc, Mutex as AsyncMutex};
use tracing::{debug, error, info, warn};

use crate::config::DisplaySettings;
use crate::error::AppResult;
use crate::templates;

type Handler = fn(&Screens, &ShopEvent) -> anyhow::Result<()>;

// =============================================================================
// Presenter
// =============================================================================

/// Owns the views and drives the storefront.
pub struct Presenter {
    screens: Arc<Screens>,
    api: Arc<dyn ShopApi>,
    orders: AsyncMutex<mpsc::UnboundedReceiver<Order>>,
    subscriptions: Vec<SubscriptionId>,
}

/// Everything the bus handlers touch.
struct Screens {
    bus: EventBus,
    state: Arc<AppState>,
    flow: Mutex<CheckoutFlow>,
    display: DisplaySettings,
    document: Node,
    page: PageView,
    modal: ModalView,
    basket: BasketView,
    order_form: OrderForm,
    contacts_form: ContactsForm,
    /// Product id and view of the open preview card.
    preview: Mutex<Option<(String, ProductView)>>,
    queue: mpsc::UnboundedSender<Order>,
}

impl Presenter {
    /// Binds the views onto `document` and subscribes on `state`'s bus.
    ///
    /// ## Errors
    /// `AppError::Ui` if the document lacks a required node or template.
    pub fn new(
        document: Node,
        state: Arc<AppState>,
        api: Arc<dyn ShopApi>,
        display: DisplaySettings,
    ) -> AppResult<Self> {
        let bus = state.events().clone();

        let page = PageView::new(document.clone(), bus.clone())?;
        let modal_root = ensure_element(&document, templates::MODAL_CONTAINER)?;
        let modal = ModalView::new(modal_root, &document, bus.clone())?;
        let basket = BasketView::new(clone_template(&document, templates::BASKET)?, bus.clone())?;
        let order_form = OrderForm::new(clone_template(&document, templates::ORDER)?, bus.clone())?;
        let contacts_form =
            ContactsForm::new(clone_template(&document, templates::CONTACTS)?, bus.clone())?;

        let (queue, orders) = mpsc::unbounded_channel();

        let screens = Arc::new(Screens {
            bus: bus.clone(),
            state,
            flow: Mutex::new(CheckoutFlow::new()),
            display,
            document,
            page,
            modal,
            basket,
            order_form,
            contacts_form,
            preview: Mutex::new(None),
            queue,
        });

        let routes: [(EventPattern, Handler); 15] = [
            (EventKind::ProductsChanged.into(), Screens::on_products_changed),
            (EventKind::ProductSelected.into(), Screens::on_product_selected),
            (EventKind::BasketAdd.into(), Screens::on_basket_add),
            (EventKind::BasketRemove.into(), Screens::on_basket_remove),
            (EventKind::BasketShow.into(), Screens::on_basket_show),
            (EventKind::OrderStart.into(), Screens::on_order_start),
            (EventPattern::any_field(), Screens::on_field_changed),
            (EventKind::PaymentMethod.into(), Screens::on_payment_method),
            (EventKind::FormInvalid.into(), Screens::on_form_invalid),
            (EventKind::FormSubmit.into(), Screens::on_form_submit),
            (EventKind::OrderPlaced.into(), Screens::on_order_placed),
            (EventKind::OrderFailed.into(), Screens::on_order_failed),
            (EventKind::OrderCleared.into(), Screens::on_order_cleared),
            (EventKind::ModalOpen.into(), Screens::on_modal_open),
            (EventKind::ModalClose.into(), Screens::on_modal_close),
        ];
        let subscriptions = routes
            .into_iter()
            .map(|(pattern, handler)| subscribe(&bus, &screens, pattern, handler))
            .collect();

        screens.page.set_counter(screens.state.basket_len());
        info!(basket = screens.state.basket_len(), "Presenter ready");

        Ok(Presenter {
            screens,
            api,
            orders: AsyncMutex::new(orders),
            subscriptions,
        })
    }

    /// Fetches the catalog into `AppState`.
    ///
    /// A failure is logged and leaves the gallery empty.
    pub async fn load_catalog(&self) -> ClientResult<usize> {
        match self.api.get_products().await {
            Ok(list) => {
                let count = list.items.len();
                self.screens.state.set_products(list.items);
                Ok(count)
            }
            Err(e) => {
                error!(error = %e, "Failed to load catalog");
                Err(e)
            }
        }
    }

    /// Submits every queued order, returning how many were sent.
    pub async fn process_pending(&self) -> usize {
        let mut sent = 0;
        loop {
            let next = self.orders.lock().await.try_recv();
            let Ok(order) = next else {
                break;
            };
            self.submit(order).await;
            sent += 1;
        }
        sent
    }

    /// Submits queued orders as they arrive. Runs for the life of the
    /// presenter.
    pub async fn run(&self) {
        debug!("Order queue running");
        loop {
            let next = self.orders.lock().await.recv().await;
            match next {
                Some(order) => self.submit(order).await,
                None => break,
            }
        }
    }

    async fn submit(&self, order: Order) {
        info!(items = order.items.len(), total = %order.total, "Submitting order");
        let outcome = self.api.make_order(&order).await;
        self.screens.finish_order(outcome);
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn state(&self) -> &AppState {
        &self.screens.state
    }

    pub fn step(&self) -> CheckoutStep {
        self.screens.flow.lock().step().clone()
    }

    pub fn document(&self) -> &Node {
        &self.screens.document
    }

    pub fn page(&self) -> &PageView {
        &self.screens.page
    }

    pub fn modal(&self) -> &ModalView {
        &self.screens.modal
    }

    pub fn basket(&self) -> &BasketView {
        &self.screens.basket
    }

    pub fn order_form(&self) -> &OrderForm {
        &self.screens.order_form
    }

    pub fn contacts_form(&self) -> &ContactsForm {
        &self.screens.contacts_form
    }

    /// HTML of the page (templates excluded).
    pub fn page_html(&self) -> String {
        self.screens
            .document
            .query(".page")
            .map(|page| page.to_html())
            .unwrap_or_default()
    }
}

impl Drop for Presenter {
    fn drop(&mut self) {
        for id in self.subscriptions.drain(..) {
            self.screens.bus.off(id);
        }
    }
}

/// Handlers hold the screens weakly; the bus outlives nothing it owns.
fn subscribe(
    bus: &EventBus,
    screens: &Arc<Screens>,
    pattern: EventPattern,
    handler: Handler,
) -> SubscriptionId {
    let weak: Weak<Screens> = Arc::downgrade(screens);
    bus.on(pattern, move |event| match weak.upgrade() {
        Some(screens) => handler(&screens, event),
        None => Ok(()),
    })
}

// =============================================================================
// Handlers
// =============================================================================

impl Screens {
    fn on_products_changed(&self, event: &ShopEvent) -> anyhow::Result<()> {
        let ShopEvent::ProductsChanged { products } = event else {
            return Ok(());
        };

        let cards = products
            .iter()
            .map(|product| self.catalog_card(product))
            .collect::<UiResult<Vec<Node>>>()?;
        self.page.set_catalog(cards);
        self.page.set_counter(self.state.basket_len());
        Ok(())
    }

    fn on_product_selected(&self, event: &ShopEvent) -> anyhow::Result<()> {
        let ShopEvent::ProductSelected(product) = event else {
            return Ok(());
        };

        let node = clone_template(&self.document, templates::CARD_PREVIEW)?;
        let view = ProductView::preview(node, self.bus.trigger(ShopEvent::BasketAdd(product.clone())))?;
        let root = view.render(Some(ProductState {
            description: Some(product.description.clone()),
            status: Some(BuyStatus::of(
                product.is_for_sale(),
                self.state.is_in_basket(&product.id),
            )),
            ..self.card_state(product)
        }));

        *self.preview.lock() = Some((product.id.clone(), view));
        self.modal.show(root);
        Ok(())
    }

    fn on_basket_add(&self, event: &ShopEvent) -> anyhow::Result<()> {
        let ShopEvent::BasketAdd(product) = event else {
            return Ok(());
        };
        if !product.is_for_sale() {
            debug!(id = %product.id, "Not for sale, add ignored");
            return Ok(());
        }

        self.state.add_to_basket(product);
        self.page.set_counter(self.state.basket_len());

        let preview = self.preview.lock().clone();
        if let Some((id, view)) = preview {
            if id == product.id {
                view.set_status(BuyStatus::InBasket);
            }
        }
        Ok(())
    }

    fn on_basket_remove(&self, event: &ShopEvent) -> anyhow::Result<()> {
        if let ShopEvent::BasketRemove(product) = event {
            self.state.remove_from_basket(product);
        }
        Ok(())
    }

    fn on_basket_show(&self, _event: &ShopEvent) -> anyhow::Result<()> {
        let basket = self.state.basket();
        let rows = basket
            .iter()
            .enumerate()
            .map(|(i, product)| self.basket_row(i + 1, product))
            .collect::<UiResult<Vec<Node>>>()?;

        let root = self.basket.render(Some(BasketState {
            items: Some(rows),
            total: Some(self.display.format_amount(self.state.total_price())),
        }));
        self.page.set_counter(basket.len());

        if !self.is_showing(&root) {
            self.modal.show(root);
        }
        Ok(())
    }

    fn on_order_start(&self, _event: &ShopEvent) -> anyhow::Result<()> {
        let previous_valid = self.state.is_previous_form_valid();
        let step = self.flow.lock().start(previous_valid)?.clone();
        info!(%step, "Checkout started");

        match step {
            CheckoutStep::Contacts => self.show_contacts_form(),
            _ => self.show_order_form(),
        }
        Ok(())
    }

    fn on_field_changed(&self, event: &ShopEvent) -> anyhow::Result<()> {
        let ShopEvent::FieldChanged { form, field, value } = event else {
            return Ok(());
        };
        let field: OrderField = field
            .parse()
            .with_context(|| format!("input in the {form} form"))?;
        self.state.set_order_field(field, value)?;
        Ok(())
    }

    fn on_payment_method(&self, event: &ShopEvent) -> anyhow::Result<()> {
        let ShopEvent::PaymentMethod(method) = event else {
            return Ok(());
        };
        let value = method.map_or("", |m| m.as_str());
        self.state.set_order_field(OrderField::Payment, value)?;
        Ok(())
    }

    fn on_form_invalid(&self, event: &ShopEvent) -> anyhow::Result<()> {
        let ShopEvent::FormInvalid(errors) = event else {
            return Ok(());
        };

        let step = self.flow.lock().step().clone();
        match step {
            CheckoutStep::Address => self.order_form.form().apply(FormState {
                valid: Some(self.state.is_previous_form_valid()),
                errors: Some(errors.joined()),
            }),
            CheckoutStep::Contacts | CheckoutStep::Failure { .. } => {
                self.contacts_form.form().apply(FormState {
                    valid: Some(self.ready_to_submit()),
                    errors: Some(errors.joined()),
                })
            }
            CheckoutStep::Submitting => self.contacts_form.form().set_errors(&errors.joined()),
            _ => debug!(%step, "Validation result with no form open"),
        }
        Ok(())
    }

    fn on_form_submit(&self, event: &ShopEvent) -> anyhow::Result<()> {
        let ShopEvent::FormSubmit { form } = event else {
            return Ok(());
        };
        match form {
            FormName::Order => self.submit_address(),
            FormName::Contacts => self.submit_contacts(),
        }
    }

    fn on_order_placed(&self, event: &ShopEvent) -> anyhow::Result<()> {
        let ShopEvent::OrderPlaced(placed) = event else {
            return Ok(());
        };
        info!(id = %placed.id, total = %placed.total, "Order placed");

        self.state.clear_basket();
        self.state.clear_order_fields();

        let close = self.modal.close_button().downgrade();
        let view = SuccessView::new(clone_template(&self.document, templates::SUCCESS)?, move || {
            if let Some(button) = close.upgrade() {
                button.click();
            }
        })?;
        let root = view.render(Some(SuccessState {
            title: None,
            description: Some(format!(
                "Written off {}",
                self.display.format_amount(placed.total)
            )),
        }));
        self.modal.show(root);
        Ok(())
    }

    fn on_order_failed(&self, event: &ShopEvent) -> anyhow::Result<()> {
        let ShopEvent::OrderFailed { message } = event else {
            return Ok(());
        };
        self.contacts_form.form().apply(FormState {
            valid: Some(self.ready_to_submit()),
            errors: Some(message.clone()),
        });
        Ok(())
    }

    fn on_order_cleared(&self, _event: &ShopEvent) -> anyhow::Result<()> {
        let cleared = FormState {
            valid: Some(false),
            errors: Some(String::new()),
        };
        self.order_form.apply(OrderFormState {
            form: cleared.clone(),
            address: Some(String::new()),
            payment: Some(None),
        });
        self.contacts_form.apply(ContactsFormState {
            form: cleared,
            email: Some(String::new()),
            phone: Some(String::new()),
        });
        Ok(())
    }

    fn on_modal_open(&self, _event: &ShopEvent) -> anyhow::Result<()> {
        self.page.set_locked(true);
        Ok(())
    }

    fn on_modal_close(&self, _event: &ShopEvent) -> anyhow::Result<()> {
        self.page.set_locked(false);
        *self.preview.lock() = None;
        if self.flow.lock().dismiss() {
            debug!("Checkout dismissed");
        }
        Ok(())
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    fn submit_address(&self) -> anyhow::Result<()> {
        let errors = self.state.validate_order(OrderField::Address);
        let moved = self.flow.lock().address_completed(&errors)?;
        if moved {
            self.show_contacts_form();
        }
        Ok(())
    }

    fn submit_contacts(&self) -> anyhow::Result<()> {
        if self.flow.lock().is_submitting() {
            debug!("Order already in flight, submit ignored");
            return Ok(());
        }

        let started = self.flow.lock().begin_submit(self.ready_to_submit())?;
        if !started {
            let errors = self.state.validate_order(OrderField::Email);
            if errors.is_empty() {
                self.state.validate_order(OrderField::Phone);
            }
            return Ok(());
        }

        self.contacts_form.form().apply(FormState {
            valid: Some(false),
            errors: Some(String::new()),
        });

        let order = self.state.prepare_order();
        info!(items = order.items.len(), total = %order.total, "Order queued");
        if self.queue.send(order).is_err() {
            let message = "Order queue is closed".to_string();
            self.flow.lock().complete(Err(message.clone()))?;
            self.contacts_form.form().set_errors(&message);
            anyhow::bail!(message);
        }
        Ok(())
    }

    /// Records the API outcome and announces it on the bus.
    fn finish_order(&self, outcome: ClientResult<OrderResult>) {
        let (event, result) = match outcome {
            Ok(placed) => (ShopEvent::OrderPlaced(placed.clone()), Ok(placed)),
            Err(e) => {
                error!(error = %e, "Order submission failed");
                let message = e.user_message();
                (
                    ShopEvent::OrderFailed {
                        message: message.clone(),
                    },
                    Err(message),
                )
            }
        };

        let completed = self.flow.lock().complete(result).map(|_| ());
        if let Err(e) = completed {
            warn!(error = %e, "Order outcome dropped");
            return;
        }
        self.bus.emit(event);
    }

    fn ready_to_submit(&self) -> bool {
        self.state.is_previous_form_valid() && self.state.is_contacts_valid()
    }

    fn show_order_form(&self) {
        let order = self.state.order();
        let root = self.order_form.render(Some(OrderFormState {
            form: FormState {
                valid: Some(self.state.is_previous_form_valid()),
                errors: Some(String::new()),
            },
            address: Some(order.address),
            payment: Some(order.payment),
        }));
        self.modal.show(root);
    }

    fn show_contacts_form(&self) {
        let order = self.state.order();
        let root = self.contacts_form.render(Some(ContactsFormState {
            form: FormState {
                valid: Some(self.ready_to_submit()),
                errors: Some(String::new()),
            },
            email: Some(order.email),
            phone: Some(order.phone),
        }));
        self.modal.show(root);
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    fn card_state(&self, product: &Product) -> ProductState {
        ProductState {
            title: Some(product.title.clone()),
            image: Some(product.image.clone()),
            category: Some(product.category.clone()),
            price: Some(self.display.format_price(product.price)),
            ..ProductState::default()
        }
    }

    fn catalog_card(&self, product: &Product) -> UiResult<Node> {
        let node = clone_template(&self.document, templates::CARD_CATALOG)?;
        let view = ProductView::new(
            node,
            self.bus.trigger(ShopEvent::ProductSelected(product.clone())),
        )?;
        Ok(view.render(Some(self.card_state(product))))
    }

    fn basket_row(&self, index: usize, product: &Product) -> UiResult<Node> {
        let node = clone_template(&self.document, templates::CARD_BASKET)?;
        let view = BasketItemView::new(
            node,
            self.bus.trigger(ShopEvent::BasketRemove(product.clone())),
        )?;
        Ok(view.render(Some(BasketItemState {
            index: Some(index),
            title: Some(product.title.clone()),
            price: Some(self.display.format_price(product.price)),
        })))
    }

    fn is_showing(&self, node: &Node) -> bool {
        self.modal.is_open() && self.modal.content().children().iter().any(|c| c == node)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
