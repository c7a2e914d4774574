//! # Document and Templates
//!
//! Builds the storefront document: the page skeleton, the modal container
//! and one `<template>` per reusable fragment.
//!
//! ```text
//! body
//! ├── .page
//! │   ├── .page__wrapper
//! │   │   ├── header  (.header__basket > .header__basket-counter)
//! │   │   └── main.gallery
//! │   └── #modal-container.modal
//! │       └── .modal__container (.modal__close, .modal__content)
//! ├── template#card-catalog    gallery card
//! ├── template#card-preview    full card with description + buy button
//! ├── template#card-basket     basket row
//! ├── template#basket          basket list, total, checkout button
//! ├── template#order           address + payment form
//! ├── template#contacts        email + phone form
//! └── template#success         order confirmation
//! ```

use larek_ui::Node;

pub const MODAL_CONTAINER: &str = "#modal-container";
pub const CARD_CATALOG: &str = "card-catalog";
pub const CARD_PREVIEW: &str = "card-preview";
pub const CARD_BASKET: &str = "card-basket";
pub const BASKET: &str = "basket";
pub const ORDER: &str = "order";
pub const CONTACTS: &str = "contacts";
pub const SUCCESS: &str = "success";

/// Builds a fresh document.
pub fn document() -> Node {
    Node::new("body")
        .with_child(page())
        .with_children([
            template(CARD_CATALOG, card_catalog()),
            template(CARD_PREVIEW, card_preview()),
            template(CARD_BASKET, card_basket()),
            template(BASKET, basket()),
            template(ORDER, order_form()),
            template(CONTACTS, contacts_form()),
            template(SUCCESS, success()),
        ])
}

fn template(id: &str, content: Node) -> Node {
    Node::new("template").with_attr("id", id).with_child(content)
}

// =============================================================================
// Page Skeleton
// =============================================================================

fn page() -> Node {
    let header = Node::new("header").with_class("header").with_child(
        Node::new("div")
            .with_class("header__container")
            .with_child(
                Node::new("a")
                    .with_class("header__logo")
                    .with_attr("href", "#")
                    .with_child(
                        Node::new("img")
                            .with_class("header__logo-image")
                            .with_attr("src", "./images/logo.svg")
                            .with_attr("alt", "Larek logo"),
                    ),
            )
            .with_child(
                Node::new("button").with_class("header__basket").with_child(
                    Node::new("span")
                        .with_class("header__basket-counter")
                        .with_text("0"),
                ),
            ),
    );

    let wrapper = Node::new("div")
        .with_class("page__wrapper")
        .with_child(header)
        .with_child(Node::new("main").with_class("gallery"));

    let modal = Node::new("div")
        .with_class("modal")
        .with_attr("id", "modal-container")
        .with_child(
            Node::new("div")
                .with_class("modal__container")
                .with_child(
                    Node::new("button")
                        .with_class("modal__close")
                        .with_attr("aria-label", "close"),
                )
                .with_child(Node::new("div").with_class("modal__content")),
        );

    Node::new("div")
        .with_class("page")
        .with_child(wrapper)
        .with_child(modal)
}

// =============================================================================
// Cards
// =============================================================================

fn card_catalog() -> Node {
    Node::new("button")
        .with_class("gallery__item")
        .with_class("card")
        .with_child(Node::new("span").with_class("card__category"))
        .with_child(Node::new("h2").with_class("card__title"))
        .with_child(Node::new("img").with_class("card__image"))
        .with_child(Node::new("span").with_class("card__price"))
}

fn card_preview() -> Node {
    Node::new("div")
        .with_class("card")
        .with_class("card_full")
        .with_child(Node::new("img").with_class("card__image"))
        .with_child(
            Node::new("div")
                .with_class("card__column")
                .with_child(Node::new("span").with_class("card__category"))
                .with_child(Node::new("h2").with_class("card__title"))
                .with_child(Node::new("p").with_class("card__text"))
                .with_child(
                    Node::new("div")
                        .with_class("card__row")
                        .with_child(
                            Node::new("button")
                                .with_class("button")
                                .with_class("card__button"),
                        )
                        .with_child(Node::new("span").with_class("card__price")),
                ),
        )
}

fn card_basket() -> Node {
    Node::new("li")
        .with_class("basket__item")
        .with_class("card")
        .with_class("card_compact")
        .with_child(Node::new("span").with_class("basket__item-index"))
        .with_child(Node::new("span").with_class("card__title"))
        .with_child(Node::new("span").with_class("card__price"))
        .with_child(
            Node::new("button")
                .with_class("basket__item-delete")
                .with_attr("aria-label", "delete"),
        )
}

// =============================================================================
// Basket
// =============================================================================

fn basket() -> Node {
    Node::new("div")
        .with_class("basket")
        .with_child(Node::new("h2").with_class("modal__title").with_text("Basket"))
        .with_child(Node::new("ul").with_class("basket__list"))
        .with_child(
            Node::new("div")
                .with_class("modal__actions")
                .with_child(
                    Node::new("button")
                        .with_class("button")
                        .with_class("basket__button")
                        .with_text("Checkout"),
                )
                .with_child(Node::new("span").with_class("basket__price")),
        )
}

// =============================================================================
// Forms
// =============================================================================

fn text_input(name: &str, placeholder: &str) -> Node {
    Node::new("input")
        .with_class("form__input")
        .with_attr("name", name)
        .with_attr("type", "text")
        .with_attr("placeholder", placeholder)
}

fn labelled(label: &str, input: Node) -> Node {
    Node::new("label")
        .with_class("order__field")
        .with_child(
            Node::new("span")
                .with_class("form__label")
                .with_class("modal__title")
                .with_text(label),
        )
        .with_child(input)
}

fn form_actions(submit: &str) -> Node {
    Node::new("div")
        .with_class("modal__actions")
        .with_child(
            Node::new("button")
                .with_class("button")
                .with_attr("type", "submit")
                .with_attr("disabled", "disabled")
                .with_text(submit),
        )
        .with_child(Node::new("span").with_class("form__errors"))
}

fn payment_button(name: &str, label: &str) -> Node {
    Node::new("button")
        .with_class("button")
        .with_class("button_alt")
        .with_attr("name", name)
        .with_attr("type", "button")
        .with_text(label)
}

fn order_form() -> Node {
    Node::new("form")
        .with_class("form")
        .with_attr("name", "order")
        .with_child(
            Node::new("div")
                .with_class("order")
                .with_child(
                    Node::new("div")
                        .with_class("order__field")
                        .with_child(
                            Node::new("h2")
                                .with_class("modal__title")
                                .with_text("Payment method"),
                        )
                        .with_child(
                            Node::new("div")
                                .with_class("order__buttons")
                                .with_child(payment_button("card", "Online"))
                                .with_child(payment_button("cash", "On delivery")),
                        ),
                )
                .with_child(labelled(
                    "Delivery address",
                    text_input("address", "Enter the address"),
                )),
        )
        .with_child(form_actions("Next"))
}

fn contacts_form() -> Node {
    Node::new("form")
        .with_class("form")
        .with_attr("name", "contacts")
        .with_child(
            Node::new("div")
                .with_class("order")
                .with_child(labelled("Email", text_input("email", "Enter Email")))
                .with_child(labelled("Phone", text_input("phone", "+7 (")))
        )
        .with_child(form_actions("Pay"))
}

fn success() -> Node {
    Node::new("div")
        .with_class("order-success")
        .with_child(
            Node::new("h2")
                .with_class("order-success__title")
                .with_text("Order placed"),
        )
        .with_child(Node::new("p").with_class("order-success__description"))
        .with_child(
            Node::new("button")
                .with_class("button")
                .with_class("order-success__close")
                .with_text("Back to shopping"),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use larek_ui::component::clone_template;

    #[test]
    fn test_every_template_clones() {
        let document = document();
        for id in [
            CARD_CATALOG,
            CARD_PREVIEW,
            CARD_BASKET,
            BASKET,
            ORDER,
            CONTACTS,
            SUCCESS,
        ] {
            assert!(clone_template(&document, id).is_ok(), "template {id}");
        }
    }

    #[test]
    fn test_clones_are_independent() {
        let document = document();
        let a = clone_template(&document, CARD_CATALOG).unwrap();
        let b = clone_template(&document, CARD_CATALOG).unwrap();
        a.query(".card__title").unwrap().set_text("A");

        assert_eq!(b.query(".card__title").unwrap().text(), "");
        assert!(a.parent().is_none());
    }

    #[test]
    fn test_page_skeleton() {
        let document = document();
        assert!(document.query(MODAL_CONTAINER).is_some());
        assert!(document.query(".gallery").is_some());
        assert_eq!(
            document.query(".header__basket-counter").unwrap().text(),
            "0"
        );
    }
}
