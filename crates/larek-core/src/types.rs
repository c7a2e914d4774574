//! # Domain Types
//!
//! Core domain types used throughout the storefront.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │  Order (draft)  │   │   FormErrors    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  payment        │   │  field → text   │       │
//! │  │  title          │   │  address        │   │  empty = valid  │       │
//! │  │  category       │   │  email, phone   │   └─────────────────┘       │
//! │  │  price | null   │   │  total, items   │                             │
//! │  │  inBasket       │   └─────────────────┘                             │
//! │  └─────────────────┘                                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  OrderField     │   │ PaymentMethod   │   │ProductCategory  │       │
//! │  │  payment        │   │  Card           │   │  Soft / Hard    │       │
//! │  │  address        │   │  Cash           │   │  Other / Button │       │
//! │  │  email, phone   │   └─────────────────┘   │  Additional     │       │
//! │  └─────────────────┘                         └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! Products are compared by `id` everywhere the basket is concerned; the
//! remaining fields are display data that never changes after the catalog
//! loads. The `in_basket` marker is the one exception and is owned by
//! [`AppState`](crate::state::AppState).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;
use crate::money::Money;

// =============================================================================
// Product
// =============================================================================

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Catalog identifier assigned by the backend.
    pub id: String,

    /// Display name.
    pub title: String,

    /// Long description shown in the preview.
    #[serde(default)]
    pub description: String,

    /// Image path (relative to the CDN until resolved by the client).
    #[serde(default)]
    pub image: String,

    /// Category label as sent by the backend.
    #[serde(default)]
    pub category: String,

    /// Price, or `None` when the product is not for sale.
    #[serde(default)]
    pub price: Option<Money>,

    /// Whether the product currently sits in the basket.
    #[serde(default)]
    pub in_basket: bool,
}

impl Product {
    /// Returns true if the product can be bought.
    #[inline]
    pub fn is_for_sale(&self) -> bool {
        self.price.is_some()
    }

    /// Returns the parsed category.
    pub fn category_kind(&self) -> ProductCategory {
        ProductCategory::from_label(&self.category)
    }
}

/// List envelope returned by `GET /product`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductList {
    pub total: usize,
    pub items: Vec<Product>,
}

// =============================================================================
// Product Category
// =============================================================================

/// Product categories known to the storefront.
///
/// Each category maps to a CSS modifier (`card__category_<modifier>`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProductCategory {
    Soft,
    Hard,
    Other,
    Additional,
    Button,
}

impl ProductCategory {
    /// Parses the backend label. Unknown labels fall back to `Other`.
    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "софт-скил" | "soft" => ProductCategory::Soft,
            "хард-скил" | "hard" => ProductCategory::Hard,
            "дополнительное" | "additional" => ProductCategory::Additional,
            "кнопка" | "button" => ProductCategory::Button,
            _ => ProductCategory::Other,
        }
    }

    /// CSS modifier suffix.
    pub const fn modifier(&self) -> &'static str {
        match self {
            ProductCategory::Soft => "soft",
            ProductCategory::Hard => "hard",
            ProductCategory::Other => "other",
            ProductCategory::Additional => "additional",
            ProductCategory::Button => "button",
        }
    }

    pub const ALL: [ProductCategory; 5] = [
        ProductCategory::Soft,
        ProductCategory::Hard,
        ProductCategory::Other,
        ProductCategory::Additional,
        ProductCategory::Button,
    ];
}

// =============================================================================
// Payment Method
// =============================================================================

/// How the shopper pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Online card payment.
    Card,
    /// Cash on delivery.
    Cash,
}

impl PaymentMethod {
    pub const fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Card => "card",
            PaymentMethod::Cash => "cash",
        }
    }

    /// Parses a form value; the empty string means "no method selected".
    pub fn parse_optional(value: &str) -> Result<Option<Self>, CoreError> {
        match value.trim() {
            "" | "null" => Ok(None),
            other => other.parse().map(Some),
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "card" | "online" => Ok(PaymentMethod::Card),
            "cash" => Ok(PaymentMethod::Cash),
            other => Err(CoreError::UnknownPaymentMethod(other.to_string())),
        }
    }
}

// =============================================================================
// Order Field
// =============================================================================

/// The user-editable fields of the draft order.
///
/// `total` and `items` are deliberately absent: they are computed from the
/// basket at submission time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderField {
    Payment,
    Address,
    Email,
    Phone,
}

impl OrderField {
    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderField::Payment => "payment",
            OrderField::Address => "address",
            OrderField::Email => "email",
            OrderField::Phone => "phone",
        }
    }

    /// Returns true for fields that belong to the address/payment step.
    pub const fn is_address_step(&self) -> bool {
        matches!(self, OrderField::Payment | OrderField::Address)
    }
}

impl fmt::Display for OrderField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderField {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "payment" => Ok(OrderField::Payment),
            "address" => Ok(OrderField::Address),
            "email" => Ok(OrderField::Email),
            "phone" => Ok(OrderField::Phone),
            other => Err(CoreError::UnknownField(other.to_string())),
        }
    }
}

// =============================================================================
// Order (draft)
// =============================================================================

/// The checkout draft and, once prepared, the `POST /order` body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub payment: Option<PaymentMethod>,
    pub address: String,
    pub email: String,
    pub phone: String,
    pub total: Money,
    pub items: Vec<String>,
}

impl Order {
    /// Returns the current value of an editable field as form text.
    pub fn field(&self, field: OrderField) -> String {
        match field {
            OrderField::Payment => self
                .payment
                .map(|p| p.as_str().to_string())
                .unwrap_or_default(),
            OrderField::Address => self.address.clone(),
            OrderField::Email => self.email.clone(),
            OrderField::Phone => self.phone.clone(),
        }
    }

    /// Assigns an editable field from form text.
    pub fn set_field(&mut self, field: OrderField, value: &str) -> Result<(), CoreError> {
        match field {
            OrderField::Payment => self.payment = PaymentMethod::parse_optional(value)?,
            OrderField::Address => self.address = value.to_string(),
            OrderField::Email => self.email = value.to_string(),
            OrderField::Phone => self.phone = value.to_string(),
        }
        Ok(())
    }
}

/// Response of `POST /order`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderResult {
    pub id: String,
    pub total: Money,
}

// =============================================================================
// Form Errors
// =============================================================================

/// Validation messages keyed by order field. Empty means valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<OrderField, String>);

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: OrderField, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    pub fn get(&self, field: OrderField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: OrderField) -> bool {
        self.0.contains_key(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if any of the given fields has an error.
    pub fn any_of(&self, fields: &[OrderField]) -> bool {
        fields.iter().any(|f| self.contains(*f))
    }

    /// Messages joined for the form's error line.
    pub fn joined(&self) -> String {
        self.0.values().cloned().collect::<Vec<_>>().join("; ")
    }

    pub fn iter(&self) -> impl Iterator<Item = (OrderField, &str)> {
        self.0.iter().map(|(f, m)| (*f, m.as_str()))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_from_api_json() {
        let json = r#"{
            "id": "854cef69-976d-4c2a-a18c-2aa45046c390",
            "description": "Если планируете решать задачи в тренажёре, берите два.",
            "image": "/5_Dots.svg",
            "title": "+1 час в сутках",
            "category": "софт-скил",
            "price": 750
        }"#;

        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.price, Some(Money::from_units(750)));
        assert_eq!(product.category_kind(), ProductCategory::Soft);
        assert!(!product.in_basket);
        assert!(product.is_for_sale());
    }

    #[test]
    fn test_priceless_product() {
        let json = r#"{"id": "x", "title": "Мамка-таймер", "category": "другое", "price": null}"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.price, None);
        assert!(!product.is_for_sale());
        assert_eq!(product.category_kind().modifier(), "other");
    }

    #[test]
    fn test_payment_parsing() {
        assert_eq!("card".parse::<PaymentMethod>().unwrap(), PaymentMethod::Card);
        assert_eq!("cash".parse::<PaymentMethod>().unwrap(), PaymentMethod::Cash);
        assert!("barter".parse::<PaymentMethod>().is_err());
        assert_eq!(PaymentMethod::parse_optional("").unwrap(), None);
    }

    #[test]
    fn test_order_field_parsing() {
        assert_eq!("email".parse::<OrderField>().unwrap(), OrderField::Email);
        assert!("total".parse::<OrderField>().is_err());
        assert!(OrderField::Address.is_address_step());
        assert!(!OrderField::Phone.is_address_step());
    }

    #[test]
    fn test_order_serializes_as_api_body() {
        let mut order = Order::default();
        order.set_field(OrderField::Payment, "card").unwrap();
        order.set_field(OrderField::Address, "Spb").unwrap();
        order.items = vec!["a".into()];
        order.total = Money::from_units(10);

        let value = serde_json::to_value(&order).unwrap();
        assert_eq!(value["payment"], "card");
        assert_eq!(value["total"], 10);
        assert_eq!(value["items"][0], "a");

        order.set_field(OrderField::Payment, "").unwrap();
        let value = serde_json::to_value(&order).unwrap();
        assert!(value["payment"].is_null());
    }

    #[test]
    fn test_form_errors_join() {
        let mut errors = FormErrors::new();
        assert!(errors.is_empty());

        errors.insert(OrderField::Phone, "bad phone");
        errors.insert(OrderField::Email, "bad email");
        assert_eq!(errors.len(), 2);
        // BTreeMap order follows the enum declaration
        assert_eq!(errors.joined(), "bad email; bad phone");
        assert!(errors.any_of(&[OrderField::Phone]));
        assert!(!errors.any_of(&[OrderField::Address, OrderField::Payment]));
    }
}
