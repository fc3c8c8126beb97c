//! Cart aggregate.
//!
//! The storefront only reads carts; pricing and line-item handling happen in
//! the cart engine that produced them.

use serde::{Deserialize, Serialize};

use crate::types::{CurrencyCode, Price};

/// A line in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Line identifier, unique within the cart.
    pub id: String,
    /// Referenced product or promotion.
    pub reference_id: Option<String>,
    pub label: String,
    pub quantity: u32,
    pub unit_price: Price,
    pub total_price: Price,
}

/// Cart totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartPrice {
    /// Sum of all line totals.
    pub position_price: Price,
    /// Net amount after tax.
    pub net_price: Price,
    /// Gross amount the customer pays.
    pub total_price: Price,
}

impl CartPrice {
    /// All-zero totals in the given currency.
    #[must_use]
    pub const fn zero(currency_code: CurrencyCode) -> Self {
        Self {
            position_price: Price::zero(currency_code),
            net_price: Price::zero(currency_code),
            total_price: Price::zero(currency_code),
        }
    }
}

/// The shopping cart for a context token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    /// Context token the cart belongs to.
    pub token: String,
    pub line_items: Vec<LineItem>,
    pub price: CartPrice,
    /// Validation messages from the cart engine.
    pub errors: Vec<String>,
}

impl Cart {
    /// An empty cart for a token.
    #[must_use]
    pub fn empty(token: impl Into<String>, currency_code: CurrencyCode) -> Self {
        Self {
            token: token.into(),
            line_items: Vec::new(),
            price: CartPrice::zero(currency_code),
            errors: Vec::new(),
        }
    }

    /// Total quantity across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.line_items.iter().map(|item| item.quantity).sum()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.line_items.is_empty()
    }
}
