//! The store shopping cart.
//!
//! A [`Cart`] is an ordered list of [`CartEntry`] records with at most one
//! entry per product. It is persisted as JSON under [`STORAGE_KEY`] by
//! whatever store the caller injects; this module only defines the shape
//! and the mutations.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::line_item::{CatalogProduct, LineItem, MAX_QUANTITY};
use crate::totals::{OrderTotals, Priced, TotalsError, calculate};
use crate::types::ProductId;

/// Key under which the serialized cart is stored.
pub const STORAGE_KEY: &str = "shopping-cart";

/// One product in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartEntry {
    #[serde(rename = "id")]
    pub product_id: ProductId,
    pub name: String,
    #[serde(rename = "price")]
    pub unit_price: Decimal,
    pub quantity: i64,
    #[serde(rename = "tax_rate", default)]
    pub tax_rate_percent: Decimal,
}

impl CartEntry {
    /// A fresh entry for `product` with quantity 1.
    #[must_use]
    pub fn from_product(product: &CatalogProduct) -> Self {
        Self {
            product_id: product.id.clone(),
            name: product.name.clone(),
            unit_price: product.price,
            quantity: 1,
            tax_rate_percent: product.tax_rate,
        }
    }

    /// The invoice row this entry becomes at checkout.
    #[must_use]
    pub fn to_line_item(&self) -> LineItem {
        LineItem {
            product_id: Some(self.product_id.clone()),
            description: self.name.clone(),
            quantity: self.quantity,
            unit_price: self.unit_price,
            tax_rate_percent: self.tax_rate_percent,
        }
    }
}

impl Priced for CartEntry {
    fn quantity(&self) -> i64 {
        self.quantity
    }

    fn unit_price(&self) -> Decimal {
        self.unit_price
    }

    fn tax_rate_percent(&self) -> Decimal {
        self.tax_rate_percent
    }
}

/// Errors from cart mutations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CartError {
    #[error("quantity must be between 1 and {max} (got {0})", max = MAX_QUANTITY)]
    InvalidQuantity(i64),

    #[error("product {0} is not in the cart")]
    NotInCart(ProductId),

    #[error(transparent)]
    Totals(#[from] TotalsError),
}

/// The shopping cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    entries: Vec<CartEntry>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Parse a persisted cart blob.
    ///
    /// # Errors
    ///
    /// Returns the JSON error if the blob is not a valid cart.
    pub fn from_json(blob: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(blob)
    }

    /// Serialize for persistence.
    ///
    /// # Errors
    ///
    /// Returns an error only if serialization itself fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Entries in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[CartEntry] {
        &self.entries
    }

    /// Look up the entry for a product.
    #[must_use]
    pub fn get(&self, product_id: &ProductId) -> Option<&CartEntry> {
        self.entries.iter().find(|e| &e.product_id == product_id)
    }

    /// Add one unit of `product`. An existing entry has its quantity bumped,
    /// up to [`MAX_QUANTITY`].
    pub fn add_product(&mut self, product: &CatalogProduct) {
        match self
            .entries
            .iter_mut()
            .find(|e| e.product_id == product.id)
        {
            Some(entry) => entry.quantity = entry.quantity.saturating_add(1).min(MAX_QUANTITY),
            None => self.entries.push(CartEntry::from_product(product)),
        }
    }

    /// Set the quantity of an entry already in the cart.
    ///
    /// # Errors
    ///
    /// Rejects quantities outside `1..=MAX_QUANTITY` and products not in
    /// the cart.
    pub fn set_quantity(&mut self, product_id: &ProductId, quantity: i64) -> Result<(), CartError> {
        if !(1..=MAX_QUANTITY).contains(&quantity) {
            return Err(CartError::InvalidQuantity(quantity));
        }
        let entry = self
            .entries
            .iter_mut()
            .find(|e| &e.product_id == product_id)
            .ok_or_else(|| CartError::NotInCart(product_id.clone()))?;
        entry.quantity = quantity;
        Ok(())
    }

    /// Remove a product. Returns whether anything was removed.
    pub fn remove(&mut self, product_id: &ProductId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| &e.product_id != product_id);
        self.entries.len() != before
    }

    /// Remove everything.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of distinct products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Total units across all entries.
    ///
    /// Saturates rather than wrapping for a cart read back from an
    /// oversized blob.
    #[must_use]
    pub fn item_count(&self) -> i64 {
        self.entries
            .iter()
            .fold(0_i64, |count, e| count.saturating_add(e.quantity))
    }

    /// Current totals.
    ///
    /// # Errors
    ///
    /// Returns [`TotalsError`] if the totals do not fit in a decimal.
    pub fn totals(&self) -> Result<OrderTotals, TotalsError> {
        calculate(&self.entries)
    }

    /// The cart as invoice rows, in cart order.
    #[must_use]
    pub fn to_line_items(&self) -> Vec<LineItem> {
        self.entries.iter().map(CartEntry::to_line_item).collect()
    }
}
