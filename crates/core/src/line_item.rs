//! Line items: raw form input, normalization against the product catalog,
//! and submit-time validation.
//!
//! Normalization never fails. It turns whatever the user typed into numbers
//! using fixed defaults for unparsable input, and lets the catalog overwrite
//! manual entries when a product is selected. Out-of-range values (zero
//! quantity, negative price) survive normalization untouched and are
//! reported by [`validate_items`] when the form is submitted.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::numeric::{decimal_from_json, integer_from_json};
use crate::types::ProductId;

/// Quantity used when the quantity field cannot be parsed.
pub const DEFAULT_QUANTITY: i64 = 1;

/// Largest quantity accepted on a submitted row or in the cart.
pub const MAX_QUANTITY: i64 = 1_000_000;

/// One invoice row exactly as submitted by a form.
///
/// Numeric fields may be JSON numbers, strings, empty or missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawLineItem {
    #[serde(default)]
    pub product_id: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub quantity: Option<Value>,
    #[serde(default, alias = "price")]
    pub unit_price: Option<Value>,
    #[serde(default)]
    pub tax_rate: Option<Value>,
}

/// A normalized invoice row, in the billing API's item shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<ProductId>,
    #[serde(default)]
    pub description: String,
    pub quantity: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub unit_price: Decimal,
    #[serde(rename = "tax_rate", with = "rust_decimal::serde::float", default)]
    pub tax_rate_percent: Decimal,
}

/// A product as far as pricing is concerned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogProduct {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    #[serde(default)]
    pub tax_rate: Decimal,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

const fn default_true() -> bool {
    true
}

impl CatalogProduct {
    /// Text placed on an invoice row when this product is selected.
    ///
    /// Falls back to the product name when the description is blank.
    #[must_use]
    pub fn line_description(&self) -> &str {
        if self.description.trim().is_empty() {
            &self.name
        } else {
            &self.description
        }
    }
}

/// Product lookup used while normalizing line items.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: HashMap<ProductId, CatalogProduct>,
}

impl Catalog {
    /// Build a catalog from any collection of products.
    pub fn new(products: impl IntoIterator<Item = CatalogProduct>) -> Self {
        Self {
            products: products.into_iter().map(|p| (p.id.clone(), p)).collect(),
        }
    }

    /// Look up a product by ID.
    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&CatalogProduct> {
        self.products.get(id)
    }

    /// Number of products known to the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

/// Normalize one raw row.
///
/// - quantity: integer, fractional input truncated, unparsable → 1
/// - unit price: decimal, unparsable → 0
/// - tax rate: decimal, unparsable → 0
/// - a product ID that resolves in `catalog` overwrites description,
///   unit price and tax rate
#[must_use]
pub fn normalize(raw: &RawLineItem, catalog: Option<&Catalog>) -> LineItem {
    let product_id = raw
        .product_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(ProductId::from);

    let quantity = raw
        .quantity
        .as_ref()
        .and_then(integer_from_json)
        .unwrap_or(DEFAULT_QUANTITY);

    let catalog_match = product_id
        .as_ref()
        .zip(catalog)
        .and_then(|(id, catalog)| catalog.get(id));

    if let Some(product) = catalog_match {
        return LineItem {
            product_id,
            description: product.line_description().to_owned(),
            quantity,
            unit_price: product.price,
            tax_rate_percent: product.tax_rate,
        };
    }

    LineItem {
        product_id,
        description: raw.description.clone().unwrap_or_default(),
        quantity,
        unit_price: raw
            .unit_price
            .as_ref()
            .and_then(decimal_from_json)
            .unwrap_or_default(),
        tax_rate_percent: raw
            .tax_rate
            .as_ref()
            .and_then(decimal_from_json)
            .unwrap_or_default(),
    }
}

/// Normalize every row of a form, preserving order.
#[must_use]
pub fn normalize_all(raw: &[RawLineItem], catalog: Option<&Catalog>) -> Vec<LineItem> {
    raw.iter().map(|r| normalize(r, catalog)).collect()
}

/// Which checks apply when a set of line items is submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemRules {
    /// Every row needs a non-blank description.
    pub require_description: bool,
    /// A unit price of exactly zero is acceptable.
    pub allow_zero_price: bool,
}

impl ItemRules {
    /// Store checkout: catalog rows, free items allowed.
    pub const STORE: Self = Self {
        require_description: false,
        allow_zero_price: true,
    };

    /// Manual invoice form: every row described and priced.
    pub const MANUAL_INVOICE: Self = Self {
        require_description: true,
        allow_zero_price: false,
    };
}

/// A problem found in a submitted line item. `index` is zero-based.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LineItemError {
    #[error("at least one item is required")]
    Empty,

    #[error("item {}: description is required", .index + 1)]
    MissingDescription { index: usize },

    #[error("item {}: quantity must be at least 1 (got {quantity})", .index + 1)]
    NonPositiveQuantity { index: usize, quantity: i64 },

    #[error("item {}: quantity cannot exceed {max} (got {quantity})", .index + 1, max = MAX_QUANTITY)]
    QuantityTooLarge { index: usize, quantity: i64 },

    #[error("item {}: unit price cannot be negative (got {price})", .index + 1)]
    NegativePrice { index: usize, price: Decimal },

    #[error("item {}: unit price must be greater than zero", .index + 1)]
    ZeroPrice { index: usize },

    #[error("item {}: tax rate cannot be negative (got {rate})", .index + 1)]
    NegativeTaxRate { index: usize, rate: Decimal },
}

impl LineItem {
    /// A manual row with no product reference.
    #[must_use]
    pub fn new(
        description: impl Into<String>,
        quantity: i64,
        unit_price: Decimal,
        tax_rate_percent: Decimal,
    ) -> Self {
        Self {
            product_id: None,
            description: description.into(),
            quantity,
            unit_price,
            tax_rate_percent,
        }
    }

    /// Check one item against `rules`, appending problems to `errors`.
    fn collect_errors(&self, index: usize, rules: ItemRules, errors: &mut Vec<LineItemError>) {
        if rules.require_description && self.description.trim().is_empty() {
            errors.push(LineItemError::MissingDescription { index });
        }
        if self.quantity < 1 {
            errors.push(LineItemError::NonPositiveQuantity {
                index,
                quantity: self.quantity,
            });
        } else if self.quantity > MAX_QUANTITY {
            errors.push(LineItemError::QuantityTooLarge {
                index,
                quantity: self.quantity,
            });
        }
        if self.unit_price.is_sign_negative() && !self.unit_price.is_zero() {
            errors.push(LineItemError::NegativePrice {
                index,
                price: self.unit_price,
            });
        } else if self.unit_price.is_zero() && !rules.allow_zero_price {
            errors.push(LineItemError::ZeroPrice { index });
        }
        if self.tax_rate_percent.is_sign_negative() && !self.tax_rate_percent.is_zero() {
            errors.push(LineItemError::NegativeTaxRate {
                index,
                rate: self.tax_rate_percent,
            });
        }
    }
}

/// Validate a submitted set of line items.
///
/// # Errors
///
/// Returns every problem found, in row order. An empty set is an error.
pub fn validate_items(items: &[LineItem], rules: ItemRules) -> Result<(), Vec<LineItemError>> {
    if items.is_empty() {
        return Err(vec![LineItemError::Empty]);
    }

    let mut errors = Vec::new();
    for (index, item) in items.iter().enumerate() {
        item.collect_errors(index, rules, &mut errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
