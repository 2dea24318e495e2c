//! Order totals: subtotal, tax and grand total over a sequence of items.
//!
//! Totals are a pure function of the items. Nothing is cached; callers
//! recompute after every change. Accumulation uses exact decimals and only
//! [`OrderTotals::rounded`] rounds to cents. Every step is checked, so a
//! sum that does not fit in a [`Decimal`] is an error rather than a panic.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::line_item::LineItem;
use crate::types::round_currency;

/// Anything that contributes a priced row to a total.
pub trait Priced {
    /// Units ordered.
    fn quantity(&self) -> i64;
    /// Price of a single unit.
    fn unit_price(&self) -> Decimal;
    /// Tax rate in percent (10 means 10%).
    fn tax_rate_percent(&self) -> Decimal;

    /// `quantity × unit_price`, or `None` on overflow.
    fn line_subtotal(&self) -> Option<Decimal> {
        Decimal::from(self.quantity()).checked_mul(self.unit_price())
    }

    /// `quantity × unit_price × tax_rate / 100`, or `None` on overflow.
    fn line_tax(&self) -> Option<Decimal> {
        self.line_subtotal()?
            .checked_mul(self.tax_rate_percent())?
            .checked_div(Decimal::ONE_HUNDRED)
    }
}

/// The totals of a set of items do not fit in a decimal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Order total is too large")]
pub struct TotalsError;

impl Priced for LineItem {
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

impl<T: Priced + ?Sized> Priced for &T {
    fn quantity(&self) -> i64 {
        (**self).quantity()
    }

    fn unit_price(&self) -> Decimal {
        (**self).unit_price()
    }

    fn tax_rate_percent(&self) -> Decimal {
        (**self).tax_rate_percent()
    }
}

/// Derived totals for an invoice or cart.
///
/// Serialized as JSON numbers, matching what the billing API expects for
/// `subtotal`, `tax_total` and `total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OrderTotals {
    #[serde(with = "rust_decimal::serde::float")]
    pub subtotal: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub tax_total: Decimal,
    #[serde(rename = "total", with = "rust_decimal::serde::float")]
    pub grand_total: Decimal,
}

impl OrderTotals {
    /// All-zero totals.
    pub const ZERO: Self = Self {
        subtotal: Decimal::ZERO,
        tax_total: Decimal::ZERO,
        grand_total: Decimal::ZERO,
    };

    /// The same totals rounded to cents for display or submission.
    ///
    /// `grand_total` is rounded independently, so the rounded parts may
    /// differ from the rounded sum by a cent.
    #[must_use]
    pub fn rounded(self) -> Self {
        Self {
            subtotal: round_currency(self.subtotal),
            tax_total: round_currency(self.tax_total),
            grand_total: round_currency(self.grand_total),
        }
    }
}

/// Compute totals over `items`, in full precision.
///
/// ```
/// use invoice_desk_core::{LineItem, calculate};
/// use rust_decimal::Decimal;
///
/// let items = vec![
///     LineItem::new("Widget", 2, Decimal::from(10), Decimal::from(10)),
///     LineItem::new("Gadget", 1, Decimal::from(5), Decimal::ZERO),
/// ];
/// let totals = calculate(&items).unwrap();
/// assert_eq!(totals.subtotal, Decimal::from(25));
/// assert_eq!(totals.tax_total, Decimal::from(2));
/// assert_eq!(totals.grand_total, Decimal::from(27));
/// ```
///
/// # Errors
///
/// Returns [`TotalsError`] if any line or running sum overflows.
pub fn calculate<I>(items: I) -> Result<OrderTotals, TotalsError>
where
    I: IntoIterator,
    I::Item: Priced,
{
    let mut subtotal = Decimal::ZERO;
    let mut tax_total = Decimal::ZERO;
    for item in items {
        subtotal = item
            .line_subtotal()
            .and_then(|line| subtotal.checked_add(line))
            .ok_or(TotalsError)?;
        tax_total = item
            .line_tax()
            .and_then(|tax| tax_total.checked_add(tax))
            .ok_or(TotalsError)?;
    }

    Ok(OrderTotals {
        subtotal,
        tax_total,
        grand_total: subtotal.checked_add(tax_total).ok_or(TotalsError)?,
    })
}
