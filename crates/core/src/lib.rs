//! Invoice Desk Core - domain logic for the invoicing dashboard.
//!
//! This crate holds everything that can be computed without talking to the
//! billing API:
//! - line-item normalization and validation ([`line_item`])
//! - order totals ([`totals`])
//! - the store cart ([`cart`])
//! - checkout validation and its state machine ([`checkout`])
//! - invoice creation payloads and policies ([`invoice`])
//! - balance rules and dashboard figures ([`ledger`])
//!
//! # Architecture
//!
//! No I/O, no HTTP clients, no clocks: callers pass in "today" and whatever
//! catalog they fetched. The `admin` crate does the network work and feeds
//! results through these functions.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, email, money helpers and API status enums

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod checkout;
pub mod invoice;
pub mod ledger;
pub mod line_item;
pub mod numeric;
pub mod totals;
pub mod types;

pub use cart::{Cart, CartEntry, CartError, STORAGE_KEY};
pub use checkout::{
    CheckoutEvent, CheckoutForm, CheckoutStage, CheckoutState, CheckoutValidationError,
    CustomerDetails, TransitionError, ValidatedCheckout,
};
pub use invoice::{InvoiceDraft, InvoiceDraftError, InvoicePayload, InvoicePolicy, InvoicePreview};
pub use ledger::{DashboardStats, Receivable, is_partially_paid, is_payable, outstanding_total};
pub use line_item::{
    Catalog, CatalogProduct, ItemRules, LineItem, LineItemError, MAX_QUANTITY, RawLineItem,
    normalize, normalize_all, validate_items,
};
pub use totals::{OrderTotals, Priced, TotalsError, calculate};
pub use types::*;
