//! Business logic services for admin.
//!
//! # Services
//!
//! - `cart_store` - Persisted cart behind the `CartStore` trait
//! - `checkout` - Cart to invoice orchestration
//! - `dashboard` - Dashboard counts and recent activity
//! - `payments` - Payment processor client for invoice payments

pub mod cart_store;
pub mod checkout;
pub mod dashboard;
pub mod payments;

pub use cart_store::{CartStore, CartStoreError, MemoryCartStore, SessionCartStore};
pub use checkout::{Checkout, CheckoutError, CheckoutReceipt};
pub use dashboard::{DashboardError, DashboardSummary, load_summary};
pub use payments::{PaymentClient, PaymentError, PaymentIntent};
