//! Application state shared across handlers.

use std::sync::Arc;

use chrono::NaiveDate;
use invoice_desk_core::InvoicePolicy;

use crate::billing::{BillingClient, BillingError};
use crate::config::AdminConfig;
use crate::error::AppError;
use crate::services::{PaymentClient, PaymentError};

/// Error building the application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("billing client: {0}")]
    Billing(#[from] BillingError),
    #[error("payment client: {0}")]
    Payments(#[from] PaymentError),
}

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`; the HTTP clients inside share their
/// connection pools.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    billing: BillingClient,
    payments: Option<PaymentClient>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if either HTTP client fails to build.
    pub fn new(config: AdminConfig) -> Result<Self, StateError> {
        let billing = BillingClient::new(&config.billing, config.http_timeout)?;
        let payments = config
            .payments
            .as_ref()
            .map(|p| PaymentClient::new(p, config.http_timeout))
            .transpose()?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                billing,
                payments,
            }),
        })
    }

    /// Get a reference to the dashboard configuration.
    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    /// Get a reference to the billing API client.
    #[must_use]
    pub fn billing(&self) -> &BillingClient {
        &self.inner.billing
    }

    /// Get the payment processor client.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::PaymentsUnavailable`] when no processor is
    /// configured.
    pub fn payments(&self) -> Result<&PaymentClient, AppError> {
        self.inner
            .payments
            .as_ref()
            .ok_or(AppError::PaymentsUnavailable)
    }

    /// Invoice defaults for store checkout.
    #[must_use]
    pub fn store_checkout_policy(&self) -> InvoicePolicy {
        self.inner.config.store_checkout_policy()
    }

    /// Invoice defaults for the manual invoice form.
    #[must_use]
    pub fn manual_invoice_policy(&self) -> InvoicePolicy {
        self.inner.config.manual_invoice_policy()
    }

    /// Today's date in the server's local time zone.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("billing", &self.inner.billing)
            .field("payments_enabled", &self.inner.payments.is_some())
            .finish_non_exhaustive()
    }
}
