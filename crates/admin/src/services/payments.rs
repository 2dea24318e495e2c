//! Payment processor client (Stripe-compatible REST API).
//!
//! Only one call is needed: creating a payment intent for an invoice's
//! balance. The browser completes the payment with the returned client
//! secret; no card data passes through this service.

use std::sync::Arc;
use std::time::Duration;

use invoice_desk_core::{CurrencyCode, InvoiceId, to_minor_units};
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

use crate::config::PaymentsConfig;

/// Errors from the payment processor.
///
/// Every variant displays the same customer-facing text; the detail is
/// kept for logs via `Debug` and `source()`.
#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("Payment processing failed. Please try again.")]
    Http(#[from] reqwest::Error),

    #[error("Payment processing failed. Please try again.")]
    Api { status: u16, message: String },

    #[error("Payment processing failed. Please try again.")]
    InvalidAmount(Decimal),
}

/// A created payment intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: String,
    pub amount: i64,
    pub currency: String,
}

#[derive(Serialize)]
struct CreateIntentForm<'a> {
    amount: i64,
    currency: &'a str,
    #[serde(rename = "metadata[invoice_id]")]
    invoice_id: &'a str,
}

#[derive(Deserialize)]
struct ProcessorErrorBody {
    error: ProcessorErrorDetail,
}

#[derive(Deserialize)]
struct ProcessorErrorDetail {
    #[serde(default)]
    message: String,
}

/// Payment processor client.
#[derive(Clone)]
pub struct PaymentClient {
    inner: Arc<PaymentClientInner>,
}

struct PaymentClientInner {
    client: reqwest::Client,
    api_url: String,
    secret_key: SecretString,
    currency: CurrencyCode,
}

impl PaymentClient {
    /// Create a new payment processor client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &PaymentsConfig, timeout: Duration) -> Result<Self, PaymentError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            inner: Arc::new(PaymentClientInner {
                client,
                api_url: config.api_url.as_str().trim_end_matches('/').to_string(),
                secret_key: config.secret_key.clone(),
                currency: config.currency,
            }),
        })
    }

    /// Currency every intent is created in.
    #[must_use]
    pub fn currency(&self) -> CurrencyCode {
        self.inner.currency
    }

    /// Create a payment intent for `amount` against `invoice_id`.
    ///
    /// The amount is sent in minor units, rounded half away from zero.
    ///
    /// # Errors
    ///
    /// Returns error if the amount is not positive or the processor call
    /// fails.
    #[instrument(skip(self), fields(invoice_id = %invoice_id, amount = %amount))]
    pub async fn create_payment_intent(
        &self,
        invoice_id: &InvoiceId,
        amount: Decimal,
    ) -> Result<PaymentIntent, PaymentError> {
        let minor = to_minor_units(amount)
            .filter(|m| *m > 0)
            .ok_or(PaymentError::InvalidAmount(amount))?;

        let form = CreateIntentForm {
            amount: minor,
            currency: self.inner.currency.as_str(),
            invoice_id: invoice_id.as_str(),
        };

        let response = self
            .inner
            .client
            .post(format!("{}/v1/payment_intents", self.inner.api_url))
            .bearer_auth(self.inner.secret_key.expose_secret())
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ProcessorErrorBody>(&body)
                .map(|b| b.error.message)
                .unwrap_or(body);
            tracing::warn!(status = status.as_u16(), %message, "Payment intent rejected");
            return Err(PaymentError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let intent: PaymentIntent = response.json().await?;
        tracing::info!(intent_id = %intent.id, amount = intent.amount, "Payment intent created");
        Ok(intent)
    }
}

impl std::fmt::Debug for PaymentClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentClient")
            .field("api_url", &self.inner.api_url)
            .field("currency", &self.inner.currency)
            .finish_non_exhaustive()
    }
}
