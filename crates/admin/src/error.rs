//! Unified error handling with Sentry integration.
//!
//! Every handler returns `Result<T, AppError>`. Server-side failures are
//! captured to Sentry before responding; the client only sees a JSON body
//! `{ "error": "<message>" }` with details hidden for internal errors.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use invoice_desk_core::{CartError, CheckoutValidationError, InvoiceDraftError};
use serde_json::json;
use thiserror::Error;

use crate::billing::{BillingError, FormError};
use crate::services::{CartStoreError, CheckoutError, DashboardError, PaymentError};

/// Application-level error type for the dashboard API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Billing API call failed.
    #[error("Billing error: {0}")]
    Billing(#[from] BillingError),

    /// Payment processor call failed.
    #[error(transparent)]
    Payment(#[from] PaymentError),

    /// Online payment is not configured.
    #[error("Online payment is not available")]
    PaymentsUnavailable,

    /// Checkout did not complete.
    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    /// Dashboard summary could not be loaded.
    #[error(transparent)]
    Dashboard(#[from] DashboardError),

    /// Persisted cart could not be read or written.
    #[error(transparent)]
    CartStore(#[from] CartStoreError),

    /// Cart operation rejected.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// Entity form failed its checks.
    #[error(transparent)]
    Form(#[from] FormError),

    /// Manual invoice form failed its checks.
    #[error(transparent)]
    InvoiceDraft(#[from] InvoiceDraftError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<CheckoutValidationError> for AppError {
    fn from(err: CheckoutValidationError) -> Self {
        Self::Checkout(CheckoutError::Validation(err))
    }
}

fn billing_status(err: &BillingError) -> StatusCode {
    match err {
        BillingError::NotFound(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::BAD_GATEWAY,
    }
}

fn billing_message(err: &BillingError) -> String {
    match err {
        BillingError::Api { message, .. } | BillingError::NotFound(message) => message.clone(),
        BillingError::Http(_) | BillingError::Parse(_) => "Billing service error".to_string(),
    }
}

fn cart_store_status(err: &CartStoreError) -> StatusCode {
    match err {
        CartStoreError::Corrupt(_) => StatusCode::CONFLICT,
        CartStoreError::Serialize(_) | CartStoreError::Session(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Billing(err) => billing_status(err),
            Self::Payment(_) | Self::Dashboard(_) => StatusCode::BAD_GATEWAY,
            Self::PaymentsUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::Checkout(err) => match err {
                CheckoutError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
                CheckoutError::CustomerResolution(_) => StatusCode::BAD_GATEWAY,
                CheckoutError::InvoiceCreation(e) => billing_status(e),
                CheckoutError::CartStore(e) => cart_store_status(e),
                CheckoutError::Transition(_) => StatusCode::CONFLICT,
            },
            Self::CartStore(err) => cart_store_status(err),
            Self::Cart(CartError::NotInCart(_)) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Cart(CartError::InvalidQuantity(_) | CartError::Totals(_))
            | Self::Form(_)
            | Self::InvoiceDraft(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show the caller.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::Billing(err) | Self::Checkout(CheckoutError::InvoiceCreation(err)) => {
                billing_message(err)
            }
            Self::CartStore(CartStoreError::Corrupt(_))
            | Self::Checkout(CheckoutError::CartStore(CartStoreError::Corrupt(_))) => {
                "Your saved cart could not be read. Please clear it and try again.".to_string()
            }
            Self::CartStore(_) | Self::Checkout(CheckoutError::CartStore(_)) | Self::Internal(_) => {
                "Internal server error".to_string()
            }
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                status = status.as_u16(),
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        (status, Json(json!({ "error": self.public_message() }))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Add a breadcrumb for a user action.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of actions
/// leading up to an error.
pub fn add_breadcrumb(category: &str, message: &str) {
    sentry::add_breadcrumb(sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    });
}
