//! Store checkout route handler.

use axum::{Json, extract::State, http::StatusCode};
use invoice_desk_core::CheckoutForm;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{Result, add_breadcrumb};
use crate::services::{Checkout, CheckoutReceipt, SessionCartStore};
use crate::state::AppState;

/// Turn the session cart into an invoice.
#[instrument(skip(state, session, form))]
pub async fn submit(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<CheckoutForm>,
) -> Result<(StatusCode, Json<CheckoutReceipt>)> {
    add_breadcrumb("checkout", "Checkout submitted");

    let store = SessionCartStore::new(session);
    let mut checkout = Checkout::new(state.billing(), &store, state.store_checkout_policy());
    let receipt = checkout.submit(&form, state.today()).await?;

    Ok((StatusCode::CREATED, Json(receipt)))
}
