//! Invoice route handlers.
//!
//! Create and update go through [`InvoiceDraft`]: rows are normalized
//! against the product catalog and totals are recomputed here, whatever
//! the caller sent.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use invoice_desk_core::{CurrencyCode, InvoiceDraft, InvoiceId, InvoicePreview, Receivable};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::instrument;

use crate::billing::{InvoiceView, ListParams, ListResponse};
use crate::error::{AppError, Result};
use crate::state::AppState;

/// What the browser needs to complete an online payment.
#[derive(Debug, Serialize)]
pub struct PaymentSession {
    pub invoice_id: InvoiceId,
    pub client_secret: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub currency: CurrencyCode,
}

#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<ListResponse<InvoiceView>>> {
    let invoices = state.billing().list_invoices(&params).await?;
    Ok(Json(invoices.map(InvoiceView::from)))
}

#[instrument(skip(state), fields(invoice_id = %id))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<InvoiceId>,
) -> Result<Json<InvoiceView>> {
    Ok(Json(state.billing().get_invoice(&id).await?.into()))
}

/// Normalized rows and totals for a draft, without saving anything.
#[instrument(skip(state, draft), fields(items = draft.items.len()))]
pub async fn preview(
    State(state): State<AppState>,
    Json(draft): Json<InvoiceDraft>,
) -> Result<Json<InvoicePreview>> {
    let catalog = state.billing().catalog_for(&draft.items).await?;
    Ok(Json(draft.preview(catalog.as_ref())?))
}

#[instrument(skip(state, draft), fields(client_id = %draft.client_id, items = draft.items.len()))]
pub async fn create(
    State(state): State<AppState>,
    Json(draft): Json<InvoiceDraft>,
) -> Result<(StatusCode, Json<InvoiceView>)> {
    let catalog = state.billing().catalog_for(&draft.items).await?;
    let payload = draft.into_payload(catalog.as_ref(), &state.manual_invoice_policy(), state.today())?;
    let invoice = state.billing().create_invoice(&payload).await?;
    tracing::info!(invoice_id = %invoice.id, total = %payload.totals.grand_total, "Invoice created");
    Ok((StatusCode::CREATED, Json(invoice.into())))
}

#[instrument(skip(state, draft), fields(invoice_id = %id))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<InvoiceId>,
    Json(draft): Json<InvoiceDraft>,
) -> Result<Json<InvoiceView>> {
    let catalog = state.billing().catalog_for(&draft.items).await?;
    let payload = draft.into_payload(catalog.as_ref(), &state.manual_invoice_policy(), state.today())?;
    Ok(Json(state.billing().update_invoice(&id, &payload).await?.into()))
}

#[instrument(skip(state), fields(invoice_id = %id))]
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<InvoiceId>,
) -> Result<StatusCode> {
    state.billing().delete_invoice(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Email the invoice to its client.
#[instrument(skip(state), fields(invoice_id = %id))]
pub async fn email(
    State(state): State<AppState>,
    Path(id): Path<InvoiceId>,
) -> Result<StatusCode> {
    state.billing().email_invoice(&id).await?;
    tracing::info!("Invoice emailed");
    Ok(StatusCode::ACCEPTED)
}

/// Start an online payment for the invoice's outstanding balance.
#[instrument(skip(state), fields(invoice_id = %id))]
pub async fn pay(
    State(state): State<AppState>,
    Path(id): Path<InvoiceId>,
) -> Result<Json<PaymentSession>> {
    let payments = state.payments()?;
    let invoice = state.billing().get_invoice(&id).await?;
    if !invoice.is_payable() {
        return Err(AppError::BadRequest(
            "This invoice cannot be paid online".to_string(),
        ));
    }

    let intent = payments
        .create_payment_intent(&invoice.id, invoice.balance)
        .await?;

    Ok(Json(PaymentSession {
        invoice_id: invoice.id,
        client_secret: intent.client_secret,
        amount: invoice.balance,
        currency: payments.currency(),
    }))
}
