//! Recurring invoice route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use invoice_desk_core::RecurringInvoiceId;
use tracing::instrument;

use crate::billing::{ListParams, ListResponse, RecurringInvoiceInput, RecurringInvoiceView};
use crate::error::Result;
use crate::state::AppState;

#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<ListResponse<RecurringInvoiceView>>> {
    let recurring = state.billing().list_recurring_invoices(&params).await?;
    Ok(Json(recurring.map(RecurringInvoiceView::from)))
}

#[instrument(skip(state), fields(recurring_invoice_id = %id))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<RecurringInvoiceId>,
) -> Result<Json<RecurringInvoiceView>> {
    Ok(Json(state.billing().get_recurring_invoice(&id).await?.into()))
}

#[instrument(skip(state, input))]
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<RecurringInvoiceInput>,
) -> Result<(StatusCode, Json<RecurringInvoiceView>)> {
    let catalog = state.billing().catalog_for(&input.items).await?;
    let request = input.into_request(catalog.as_ref())?;
    let recurring = state.billing().create_recurring_invoice(&request).await?;
    tracing::info!(recurring_invoice_id = %recurring.id, "Recurring invoice created");
    Ok((StatusCode::CREATED, Json(recurring.into())))
}

#[instrument(skip(state, input), fields(recurring_invoice_id = %id))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<RecurringInvoiceId>,
    Json(input): Json<RecurringInvoiceInput>,
) -> Result<Json<RecurringInvoiceView>> {
    let catalog = state.billing().catalog_for(&input.items).await?;
    let request = input.into_request(catalog.as_ref())?;
    let recurring = state
        .billing()
        .update_recurring_invoice(&id, &request)
        .await?;
    Ok(Json(recurring.into()))
}

#[instrument(skip(state), fields(recurring_invoice_id = %id))]
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<RecurringInvoiceId>,
) -> Result<StatusCode> {
    state.billing().delete_recurring_invoice(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
