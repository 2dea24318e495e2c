//! Payment route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use invoice_desk_core::PaymentId;
use tracing::instrument;

use crate::billing::{ListParams, ListResponse, Payment, PaymentInput};
use crate::error::Result;
use crate::state::AppState;

#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<ListResponse<Payment>>> {
    Ok(Json(state.billing().list_payments(&params).await?))
}

#[instrument(skip(state), fields(payment_id = %id))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<PaymentId>,
) -> Result<Json<Payment>> {
    Ok(Json(state.billing().get_payment(&id).await?))
}

#[instrument(skip(state, input))]
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<PaymentInput>,
) -> Result<(StatusCode, Json<Payment>)> {
    let request = input.into_request()?;
    let payment = state.billing().create_payment(&request).await?;
    tracing::info!(payment_id = %payment.id, amount = %payment.amount, "Payment recorded");
    Ok((StatusCode::CREATED, Json(payment)))
}

#[instrument(skip(state, input), fields(payment_id = %id))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<PaymentId>,
    Json(input): Json<PaymentInput>,
) -> Result<Json<Payment>> {
    let request = input.into_request()?;
    Ok(Json(state.billing().update_payment(&id, &request).await?))
}

#[instrument(skip(state), fields(payment_id = %id))]
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<PaymentId>,
) -> Result<StatusCode> {
    state.billing().delete_payment(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
