//! Product route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use invoice_desk_core::ProductId;
use tracing::instrument;

use crate::billing::{ListParams, ListResponse, Product, ProductInput};
use crate::error::Result;
use crate::state::AppState;

#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<ListResponse<Product>>> {
    Ok(Json(state.billing().list_products(&params).await?))
}

/// Products offered in the store: active ones only.
#[instrument(skip(state))]
pub async fn store_index(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    Ok(Json(state.billing().store_products().await?))
}

#[instrument(skip(state), fields(product_id = %id))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>> {
    Ok(Json(state.billing().get_product(&id).await?))
}

#[instrument(skip(state, input))]
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<ProductInput>,
) -> Result<(StatusCode, Json<Product>)> {
    let request = input.into_request()?;
    let product = state.billing().create_product(&request).await?;
    tracing::info!(product_id = %product.id, "Product created");
    Ok((StatusCode::CREATED, Json(product)))
}

#[instrument(skip(state, input), fields(product_id = %id))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    Json(input): Json<ProductInput>,
) -> Result<Json<Product>> {
    let request = input.into_request()?;
    Ok(Json(state.billing().update_product(&id, &request).await?))
}

#[instrument(skip(state), fields(product_id = %id))]
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<StatusCode> {
    state.billing().delete_product(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
