//! Client route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use invoice_desk_core::ClientId;
use tracing::instrument;

use crate::billing::{Client, ClientInput, ListParams, ListResponse};
use crate::error::Result;
use crate::state::AppState;

#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<ListResponse<Client>>> {
    Ok(Json(state.billing().list_clients(&params).await?))
}

#[instrument(skip(state), fields(client_id = %id))]
pub async fn show(State(state): State<AppState>, Path(id): Path<ClientId>) -> Result<Json<Client>> {
    Ok(Json(state.billing().get_client(&id).await?))
}

#[instrument(skip(state, input))]
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<ClientInput>,
) -> Result<(StatusCode, Json<Client>)> {
    input.validate()?;
    let client = state.billing().create_client(&input).await?;
    tracing::info!(client_id = %client.id, "Client created");
    Ok((StatusCode::CREATED, Json(client)))
}

#[instrument(skip(state, input), fields(client_id = %id))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<ClientId>,
    Json(input): Json<ClientInput>,
) -> Result<Json<Client>> {
    input.validate()?;
    Ok(Json(state.billing().update_client(&id, &input).await?))
}

#[instrument(skip(state), fields(client_id = %id))]
pub async fn delete(State(state): State<AppState>, Path(id): Path<ClientId>) -> Result<StatusCode> {
    state.billing().delete_client(&id).await?;
    tracing::info!("Client deleted");
    Ok(StatusCode::NO_CONTENT)
}
