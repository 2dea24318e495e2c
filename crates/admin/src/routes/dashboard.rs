//! Dashboard route handler.

use axum::{Json, extract::State};
use tracing::instrument;

use crate::error::Result;
use crate::services::{DashboardSummary, load_summary};
use crate::state::AppState;

/// Counts, outstanding and paid totals, and recent activity.
#[instrument(skip(state))]
pub async fn summary(State(state): State<AppState>) -> Result<Json<DashboardSummary>> {
    Ok(Json(load_summary(state.billing()).await?))
}
