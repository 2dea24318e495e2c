//! Dashboard summary.

use invoice_desk_core::{DashboardStats, outstanding_total};
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use tracing::instrument;

use crate::billing::{BillingClient, BillingError, InvoiceView, ListParams, Payment};

/// Number of recent invoices and payments shown.
pub const RECENT_LIMIT: u32 = 5;

/// Any of the summary's list calls failed.
#[derive(Debug, Error)]
#[error("Failed to load dashboard statistics")]
pub struct DashboardError(#[source] pub BillingError);

/// Everything the dashboard's front page shows.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub stats: DashboardStats,
    pub recent_invoices: Vec<InvoiceView>,
    pub recent_payments: Vec<Payment>,
}

/// Fetch counts and recent activity.
///
/// The three list calls are independent and run concurrently. Counts come
/// from list metadata; outstanding and paid totals are summed over the
/// fetched pages.
///
/// # Errors
///
/// Returns [`DashboardError`] if any list call fails.
#[instrument(skip(billing))]
pub async fn load_summary(billing: &BillingClient) -> Result<DashboardSummary, DashboardError> {
    let client_params = ListParams::per_page(1);
    let invoice_params = ListParams::per_page(RECENT_LIMIT).newest_first("date");
    let payment_params = ListParams::per_page(RECENT_LIMIT);

    let (clients, invoices, payments) = tokio::try_join!(
        billing.list_clients(&client_params),
        billing.list_invoices(&invoice_params),
        billing.list_payments(&payment_params),
    )
    .map_err(DashboardError)?;

    let stats = DashboardStats {
        client_count: clients.total(),
        invoice_count: invoices.total(),
        total_outstanding: outstanding_total(&invoices.data),
        total_paid: payments
            .data
            .iter()
            .map(|p| p.amount)
            .fold(Decimal::ZERO, Decimal::saturating_add),
    };
    tracing::debug!(
        clients = stats.client_count,
        invoices = stats.invoice_count,
        "Dashboard summary loaded"
    );

    Ok(DashboardSummary {
        stats,
        recent_invoices: invoices.data.into_iter().map(InvoiceView::from).collect(),
        recent_payments: payments.data,
    })
}
