//! Invoice operations.

use invoice_desk_core::{InvoiceId, InvoicePayload};
use serde::de::IgnoredAny;
use tracing::instrument;

use super::{BillingClient, BillingError, Invoice, ItemResponse, ListParams, ListResponse, record_path};

impl BillingClient {
    /// List invoices.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_invoices(&self, params: &ListParams) -> Result<ListResponse<Invoice>, BillingError> {
        self.get("/invoices", params).await
    }

    /// Get a single invoice by ID.
    ///
    /// # Errors
    ///
    /// Returns error if the invoice is not found or the API request fails.
    #[instrument(skip(self), fields(invoice_id = %id))]
    pub async fn get_invoice(&self, id: &InvoiceId) -> Result<Invoice, BillingError> {
        let response: ItemResponse<Invoice> = self.get(&record_path("invoices", id)?, &()).await?;
        Ok(response.into_inner())
    }

    /// Create an invoice.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(
        skip(self, payload),
        fields(client_id = %payload.client_id, items = payload.items.len(), total = %payload.totals.grand_total)
    )]
    pub async fn create_invoice(&self, payload: &InvoicePayload) -> Result<Invoice, BillingError> {
        let response: ItemResponse<Invoice> = self.post("/invoices", payload).await?;
        Ok(response.into_inner())
    }

    /// Replace an invoice's fields.
    ///
    /// # Errors
    ///
    /// Returns error if the invoice is not found or the API request fails.
    #[instrument(skip(self, payload), fields(invoice_id = %id))]
    pub async fn update_invoice(
        &self,
        id: &InvoiceId,
        payload: &InvoicePayload,
    ) -> Result<Invoice, BillingError> {
        let response: ItemResponse<Invoice> = self.put(&record_path("invoices", id)?, payload).await?;
        Ok(response.into_inner())
    }

    /// Delete an invoice.
    ///
    /// # Errors
    ///
    /// Returns error if the invoice is not found or the API request fails.
    #[instrument(skip(self), fields(invoice_id = %id))]
    pub async fn delete_invoice(&self, id: &InvoiceId) -> Result<(), BillingError> {
        self.delete(&record_path("invoices", id)?).await
    }

    /// Ask the billing backend to email the invoice to its client.
    ///
    /// # Errors
    ///
    /// Returns error if the invoice is not found or the API request fails.
    #[instrument(skip(self), fields(invoice_id = %id))]
    pub async fn email_invoice(&self, id: &InvoiceId) -> Result<(), BillingError> {
        let _: IgnoredAny = self
            .post(&format!("{}/email", record_path("invoices", id)?), &serde_json::json!({}))
            .await?;
        Ok(())
    }
}
