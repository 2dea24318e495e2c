//! Recurring invoice operations.

use invoice_desk_core::RecurringInvoiceId;
use tracing::instrument;

use super::{
    BillingClient, BillingError, ItemResponse, ListParams, ListResponse, RecurringInvoice,
    RecurringInvoiceRequest, record_path,
};

impl BillingClient {
    /// List recurring invoices.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_recurring_invoices(
        &self,
        params: &ListParams,
    ) -> Result<ListResponse<RecurringInvoice>, BillingError> {
        self.get("/recurring_invoices", params).await
    }

    /// Get a single recurring invoice by ID.
    ///
    /// # Errors
    ///
    /// Returns error if the record is not found or the API request fails.
    #[instrument(skip(self), fields(recurring_invoice_id = %id))]
    pub async fn get_recurring_invoice(
        &self,
        id: &RecurringInvoiceId,
    ) -> Result<RecurringInvoice, BillingError> {
        let response: ItemResponse<RecurringInvoice> =
            self.get(&record_path("recurring_invoices", id)?, &()).await?;
        Ok(response.into_inner())
    }

    /// Create a recurring invoice.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, request), fields(client_id = %request.client_id))]
    pub async fn create_recurring_invoice(
        &self,
        request: &RecurringInvoiceRequest,
    ) -> Result<RecurringInvoice, BillingError> {
        let response: ItemResponse<RecurringInvoice> =
            self.post("/recurring_invoices", request).await?;
        Ok(response.into_inner())
    }

    /// Replace a recurring invoice's fields.
    ///
    /// # Errors
    ///
    /// Returns error if the record is not found or the API request fails.
    #[instrument(skip(self, request), fields(recurring_invoice_id = %id))]
    pub async fn update_recurring_invoice(
        &self,
        id: &RecurringInvoiceId,
        request: &RecurringInvoiceRequest,
    ) -> Result<RecurringInvoice, BillingError> {
        let response: ItemResponse<RecurringInvoice> =
            self.put(&record_path("recurring_invoices", id)?, request).await?;
        Ok(response.into_inner())
    }

    /// Delete a recurring invoice.
    ///
    /// # Errors
    ///
    /// Returns error if the record is not found or the API request fails.
    #[instrument(skip(self), fields(recurring_invoice_id = %id))]
    pub async fn delete_recurring_invoice(&self, id: &RecurringInvoiceId) -> Result<(), BillingError> {
        self.delete(&record_path("recurring_invoices", id)?).await
    }
}
