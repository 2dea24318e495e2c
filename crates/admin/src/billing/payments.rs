//! Payment record operations.

use invoice_desk_core::PaymentId;
use tracing::instrument;

use super::{BillingClient, BillingError, ItemResponse, ListParams, ListResponse, Payment, PaymentRequest, record_path};

impl BillingClient {
    /// List payments.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_payments(&self, params: &ListParams) -> Result<ListResponse<Payment>, BillingError> {
        self.get("/payments", params).await
    }

    /// Get a single payment by ID.
    ///
    /// # Errors
    ///
    /// Returns error if the payment is not found or the API request fails.
    #[instrument(skip(self), fields(payment_id = %id))]
    pub async fn get_payment(&self, id: &PaymentId) -> Result<Payment, BillingError> {
        let response: ItemResponse<Payment> = self.get(&record_path("payments", id)?, &()).await?;
        Ok(response.into_inner())
    }

    /// Record a payment.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, request), fields(client_id = %request.client_id, amount = %request.amount))]
    pub async fn create_payment(&self, request: &PaymentRequest) -> Result<Payment, BillingError> {
        let response: ItemResponse<Payment> = self.post("/payments", request).await?;
        Ok(response.into_inner())
    }

    /// Replace a payment's fields.
    ///
    /// # Errors
    ///
    /// Returns error if the payment is not found or the API request fails.
    #[instrument(skip(self, request), fields(payment_id = %id))]
    pub async fn update_payment(
        &self,
        id: &PaymentId,
        request: &PaymentRequest,
    ) -> Result<Payment, BillingError> {
        let response: ItemResponse<Payment> = self.put(&record_path("payments", id)?, request).await?;
        Ok(response.into_inner())
    }

    /// Delete a payment.
    ///
    /// # Errors
    ///
    /// Returns error if the payment is not found or the API request fails.
    #[instrument(skip(self), fields(payment_id = %id))]
    pub async fn delete_payment(&self, id: &PaymentId) -> Result<(), BillingError> {
        self.delete(&record_path("payments", id)?).await
    }
}
