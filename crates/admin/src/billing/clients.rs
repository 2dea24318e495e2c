//! Client (customer) operations.

use invoice_desk_core::{ClientId, Email};
use tracing::instrument;

use super::{BillingClient, BillingError, Client, ClientInput, ItemResponse, ListParams, ListResponse, record_path};

impl BillingClient {
    /// List clients.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_clients(&self, params: &ListParams) -> Result<ListResponse<Client>, BillingError> {
        self.get("/clients", params).await
    }

    /// Get a single client by ID.
    ///
    /// # Errors
    ///
    /// Returns error if the client is not found or the API request fails.
    #[instrument(skip(self), fields(client_id = %id))]
    pub async fn get_client(&self, id: &ClientId) -> Result<Client, BillingError> {
        let response: ItemResponse<Client> = self.get(&record_path("clients", id)?, &()).await?;
        Ok(response.into_inner())
    }

    /// First client whose email matches `email`, if any.
    ///
    /// The API filters by email server-side; the result is checked again
    /// here so a backend that ignores the filter cannot hand back a
    /// stranger's record.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self), fields(email = %email))]
    pub async fn find_client_by_email(&self, email: &Email) -> Result<Option<Client>, BillingError> {
        let response = self.list_clients(&ListParams::by_email(email.as_str())).await?;
        Ok(response
            .data
            .into_iter()
            .find(|client| client.email.as_deref().is_some_and(|e| email.matches(e))))
    }

    /// Create a client.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_client(&self, input: &ClientInput) -> Result<Client, BillingError> {
        let response: ItemResponse<Client> = self.post("/clients", input).await?;
        Ok(response.into_inner())
    }

    /// Replace a client's fields.
    ///
    /// # Errors
    ///
    /// Returns error if the client is not found or the API request fails.
    #[instrument(skip(self, input), fields(client_id = %id))]
    pub async fn update_client(&self, id: &ClientId, input: &ClientInput) -> Result<Client, BillingError> {
        let response: ItemResponse<Client> = self.put(&record_path("clients", id)?, input).await?;
        Ok(response.into_inner())
    }

    /// Delete a client.
    ///
    /// # Errors
    ///
    /// Returns error if the client is not found or the API request fails.
    #[instrument(skip(self), fields(client_id = %id))]
    pub async fn delete_client(&self, id: &ClientId) -> Result<(), BillingError> {
        self.delete(&record_path("clients", id)?).await
    }
}
