//! Product catalog operations.

use invoice_desk_core::{Catalog, ProductId, RawLineItem};
use tracing::instrument;

use super::{BillingClient, BillingError, ItemResponse, ListParams, ListResponse, Product, ProductRequest, record_path};

impl BillingClient {
    /// List products.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_products(&self, params: &ListParams) -> Result<ListResponse<Product>, BillingError> {
        self.get("/products", params).await
    }

    /// Get a single product by ID.
    ///
    /// # Errors
    ///
    /// Returns error if the product is not found or the API request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: &ProductId) -> Result<Product, BillingError> {
        let response: ItemResponse<Product> = self.get(&record_path("products", id)?, &()).await?;
        Ok(response.into_inner())
    }

    /// Products the store offers: active ones only.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn store_products(&self) -> Result<Vec<Product>, BillingError> {
        let response = self.list_products(&ListParams::default()).await?;
        Ok(response.data.into_iter().filter(|p| p.is_active).collect())
    }

    /// The pricing catalog used to fill in invoice rows.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn catalog(&self) -> Result<Catalog, BillingError> {
        let response = self.list_products(&ListParams::default()).await?;
        Ok(Catalog::new(response.data.iter().map(Product::to_catalog)))
    }

    /// The catalog, fetched only when some row references a product.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    pub async fn catalog_for(&self, items: &[RawLineItem]) -> Result<Option<Catalog>, BillingError> {
        let references_product = items
            .iter()
            .any(|item| item.product_id.as_deref().is_some_and(|id| !id.trim().is_empty()));
        if !references_product {
            return Ok(None);
        }
        self.catalog().await.map(Some)
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create_product(&self, request: &ProductRequest) -> Result<Product, BillingError> {
        let response: ItemResponse<Product> = self.post("/products", request).await?;
        Ok(response.into_inner())
    }

    /// Replace a product's fields.
    ///
    /// # Errors
    ///
    /// Returns error if the product is not found or the API request fails.
    #[instrument(skip(self, request), fields(product_id = %id))]
    pub async fn update_product(
        &self,
        id: &ProductId,
        request: &ProductRequest,
    ) -> Result<Product, BillingError> {
        let response: ItemResponse<Product> = self.put(&record_path("products", id)?, request).await?;
        Ok(response.into_inner())
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns error if the product is not found or the API request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete_product(&self, id: &ProductId) -> Result<(), BillingError> {
        self.delete(&record_path("products", id)?).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::billing::tests::client_for;

    async fn mount_products(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/products"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [
                {"id": "p1", "name": "Mug", "price": "7.50", "is_active": true},
                {"id": "p2", "name": "Retired mug", "price": 5, "is_active": false}
            ]})))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_store_products_are_active_only() {
        let server = MockServer::start().await;
        mount_products(&server).await;

        let products = client_for(&server).store_products().await.unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].id, ProductId::new("p1"));
    }

    #[tokio::test]
    async fn test_catalog_only_fetched_when_referenced() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/products"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let billing = client_for(&server);
        let manual = RawLineItem {
            description: Some("Consulting".to_string()),
            product_id: Some(String::new()),
            ..RawLineItem::default()
        };
        assert!(billing.catalog_for(&[manual.clone()]).await.unwrap().is_none());

        let linked = RawLineItem {
            product_id: Some("p1".to_string()),
            ..RawLineItem::default()
        };
        assert!(billing.catalog_for(&[manual, linked]).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_catalog_holds_every_product() {
        let server = MockServer::start().await;
        mount_products(&server).await;

        let catalog = client_for(&server).catalog().await.unwrap();
        assert_eq!(catalog.len(), 2);
        assert!(catalog.get(&ProductId::new("p2")).is_some());
    }
}
