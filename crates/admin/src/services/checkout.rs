//! Store checkout orchestration.
//!
//! Turns the visitor's cart into a billing invoice:
//!
//! 1. validate the form and cart (no network)
//! 2. resolve the customer: first client with the same email, else create one
//! 3. create the invoice under the store checkout policy
//! 4. clear the persisted cart
//!
//! Each step awaits the previous one. Nothing is rolled back: a customer
//! created in step 2 stays even if step 3 fails.

use chrono::NaiveDate;
use invoice_desk_core::{
    CheckoutEvent, CheckoutForm, CheckoutStage, CheckoutState, CheckoutValidationError,
    CustomerDetails, InvoicePayload, InvoicePolicy, OrderTotals, TransitionError,
};
use serde::Serialize;
use thiserror::Error;
use tracing::instrument;

use crate::billing::{BillingClient, BillingError, Client, ClientInput, Invoice};
use crate::services::cart_store::{CartStore, CartStoreError};

/// Errors that end a checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The form or cart failed validation.
    #[error(transparent)]
    Validation(#[from] CheckoutValidationError),

    /// Customer lookup or creation failed.
    #[error("Failed to process customer information")]
    CustomerResolution(#[source] BillingError),

    /// The billing API refused the invoice.
    #[error("{0}")]
    InvoiceCreation(#[source] BillingError),

    /// The persisted cart could not be read.
    #[error(transparent)]
    CartStore(#[from] CartStoreError),

    /// The state machine was driven out of order.
    #[error(transparent)]
    Transition(#[from] TransitionError),
}

/// Result of a completed checkout.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutReceipt {
    pub invoice: Invoice,
    pub client: Client,
    pub totals: OrderTotals,
    pub created_client: bool,
}

/// One checkout attempt.
///
/// Holds the state machine so callers and tests can see where a failed
/// attempt stopped.
#[derive(Debug)]
pub struct Checkout<'a, S> {
    billing: &'a BillingClient,
    cart_store: &'a S,
    policy: InvoicePolicy,
    state: CheckoutState,
}

impl<'a, S: CartStore> Checkout<'a, S> {
    #[must_use]
    pub fn new(billing: &'a BillingClient, cart_store: &'a S, policy: InvoicePolicy) -> Self {
        Self {
            billing,
            cart_store,
            policy,
            state: CheckoutState::default(),
        }
    }

    /// Current state of this attempt.
    #[must_use]
    pub const fn state(&self) -> &CheckoutState {
        &self.state
    }

    /// Run the checkout for `form`, issuing the invoice on `today`.
    ///
    /// On failure the attempt is left in [`CheckoutState::Failed`] and the
    /// cart is untouched.
    ///
    /// # Errors
    ///
    /// Returns the first failing step's error.
    #[instrument(skip(self, form), fields(payment_method = %form.payment_method))]
    pub async fn submit(
        &mut self,
        form: &CheckoutForm,
        today: NaiveDate,
    ) -> Result<CheckoutReceipt, CheckoutError> {
        self.state.apply(CheckoutEvent::Submit)?;

        match self.run(form, today).await {
            Ok(receipt) => Ok(receipt),
            Err(err) => {
                let stage = self.state.stage().map_or("unknown", CheckoutStage::as_str);
                tracing::warn!(stage, error = %err, "Checkout failed");
                self.state.apply(CheckoutEvent::Fail(err.to_string()))?;
                Err(err)
            }
        }
    }

    /// Leave the failed state so the visitor can edit the cart again.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError`] unless the attempt has failed.
    pub fn return_to_cart(&mut self) -> Result<(), TransitionError> {
        self.state.apply(CheckoutEvent::ReturnToCart)
    }

    async fn run(
        &mut self,
        form: &CheckoutForm,
        today: NaiveDate,
    ) -> Result<CheckoutReceipt, CheckoutError> {
        let cart = self.cart_store.load().await?;
        let checkout = form.validate(&cart)?;
        self.state.apply(CheckoutEvent::Validated)?;

        let (client, created_client) = self
            .resolve_customer(&checkout.customer)
            .await
            .map_err(CheckoutError::CustomerResolution)?;
        self.state.apply(CheckoutEvent::CustomerResolved)?;

        let payload = InvoicePayload::from_cart(&cart, client.id.clone(), today, &self.policy)
            .map_err(|e| CheckoutError::Validation(e.into()))?;
        let invoice = self
            .billing
            .create_invoice(&payload)
            .await
            .map_err(CheckoutError::InvoiceCreation)?;
        self.state.apply(CheckoutEvent::InvoiceCreated)?;

        tracing::info!(
            invoice_id = %invoice.id,
            client_id = %client.id,
            total = %payload.totals.grand_total,
            "Checkout invoice created"
        );

        // The invoice exists now; a stale cart is the lesser problem.
        if let Err(e) = self.cart_store.clear().await {
            tracing::error!(error = %e, invoice_id = %invoice.id, "Failed to clear cart after checkout");
        }

        Ok(CheckoutReceipt {
            invoice,
            client,
            totals: payload.totals,
            created_client,
        })
    }

    async fn resolve_customer(
        &self,
        customer: &CustomerDetails,
    ) -> Result<(Client, bool), BillingError> {
        if let Some(existing) = self.billing.find_client_by_email(&customer.email).await? {
            tracing::debug!(client_id = %existing.id, "Using existing client");
            return Ok((existing, false));
        }

        let created = self.billing.create_client(&ClientInput::from(customer)).await?;
        tracing::info!(client_id = %created.id, "Created client for checkout");
        Ok((created, true))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use invoice_desk_core::{Cart, CatalogProduct, ProductId};
    use rust_decimal::Decimal;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::billing::tests::client_for;
    use crate::services::cart_store::MemoryCartStore;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    fn form() -> CheckoutForm {
        CheckoutForm {
            name: "Jane Buyer".to_string(),
            email: "jane@shop.test".to_string(),
            address: "1 Main St".to_string(),
            city: "Springfield".to_string(),
            state: "IL".to_string(),
            zip: "62701".to_string(),
            country: "US".to_string(),
            payment_method: "paypal".to_string(),
            ..CheckoutForm::default()
        }
    }

    async fn stocked_store() -> MemoryCartStore {
        let mut cart = Cart::new();
        for (id, price) in [("p1", 750), ("p2", 1000)] {
            cart.add_product(&CatalogProduct {
                id: ProductId::new(id),
                name: format!("Product {id}"),
                description: String::new(),
                price: Decimal::new(price, 2),
                tax_rate: Decimal::from(8),
                is_active: true,
            });
        }
        cart.set_quantity(&ProductId::new("p1"), 2).unwrap();
        let store = MemoryCartStore::new();
        store.save(&cart).await.unwrap();
        store
    }

    async fn mount_lookup(server: &MockServer, clients: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path("/clients"))
            .respond_with(ResponseTemplate::new(200).set_body_json(clients))
            .mount(server)
            .await;
    }

    async fn mount_invoice(server: &MockServer, expected: u64) {
        Mock::given(method("POST"))
            .and(path("/invoices"))
            .and(body_partial_json(json!({
                "status": "sent",
                "terms": "Due on Receipt",
                "due_date": "2024-03-08",
                "subtotal": 25.0,
                "tax_total": 2.0,
                "total": 27.0
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "data": {"id": "i1", "status": "sent", "amount": 27, "balance": 27}
            })))
            .expect(expected)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_checkout_with_existing_client() {
        let server = MockServer::start().await;
        mount_lookup(&server, json!([{"id": "c1", "name": "Jane", "email": "jane@shop.test"}])).await;
        Mock::given(method("POST"))
            .and(path("/clients"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;
        mount_invoice(&server, 1).await;

        let billing = client_for(&server);
        let store = stocked_store().await;
        let mut checkout = Checkout::new(&billing, &store, InvoicePolicy::STORE_CHECKOUT);

        let receipt = checkout.submit(&form(), today()).await.unwrap();
        assert!(!receipt.created_client);
        assert_eq!(receipt.client.id.as_str(), "c1");
        assert_eq!(receipt.totals.grand_total, Decimal::from(27));
        assert_eq!(checkout.state(), &CheckoutState::Cleared);
        assert!(store.blob().await.is_none());
    }

    #[tokio::test]
    async fn test_checkout_creates_missing_client() {
        let server = MockServer::start().await;
        mount_lookup(&server, json!({"data": [], "meta": {"total": 0}})).await;
        Mock::given(method("POST"))
            .and(path("/clients"))
            .and(body_partial_json(json!({
                "name": "Jane Buyer",
                "email": "jane@shop.test",
                "postal_code": "62701",
                "is_active": true
            })))
            .respond_with(
                ResponseTemplate::new(201).set_body_json(json!({"data": {"id": "c7", "name": "Jane Buyer"}})),
            )
            .expect(1)
            .mount(&server)
            .await;
        mount_invoice(&server, 1).await;

        let billing = client_for(&server);
        let store = stocked_store().await;
        let mut checkout = Checkout::new(&billing, &store, InvoicePolicy::STORE_CHECKOUT);

        let receipt = checkout.submit(&form(), today()).await.unwrap();
        assert!(receipt.created_client);
        assert_eq!(receipt.client.id.as_str(), "c7");
    }

    #[tokio::test]
    async fn test_resolution_failure_creates_no_invoice() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/clients"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({"message": "db down"})))
            .mount(&server)
            .await;
        mount_invoice(&server, 0).await;

        let billing = client_for(&server);
        let store = stocked_store().await;
        let mut checkout = Checkout::new(&billing, &store, InvoicePolicy::STORE_CHECKOUT);

        let err = checkout.submit(&form(), today()).await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to process customer information");
        assert_eq!(
            checkout.state(),
            &CheckoutState::Failed {
                stage: CheckoutStage::ResolvingCustomer,
                reason: "Failed to process customer information".to_string(),
            }
        );
        // Cart untouched.
        assert_eq!(store.load().await.unwrap().len(), 2);

        checkout.return_to_cart().unwrap();
        assert_eq!(checkout.state(), &CheckoutState::EditingCart);
    }

    #[tokio::test]
    async fn test_invoice_failure_surfaces_api_message() {
        let server = MockServer::start().await;
        mount_lookup(&server, json!([{"id": "c1", "name": "Jane", "email": "jane@shop.test"}])).await;
        Mock::given(method("POST"))
            .and(path("/invoices"))
            .respond_with(
                ResponseTemplate::new(422).set_body_json(json!({"message": "Invalid client"})),
            )
            .mount(&server)
            .await;

        let billing = client_for(&server);
        let store = stocked_store().await;
        let mut checkout = Checkout::new(&billing, &store, InvoicePolicy::STORE_CHECKOUT);

        let err = checkout.submit(&form(), today()).await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid client");
        assert_eq!(
            checkout.state().failure_reason(),
            Some("Invalid client")
        );
        assert!(!store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_validation_failure_makes_no_calls() {
        let server = MockServer::start().await;
        Mock::given(wiremock::matchers::any())
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let billing = client_for(&server);
        let store = MemoryCartStore::new();
        let mut checkout = Checkout::new(&billing, &store, InvoicePolicy::STORE_CHECKOUT);

        let err = checkout.submit(&form(), today()).await.unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::Validation(CheckoutValidationError::EmptyCart)
        ));
        assert_eq!(
            checkout.state().failure_reason(),
            Some("Your cart is empty")
        );
    }

    #[tokio::test]
    async fn test_second_submit_without_returning_is_rejected() {
        let server = MockServer::start().await;
        let billing = client_for(&server);
        let store = MemoryCartStore::new();
        let mut checkout = Checkout::new(&billing, &store, InvoicePolicy::STORE_CHECKOUT);

        let _ = checkout.submit(&form(), today()).await;
        let err = checkout.submit(&form(), today()).await.unwrap_err();
        assert!(matches!(err, CheckoutError::Transition(_)));
    }
}
