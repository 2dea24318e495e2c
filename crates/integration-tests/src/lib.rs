//! Integration tests for Invoice Desk.
//!
//! Each test starts the real admin router on an ephemeral port, pointed at
//! a `wiremock` server standing in for the billing API (and, optionally,
//! the payment processor). Requests go through a cookie-keeping `reqwest`
//! client so the session cart behaves as it does in a browser.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p invoice-desk-integration-tests
//! ```

use invoice_desk_admin::config::{AdminConfig, BillingConfig, PaymentsConfig};
use invoice_desk_admin::state::AppState;
use invoice_desk_core::CurrencyCode;
use reqwest::Client;
use url::Url;
use wiremock::MockServer;

/// A running dashboard plus its mocked upstreams.
pub struct TestContext {
    pub client: Client,
    pub base_url: String,
    pub billing: MockServer,
    pub payments: Option<MockServer>,
}

impl TestContext {
    /// Start the app with a billing mock and no payment processor.
    ///
    /// # Panics
    ///
    /// Panics if the server cannot be started.
    pub async fn new() -> Self {
        Self::start(false).await
    }

    /// Start the app with both a billing and a payment processor mock.
    ///
    /// # Panics
    ///
    /// Panics if the server cannot be started.
    pub async fn with_payments() -> Self {
        Self::start(true).await
    }

    #[allow(clippy::expect_used)]
    async fn start(payments: bool) -> Self {
        let billing = MockServer::start().await;
        let billing_url = Url::parse(&billing.uri()).expect("mock server uri");
        let mut config =
            AdminConfig::with_billing(BillingConfig::new(billing_url, "integration-token"));

        let payments = if payments {
            let server = MockServer::start().await;
            let url = Url::parse(&server.uri()).expect("mock server uri");
            config.payments = Some(PaymentsConfig::new(
                url,
                "sk_test_integration",
                CurrencyCode::Usd,
            ));
            Some(server)
        } else {
            None
        };

        let state = AppState::new(config).expect("app state");
        let app = invoice_desk_admin::app(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind ephemeral port");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum_serve(listener, app).await;
        });

        let client = Client::builder()
            .cookie_store(true)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: format!("http://{addr}"),
            billing,
            payments,
        }
    }

    /// Absolute URL for a path on the running app.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

#[allow(clippy::expect_used)]
async fn axum_serve(listener: tokio::net::TcpListener, app: axum::Router) {
    axum::serve(listener, app).await.expect("server error");
}
