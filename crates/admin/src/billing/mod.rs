//! Billing API client.
//!
//! Thin REST client for the invoicing backend that owns clients, products,
//! invoices, recurring invoices and payments. This dashboard stores nothing
//! itself; every record lives behind this API.
//!
//! # API Reference
//!
//! - Base URL: `BILLING_API_URL` (e.g. `https://billing.example.com/api/v1`)
//! - Authentication: static token via the `X-API-TOKEN` header
//! - Bodies: JSON; responses may or may not be wrapped in `{ data, meta }`

mod clients;
pub mod forms;
mod invoices;
mod payments;
mod products;
mod recurring;
mod types;

pub use forms::*;
pub use types::*;

use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::config::BillingConfig;

/// Authentication header expected by the billing API.
const TOKEN_HEADER: &str = "X-API-TOKEN";

/// Errors that can occur when talking to the billing API.
#[derive(Debug, Error)]
pub enum BillingError {
    /// Transport failure (connect, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-2xx status.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// The record does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The API answered 2xx with a body we could not decode.
    #[error("Parse error: {0}")]
    Parse(String),
}

impl BillingError {
    /// HTTP status returned by the API, when there was one.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::NotFound(_) => Some(404),
            Self::Http(_) | Self::Parse(_) => None,
        }
    }
}

/// Billing API client.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct BillingClient {
    inner: Arc<BillingClientInner>,
}

struct BillingClientInner {
    client: reqwest::Client,
    base_url: String,
}

impl BillingClient {
    /// Create a new billing API client.
    ///
    /// # Errors
    ///
    /// Returns error if the token is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(config: &BillingConfig, timeout: Duration) -> Result<Self, BillingError> {
        let mut headers = HeaderMap::new();

        let mut token = HeaderValue::from_str(config.api_token.expose_secret())
            .map_err(|e| BillingError::Parse(format!("Invalid API token format: {e}")))?;
        token.set_sensitive(true);
        headers.insert(TOKEN_HEADER, token);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(BillingClientInner {
                client,
                base_url: config.api_url.as_str().trim_end_matches('/').to_string(),
            }),
        })
    }

    /// Base URL every path is appended to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base_url)
    }

    /// Execute a GET request with query parameters.
    pub(crate) async fn get<T: DeserializeOwned, Q: Serialize + ?Sized + Sync>(
        &self,
        path: &str,
        query: &Q,
    ) -> Result<T, BillingError> {
        let response = self
            .inner
            .client
            .get(self.url(path))
            .query(query)
            .send()
            .await?;
        Self::handle_response(response).await
    }

    /// Execute a POST request with a JSON body.
    pub(crate) async fn post<T: DeserializeOwned, B: Serialize + ?Sized + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, BillingError> {
        let response = self
            .inner
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await?;
        Self::handle_response(response).await
    }

    /// Execute a PUT request with a JSON body.
    pub(crate) async fn put<T: DeserializeOwned, B: Serialize + ?Sized + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, BillingError> {
        let response = self
            .inner
            .client
            .put(self.url(path))
            .json(body)
            .send()
            .await?;
        Self::handle_response(response).await
    }

    /// Execute a DELETE request. Any 2xx counts as success.
    pub(crate) async fn delete(&self, path: &str) -> Result<(), BillingError> {
        let response = self.inner.client.delete(self.url(path)).send().await?;
        if response.status().is_success() {
            return Ok(());
        }
        Err(Self::parse_error(response).await)
    }

    async fn handle_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, BillingError> {
        if !response.status().is_success() {
            return Err(Self::parse_error(response).await);
        }

        let body = response.bytes().await?;
        // 204 and friends: decode as `null`.
        let body: &[u8] = if body.is_empty() { b"null" } else { &body };
        serde_json::from_slice(body)
            .map_err(|e| BillingError::Parse(format!("Failed to parse response: {e}")))
    }

    async fn parse_error(response: reqwest::Response) -> BillingError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let message = error_message(status, &body);

        if status == StatusCode::NOT_FOUND {
            return BillingError::NotFound(message);
        }
        BillingError::Api {
            status: status.as_u16(),
            message,
        }
    }
}

/// Path of one record in `collection`, with the id percent-encoded as a
/// single segment.
///
/// Ids that would resolve as dot segments never reach the API.
pub(crate) fn record_path(collection: &str, id: impl std::fmt::Display) -> Result<String, BillingError> {
    let id = id.to_string();
    if matches!(id.as_str(), "" | "." | "..") {
        return Err(BillingError::NotFound("Record not found".to_string()));
    }
    Ok(format!("/{collection}/{}", urlencoding::encode(&id)))
}

/// User-facing message for a failed response.
///
/// JSON bodies yield their `message` field, or `Error: {status}` without
/// one. Anything else yields `Error: {status} {reason}`.
fn error_message(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(json) => json
            .get("message")
            .and_then(serde_json::Value::as_str)
            .filter(|m| !m.is_empty())
            .map_or_else(|| format!("Error: {}", status.as_u16()), str::to_string),
        Err(_) => format!(
            "Error: {} {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or_default()
        )
        .trim_end()
        .to_string(),
    }
}

impl std::fmt::Debug for BillingClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BillingClient")
            .field("base_url", &self.inner.base_url)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use url::Url;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    pub(crate) fn client_for(server: &MockServer) -> BillingClient {
        let config = BillingConfig::new(Url::parse(&server.uri()).unwrap(), "test-token");
        BillingClient::new(&config, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_error_message_from_json() {
        let message = error_message(
            StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"message":"The given data was invalid."}"#,
        );
        assert_eq!(message, "The given data was invalid.");
    }

    #[test]
    fn test_error_message_without_message_field() {
        assert_eq!(
            error_message(StatusCode::INTERNAL_SERVER_ERROR, r#"{"errors":[]}"#),
            "Error: 500"
        );
    }

    #[test]
    fn test_error_message_non_json() {
        assert_eq!(
            error_message(StatusCode::BAD_GATEWAY, "<html>upstream down</html>"),
            "Error: 502 Bad Gateway"
        );
    }

    #[test]
    fn test_record_path_encodes_id() {
        assert_eq!(record_path("invoices", "i1").unwrap(), "/invoices/i1");
        assert_eq!(record_path("invoices", "a/b?c").unwrap(), "/invoices/a%2Fb%3Fc");
        assert_eq!(record_path("products", "..%2F").unwrap(), "/products/..%252F");
        assert!(record_path("products", "..").is_err());
    }

    #[test]
    fn test_base_url_is_trimmed() {
        let config = BillingConfig::new(
            Url::parse("https://billing.example.com/api/v1/").unwrap(),
            "test-token",
        );
        let client = BillingClient::new(&config, Duration::from_secs(5)).unwrap();
        assert_eq!(client.base_url(), "https://billing.example.com/api/v1");
        assert!(format!("{client:?}").contains("BillingClient"));
    }

    #[tokio::test]
    async fn test_token_header_is_sent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/clients"))
            .and(header("X-API-TOKEN", "test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let clients = client_for(&server)
            .list_clients(&ListParams::default())
            .await
            .unwrap();
        assert!(clients.data.is_empty());
    }

    #[tokio::test]
    async fn test_not_found_maps_to_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/invoices/missing"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(serde_json::json!({"message": "Invoice not found"})),
            )
            .mount(&server)
            .await;

        let err = client_for(&server)
            .get_invoice(&invoice_desk_core::InvoiceId::new("missing"))
            .await
            .unwrap_err();
        assert!(matches!(err, BillingError::NotFound(ref m) if m == "Invoice not found"));
        assert_eq!(err.status(), Some(404));
    }

    #[tokio::test]
    async fn test_api_error_keeps_status_and_message() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/clients/c1"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .delete_client(&invoice_desk_core::ClientId::new("c1"))
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert_eq!(err.to_string(), "Error: 500 Internal Server Error");
    }

    #[tokio::test]
    async fn test_undecodable_success_body_is_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/products"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .list_products(&ListParams::default())
            .await
            .unwrap_err();
        assert!(matches!(err, BillingError::Parse(_)));
    }
}
