//! Admin configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `BILLING_API_URL` - Base URL of the billing REST API (e.g. `https://billing.example.com/api/v1`)
//! - `BILLING_API_TOKEN` - Static API token sent as `X-API-TOKEN` (high entropy)
//!
//! ## Optional
//! - `ADMIN_HOST` - Bind address (default: 127.0.0.1)
//! - `ADMIN_PORT` - Listen port (default: 3001)
//! - `ADMIN_BASE_URL` - Public URL (default: `http://{host}:{port}`); `https` enables secure cookies
//! - `STORE_CHECKOUT_DUE_DAYS` - Days until a store order invoice is due (default: 7)
//! - `INVOICE_DUE_DAYS` - Days until a manual invoice is due (default: 30)
//! - `HTTP_TIMEOUT_SECS` - Timeout for outbound API calls (default: 30)
//! - `LOG_FORMAT` - `json` for structured logs, anything else for text
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT`, `SENTRY_SAMPLE_RATE`, `SENTRY_TRACES_SAMPLE_RATE`
//!
//! ## Optional (payments - enables online invoice payment)
//! - `STRIPE_SECRET_KEY` - Payment processor secret key
//! - `STRIPE_API_URL` - Payment processor base URL (default: `https://api.stripe.com`)
//! - `PAYMENT_CURRENCY` - ISO currency code (default: usd)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use invoice_desk_core::{CurrencyCode, InvoicePolicy};
use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;
const DEFAULT_STRIPE_API_URL: &str = "https://api.stripe.com";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Admin application configuration.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the dashboard
    pub base_url: String,
    /// Billing REST API configuration
    pub billing: BillingConfig,
    /// Payment processor configuration (optional - enables `/pay`)
    pub payments: Option<PaymentsConfig>,
    /// Days until a store checkout invoice is due
    pub store_checkout_due_days: u32,
    /// Days until a manually created invoice is due
    pub invoice_due_days: u32,
    /// Timeout applied to every outbound HTTP call
    pub http_timeout: Duration,
    /// Emit JSON logs instead of text
    pub json_logs: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "staging", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

/// Billing REST API configuration.
///
/// Implements `Debug` manually to redact the API token.
#[derive(Clone)]
pub struct BillingConfig {
    /// Base URL, without a trailing slash
    pub api_url: Url,
    /// Token sent in the `X-API-TOKEN` header
    pub api_token: SecretString,
}

impl std::fmt::Debug for BillingConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BillingConfig")
            .field("api_url", &self.api_url.as_str())
            .field("api_token", &"[REDACTED]")
            .finish()
    }
}

/// Payment processor configuration.
///
/// Implements `Debug` manually to redact the secret key.
#[derive(Clone)]
pub struct PaymentsConfig {
    /// Secret key sent as a bearer token
    pub secret_key: SecretString,
    /// Base URL of the processor API
    pub api_url: Url,
    /// Currency charged for invoice payments
    pub currency: CurrencyCode,
}

impl std::fmt::Debug for PaymentsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentsConfig")
            .field("secret_key", &"[REDACTED]")
            .field("api_url", &self.api_url.as_str())
            .field("currency", &self.currency)
            .finish()
    }
}

impl AdminConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("ADMIN_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("ADMIN_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("ADMIN_PORT", "3001")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("ADMIN_PORT".to_string(), e.to_string()))?;
        let base_url =
            get_optional_env("ADMIN_BASE_URL").unwrap_or_else(|| format!("http://{host}:{port}"));

        let billing = BillingConfig::from_env()?;
        let payments = PaymentsConfig::from_env()?;

        let store_checkout_due_days = get_parsed_or_default(
            "STORE_CHECKOUT_DUE_DAYS",
            InvoicePolicy::STORE_CHECKOUT.due_in_days,
        )?;
        let invoice_due_days =
            get_parsed_or_default("INVOICE_DUE_DAYS", InvoicePolicy::MANUAL_INVOICE.due_in_days)?;
        let http_timeout = Duration::from_secs(get_parsed_or_default("HTTP_TIMEOUT_SECS", 30)?);
        let json_logs = get_optional_env("LOG_FORMAT").is_some_and(|f| f.eq_ignore_ascii_case("json"));

        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_optional_env("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = get_optional_env("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(0.1);

        Ok(Self {
            host,
            port,
            base_url,
            billing,
            payments,
            store_checkout_due_days,
            invoice_due_days,
            http_timeout,
            json_logs,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Configuration with defaults for everything except the billing API.
    ///
    /// Used by tests and embedders that build the config in code.
    #[must_use]
    pub fn with_billing(billing: BillingConfig) -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3001,
            base_url: "http://127.0.0.1:3001".to_string(),
            billing,
            payments: None,
            store_checkout_due_days: InvoicePolicy::STORE_CHECKOUT.due_in_days,
            invoice_due_days: InvoicePolicy::MANUAL_INVOICE.due_in_days,
            http_timeout: Duration::from_secs(30),
            json_logs: false,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.1,
        }
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` flag.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }

    /// Store checkout policy with the configured due-date offset.
    #[must_use]
    pub const fn store_checkout_policy(&self) -> InvoicePolicy {
        InvoicePolicy::STORE_CHECKOUT.with_due_in_days(self.store_checkout_due_days)
    }

    /// Manual invoice policy with the configured due-date offset.
    #[must_use]
    pub const fn manual_invoice_policy(&self) -> InvoicePolicy {
        InvoicePolicy::MANUAL_INVOICE.with_due_in_days(self.invoice_due_days)
    }
}

impl BillingConfig {
    /// Build from an already validated URL and token.
    #[must_use]
    pub fn new(api_url: Url, api_token: impl Into<String>) -> Self {
        Self {
            api_url,
            api_token: SecretString::from(api_token.into()),
        }
    }

    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            api_url: get_url("BILLING_API_URL")?,
            api_token: get_validated_secret("BILLING_API_TOKEN")?,
        })
    }
}

impl PaymentsConfig {
    /// Build from an already validated URL and key.
    #[must_use]
    pub fn new(api_url: Url, secret_key: impl Into<String>, currency: CurrencyCode) -> Self {
        Self {
            secret_key: SecretString::from(secret_key.into()),
            api_url,
            currency,
        }
    }

    /// Load payment configuration from environment.
    ///
    /// Returns `None` if `STRIPE_SECRET_KEY` is not set (online payment disabled).
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let Some(secret_key) = get_optional_env("STRIPE_SECRET_KEY") else {
            return Ok(None);
        };
        if let Err(e) = validate_secret_strength(&secret_key, "STRIPE_SECRET_KEY") {
            tracing::warn!("STRIPE_SECRET_KEY validation warning: {e}");
        }

        let api_url = match get_optional_env("STRIPE_API_URL") {
            Some(raw) => parse_url("STRIPE_API_URL", &raw)?,
            None => parse_url("STRIPE_API_URL", DEFAULT_STRIPE_API_URL)?,
        };
        let currency = get_env_or_default("PAYMENT_CURRENCY", "usd")
            .parse::<CurrencyCode>()
            .map_err(|e| ConfigError::InvalidEnvVar("PAYMENT_CURRENCY".to_string(), e))?;

        Ok(Some(Self {
            secret_key: SecretString::from(secret_key),
            api_url,
            currency,
        }))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable. Empty values count as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse an optional environment variable, falling back to `default`.
fn get_parsed_or_default<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_optional_env(key).map_or(Ok(default), |raw| {
        raw.trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

/// Parse an absolute http(s) URL.
fn parse_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim().trim_end_matches('/'))
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(url)
}

/// Get a required URL from environment.
fn get_url(key: &str) -> Result<Url, ConfigError> {
    parse_url(key, &get_required_env(key)?)
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)]
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated token."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn billing() -> BillingConfig {
        BillingConfig::new(
            Url::parse("https://billing.test/api/v1").unwrap(),
            "tok_9fQ2xL7pR4mZ8wK1",
        )
    }

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-api-token-here", "BILLING_API_TOKEN");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "BILLING_API_TOKEN");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        let result = validate_secret_strength("Zk3vT9qLw2Xn8RbY4mHc7JpF", "BILLING_API_TOKEN");
        assert!(result.is_ok());
    }

    #[test]
    fn test_parse_url() {
        let url = parse_url("BILLING_API_URL", "https://billing.test/api/v1/").unwrap();
        assert_eq!(url.as_str(), "https://billing.test/api/v1");

        assert!(parse_url("BILLING_API_URL", "not a url").is_err());
        assert!(matches!(
            parse_url("BILLING_API_URL", "ftp://billing.test"),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
    }

    #[test]
    fn test_defaults() {
        let config = AdminConfig::with_billing(billing());
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3001");
        assert!(!config.is_secure());
        assert!(config.payments.is_none());
        assert_eq!(config.store_checkout_policy(), InvoicePolicy::STORE_CHECKOUT);
        assert_eq!(config.manual_invoice_policy(), InvoicePolicy::MANUAL_INVOICE);
    }

    #[test]
    fn test_policy_offsets_are_configurable() {
        let mut config = AdminConfig::with_billing(billing());
        config.store_checkout_due_days = 14;
        config.invoice_due_days = 45;
        assert_eq!(config.store_checkout_policy().due_in_days, 14);
        assert_eq!(config.manual_invoice_policy().due_in_days, 45);
    }

    #[test]
    fn test_billing_config_debug_redacts_secrets() {
        let debug_output = format!("{:?}", billing());

        assert!(debug_output.contains("billing.test"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("tok_9fQ2xL7pR4mZ8wK1"));
    }

    #[test]
    fn test_payments_config_debug_redacts_secrets() {
        let config = PaymentsConfig {
            secret_key: SecretString::from("sk_test_51HqLyjWDarjtT1zdp7dc"),
            api_url: Url::parse(DEFAULT_STRIPE_API_URL).unwrap(),
            currency: CurrencyCode::Usd,
        };
        let debug_output = format!("{config:?}");

        assert!(debug_output.contains("api.stripe.com"));
        assert!(debug_output.contains("Usd"));
        assert!(!debug_output.contains("sk_test_51HqLyjWDarjtT1zdp7dc"));
    }
}
