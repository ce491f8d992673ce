//! Cart configuration loaded from environment variables.
//!
//! Every component receives its settings from a [`CartConfig`] at
//! construction, so storage keys and API paths are defined in one place.
//!
//! # Environment Variables
//!
//! All optional:
//! - `MYSTORE_API_BASE_URL` - Backend REST base URL (default: the hosted store API)
//! - `MYSTORE_HTTP_TIMEOUT_SECS` - Request timeout (default: 30)
//! - `MYSTORE_CATALOG_CACHE_SECS` - Product catalog cache TTL (default: 300)
//! - `MYSTORE_CART_KEY` - Storage key of the cart (default: `myStoreShoppingCart`)
//! - `MYSTORE_CUSTOMER_TOKEN_KEY` - Storage key of the customer token (default: `userToken`)
//! - `MYSTORE_ADMIN_TOKEN_KEY` - Storage key of the admin token (default: `adminAuthToken`)
//! - `MYSTORE_SHIPPING` - Flat shipping charge (default: 7.99)
//! - `MYSTORE_TAX_RATE` - Tax rate as a fraction (default: 0.04)

use std::time::Duration;

use rust_decimal::Decimal;
use thiserror::Error;
use url::Url;

use crate::session::{ADMIN_ROLE, CUSTOMER_ROLE, SessionRole};
use crate::totals::Pricing;

/// Default backend base URL.
pub const DEFAULT_API_BASE_URL: &str = "https://mongodb-crud-api-ato3.onrender.com/api/";

/// Default storage key of the serialized cart.
pub const DEFAULT_CART_KEY: &str = "myStoreShoppingCart";

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CATALOG_CACHE_SECS: u64 = 300;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Top-level cart configuration.
#[derive(Debug, Clone)]
pub struct CartConfig {
    /// Storage key of the serialized cart.
    pub cart_key: String,
    /// Session roles in priority order.
    pub session_roles: Vec<SessionRole>,
    /// Shipping and tax settings.
    pub pricing: Pricing,
    /// Backend API settings.
    pub api: ApiConfig,
}

/// Backend REST API configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL; always ends with `/` so relative paths join beneath it.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// How long a fetched product catalog is reused.
    pub catalog_cache_ttl: Duration,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            cart_key: DEFAULT_CART_KEY.to_string(),
            session_roles: SessionRole::defaults(),
            pricing: Pricing::default(),
            api: ApiConfig::default(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            catalog_cache_ttl: Duration::from_secs(DEFAULT_CATALOG_CACHE_SECS),
        }
    }
}

impl CartConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let base_url = match get("MYSTORE_API_BASE_URL") {
            Some(raw) => normalize_base_url(&raw).map_err(|e| {
                ConfigError::InvalidEnvVar("MYSTORE_API_BASE_URL".to_string(), e.to_string())
            })?,
            None => defaults.api.base_url,
        };
        let timeout = parse_secs(
            "MYSTORE_HTTP_TIMEOUT_SECS",
            get("MYSTORE_HTTP_TIMEOUT_SECS"),
            defaults.api.timeout,
        )?;
        let catalog_cache_ttl = parse_secs(
            "MYSTORE_CATALOG_CACHE_SECS",
            get("MYSTORE_CATALOG_CACHE_SECS"),
            defaults.api.catalog_cache_ttl,
        )?;

        let customer_key = get("MYSTORE_CUSTOMER_TOKEN_KEY");
        let admin_key = get("MYSTORE_ADMIN_TOKEN_KEY");
        let session_roles = defaults
            .session_roles
            .into_iter()
            .map(|role| match role.name.as_str() {
                CUSTOMER_ROLE => customer_key
                    .clone()
                    .map_or(role.clone(), |key| SessionRole::new(CUSTOMER_ROLE, key)),
                ADMIN_ROLE => admin_key
                    .clone()
                    .map_or(role.clone(), |key| SessionRole::new(ADMIN_ROLE, key)),
                _ => role,
            })
            .collect();

        let shipping = parse_amount(
            "MYSTORE_SHIPPING",
            get("MYSTORE_SHIPPING"),
            defaults.pricing.shipping,
        )?;
        let tax_rate = parse_amount(
            "MYSTORE_TAX_RATE",
            get("MYSTORE_TAX_RATE"),
            defaults.pricing.tax_rate,
        )?;

        Ok(Self {
            cart_key: get("MYSTORE_CART_KEY").unwrap_or(defaults.cart_key),
            session_roles,
            pricing: Pricing { shipping, tax_rate },
            api: ApiConfig {
                base_url,
                timeout,
                catalog_cache_ttl,
            },
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Validate a base URL and make sure its path ends with `/`.
fn normalize_base_url(raw: &str) -> Result<String, url::ParseError> {
    let mut url = Url::parse(raw.trim())?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url.into())
}

/// Parse a whole number of seconds.
fn parse_secs(key: &str, raw: Option<String>, default: Duration) -> Result<Duration, ConfigError> {
    raw.map_or(Ok(default), |raw| {
        raw.trim()
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

/// Parse a non-negative decimal amount.
fn parse_amount(key: &str, raw: Option<String>, default: Decimal) -> Result<Decimal, ConfigError> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    let value = raw
        .trim()
        .parse::<Decimal>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if value.is_sign_negative() {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must not be negative".to_string(),
        ));
    }
    Ok(value)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = CartConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.cart_key, "myStoreShoppingCart");
        assert_eq!(config.pricing.shipping, Decimal::new(799, 2));
        assert_eq!(config.pricing.tax_rate, Decimal::new(4, 2));
        assert_eq!(
            config.api.base_url,
            "https://mongodb-crud-api-ato3.onrender.com/api/"
        );
        assert_eq!(config.session_roles, SessionRole::defaults());
        assert_eq!(config.api.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_overrides() {
        let config = CartConfig::from_lookup(lookup(&[
            ("MYSTORE_API_BASE_URL", "http://127.0.0.1:4000/v2"),
            ("MYSTORE_CART_KEY", "cart"),
            ("MYSTORE_ADMIN_TOKEN_KEY", "staffToken"),
            ("MYSTORE_SHIPPING", "0"),
            ("MYSTORE_TAX_RATE", "0.0825"),
            ("MYSTORE_CATALOG_CACHE_SECS", "0"),
        ]))
        .unwrap();

        assert_eq!(config.api.base_url, "http://127.0.0.1:4000/v2/");
        assert_eq!(config.cart_key, "cart");
        assert_eq!(config.session_roles[1], SessionRole::new("admin", "staffToken"));
        assert_eq!(config.session_roles[0], SessionRole::new("customer", "userToken"));
        assert_eq!(config.pricing.shipping, Decimal::ZERO);
        assert_eq!(config.pricing.tax_rate, Decimal::new(825, 4));
        assert_eq!(config.api.catalog_cache_ttl, Duration::ZERO);
    }

    #[test]
    fn test_blank_values_fall_back_to_defaults() {
        let config = CartConfig::from_lookup(lookup(&[("MYSTORE_CART_KEY", "  ")])).unwrap();
        assert_eq!(config.cart_key, DEFAULT_CART_KEY);
    }

    #[test]
    fn test_invalid_values() {
        for (key, value) in [
            ("MYSTORE_API_BASE_URL", "not a url"),
            ("MYSTORE_HTTP_TIMEOUT_SECS", "soon"),
            ("MYSTORE_SHIPPING", "-1"),
            ("MYSTORE_TAX_RATE", "four percent"),
        ] {
            let result = CartConfig::from_lookup(lookup(&[(key, value)]));
            assert!(
                matches!(result, Err(ConfigError::InvalidEnvVar(ref k, _)) if k == key),
                "{key}={value} should be rejected"
            );
        }
    }

    #[test]
    fn test_normalize_base_url_keeps_trailing_slash() {
        let url = normalize_base_url("https://example.com/api/").unwrap();
        assert_eq!(url, "https://example.com/api/");
        assert_eq!(
            Url::parse(&url).unwrap().join("sales/checkout").unwrap().as_str(),
            "https://example.com/api/sales/checkout"
        );
    }
}
