//! Store backend REST client.
//!
//! # Architecture
//!
//! - One `reqwest` client with a request timeout, shared behind an `Arc`
//! - Every response body is read as text first, then decoded explicitly
//! - Product catalog cached in-memory via `moka` (5 minute TTL by default)
//! - Failure bodies are reduced to the server's `error` message

mod cache;
mod types;

use std::sync::Arc;

use moka::future::Cache;
use mystore_core::{ProductId, SessionToken};
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::checkout::OrderGateway;
use crate::config::ApiConfig;

use cache::{CacheKey, CacheValue};
pub use types::{
    AccountSummary, LoginResponse, OrderConfirmation, OrderItem, OrderPayload, Product,
    RegisterResponse, decode_product, decode_product_list,
};
use types::{LoginRequest, RegisterRequest, error_message};

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request could not complete (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// A success body did not have an accepted shape.
    #[error("Decode error: {0}")]
    Decode(String),

    /// The request was refused locally before sending.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the store backend.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    cache: Cache<CacheKey, CacheValue>,
}

impl ApiClient {
    /// Create a new backend client.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidInput` for an unusable base URL, or
    /// `ApiError::Http` if the HTTP client fails to build.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let raw = if config.base_url.ends_with('/') {
            config.base_url.clone()
        } else {
            format!("{}/", config.base_url)
        };
        let base_url = Url::parse(&raw)
            .map_err(|e| ApiError::InvalidInput(format!("base URL {raw:?}: {e}")))?;

        let client = reqwest::Client::builder().timeout(config.timeout).build()?;

        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(config.catalog_cache_ttl)
            .build();

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url,
                cache,
            }),
        })
    }

    /// Base URL every endpoint is resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.inner
            .base_url
            .join(path)
            .map_err(|e| ApiError::InvalidInput(format!("endpoint {path:?}: {e}")))
    }

    /// Send a request and return the body of a success response.
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<String, ApiError> {
        let response = request.send().await?;
        let status = response.status();

        // Read as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            let message = error_message(&body)
                .unwrap_or_else(|| format!("Server responded with status {}", status.as_u16()));
            warn!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "Backend returned non-success status"
            );
            return Err(ApiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(body)
    }

    // =========================================================================
    // Order Methods
    // =========================================================================

    /// Submit an order on behalf of the bearer of `token`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Api` if the backend rejects the order, `ApiError::Http`
    /// if the request cannot complete, or `ApiError::Decode` for a success body
    /// that is not JSON.
    #[instrument(skip(self, token, order), fields(lines = order.order_items.len()))]
    pub async fn place_order(
        &self,
        token: &SessionToken,
        order: &OrderPayload,
    ) -> Result<OrderConfirmation, ApiError> {
        let url = self.endpoint("sales/checkout")?;
        let request = self
            .inner
            .client
            .post(url)
            .header(reqwest::header::AUTHORIZATION, token.bearer())
            .json(order);

        let body = self.send(request).await?;
        let confirmation = OrderConfirmation::decode(&body)?;
        debug!(message = ?confirmation.message, "Order accepted");
        Ok(confirmation)
    }

    // =========================================================================
    // Catalog Methods
    // =========================================================================

    /// Get the product catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not a product list.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<Product>, ApiError> {
        if let Some(CacheValue::Products(products)) =
            self.inner.cache.get(&CacheKey::Products).await
        {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let url = self.endpoint("products")?;
        let body = self.send(self.inner.client.get(url)).await?;
        let products = decode_product_list(&body)?;
        debug!(count = products.len(), "Fetched product catalog");

        self.inner
            .cache
            .insert(CacheKey::Products, CacheValue::Products(products.clone()))
            .await;

        Ok(products)
    }

    /// Get one product by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the product does not exist or the request fails.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn get_product(&self, id: &ProductId) -> Result<Product, ApiError> {
        let cache_key = CacheKey::Product(id.clone());

        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        if id.is_blank() {
            return Err(ApiError::InvalidInput("product id is empty".to_string()));
        }
        let url = self.endpoint(&format!("products/{}", id.as_str()))?;
        let body = self.send(self.inner.client.get(url)).await?;
        let product = decode_product(&body)?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    /// Drop all cached catalog responses.
    pub fn invalidate_catalog(&self) {
        self.inner.cache.invalidate_all();
    }

    // =========================================================================
    // Account Methods
    // =========================================================================

    /// Sign in a customer.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Api` for rejected credentials, or `ApiError::Decode`
    /// if the response carries no token.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<LoginResponse, ApiError> {
        self.sign_in("login", email, password).await
    }

    /// Sign in an administrator.
    ///
    /// # Errors
    ///
    /// Same as [`ApiClient::login`].
    #[instrument(skip(self, password))]
    pub async fn admin_login(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<LoginResponse, ApiError> {
        self.sign_in("admin/login", email, password).await
    }

    async fn sign_in(
        &self,
        path: &str,
        email: &str,
        password: &SecretString,
    ) -> Result<LoginResponse, ApiError> {
        if email.trim().is_empty() || password.expose_secret().is_empty() {
            return Err(ApiError::InvalidInput(
                "email and password are required".to_string(),
            ));
        }

        let url = self.endpoint(path)?;
        let body = LoginRequest {
            email: email.trim(),
            password: password.expose_secret(),
        };
        let text = self.send(self.inner.client.post(url).json(&body)).await?;

        let response: LoginResponse = serde_json::from_str(&text)
            .map_err(|e| ApiError::Decode(format!("login response: {e}")))?;
        if response.token.trim().is_empty() {
            return Err(ApiError::Decode("login response has an empty token".to_string()));
        }
        Ok(response)
    }

    /// Register a customer account.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidInput` if any field is empty (nothing is
    /// sent), or `ApiError::Api` if the backend refuses the registration.
    #[instrument(skip(self, password))]
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &SecretString,
    ) -> Result<RegisterResponse, ApiError> {
        if name.trim().is_empty() || email.trim().is_empty() || password.expose_secret().is_empty()
        {
            return Err(ApiError::InvalidInput(
                "name, email and password are required".to_string(),
            ));
        }

        let url = self.endpoint("register")?;
        let body = RegisterRequest {
            name: name.trim(),
            email: email.trim(),
            password: password.expose_secret(),
        };
        let text = self.send(self.inner.client.post(url).json(&body)).await?;

        if text.trim().is_empty() {
            return Ok(RegisterResponse { user: None });
        }
        serde_json::from_str(&text).map_err(|e| ApiError::Decode(format!("register response: {e}")))
    }
}

impl OrderGateway for ApiClient {
    fn submit_order(
        &self,
        token: &SessionToken,
        order: &OrderPayload,
    ) -> impl Future<Output = Result<OrderConfirmation, ApiError>> + Send {
        self.place_order(token, order)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn config(base_url: &str) -> ApiConfig {
        ApiConfig {
            base_url: base_url.to_string(),
            timeout: Duration::from_secs(5),
            catalog_cache_ttl: Duration::from_secs(60),
        }
    }

    #[test]
    fn test_endpoints_join_under_base_path() {
        let client = ApiClient::new(&config("https://store.example.com/api")).unwrap();
        assert_eq!(client.base_url().as_str(), "https://store.example.com/api/");
        assert_eq!(
            client.endpoint("sales/checkout").unwrap().as_str(),
            "https://store.example.com/api/sales/checkout"
        );
        assert_eq!(
            client.endpoint("products").unwrap().as_str(),
            "https://store.example.com/api/products"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            ApiClient::new(&config("not a url")),
            Err(ApiError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_register_requires_all_fields() {
        let client = ApiClient::new(&config("http://127.0.0.1:9/api/")).unwrap();
        let password = SecretString::from("hunter2".to_string());

        let result = client.register("", "ada@example.com", &password).await;
        assert!(matches!(result, Err(ApiError::InvalidInput(_))));

        let empty = SecretString::from(String::new());
        let result = client.register("Ada", "ada@example.com", &empty).await;
        assert!(matches!(result, Err(ApiError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_login_requires_credentials() {
        let client = ApiClient::new(&config("http://127.0.0.1:9/api/")).unwrap();
        let password = SecretString::from("hunter2".to_string());
        assert!(matches!(
            client.login("  ", &password).await,
            Err(ApiError::InvalidInput(_))
        ));
    }
}
