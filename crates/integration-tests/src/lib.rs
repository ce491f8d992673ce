//! Integration tests for MyStore.
//!
//! The cart core is exercised over real HTTP against [`StubBackend`], an
//! in-process `axum` server that answers from canned responses and records
//! every request it receives.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p mystore-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `checkout_flow` - Order submission, auth and failure handling
//! - `catalog` - Product list decoding and caching
//! - `account` - Login, registration and session storage

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use mystore_cart::{ApiConfig, CartConfig};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// A request as the stub backend saw it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    /// Raw `Authorization` header, if any.
    pub authorization: Option<String>,
    /// Body parsed as JSON (`Null` when empty or not JSON).
    pub body: serde_json::Value,
}

#[derive(Clone)]
struct Canned {
    status: StatusCode,
    body: String,
}

#[derive(Default)]
struct StubState {
    routes: HashMap<(Method, String), Canned>,
    recorded: Mutex<Vec<RecordedRequest>>,
}

/// Builder for a [`StubBackend`].
#[derive(Default)]
pub struct StubBackendBuilder {
    routes: HashMap<(Method, String), Canned>,
}

impl StubBackendBuilder {
    /// Answer `method path` with `status` and a JSON `body`.
    #[must_use]
    pub fn route(mut self, method: Method, path: &str, status: u16, body: &str) -> Self {
        self.routes.insert(
            (method, path.to_string()),
            Canned {
                status: StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                body: body.to_string(),
            },
        );
        self
    }

    /// Bind to an ephemeral local port and start serving.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound.
    pub async fn start(self) -> std::io::Result<StubBackend> {
        let state = Arc::new(StubState {
            routes: self.routes,
            recorded: Mutex::new(Vec::new()),
        });

        let app = Router::new().fallback(handle).with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(StubBackend {
            addr,
            state,
            server,
        })
    }
}

/// In-process stand-in for the store backend.
pub struct StubBackend {
    addr: SocketAddr,
    state: Arc<StubState>,
    server: JoinHandle<()>,
}

impl StubBackend {
    /// Start building a stub backend.
    #[must_use]
    pub fn builder() -> StubBackendBuilder {
        StubBackendBuilder::default()
    }

    /// Base URL of the stub's API, ending in `/api/`.
    #[must_use]
    pub fn api_base_url(&self) -> String {
        format!("http://{}/api/", self.addr)
    }

    /// API settings pointing at this stub.
    #[must_use]
    pub fn api_config(&self) -> ApiConfig {
        ApiConfig {
            base_url: self.api_base_url(),
            timeout: Duration::from_secs(5),
            catalog_cache_ttl: Duration::from_secs(60),
        }
    }

    /// Default cart configuration pointing at this stub.
    #[must_use]
    pub fn cart_config(&self) -> CartConfig {
        CartConfig {
            api: self.api_config(),
            ..CartConfig::default()
        }
    }

    /// Every request received so far, oldest first.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state
            .recorded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Requests received for `path`.
    #[must_use]
    pub fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.path == path)
            .collect()
    }
}

impl Drop for StubBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

async fn handle(
    State(state): State<Arc<StubState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> Response {
    let path = uri.path().to_string();
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    state
        .recorded
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(RecordedRequest {
            method: method.clone(),
            path: path.clone(),
            authorization,
            body: serde_json::from_str(&body).unwrap_or(serde_json::Value::Null),
        });

    match state.routes.get(&(method, path)) {
        Some(canned) => (
            canned.status,
            [(header::CONTENT_TYPE, "application/json")],
            canned.body.clone(),
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, r#"{"error":"Not found"}"#).into_response(),
    }
}

/// An address nothing is listening on.
///
/// # Errors
///
/// Returns an error if a throwaway listener cannot be bound.
pub async fn closed_port_base_url() -> std::io::Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(format!("http://{addr}/api/"))
}
