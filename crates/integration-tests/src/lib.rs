//! Integration tests for Shopfront.
//!
//! # Running Tests
//!
//! ```bash
//! # In-process tests (no external services)
//! cargo test -p shopfront-integration-tests
//!
//! # Database and live-server tests
//! docker compose up -d postgres
//! cargo test -p shopfront-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `catalog_api` - Product listing over HTTP
//! - `purchase_flow` - Address capture workflow over HTTP
//! - `postgres` - `PostgreSQL` stores and the live server (ignored by default)
//!
//! The in-process tests drive the full router with `tower::ServiceExt::oneshot`
//! over in-memory stores, carrying the session cookie between requests the
//! way a browser would.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode, header};
use chrono::{DateTime, TimeZone, Utc};
use tower::ServiceExt;
use tower_sessions::MemoryStore;

use shopfront_core::CustomerId;
use shopfront_storefront::config::StorefrontConfig;
use shopfront_storefront::middleware::CUSTOMER_ID_HEADER;
use shopfront_storefront::routes;
use shopfront_storefront::state::AppState;
use shopfront_storefront::store::memory::{MemoryAddressStore, MemoryCatalogStore};

/// Public base URL used by the test configuration.
pub const BASE_URL: &str = "http://shop.test/";

/// Configuration for in-process tests.
///
/// # Panics
///
/// Panics if the fixed test configuration is rejected.
#[must_use]
#[allow(clippy::expect_used)]
pub fn test_config() -> StorefrontConfig {
    StorefrontConfig::from_lookup(|key| match key {
        "STOREFRONT_DATABASE_URL" => Some("postgres://unused@localhost/unused".to_string()),
        "STOREFRONT_BASE_URL" => Some(BASE_URL.to_string()),
        _ => None,
    })
    .expect("test configuration should be valid")
}

/// Timestamp `secs` seconds after a fixed origin.
///
/// # Panics
///
/// Panics if the timestamp is out of range.
#[must_use]
#[allow(clippy::expect_used)]
pub fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + secs, 0)
        .single()
        .expect("timestamp in range")
}

/// A fully wired storefront over in-memory stores.
pub struct TestApp {
    pub router: Router,
    pub catalog: Arc<MemoryCatalogStore>,
    pub addresses: Arc<MemoryAddressStore>,
}

impl TestApp {
    #[must_use]
    pub fn new() -> Self {
        let catalog = Arc::new(MemoryCatalogStore::new());
        let addresses = Arc::new(MemoryAddressStore::new());
        let state = AppState::new(test_config(), catalog.clone(), addresses.clone());
        let router = routes::app(state, MemoryStore::default());

        Self {
            router,
            catalog,
            addresses,
        }
    }

    /// A browser-like client acting as `customer`.
    #[must_use]
    pub fn client(&self, customer: Option<CustomerId>) -> TestClient {
        TestClient {
            router: self.router.clone(),
            customer,
            cookie: None,
        }
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

/// A response with its body read.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    /// The `Location` header of a redirect.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok())
    }

    /// Parse the body as JSON.
    ///
    /// # Panics
    ///
    /// Panics if the body is not valid JSON.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).expect("response body should be JSON")
    }
}

/// Sends requests through the router, keeping the session cookie.
pub struct TestClient {
    router: Router,
    customer: Option<CustomerId>,
    cookie: Option<String>,
}

impl TestClient {
    /// Send a `GET` request.
    pub async fn get(&mut self, uri: &str) -> TestResponse {
        self.send(Request::get(uri), Body::empty()).await
    }

    /// Send a urlencoded form `POST`.
    pub async fn post_form(&mut self, uri: &str, form: &str) -> TestResponse {
        let builder = Request::post(uri).header(
            header::CONTENT_TYPE,
            "application/x-www-form-urlencoded",
        );
        self.send(builder, Body::from(form.to_string())).await
    }

    #[allow(clippy::expect_used)]
    async fn send(&mut self, mut builder: axum::http::request::Builder, body: Body) -> TestResponse {
        if let Some(customer) = self.customer {
            builder = builder.header(CUSTOMER_ID_HEADER, customer.to_string());
        }
        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }

        let request = builder.body(body).expect("request should build");
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        if let Some(cookie) = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(';').next())
        {
            self.cookie = Some(cookie.to_string());
        }

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should be readable");

        TestResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }
}
