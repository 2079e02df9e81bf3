//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (pings both stores)
//!
//! # Catalog
//! GET  /api/products           - Product listing (JSON, newest first)
//! GET  /products/{id}          - Canonical product view with flash notices
//!
//! # Purchase (requires x-customer-id)
//! GET  /purchase/{id}          - Address check: form or redirect
//! POST /purchase/{id}          - Address submission
//!
//! # Files
//! GET  /files/*                - Product images (when STOREFRONT_FILES_DIR is set)
//! ```

pub mod api;
pub mod health;
pub mod products;
pub mod purchase;

use axum::{Router, middleware::from_fn, routing::get};
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tower_sessions::SessionStore;
use tracing::Span;

use shopfront_core::ProductId;

use crate::middleware::{create_session_layer, request_id_middleware};
use crate::state::AppState;

/// Canonical path of a catalog entry.
#[must_use]
pub fn product_path(id: ProductId) -> String {
    format!("/products/{id}")
}

/// Entry path of the purchase workflow for a target.
#[must_use]
pub fn purchase_path(id: ProductId) -> String {
    format!("/purchase/{id}")
}

/// Create the JSON API routes router.
pub fn api_routes() -> Router<AppState> {
    Router::new().route("/products", get(api::products::list))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/api", api_routes())
        .route("/products/{id}", get(products::show))
        .route(
            "/purchase/{id}",
            get(purchase::check).post(purchase::submit),
        )
}

/// Build the full application with its middleware stack.
///
/// Sentry layers are added by the binary on top of this.
pub fn app<S>(state: AppState, session_store: S) -> Router
where
    S: SessionStore + Clone,
{
    let session_layer = create_session_layer(session_store, state.config());

    let mut router = routes();
    if let Some(dir) = &state.config().files_dir {
        router = router.nest_service("/files", ServeDir::new(dir));
    }

    router
        .layer(session_layer)
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}
