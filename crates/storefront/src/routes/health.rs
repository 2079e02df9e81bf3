//! Health check endpoints.

use axum::{extract::State, http::StatusCode};

use crate::state::AppState;

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
pub async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Verifies both stores are reachable before returning OK.
/// Returns 503 Service Unavailable otherwise.
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    let (catalog, addresses) = tokio::join!(state.catalog().ping(), state.addresses().ping());

    match (catalog, addresses) {
        (Ok(()), Ok(())) => StatusCode::OK,
        (catalog, addresses) => {
            tracing::warn!(
                catalog_ok = catalog.is_ok(),
                addresses_ok = addresses.is_ok(),
                "Readiness check failed"
            );
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
