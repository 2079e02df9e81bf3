//! Product listing API.

use axum::{Json, extract::State};
use tracing::instrument;

use shopfront_core::Product;

use crate::error::Result;
use crate::state::AppState;

/// List every product, newest first.
///
/// An empty catalog yields `[]`; an unreachable catalog yields `503` and no
/// partial list.
#[instrument(skip(state))]
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    let products = state.catalog_service().list_products().await?;
    Ok(Json(products))
}
