//! Canonical product view.
//!
//! This is where the purchase workflow redirects to, so it also drains the
//! session's flash notices.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, State};
use tower_sessions::Session;
use tracing::instrument;

use shopfront_core::{Product, ProductId};

use crate::error::{AppError, Result};
use crate::models::session;
use crate::routes::purchase_path;
use crate::state::AppState;

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub product: Product,
    pub purchase_path: String,
    pub messages: Vec<String>,
}

/// Display a product with any pending notices.
#[instrument(skip(state, session))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    Path(raw_id): Path<String>,
) -> Result<ProductShowTemplate> {
    let not_found = || AppError::NotFound("product".to_string());

    let id = raw_id.parse::<ProductId>().map_err(|_| not_found())?;
    let product = state
        .catalog_service()
        .get_product(id)
        .await?
        .ok_or_else(not_found)?;
    let messages = session::take_flash(&session).await?;

    Ok(ProductShowTemplate {
        product,
        purchase_path: purchase_path(id),
        messages,
    })
}
