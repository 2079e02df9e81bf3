//! Catalog listing service.
//!
//! Reads product-kind entries from the catalog and projects them into the
//! public [`Product`] shape. Malformed entries are never dropped: missing
//! text fields become empty strings and unusable image references become
//! `None`.

use tracing::instrument;

use shopfront_core::{ContentKind, Product, ProductId};

use crate::store::{CatalogEntry, CatalogQuery, CatalogStore, ImageResolver, StoreError};

/// Lists and projects catalog products.
pub struct CatalogService<'a> {
    store: &'a dyn CatalogStore,
    images: &'a dyn ImageResolver,
    kind: &'a ContentKind,
}

impl<'a> CatalogService<'a> {
    #[must_use]
    pub fn new(
        store: &'a dyn CatalogStore,
        images: &'a dyn ImageResolver,
        kind: &'a ContentKind,
    ) -> Self {
        Self {
            store,
            images,
            kind,
        }
    }

    /// List every product, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unavailable` if the catalog cannot be read. No
    /// partial list is returned in that case.
    #[instrument(skip(self), fields(kind = %self.kind))]
    pub async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        let entries = self
            .store
            .find_by_kind(&CatalogQuery::newest_first(self.kind.clone()))
            .await?;

        tracing::debug!(count = entries.len(), "Catalog entries loaded");

        Ok(entries.iter().map(|entry| self.project(entry)).collect())
    }

    /// Load a single product by id.
    ///
    /// Returns `Ok(None)` if no product-kind entry has this id.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unavailable` if the catalog cannot be read.
    pub async fn get_product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let entry = self.store.find_entry(id, self.kind).await?;
        Ok(entry.map(|entry| self.project(&entry)))
    }

    /// Project a raw entry into the public representation.
    #[must_use]
    pub fn project(&self, entry: &CatalogEntry) -> Product {
        if entry.title.is_none() {
            tracing::debug!(entry_id = %entry.id, "Catalog entry has no title");
        }

        let image_url = entry.image_ref.as_deref().and_then(|image_ref| {
            let url = self.images.resolve_absolute_url(image_ref);
            if url.is_none() {
                tracing::warn!(entry_id = %entry.id, "Catalog entry image could not be resolved");
            }
            url
        });

        Product {
            title: entry.title.clone().unwrap_or_default(),
            description: entry.body.clone().unwrap_or_default(),
            price: entry.price.clone().unwrap_or_default(),
            image_url,
        }
    }
}
