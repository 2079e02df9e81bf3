//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::StorefrontConfig;
use crate::db::{PgAddressStore, PgCatalogStore};
use crate::images::PublicFileUrlResolver;
use crate::services::{AddressCapture, CatalogService};
use crate::store::{AddressStore, CatalogStore, ImageResolver};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and hands out the stores and
/// the per-request services built on them.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    catalog: Arc<dyn CatalogStore>,
    addresses: Arc<dyn AddressStore>,
    images: Arc<dyn ImageResolver>,
}

impl AppState {
    /// Create application state over arbitrary store implementations.
    ///
    /// Image references resolve under `config.files_base_url`.
    #[must_use]
    pub fn new(
        config: StorefrontConfig,
        catalog: Arc<dyn CatalogStore>,
        addresses: Arc<dyn AddressStore>,
    ) -> Self {
        let images = Arc::new(PublicFileUrlResolver::new(config.files_base_url.clone()));

        Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog,
                addresses,
                images,
            }),
        }
    }

    /// Create application state backed by `PostgreSQL`.
    #[must_use]
    pub fn with_pool(config: StorefrontConfig, pool: &PgPool) -> Self {
        Self::new(
            config,
            Arc::new(PgCatalogStore::new(pool.clone())),
            Arc::new(PgAddressStore::new(pool.clone())),
        )
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get the catalog store.
    #[must_use]
    pub fn catalog(&self) -> &dyn CatalogStore {
        self.inner.catalog.as_ref()
    }

    /// Get the address store.
    #[must_use]
    pub fn addresses(&self) -> &dyn AddressStore {
        self.inner.addresses.as_ref()
    }

    /// Catalog listing service for this request.
    #[must_use]
    pub fn catalog_service(&self) -> CatalogService<'_> {
        CatalogService::new(
            self.catalog(),
            self.inner.images.as_ref(),
            &self.inner.config.product_kind,
        )
    }

    /// Address capture workflow for this request.
    #[must_use]
    pub fn address_capture(&self) -> AddressCapture<'_> {
        AddressCapture::new(
            self.catalog(),
            self.addresses(),
            &self.inner.config.product_kind,
        )
    }
}
