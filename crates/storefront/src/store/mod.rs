//! Narrow interfaces onto the external stores.
//!
//! The catalog and the customer address table are owned by collaborators;
//! the services in this crate only see them through these traits.
//!
//! - [`CatalogStore`] - read-only access to catalog entries
//! - [`AddressStore`] - lookup and atomic upsert of one address per customer
//! - [`ImageResolver`] - turns stored image references into absolute URLs
//!
//! `PostgreSQL` implementations live in [`crate::db`]; in-memory ones in
//! [`memory`].

pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use shopfront_core::{ContentKind, CustomerId, ProductId, ShippingAddress};

/// Errors returned by store implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached or the operation did not complete.
    ///
    /// Nothing was persisted when a write fails with this error.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        Self::Unavailable(err.to_string())
    }
}

/// Ordering applied to catalog queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CatalogOrder {
    /// Creation time descending. Ties keep the store's natural order.
    #[default]
    NewestFirst,
}

/// A catalog query: every entry of one kind, in a given order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogQuery {
    pub kind: ContentKind,
    pub order: CatalogOrder,
}

impl CatalogQuery {
    /// All entries of `kind`, newest first.
    #[must_use]
    pub const fn newest_first(kind: ContentKind) -> Self {
        Self {
            kind,
            order: CatalogOrder::NewestFirst,
        }
    }
}

/// A raw catalog entry as stored.
///
/// Text fields are optional because the catalog does not enforce them;
/// the projection into [`shopfront_core::Product`] decides the defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub id: ProductId,
    pub kind: ContentKind,
    pub title: Option<String>,
    pub body: Option<String>,
    pub price: Option<String>,
    pub image_ref: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A stored customer address row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerAddress {
    pub customer_id: CustomerId,
    pub address: ShippingAddress,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Read access to the catalog.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Fetch every entry matching the query, ordered as the query requests.
    async fn find_by_kind(&self, query: &CatalogQuery) -> Result<Vec<CatalogEntry>, StoreError>;

    /// Fetch a single entry, only if it is of `kind`.
    async fn find_entry(
        &self,
        id: ProductId,
        kind: &ContentKind,
    ) -> Result<Option<CatalogEntry>, StoreError>;

    /// Check that the store is reachable.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Storage for the one address each customer may have.
#[async_trait]
pub trait AddressStore: Send + Sync {
    /// Look up the address row for a customer.
    async fn find_by_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Option<CustomerAddress>, StoreError>;

    /// Insert the customer's address, or overwrite the existing row.
    ///
    /// Must be a single atomic operation keyed on `customer_id` so that
    /// concurrent calls for the same customer leave exactly one row holding
    /// one of the submitted values.
    async fn upsert(
        &self,
        customer_id: CustomerId,
        address: &ShippingAddress,
    ) -> Result<CustomerAddress, StoreError>;

    /// Check that the store is reachable.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Resolves stored image references to absolute URLs.
pub trait ImageResolver: Send + Sync {
    /// Returns `None` when the reference cannot be turned into a URL.
    fn resolve_absolute_url(&self, image_ref: &str) -> Option<String>;
}
