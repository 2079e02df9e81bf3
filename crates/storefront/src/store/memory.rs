//! In-memory store implementations.
//!
//! Used by tests and local demos. Both stores can be switched to an
//! unavailable state to exercise outage handling.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use shopfront_core::{ContentKind, CustomerId, ProductId, ShippingAddress};

use super::{
    AddressStore, CatalogEntry, CatalogOrder, CatalogQuery, CatalogStore, CustomerAddress,
    StoreError,
};

/// Toggle shared by both in-memory stores.
#[derive(Debug)]
struct Availability(AtomicBool);

impl Availability {
    const fn new() -> Self {
        Self(AtomicBool::new(true))
    }

    fn set(&self, available: bool) {
        self.0.store(available, Ordering::SeqCst);
    }

    fn check(&self, store: &str) -> Result<(), StoreError> {
        if self.0.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable(format!("{store} is offline")))
        }
    }
}

/// Fields for a new in-memory catalog entry.
#[derive(Debug, Clone, Default)]
pub struct NewEntry {
    pub kind: Option<ContentKind>,
    pub title: Option<String>,
    pub body: Option<String>,
    pub price: Option<String>,
    pub image_ref: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl NewEntry {
    /// A product-kind entry with the given title.
    #[must_use]
    pub fn product(title: &str) -> Self {
        Self {
            title: Some(title.to_string()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn body(mut self, body: &str) -> Self {
        self.body = Some(body.to_string());
        self
    }

    #[must_use]
    pub fn price(mut self, price: &str) -> Self {
        self.price = Some(price.to_string());
        self
    }

    #[must_use]
    pub fn image(mut self, image_ref: &str) -> Self {
        self.image_ref = Some(image_ref.to_string());
        self
    }

    #[must_use]
    pub fn kind(mut self, kind: &str) -> Self {
        self.kind = Some(ContentKind::new(kind));
        self
    }

    #[must_use]
    pub const fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }
}

/// Catalog held in a `Vec` in insertion order.
#[derive(Debug)]
pub struct MemoryCatalogStore {
    entries: RwLock<Vec<CatalogEntry>>,
    next_id: AtomicI64,
    availability: Availability,
}

impl Default for MemoryCatalogStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryCatalogStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            next_id: AtomicI64::new(1),
            availability: Availability::new(),
        }
    }

    /// Add an entry and return its id. Kind defaults to `products`,
    /// creation time to now.
    pub async fn insert(&self, entry: NewEntry) -> ProductId {
        let id = ProductId::new(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.entries.write().await.push(CatalogEntry {
            id,
            kind: entry.kind.unwrap_or_default(),
            title: entry.title,
            body: entry.body,
            price: entry.price,
            image_ref: entry.image_ref,
            created_at: entry.created_at.unwrap_or_else(Utc::now),
        });
        id
    }

    /// Simulate the store going offline or coming back.
    pub fn set_available(&self, available: bool) {
        self.availability.set(available);
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalogStore {
    async fn find_by_kind(&self, query: &CatalogQuery) -> Result<Vec<CatalogEntry>, StoreError> {
        self.availability.check("catalog")?;

        let mut entries: Vec<CatalogEntry> = self
            .entries
            .read()
            .await
            .iter()
            .filter(|entry| entry.kind == query.kind)
            .cloned()
            .collect();

        match query.order {
            // sort_by is stable, so ties keep insertion order
            CatalogOrder::NewestFirst => entries.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        }

        Ok(entries)
    }

    async fn find_entry(
        &self,
        id: ProductId,
        kind: &ContentKind,
    ) -> Result<Option<CatalogEntry>, StoreError> {
        self.availability.check("catalog")?;

        Ok(self
            .entries
            .read()
            .await
            .iter()
            .find(|entry| entry.id == id && &entry.kind == kind)
            .cloned())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.availability.check("catalog")
    }
}

/// Address table keyed by customer id.
#[derive(Debug)]
pub struct MemoryAddressStore {
    rows: RwLock<HashMap<CustomerId, CustomerAddress>>,
    availability: Availability,
}

impl Default for MemoryAddressStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryAddressStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(HashMap::new()),
            availability: Availability::new(),
        }
    }

    /// Number of stored rows.
    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    /// Whether no rows are stored.
    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }

    /// Simulate the store going offline or coming back.
    pub fn set_available(&self, available: bool) {
        self.availability.set(available);
    }
}

#[async_trait]
impl AddressStore for MemoryAddressStore {
    async fn find_by_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Option<CustomerAddress>, StoreError> {
        self.availability.check("address store")?;
        Ok(self.rows.read().await.get(&customer_id).cloned())
    }

    async fn upsert(
        &self,
        customer_id: CustomerId,
        address: &ShippingAddress,
    ) -> Result<CustomerAddress, StoreError> {
        self.availability.check("address store")?;

        // The write lock makes check-and-write one step.
        let mut rows = self.rows.write().await;
        let now = Utc::now();
        let row = rows
            .entry(customer_id)
            .and_modify(|row| {
                row.address = address.clone();
                row.updated_at = now;
            })
            .or_insert_with(|| CustomerAddress {
                customer_id,
                address: address.clone(),
                created_at: now,
                updated_at: now,
            });

        Ok(row.clone())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.availability.check("address store")
    }
}
