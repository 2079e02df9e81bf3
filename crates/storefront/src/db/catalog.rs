//! Catalog reads against `catalog.entry`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use shopfront_core::{ContentKind, ProductId};

use crate::store::{CatalogEntry, CatalogOrder, CatalogQuery, CatalogStore, StoreError};

/// Catalog store backed by `PostgreSQL`.
#[derive(Debug, Clone)]
pub struct PgCatalogStore {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct EntryRow {
    id: ProductId,
    kind: String,
    title: Option<String>,
    body: Option<String>,
    price: Option<String>,
    image_ref: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<EntryRow> for CatalogEntry {
    fn from(row: EntryRow) -> Self {
        Self {
            id: row.id,
            kind: ContentKind::new(row.kind),
            title: row.title,
            body: row.body,
            price: row.price,
            image_ref: row.image_ref,
            created_at: row.created_at,
        }
    }
}

impl PgCatalogStore {
    /// Create a new catalog store.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// `ORDER BY` clause for a catalog ordering.
///
/// `id` is deliberately not used as a secondary key: ties are left to the
/// table's natural order.
const fn order_clause(order: CatalogOrder) -> &'static str {
    match order {
        CatalogOrder::NewestFirst => "ORDER BY created_at DESC",
    }
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
    async fn find_by_kind(&self, query: &CatalogQuery) -> Result<Vec<CatalogEntry>, StoreError> {
        let sql = format!(
            r"
            SELECT id, kind, title, body, price, image_ref, created_at
            FROM catalog.entry
            WHERE kind = $1
            {}
            ",
            order_clause(query.order)
        );

        let rows = sqlx::query_as::<_, EntryRow>(&sql)
            .bind(query.kind.as_str())
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(CatalogEntry::from).collect())
    }

    async fn find_entry(
        &self,
        id: ProductId,
        kind: &ContentKind,
    ) -> Result<Option<CatalogEntry>, StoreError> {
        let row = sqlx::query_as::<_, EntryRow>(
            r"
            SELECT id, kind, title, body, price, image_ref, created_at
            FROM catalog.entry
            WHERE id = $1 AND kind = $2
            ",
        )
        .bind(id)
        .bind(kind.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(CatalogEntry::from))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
