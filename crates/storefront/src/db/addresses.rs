//! Customer address repository.
//!
//! The table keeps at most one row per customer: `customer_id` is the
//! primary key and every write goes through a single
//! `INSERT ... ON CONFLICT DO UPDATE` statement.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use shopfront_core::{CustomerId, ShippingAddress};

use crate::store::{AddressStore, CustomerAddress, StoreError};

/// Address store backed by `PostgreSQL`.
#[derive(Debug, Clone)]
pub struct PgAddressStore {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct AddressRow {
    customer_id: CustomerId,
    address: ShippingAddress,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<AddressRow> for CustomerAddress {
    fn from(row: AddressRow) -> Self {
        Self {
            customer_id: row.customer_id,
            address: row.address,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl PgAddressStore {
    /// Create a new address store.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AddressStore for PgAddressStore {
    async fn find_by_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Option<CustomerAddress>, StoreError> {
        let row = sqlx::query_as::<_, AddressRow>(
            r"
            SELECT customer_id, address, created_at, updated_at
            FROM storefront.customer_address
            WHERE customer_id = $1
            ",
        )
        .bind(customer_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(CustomerAddress::from))
    }

    async fn upsert(
        &self,
        customer_id: CustomerId,
        address: &ShippingAddress,
    ) -> Result<CustomerAddress, StoreError> {
        let row = sqlx::query_as::<_, AddressRow>(
            r"
            INSERT INTO storefront.customer_address (customer_id, address)
            VALUES ($1, $2)
            ON CONFLICT (customer_id)
            DO UPDATE SET address = EXCLUDED.address, updated_at = now()
            RETURNING customer_id, address, created_at, updated_at
            ",
        )
        .bind(customer_id)
        .bind(address)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!(customer_id = %customer_id, "Customer address upserted");
        Ok(row.into())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
