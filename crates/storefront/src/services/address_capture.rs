//! Address capture workflow.
//!
//! A customer buying a product must have a shipping address on file. The
//! interaction has two steps:
//!
//! ```text
//! check ──(row exists)──────────────────────────────▶ done: "already submitted"
//!   │
//!   └─(no row)──▶ collect ──(valid address)──upsert──▶ done: "purchased"
//!                   ▲  │
//!                   └──┘ (blank / too long: re-render, nothing written)
//! ```
//!
//! The purchase target chosen at `check` travels inside [`PendingPurchase`]
//! and is the only target `submit` ever redirects to.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

use shopfront_core::{AddressError, ContentKind, CustomerId, ProductId, ShippingAddress};

use crate::store::{AddressStore, CatalogStore, StoreError};

/// Notice shown when the customer already has an address on file.
pub const ALREADY_SUBMITTED_NOTICE: &str = "Order placed! Address already exists...";

/// Notice shown after a successful submission.
pub const PURCHASED_NOTICE: &str = "Product purchased successfully!";

/// Errors that end the interaction.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// The purchase target is missing or is not a product.
    #[error("purchase target not found")]
    TargetNotFound,

    /// A submission arrived without a matching pending interaction.
    #[error("no pending purchase for this customer and target")]
    InteractionExpired,

    /// A store could not be reached.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Interaction state carried from `check` to `submit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingPurchase {
    pub target: ProductId,
    pub customer: CustomerId,
}

/// A finished interaction: show `notice`, then go to `redirect_to`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub notice: &'static str,
    pub redirect_to: ProductId,
}

/// Result of entering the workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// An address is already on file; no form is shown.
    AlreadySubmitted(Completion),
    /// Show the address form and remember the pending purchase.
    Collect(PendingPurchase),
}

/// Result of a form submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The address was stored.
    Purchased(Completion),
    /// The input was rejected; the form is shown again.
    Rejected {
        pending: PendingPurchase,
        error: AddressError,
    },
}

/// The address capture workflow over its two stores.
pub struct AddressCapture<'a> {
    catalog: &'a dyn CatalogStore,
    addresses: &'a dyn AddressStore,
    product_kind: &'a ContentKind,
}

impl<'a> AddressCapture<'a> {
    #[must_use]
    pub fn new(
        catalog: &'a dyn CatalogStore,
        addresses: &'a dyn AddressStore,
        product_kind: &'a ContentKind,
    ) -> Self {
        Self {
            catalog,
            addresses,
            product_kind,
        }
    }

    /// Enter the workflow for `customer` buying `target`.
    ///
    /// # Errors
    ///
    /// - `CaptureError::TargetNotFound` if `target` is `None` or not a
    ///   product; the address store is not touched in that case.
    /// - `CaptureError::Store` if either store is unavailable.
    #[instrument(skip(self), fields(customer_id = %customer))]
    pub async fn check(
        &self,
        customer: CustomerId,
        target: Option<ProductId>,
    ) -> Result<CheckOutcome, CaptureError> {
        let target = target.ok_or(CaptureError::TargetNotFound)?;

        if self
            .catalog
            .find_entry(target, self.product_kind)
            .await?
            .is_none()
        {
            tracing::info!(target_id = %target, "Purchase target not found");
            return Err(CaptureError::TargetNotFound);
        }

        if self.addresses.find_by_customer(customer).await?.is_some() {
            tracing::info!(target_id = %target, "Address already on file, skipping form");
            return Ok(CheckOutcome::AlreadySubmitted(Completion {
                notice: ALREADY_SUBMITTED_NOTICE,
                redirect_to: target,
            }));
        }

        tracing::info!(target_id = %target, "Collecting shipping address");
        Ok(CheckOutcome::Collect(PendingPurchase { target, customer }))
    }

    /// Handle a submission of the address form.
    ///
    /// `pending` is the state recorded by [`Self::check`]; `customer` is the
    /// identity of the submitting request and must match it.
    ///
    /// # Errors
    ///
    /// - `CaptureError::InteractionExpired` if `customer` differs from the
    ///   one recorded at check time.
    /// - `CaptureError::Store` if the upsert fails; nothing is written.
    #[instrument(skip(self, raw_address), fields(customer_id = %customer, target_id = %pending.target))]
    pub async fn submit(
        &self,
        pending: PendingPurchase,
        customer: CustomerId,
        raw_address: Option<&str>,
    ) -> Result<SubmitOutcome, CaptureError> {
        if pending.customer != customer {
            tracing::warn!(
                pending_customer_id = %pending.customer,
                "Submission from a different customer than the pending purchase"
            );
            return Err(CaptureError::InteractionExpired);
        }

        let address = match ShippingAddress::parse(raw_address.unwrap_or_default()) {
            Ok(address) => address,
            Err(error) => {
                tracing::info!(%error, "Address submission rejected");
                return Ok(SubmitOutcome::Rejected { pending, error });
            }
        };

        self.addresses.upsert(customer, &address).await?;

        tracing::info!("Shipping address stored, purchase complete");
        Ok(SubmitOutcome::Purchased(Completion {
            notice: PURCHASED_NOTICE,
            redirect_to: pending.target,
        }))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::store::memory::{MemoryAddressStore, MemoryCatalogStore, NewEntry};

    struct Fixture {
        catalog: MemoryCatalogStore,
        addresses: MemoryAddressStore,
        kind: ContentKind,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                catalog: MemoryCatalogStore::new(),
                addresses: MemoryAddressStore::new(),
                kind: ContentKind::default(),
            }
        }

        fn workflow(&self) -> AddressCapture<'_> {
            AddressCapture::new(&self.catalog, &self.addresses, &self.kind)
        }

        async fn stored(&self, customer: CustomerId) -> Option<String> {
            self.addresses
                .find_by_customer(customer)
                .await
                .unwrap()
                .map(|row| row.address.into_inner())
        }
    }

    const ALICE: CustomerId = CustomerId::new(1);
    const BOB: CustomerId = CustomerId::new(2);

    async fn pending_for(fx: &Fixture, customer: CustomerId) -> PendingPurchase {
        let target = fx.catalog.insert(NewEntry::product("Widget")).await;
        match fx.workflow().check(customer, Some(target)).await.unwrap() {
            CheckOutcome::Collect(pending) => pending,
            other => panic!("expected form, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_check_without_address_collects() {
        let fx = Fixture::new();
        let target = fx.catalog.insert(NewEntry::product("Widget")).await;

        let outcome = fx.workflow().check(ALICE, Some(target)).await.unwrap();

        assert_eq!(
            outcome,
            CheckOutcome::Collect(PendingPurchase {
                target,
                customer: ALICE
            })
        );
    }

    #[tokio::test]
    async fn test_check_with_address_short_circuits() {
        let fx = Fixture::new();
        let target = fx.catalog.insert(NewEntry::product("Widget")).await;
        fx.addresses
            .upsert(ALICE, &ShippingAddress::parse("1 Main St").unwrap())
            .await
            .unwrap();

        for _ in 0..3 {
            let outcome = fx.workflow().check(ALICE, Some(target)).await.unwrap();
            assert_eq!(
                outcome,
                CheckOutcome::AlreadySubmitted(Completion {
                    notice: ALREADY_SUBMITTED_NOTICE,
                    redirect_to: target,
                })
            );
        }
    }

    #[tokio::test]
    async fn test_check_missing_target() {
        let fx = Fixture::new();
        fx.addresses.set_available(false);

        // Fails before the (offline) address store is consulted.
        let result = fx.workflow().check(ALICE, None).await;
        assert!(matches!(result, Err(CaptureError::TargetNotFound)));
    }

    #[tokio::test]
    async fn test_check_unknown_or_non_product_target() {
        let fx = Fixture::new();
        let page = fx.catalog.insert(NewEntry::product("About").kind("page")).await;

        let result = fx.workflow().check(ALICE, Some(page)).await;
        assert!(matches!(result, Err(CaptureError::TargetNotFound)));

        let result = fx.workflow().check(ALICE, Some(ProductId::new(999))).await;
        assert!(matches!(result, Err(CaptureError::TargetNotFound)));
    }

    #[tokio::test]
    async fn test_check_store_unavailable() {
        let fx = Fixture::new();
        let target = fx.catalog.insert(NewEntry::product("Widget")).await;
        fx.addresses.set_available(false);

        let result = fx.workflow().check(ALICE, Some(target)).await;
        assert!(matches!(result, Err(CaptureError::Store(_))));
    }

    #[tokio::test]
    async fn test_submit_stores_and_redirects_to_pending_target() {
        let fx = Fixture::new();
        let pending = pending_for(&fx, ALICE).await;

        let outcome = fx
            .workflow()
            .submit(pending, ALICE, Some("1 Main St"))
            .await
            .unwrap();

        assert_eq!(
            outcome,
            SubmitOutcome::Purchased(Completion {
                notice: PURCHASED_NOTICE,
                redirect_to: pending.target,
            })
        );
        assert_eq!(fx.stored(ALICE).await.as_deref(), Some("1 Main St"));
    }

    #[tokio::test]
    async fn test_repeated_submissions_keep_one_row_last_wins() {
        let fx = Fixture::new();
        let pending = pending_for(&fx, ALICE).await;

        for address in ["1 Main St", "1 Main St", "2 Side St"] {
            fx.workflow()
                .submit(pending, ALICE, Some(address))
                .await
                .unwrap();
        }

        assert_eq!(fx.addresses.len().await, 1);
        assert_eq!(fx.stored(ALICE).await.as_deref(), Some("2 Side St"));
    }

    #[tokio::test]
    async fn test_concurrent_submissions() {
        let fx = Arc::new(Fixture::new());
        let pending = pending_for(&fx, ALICE).await;

        let a = {
            let fx = Arc::clone(&fx);
            tokio::spawn(async move {
                fx.workflow().submit(pending, ALICE, Some("A Street")).await
            })
        };
        let b = {
            let fx = Arc::clone(&fx);
            tokio::spawn(async move {
                fx.workflow().submit(pending, ALICE, Some("B Street")).await
            })
        };

        assert!(matches!(a.await.unwrap(), Ok(SubmitOutcome::Purchased(_))));
        assert!(matches!(b.await.unwrap(), Ok(SubmitOutcome::Purchased(_))));
        assert_eq!(fx.addresses.len().await, 1);
        let stored = fx.stored(ALICE).await.unwrap();
        assert!(stored == "A Street" || stored == "B Street");
    }

    #[tokio::test]
    async fn test_empty_submission_rejected_without_write() {
        let fx = Fixture::new();
        let pending = pending_for(&fx, ALICE).await;

        for raw in [None, Some(""), Some("   ")] {
            let outcome = fx.workflow().submit(pending, ALICE, raw).await.unwrap();
            assert_eq!(
                outcome,
                SubmitOutcome::Rejected {
                    pending,
                    error: AddressError::Empty
                }
            );
        }
        assert!(fx.addresses.is_empty().await);
    }

    #[tokio::test]
    async fn test_empty_resubmission_keeps_previous_address() {
        let fx = Fixture::new();
        let pending = pending_for(&fx, ALICE).await;
        fx.workflow()
            .submit(pending, ALICE, Some("1 Main St"))
            .await
            .unwrap();

        let outcome = fx.workflow().submit(pending, ALICE, Some("")).await.unwrap();

        assert!(matches!(outcome, SubmitOutcome::Rejected { .. }));
        assert_eq!(fx.stored(ALICE).await.as_deref(), Some("1 Main St"));
    }

    #[tokio::test]
    async fn test_too_long_rejected() {
        let fx = Fixture::new();
        let pending = pending_for(&fx, ALICE).await;
        let long = "x".repeat(ShippingAddress::MAX_LENGTH + 1);

        let outcome = fx
            .workflow()
            .submit(pending, ALICE, Some(&long))
            .await
            .unwrap();

        assert!(matches!(
            outcome,
            SubmitOutcome::Rejected {
                error: AddressError::TooLong { .. },
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_submit_from_other_customer_expires() {
        let fx = Fixture::new();
        let pending = pending_for(&fx, ALICE).await;

        let result = fx.workflow().submit(pending, BOB, Some("1 Main St")).await;

        assert!(matches!(result, Err(CaptureError::InteractionExpired)));
        assert!(fx.addresses.is_empty().await);
    }

    #[tokio::test]
    async fn test_submit_store_unavailable_writes_nothing() {
        let fx = Fixture::new();
        let pending = pending_for(&fx, ALICE).await;
        fx.addresses.set_available(false);

        let result = fx.workflow().submit(pending, ALICE, Some("1 Main St")).await;
        assert!(matches!(result, Err(CaptureError::Store(_))));

        fx.addresses.set_available(true);
        assert!(fx.stored(ALICE).await.is_none());
    }
}
