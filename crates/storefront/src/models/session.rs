//! Session-related types and helpers.
//!
//! The session carries the state that must survive between the steps of
//! one interaction: the pending purchase and queued flash notices.

use tower_sessions::Session;

use crate::services::PendingPurchase;

/// Session keys.
pub mod keys {
    /// Key for the purchase awaiting an address submission.
    pub const PENDING_PURCHASE: &str = "pending_purchase";

    /// Key for status notices shown on the next page render.
    pub const FLASH: &str = "flash";
}

/// Remember the purchase being collected.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_pending_purchase(
    session: &Session,
    pending: &PendingPurchase,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(keys::PENDING_PURCHASE, pending).await
}

/// The purchase being collected, if any.
///
/// # Errors
///
/// Returns an error if the session cannot be read.
pub async fn pending_purchase(
    session: &Session,
) -> Result<Option<PendingPurchase>, tower_sessions::session::Error> {
    session.get(keys::PENDING_PURCHASE).await
}

/// Forget the pending purchase once the interaction is complete.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_pending_purchase(
    session: &Session,
) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<PendingPurchase>(keys::PENDING_PURCHASE)
        .await?;
    Ok(())
}

/// Queue a status notice for the next page render.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn push_flash(
    session: &Session,
    message: &str,
) -> Result<(), tower_sessions::session::Error> {
    let mut messages: Vec<String> = session.get(keys::FLASH).await?.unwrap_or_default();
    messages.push(message.to_owned());
    session.insert(keys::FLASH, messages).await
}

/// Drain queued notices.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn take_flash(session: &Session) -> Result<Vec<String>, tower_sessions::session::Error> {
    Ok(session
        .remove::<Vec<String>>(keys::FLASH)
        .await?
        .unwrap_or_default())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use shopfront_core::{CustomerId, ProductId};
    use tower_sessions::MemoryStore;

    use super::*;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    #[tokio::test]
    async fn test_flash_is_drained_once() {
        let session = session();
        push_flash(&session, "first").await.unwrap();
        push_flash(&session, "second").await.unwrap();

        assert_eq!(take_flash(&session).await.unwrap(), vec!["first", "second"]);
        assert!(take_flash(&session).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_pending_purchase_lifecycle() {
        let session = session();
        assert!(pending_purchase(&session).await.unwrap().is_none());

        let pending = PendingPurchase {
            target: ProductId::new(4),
            customer: CustomerId::new(8),
        };
        set_pending_purchase(&session, &pending).await.unwrap();
        assert_eq!(pending_purchase(&session).await.unwrap(), Some(pending));

        clear_pending_purchase(&session).await.unwrap();
        assert!(pending_purchase(&session).await.unwrap().is_none());
    }
}
