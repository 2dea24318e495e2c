//! Persisted cart storage.
//!
//! The cart is one serialized blob under [`STORAGE_KEY`]. It is read when a
//! request needs it, written after every mutation and cleared after a
//! successful checkout. The server keeps it in the visitor's cookie session;
//! tests swap in [`MemoryCartStore`].

use std::future::Future;
use std::sync::Arc;

use invoice_desk_core::{Cart, STORAGE_KEY};
use thiserror::Error;
use tokio::sync::Mutex;
use tower_sessions::Session;

/// Errors from reading or writing the persisted cart.
#[derive(Debug, Error)]
pub enum CartStoreError {
    /// The stored blob is not a valid cart.
    #[error("Stored cart is corrupt: {0}")]
    Corrupt(#[source] serde_json::Error),

    /// The cart could not be serialized.
    #[error("Failed to serialize cart: {0}")]
    Serialize(#[source] serde_json::Error),

    /// The session backend failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

/// Key-value storage for one visitor's cart.
pub trait CartStore: Send + Sync {
    /// The stored cart, or an empty one if nothing is stored.
    fn load(&self) -> impl Future<Output = Result<Cart, CartStoreError>> + Send;

    /// Replace the stored cart.
    fn save(&self, cart: &Cart) -> impl Future<Output = Result<(), CartStoreError>> + Send;

    /// Remove the stored cart.
    fn clear(&self) -> impl Future<Output = Result<(), CartStoreError>> + Send;
}

fn decode(blob: Option<String>) -> Result<Cart, CartStoreError> {
    blob.map_or_else(|| Ok(Cart::new()), |b| Cart::from_json(&b).map_err(CartStoreError::Corrupt))
}

/// Cart kept in the visitor's `tower-sessions` session.
#[derive(Debug, Clone)]
pub struct SessionCartStore {
    session: Session,
}

impl SessionCartStore {
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self { session }
    }
}

impl CartStore for SessionCartStore {
    async fn load(&self) -> Result<Cart, CartStoreError> {
        decode(self.session.get::<String>(STORAGE_KEY).await?)
    }

    async fn save(&self, cart: &Cart) -> Result<(), CartStoreError> {
        let blob = cart.to_json().map_err(CartStoreError::Serialize)?;
        self.session.insert(STORAGE_KEY, blob).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), CartStoreError> {
        self.session.remove::<String>(STORAGE_KEY).await?;
        Ok(())
    }
}

/// In-memory cart store.
#[derive(Debug, Clone, Default)]
pub struct MemoryCartStore {
    blob: Arc<Mutex<Option<String>>>,
}

impl MemoryCartStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with a raw blob, valid or not.
    #[must_use]
    pub fn with_blob(blob: impl Into<String>) -> Self {
        Self {
            blob: Arc::new(Mutex::new(Some(blob.into()))),
        }
    }

    /// The raw stored blob.
    pub async fn blob(&self) -> Option<String> {
        self.blob.lock().await.clone()
    }
}

impl CartStore for MemoryCartStore {
    async fn load(&self) -> Result<Cart, CartStoreError> {
        decode(self.blob.lock().await.clone())
    }

    async fn save(&self, cart: &Cart) -> Result<(), CartStoreError> {
        let blob = cart.to_json().map_err(CartStoreError::Serialize)?;
        *self.blob.lock().await = Some(blob);
        Ok(())
    }

    async fn clear(&self) -> Result<(), CartStoreError> {
        *self.blob.lock().await = None;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use invoice_desk_core::{CatalogProduct, ProductId};
    use rust_decimal::Decimal;
    use tower_sessions::MemoryStore;

    use super::*;

    fn mug() -> CatalogProduct {
        CatalogProduct {
            id: ProductId::new("p1"),
            name: "Mug".to_string(),
            description: String::new(),
            price: Decimal::new(750, 2),
            tax_rate: Decimal::from(8),
            is_active: true,
        }
    }

    async fn round_trip(store: &impl CartStore) {
        assert!(store.load().await.unwrap().is_empty());

        let mut cart = Cart::new();
        cart.add_product(&mug());
        cart.add_product(&mug());
        store.save(&cart).await.unwrap();

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded, cart);
        assert_eq!(loaded.item_count(), 2);

        store.clear().await.unwrap();
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_memory_store() {
        round_trip(&MemoryCartStore::new()).await;
    }

    #[tokio::test]
    async fn test_session_store() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        round_trip(&SessionCartStore::new(session)).await;
    }

    #[tokio::test]
    async fn test_corrupt_blob_is_reported() {
        let store = MemoryCartStore::with_blob("{not a cart");
        assert!(matches!(store.load().await, Err(CartStoreError::Corrupt(_))));
        // Still there for inspection.
        assert_eq!(store.blob().await.as_deref(), Some("{not a cart"));
    }
}
