//! In-memory state store implementation
//!
//! Reference implementation of [`StateStore`] backed by a `HashMap` behind a
//! `tokio::sync::RwLock`. Suitable for development, testing, and processes
//! whose suspended flows may be lost on restart. For durability, implement
//! [`StateStore`] over a database and swap it in; application code stays the
//! same.
//!
//! # Example
//!
//! ```rust
//! use flowrun_checkpoint::{InMemoryStateStore, StateStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = InMemoryStateStore::new();
//!
//!     store.save("subject-1", Some(b"{\"executed\":false}")).await?;
//!     assert!(store.load("subject-1").await?.is_some());
//!
//!     // `None` deletes the record
//!     store.save("subject-1", None).await?;
//!     assert!(store.load("subject-1").await?.is_none());
//!
//!     Ok(())
//! }
//! ```

use crate::error::Result;
use crate::traits::StateStore;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Thread-safe in-memory record storage
type RecordStorage = Arc<RwLock<HashMap<String, Vec<u8>>>>;

/// In-memory [`StateStore`] implementation
///
/// Cloning shares the underlying storage, so a store can be handed to
/// multiple owners.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStateStore {
    storage: RecordStorage,
}

impl InMemoryStateStore {
    /// Create a new empty in-memory store
    pub fn new() -> Self {
        Self {
            storage: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Number of subjects with a stored record
    pub async fn subject_count(&self) -> usize {
        self.storage.read().await.len()
    }

    /// Remove all records (useful for testing)
    pub async fn clear(&self) {
        self.storage.write().await.clear();
    }
}

#[async_trait]
impl StateStore for InMemoryStateStore {
    async fn load(&self, subject: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.storage.read().await.get(subject).cloned())
    }

    async fn save(&self, subject: &str, blob: Option<&[u8]>) -> Result<()> {
        let mut storage = self.storage.write().await;
        match blob {
            Some(bytes) => {
                storage.insert(subject.to_string(), bytes.to_vec());
            }
            None => {
                storage.remove(subject);
            }
        }
        Ok(())
    }
}
