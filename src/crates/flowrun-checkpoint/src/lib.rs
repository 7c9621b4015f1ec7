//! # flowrun-checkpoint
//!
//! Persistence layer for the flowrun replay engine.
//!
//! A suspended flow is nothing but a serialized continuation tree keyed by
//! its subject. This crate defines the storage contract for those records
//! and ships a reference in-memory backend:
//!
//! - [`StateStore`] - async trait for `load` / `save(None = delete)` of
//!   opaque per-subject blobs
//! - [`InMemoryStateStore`] - `HashMap`-backed reference implementation
//! - [`SerializerProtocol`] - pluggable encoding ([`JsonSerializer`] is the
//!   canonical textual form, [`BincodeSerializer`] a binary alternative)
//! - [`StoreError`] - error type for all store operations
//!
//! The engine core (`flowrun-core`) depends on this crate; storage backends
//! depend only on this crate and can be swapped without touching flow code.
//!
//! # Example
//!
//! ```rust
//! use flowrun_checkpoint::{InMemoryStateStore, StateStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = InMemoryStateStore::new();
//!     store.save("chat-42", Some(b"...serialized tree...")).await?;
//!     let blob = store.load("chat-42").await?;
//!     assert!(blob.is_some());
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod memory;
pub mod serializer;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::InMemoryStateStore;
pub use serializer::{BincodeSerializer, JsonSerializer, SerializerProtocol};
pub use traits::StateStore;
