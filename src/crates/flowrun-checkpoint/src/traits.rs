//! Storage trait for per-subject continuation records
//!
//! `StateStore` is the persistence collaborator of the replay engine. The
//! engine hands it one opaque serialized blob per subject (a conversation, a
//! user, a session) and asks for it back on the subject's next event. The
//! store never inspects the blob; encoding is the caller's business (see
//! [`SerializerProtocol`](crate::serializer::SerializerProtocol)).
//!
//! # Contract
//!
//! - `load` returns the most recently saved blob for a subject, or `None`
//!   if the subject has no suspended flow.
//! - `save` with `Some(blob)` replaces the subject's record; `save` with
//!   `None` deletes it. Deletion of a missing record is not an error.
//! - No partial-write semantics are assumed: each call either succeeds or
//!   returns an error.
//!
//! # Example: custom database backend
//!
//! ```rust,ignore
//! use flowrun_checkpoint::{StateStore, Result};
//! use async_trait::async_trait;
//!
//! struct PostgresStateStore {
//!     pool: sqlx::PgPool,
//! }
//!
//! #[async_trait]
//! impl StateStore for PostgresStateStore {
//!     async fn load(&self, subject: &str) -> Result<Option<Vec<u8>>> {
//!         // SELECT blob FROM flow_state WHERE subject = $1
//!         todo!()
//!     }
//!
//!     async fn save(&self, subject: &str, blob: Option<&[u8]>) -> Result<()> {
//!         // UPSERT or DELETE depending on `blob`
//!         todo!()
//!     }
//! }
//! ```
//!
//! # Thread safety
//!
//! Implementations must be `Send + Sync`. The engine serializes access per
//! subject at a higher level; the store only needs to be safe for concurrent
//! calls across different subjects.

use crate::error::Result;
use async_trait::async_trait;

/// Storage backend for serialized continuation trees, keyed by subject
///
/// Implementations decide durability (memory, file, database). The blob is
/// opaque: the engine serializes the continuation tree before calling `save`
/// and deserializes after `load`.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Load the stored record for a subject, if any
    async fn load(&self, subject: &str) -> Result<Option<Vec<u8>>>;

    /// Save a record for a subject; `None` deletes the record
    async fn save(&self, subject: &str, blob: Option<&[u8]>) -> Result<()>;
}
