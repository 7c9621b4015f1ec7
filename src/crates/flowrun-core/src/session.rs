//! Per-subject glue between the driver and a state store
//!
//! [`Session`] owns a [`StateStore`] and runs the full load → execute →
//! persist-or-delete cycle for one subject's inbound event. Suspended trees
//! are saved for the subject's next event; completed or failed trees delete
//! the stored record (a failed flow does not get silently retried forever).
//!
//! # Example
//!
//! ```rust,no_run
//! use flowrun_core::{flow, Session};
//! use flowrun_checkpoint::InMemoryStateStore;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let session = Session::new(InMemoryStateStore::new());
//!     let root = flow::<(), String, _>("echo", |run| {
//!         Box::pin(async move {
//!             let text = run.consume()?;
//!             println!("{text}");
//!             Ok(())
//!         })
//!     });
//!
//!     session.handle("chat-42", "hello".to_string(), &root).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Concurrency
//!
//! `handle` assumes events for the same subject are dispatched one at a
//! time. Two concurrent calls for one subject would both load the same prior
//! tree and race to persist divergent updates, one of which is lost;
//! serializing dispatch per subject is the caller's obligation.

use crate::driver::{execute, RunOutcome, RunReport};
use crate::error::FlowResult;
use crate::flow::Flow;
use crate::run::FlowRun;
use crate::state::FlowState;
use flowrun_checkpoint::{JsonSerializer, SerializerProtocol, StateStore};

/// Binds a state store to the root driver for per-subject event handling
///
/// Generic over the record encoding; plain [`Session::new`] uses
/// [`JsonSerializer`], the canonical encoding for continuation trees.
#[derive(Debug, Clone)]
pub struct Session<S, P = JsonSerializer> {
    store: S,
    serializer: P,
    keep_trace: bool,
}

impl<S: StateStore> Session<S> {
    /// Create a session over a state store, with JSON-encoded records
    pub fn new(store: S) -> Self {
        Self::with_serializer(store, JsonSerializer::new())
    }
}

impl<S: StateStore, P: SerializerProtocol> Session<S, P> {
    /// Create a session with a custom record encoding
    ///
    /// The serializer must round-trip [`FlowState`], whose results are
    /// dynamically typed `serde_json::Value`s; self-describing encodings
    /// qualify, plain `BincodeSerializer` does not (see the serializer
    /// docs).
    pub fn with_serializer(store: S, serializer: P) -> Self {
        Self {
            store,
            serializer,
            keep_trace: false,
        }
    }

    /// Retain executed subtrees in persisted records (see [`FlowRun::with_trace`])
    pub fn with_trace(mut self, keep: bool) -> Self {
        self.keep_trace = keep;
        self
    }

    /// The underlying state store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Process one inbound event for a subject
    ///
    /// Loads the subject's continuation (or starts fresh), advances it
    /// through the root flow, then persists the suspended tree or deletes
    /// the record for terminal outcomes. The report is returned either way
    /// so callers can surface recorded faults to the subject.
    #[tracing::instrument(skip(self, event, root), fields(flow = root.id()))]
    pub async fn handle<E>(&self, subject: &str, event: E, root: &Flow<(), E>) -> FlowResult<RunReport> {
        let prior = match self.store.load(subject).await? {
            Some(blob) => Some(self.serializer.loads::<FlowState>(&blob)?),
            None => None,
        };
        tracing::debug!(resumed = prior.is_some(), "processing event");

        let run = FlowRun::new(event, prior).with_trace(self.keep_trace);
        let report = execute(run, root).await;

        match report.outcome {
            RunOutcome::Suspended => {
                let blob = self.serializer.dumps(&report.state)?;
                self.store.save(subject, Some(&blob)).await?;
            }
            RunOutcome::Completed => {
                tracing::debug!("flow completed, deleting record");
                self.store.save(subject, None).await?;
            }
            RunOutcome::Failed => {
                if let Some(error) = &report.state.error {
                    tracing::error!(kind = %error.kind, message = %error.message, "flow failed");
                }
                self.store.save(subject, None).await?;
            }
        }

        Ok(report)
    }
}
