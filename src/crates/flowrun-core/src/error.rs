//! Error types for the replay engine

use thiserror::Error;

/// Convenience result type using [`FlowError`]
pub type FlowResult<T> = std::result::Result<T, FlowError>;

/// Errors (and the one non-error signal) produced by flow execution
///
/// `Suspended` travels through the same channel as real faults so that a
/// blocked handler can abort the current pass from arbitrarily deep in the
/// call chain with a plain `?`. The root driver is the only place that
/// catches it, and it is never reported as a failure.
#[derive(Error, Debug)]
pub enum FlowError {
    /// Suspend signal: processing of this event is done, wait for the next
    ///
    /// Not a failure. Raised by [`FlowRun::interrupt`](crate::run::FlowRun::interrupt)
    /// and by [`FlowRun::consume`](crate::run::FlowRun::consume) once the
    /// event has already been spent.
    #[error("flow suspended awaiting the next event")]
    Suspended,

    /// Determinism violation: replay invoked a subflow whose id does not
    /// match the recorded child at that position
    ///
    /// Indicates a code/state mismatch (for example, deployed code changed
    /// the shape of a flow that still has suspended instances in storage).
    /// Fatal for the current event; never silently recovered.
    #[error("non-deterministic flow: expected '{expected}', found '{found}'")]
    NonDeterministic { expected: String, found: String },

    /// Application fault raised inside a handler body
    #[error("handler fault: {0}")]
    Handler(String),

    /// A flow result or stashed value failed the structural-clone round trip
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Persistence collaborator fault, surfaced by the session layer
    #[error("state store error: {0}")]
    Checkpoint(#[from] flowrun_checkpoint::StoreError),

    /// Engine invariant breakage (empty frame stack, dangling path)
    #[error("internal engine error: {0}")]
    Internal(String),
}

impl FlowError {
    /// Create a handler fault with a message
    pub fn handler(message: impl Into<String>) -> Self {
        FlowError::Handler(message.into())
    }

    /// True if this value is the suspend signal rather than a failure
    pub fn is_suspend(&self) -> bool {
        matches!(self, FlowError::Suspended)
    }
}
