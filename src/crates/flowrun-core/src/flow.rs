//! Flow descriptors: the unit of composition
//!
//! A [`Flow`] pairs a stable identifier with an async handler. Handlers
//! receive the run context and call back into it to read the current event,
//! wait for further events, or recurse into subflows. The id is compared
//! against the persisted trace on every replay, so it must be stable across
//! code versions for any flow invoked at the same structural position.
//!
//! # Example
//!
//! ```rust,no_run
//! use flowrun_core::{flow, Flow, FlowRun};
//!
//! fn greet() -> Flow<String, String> {
//!     flow("greet", |run| {
//!         Box::pin(async move {
//!             let event = run.consume()?;
//!             Ok(format!("hello, {event}"))
//!         })
//!     })
//! }
//! ```

use crate::error::FlowResult;
use crate::run::FlowRun;
use futures::future::BoxFuture;
use std::sync::Arc;

/// Type alias for flow handler functions
pub type HandlerFn<T, E> =
    Arc<dyn for<'a> Fn(&'a mut FlowRun<E>) -> BoxFuture<'a, FlowResult<T>> + Send + Sync>;

/// An immutable pairing of a stable identifier and an async handler
///
/// `T` is the handler's return type; it must survive a serialize/deserialize
/// round trip, because results are stored in the continuation tree as
/// structural clones. `E` is the inbound event type the flow runs against.
pub struct Flow<T, E> {
    id: String,
    handler: HandlerFn<T, E>,
}

impl<T, E> Flow<T, E> {
    /// Create a new flow descriptor
    ///
    /// # Arguments
    ///
    /// * `id` - Stable identifier, compared against the persisted trace
    /// * `handler` - Async function executed against the run context
    pub fn new<F>(id: impl Into<String>, handler: F) -> Self
    where
        F: for<'a> Fn(&'a mut FlowRun<E>) -> BoxFuture<'a, FlowResult<T>> + Send + Sync + 'static,
    {
        Self {
            id: id.into(),
            handler: Arc::new(handler),
        }
    }

    /// The flow's stable identifier
    pub fn id(&self) -> &str {
        &self.id
    }

    pub(crate) fn call<'a>(&self, run: &'a mut FlowRun<E>) -> BoxFuture<'a, FlowResult<T>> {
        (self.handler)(run)
    }
}

impl<T, E> Clone for Flow<T, E> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            handler: Arc::clone(&self.handler),
        }
    }
}

impl<T, E> std::fmt::Debug for Flow<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Flow").field("id", &self.id).finish()
    }
}

/// Convenience function to create a flow descriptor
///
/// # Example
///
/// ```rust,no_run
/// use flowrun_core::flow;
///
/// let noop = flow::<(), String, _>("noop", |_run| Box::pin(async move { Ok(()) }));
/// ```
pub fn flow<T, E, F>(id: impl Into<String>, handler: F) -> Flow<T, E>
where
    F: for<'a> Fn(&'a mut FlowRun<E>) -> BoxFuture<'a, FlowResult<T>> + Send + Sync + 'static,
{
    Flow::new(id, handler)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flow_id() {
        let f = flow::<(), i32, _>("counter", |_run| Box::pin(async move { Ok(()) }));
        assert_eq!(f.id(), "counter");
    }

    #[test]
    fn test_flow_clone_shares_handler() {
        let f = flow::<i32, i32, _>("answer", |_run| Box::pin(async move { Ok(42) }));
        let g = f.clone();
        assert_eq!(g.id(), "answer");
    }
}
