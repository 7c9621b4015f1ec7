//! The persisted continuation model
//!
//! A [`FlowState`] node records one flow invocation's execution trace:
//! whether its handler completed, the structurally cloned result, the traces
//! of its subflow invocations in order, any captured fault, and a private
//! key-value scratch space that survives suspensions. A tree of these nodes
//! is the only thing the engine ever persists.
//!
//! ```text
//! FlowState (root, id = uuid)           executed: false
//! └── "counter"                          executed: false
//!     ├── "send"    result: {...}        executed: true
//!     ├── "input"   result: {...}        executed: true
//!     └── "send"                         executed: false   <- suspended here
//! ```
//!
//! Once a node is `executed`, replay never re-enters its handler body; only
//! `result` is consulted. Its `subflows` are therefore discarded at
//! completion unless trace retention is enabled on the run.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use uuid::Uuid;

/// Key in the root node's `kvs` holding the creation timestamp (RFC 3339)
pub const KV_CREATED: &str = "created";

/// Key in the root node's `kvs` holding the last-processed timestamp (RFC 3339)
pub const KV_UPDATED: &str = "updated";

/// Serializable record of a fault captured during flow execution
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorRecord {
    /// Coarse error category ("handler", "non_deterministic", ...)
    pub kind: String,

    /// Human-readable error message
    pub message: String,
}

impl ErrorRecord {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
        }
    }
}

/// One node of a persisted continuation tree
///
/// Field-for-field the canonical serialized shape: `id`, `executed`,
/// optional `result` and `error`, ordered `subflows`, and the node-scoped
/// `kvs` map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowState {
    /// Identifier of the flow this node represents
    pub id: String,

    /// True once the handler has completed without suspending
    pub executed: bool,

    /// Last completed return value, structurally cloned at storage time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,

    /// Fault captured at the innermost active node, mirrored to the root
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorRecord>,

    /// Child continuations, one per subflow invocation, in invocation order
    #[serde(default)]
    pub subflows: Vec<FlowState>,

    /// Node-scoped scratch storage; survives suspensions of this node
    #[serde(default)]
    pub kvs: HashMap<String, String>,
}

impl FlowState {
    /// Create an empty, unexecuted node for a flow id
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            executed: false,
            result: None,
            error: None,
            subflows: Vec::new(),
            kvs: HashMap::new(),
        }
    }

    /// Create a fresh root node for a subject with no prior state
    ///
    /// Roots get a generated id and a `created` timestamp, matching the
    /// canonical record shape.
    pub fn new_root() -> Self {
        let mut root = Self::new(Uuid::new_v4().to_string());
        root.kvs
            .insert(KV_CREATED.to_string(), Utc::now().to_rfc3339());
        root
    }

    /// Stamp the last-processed timestamp on this node
    pub fn touch(&mut self) {
        self.kvs
            .insert(KV_UPDATED.to_string(), Utc::now().to_rfc3339());
    }

    /// Total number of nodes in this subtree, including self
    pub fn node_count(&self) -> usize {
        1 + self.subflows.iter().map(FlowState::node_count).sum::<usize>()
    }
}
