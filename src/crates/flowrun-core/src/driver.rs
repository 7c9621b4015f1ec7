//! Root driver: run one event through a flow and classify the outcome
//!
//! [`execute`] binds a fresh or deserialized continuation tree to a run
//! context for exactly one inbound event, runs the root flow through it, and
//! produces a three-way [`RunOutcome`]:
//!
//! - **Completed** - the root handler returned; the caller should discard
//!   any persisted record for the subject.
//! - **Suspended** - the suspend signal reached the top uncaught; the
//!   caller persists the returned tree verbatim for replay on the next
//!   event.
//! - **Failed** - a real fault escaped a handler; the error is recorded on
//!   the innermost node active at fault time and mirrored onto the root,
//!   and the record should be dropped rather than replayed into a broken
//!   state repeatedly.
//!
//! In all three cases the root's `kvs` is stamped with the processing
//! timestamp before the report is returned.

use crate::error::FlowError;
use crate::flow::Flow;
use crate::run::FlowRun;
use crate::state::{ErrorRecord, FlowState};

/// Classification of one event-processing pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The root flow ran to completion
    Completed,
    /// The root flow suspended awaiting the next event
    Suspended,
    /// The root flow failed with a recorded fault
    Failed,
}

/// Result of one event-processing pass: outcome plus the updated tree
#[derive(Debug, Clone)]
pub struct RunReport {
    pub outcome: RunOutcome,
    pub state: FlowState,
}

impl RunReport {
    /// True if the caller should persist the tree for a later resume
    ///
    /// Completed and failed flows are terminal: their records are deleted,
    /// not retried.
    pub fn should_persist(&self) -> bool {
        matches!(self.outcome, RunOutcome::Suspended)
    }
}

/// Coarse category for an [`ErrorRecord`]
fn error_kind(err: &FlowError) -> &'static str {
    match err {
        FlowError::Suspended => "suspended",
        FlowError::NonDeterministic { .. } => "non_deterministic",
        FlowError::Handler(_) => "handler",
        FlowError::Serialization(_) => "serialization",
        FlowError::Checkpoint(_) => "checkpoint",
        FlowError::Internal(_) => "internal",
    }
}

/// Execute the root flow against the run context for one inbound event
pub async fn execute<E>(mut run: FlowRun<E>, root: &Flow<(), E>) -> RunReport {
    let outcome = match run.subflow(root).await {
        Ok(()) => {
            run.state_mut().executed = true;
            RunOutcome::Completed
        }
        Err(FlowError::Suspended) => RunOutcome::Suspended,
        Err(err) => {
            let record = ErrorRecord::new(error_kind(&err), err.to_string());

            // The frame stack is not unwound on failure, so its top still
            // names the node that was active when the fault was raised.
            let failed_path = run.innermost_path();
            if let Ok(node) = run.node_at_mut(&failed_path) {
                node.error = Some(record.clone());
            }

            let state = run.state_mut();
            state.error = Some(record);
            state.executed = true;
            RunOutcome::Failed
        }
    };

    run.state_mut().touch();

    RunReport {
        outcome,
        state: run.into_state(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::flow;
    use serde_json::json;

    #[tokio::test]
    async fn test_completed_flow_is_terminal() {
        let root = flow::<(), i64, _>("root", |_run| Box::pin(async move { Ok(()) }));
        let report = execute(FlowRun::new(0i64, None), &root).await;

        assert_eq!(report.outcome, RunOutcome::Completed);
        assert!(report.state.executed);
        assert!(!report.should_persist());
    }

    #[tokio::test]
    async fn test_suspended_flow_persists() {
        let root = flow::<(), i64, _>("root", |run| {
            Box::pin(async move { run.interrupt() })
        });
        let report = execute(FlowRun::new(0i64, None), &root).await;

        assert_eq!(report.outcome, RunOutcome::Suspended);
        assert!(!report.state.executed);
        assert!(report.state.error.is_none());
        assert!(report.should_persist());
    }

    #[tokio::test]
    async fn test_failed_flow_records_error_at_root() {
        let root = flow::<(), i64, _>("root", |_run| {
            Box::pin(async move { Err(FlowError::handler("exploded")) })
        });
        let report = execute(FlowRun::new(0i64, None), &root).await;

        assert_eq!(report.outcome, RunOutcome::Failed);
        assert!(report.state.executed);
        let error = report.state.error.as_ref().unwrap();
        assert_eq!(error.kind, "handler");
        assert!(error.message.contains("exploded"));
        assert!(!report.should_persist());
    }

    #[tokio::test]
    async fn test_failure_localized_at_innermost_node() {
        let leaf = flow::<(), i64, _>("leaf", |_run| {
            Box::pin(async move { Err(FlowError::handler("deep fault")) })
        });
        let mid = flow::<(), i64, _>("mid", move |run| {
            let leaf = leaf.clone();
            Box::pin(async move { run.subflow(&leaf).await })
        });
        let top = flow::<(), i64, _>("top", move |run| {
            let mid = mid.clone();
            Box::pin(async move { run.subflow(&mid).await })
        });

        let report = execute(FlowRun::new(0i64, None), &top).await;
        assert_eq!(report.outcome, RunOutcome::Failed);

        // Root carries a mirror of the fault...
        let root_error = report.state.error.as_ref().unwrap();
        assert!(root_error.message.contains("deep fault"));

        // ...and the depth-3 node carries the original.
        let top_node = &report.state.subflows[0];
        let mid_node = &top_node.subflows[0];
        let leaf_node = &mid_node.subflows[0];
        assert_eq!(leaf_node.id, "leaf");
        assert_eq!(leaf_node.error, report.state.error);
        assert!(top_node.error.is_none());
        assert!(mid_node.error.is_none());
    }

    #[tokio::test]
    async fn test_every_outcome_stamps_updated() {
        let root = flow::<(), i64, _>("root", |run| {
            Box::pin(async move { run.interrupt() })
        });
        let report = execute(FlowRun::new(0i64, None), &root).await;
        assert!(report.state.kvs.contains_key(crate::state::KV_UPDATED));
    }

    #[tokio::test]
    async fn test_suspend_mid_flow_keeps_partial_results() {
        let greet = flow::<serde_json::Value, i64, _>("greet", |_run| {
            Box::pin(async move { Ok(json!("hi")) })
        });
        let root = flow::<(), i64, _>("root", move |run| {
            let greet = greet.clone();
            Box::pin(async move {
                run.subflow(&greet).await?;
                run.interrupt()
            })
        });

        let report = execute(FlowRun::new(0i64, None), &root).await;
        assert_eq!(report.outcome, RunOutcome::Suspended);

        let root_node = &report.state.subflows[0];
        assert!(!root_node.executed);
        assert_eq!(root_node.subflows[0].id, "greet");
        assert!(root_node.subflows[0].executed);
        assert_eq!(root_node.subflows[0].result, Some(json!("hi")));
    }
}
