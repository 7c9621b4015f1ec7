//! The event-wait protocol: waiting points built on the core primitives
//!
//! [`input`] is the canonical waiting point. It is an ordinary subflow with
//! the stable id `"input"`, so the wait is recorded in the continuation tree
//! like any other node: the pass that consumes the event completes the node,
//! every earlier pass leaves it pending and suspends.
//!
//! # Watch mode
//!
//! With [`InputOptions::watch`] enabled, a completed waiting point keeps
//! tracking the message it consumed. When a later pass carries an edit of
//! that message, the edit is stashed in the caller's node storage and the
//! pass suspends; from then on replay transparently substitutes the edited
//! message for the originally consumed one. Handler code downstream never
//! sees the difference. Selections are never watched.

use crate::event::{ChatEvent, EventKind, IncomingMessage, Selection};
use flowrun_core::{flow, FlowError, FlowResult, FlowRun};

/// Configuration for a waiting point
#[derive(Debug, Clone)]
pub struct InputOptions {
    /// Event kinds this waiting point accepts; anything else suspends
    pub awaited: Vec<EventKind>,
    /// Keep tracking the consumed message for in-place edits
    pub watch: bool,
}

impl Default for InputOptions {
    fn default() -> Self {
        Self {
            awaited: vec![EventKind::Message, EventKind::Selection],
            watch: false,
        }
    }
}

impl InputOptions {
    pub fn awaiting(mut self, kinds: Vec<EventKind>) -> Self {
        self.awaited = kinds;
        self
    }

    pub fn watch(mut self, watch: bool) -> Self {
        self.watch = watch;
        self
    }
}

fn edit_key(message_id: i64) -> String {
    format!("edited-message-{message_id}")
}

/// Wait for the next event of an accepted kind
///
/// Consumes the current event if its kind is in [`InputOptions::awaited`];
/// otherwise the pass suspends and the waiting point stays pending. On
/// replay the originally consumed event is returned without consuming
/// anything, unless watch mode has substituted an edit.
pub async fn input(run: &mut FlowRun<ChatEvent>, options: &InputOptions) -> FlowResult<ChatEvent> {
    let awaited = options.awaited.clone();
    let waiting_point = flow("input", move |run: &mut FlowRun<ChatEvent>| {
        let awaited = awaited.clone();
        Box::pin(async move {
            let event = run.consume()?;
            if !awaited.contains(&event.kind()) {
                return run.interrupt();
            }
            Ok(event)
        })
    });

    let result = run.subflow(&waiting_point).await?;

    // Only plain messages can be edited later.
    let message_id = match &result {
        ChatEvent::Message(m) if options.watch => m.message_id,
        _ => return Ok(result),
    };
    let key = edit_key(message_id);

    let pending_edit = match run.intercept() {
        ChatEvent::Edit(edit) if edit.message_id == message_id => Some(edit.clone()),
        _ => None,
    };
    if let Some(edit) = pending_edit {
        run.set(key, serde_json::to_string(&edit)?)?;
        return run.interrupt();
    }

    match run.get(&key)? {
        Some(stashed) => Ok(ChatEvent::Message(serde_json::from_str(&stashed)?)),
        None => Ok(result),
    }
}

/// Wait for a plain text message
pub async fn prompt(run: &mut FlowRun<ChatEvent>, watch: bool) -> FlowResult<IncomingMessage> {
    let options = InputOptions::default()
        .awaiting(vec![EventKind::Message])
        .watch(watch);
    match input(run, &options).await? {
        ChatEvent::Message(m) | ChatEvent::Edit(m) => Ok(m),
        other => Err(FlowError::Internal(format!(
            "prompt resolved to a non-message event: {other:?}"
        ))),
    }
}

/// Wait for a choice selection
pub async fn select(run: &mut FlowRun<ChatEvent>) -> FlowResult<Selection> {
    let options = InputOptions::default().awaiting(vec![EventKind::Selection]);
    match input(run, &options).await? {
        ChatEvent::Selection(s) => Ok(s),
        other => Err(FlowError::Internal(format!(
            "select resolved to a non-selection event: {other:?}"
        ))),
    }
}
