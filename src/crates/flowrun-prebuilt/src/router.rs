//! Root flow dispatching top-level commands to their own flows
//!
//! The router is itself a flow, so command dispatch is recorded in the
//! continuation tree and replays like everything else: once a command flow
//! is underway, later events replay through the router straight into it.
//! A fresh command arriving mid-conversation abandons the current branch
//! via [`FlowRun::reset`] and starts over.

use crate::event::ChatEvent;
use crate::wait::prompt;
use flowrun_core::{flow, Flow, FlowRun};

/// One dispatchable top-level command
#[derive(Debug, Clone)]
pub struct Command {
    name: String,
    description: String,
    flow: Flow<(), ChatEvent>,
}

impl Command {
    /// `name` is matched verbatim against incoming message text, e.g. `"/start"`
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        flow: Flow<(), ChatEvent>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            flow,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

/// Build the root flow for a command-driven conversation
///
/// Waits for a message, looks its text up in the command list, and runs the
/// matching command's flow as a subflow. A message matching no command ends
/// the pass without dispatching. A message matching a command while another
/// command's flow is still suspended resets the trace and dispatches anew.
pub fn command_router(commands: Vec<Command>) -> Flow<(), ChatEvent> {
    flow("root", move |run: &mut FlowRun<ChatEvent>| {
        let commands = commands.clone();
        Box::pin(async move {
            let fresh_command = matches!(
                run.intercept(),
                ChatEvent::Message(m) if commands.iter().any(|c| c.name == m.text)
            );
            if fresh_command {
                run.reset()?;
            }

            let message = prompt(run, false).await?;
            match commands.iter().find(|c| c.name == message.text) {
                Some(command) => {
                    tracing::debug!(command = %command.name, "dispatching command");
                    run.subflow(&command.flow).await
                }
                None => Ok(()),
            }
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::IncomingMessage;
    use flowrun_core::{execute, FlowState, RunOutcome, RunReport};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn message(id: i64, text: &str) -> ChatEvent {
        ChatEvent::Message(IncomingMessage {
            message_id: id,
            text: text.to_string(),
        })
    }

    /// A command flow that bumps a counter when its body actually runs.
    fn tracked(id: &str, hits: Arc<AtomicUsize>) -> Flow<(), ChatEvent> {
        flow(id, move |_run| {
            let hits = Arc::clone(&hits);
            Box::pin(async move {
                hits.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
        })
    }

    /// A command flow that waits for one more message before finishing.
    fn two_step(id: &str) -> Flow<(), ChatEvent> {
        flow(id, |run| {
            Box::pin(async move {
                prompt(run, false).await?;
                Ok(())
            })
        })
    }

    async fn advance(
        root: &Flow<(), ChatEvent>,
        prior: Option<FlowState>,
        event: ChatEvent,
    ) -> RunReport {
        execute(FlowRun::new(event, prior), root).await
    }

    #[tokio::test]
    async fn test_dispatches_matching_command() {
        let hits = Arc::new(AtomicUsize::new(0));
        let root = command_router(vec![Command::new(
            "/go",
            "run it",
            tracked("go", Arc::clone(&hits)),
        )]);

        let report = advance(&root, None, message(1, "/go")).await;
        assert_eq!(report.outcome, RunOutcome::Completed);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unknown_message_ends_pass() {
        let hits = Arc::new(AtomicUsize::new(0));
        let root = command_router(vec![Command::new(
            "/go",
            "run it",
            tracked("go", Arc::clone(&hits)),
        )]);

        let report = advance(&root, None, message(1, "hello?")).await;
        assert_eq!(report.outcome, RunOutcome::Completed);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_fresh_command_resets_suspended_flow() {
        let hits = Arc::new(AtomicUsize::new(0));
        let root = command_router(vec![
            Command::new("/slow", "asks a question", two_step("slow")),
            Command::new("/quick", "done at once", tracked("quick", Arc::clone(&hits))),
        ]);

        // /slow starts and waits for its follow-up message.
        let pending = advance(&root, None, message(1, "/slow")).await;
        assert_eq!(pending.outcome, RunOutcome::Suspended);

        // A new command abandons the suspended branch and dispatches fresh.
        let done = advance(&root, Some(pending.state), message(2, "/quick")).await;
        assert_eq!(done.outcome, RunOutcome::Completed);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_replay_routes_into_suspended_command() {
        let root = command_router(vec![Command::new("/slow", "", two_step("slow"))]);

        let pending = advance(&root, None, message(1, "/slow")).await;
        assert_eq!(pending.outcome, RunOutcome::Suspended);

        // A plain message resolves the command's own waiting point.
        let done = advance(&root, Some(pending.state), message(2, "answer")).await;
        assert_eq!(done.outcome, RunOutcome::Completed);
    }
}
