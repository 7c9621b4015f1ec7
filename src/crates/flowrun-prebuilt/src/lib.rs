//! # flowrun-prebuilt - Conversational Patterns
//!
//! Ready-made building blocks for conversational flows on top of
//! `flowrun-core`: a concrete chat event type, the event-wait protocol, and
//! a command-dispatching root flow. Everything here is built purely from the
//! core primitives (`subflow`, `consume`, `intercept`, `interrupt`, `set`,
//! `get`, `reset`); nothing reaches into the engine.
//!
//! - [`ChatEvent`] - closed union of message, selection, and edit events
//! - [`input`] / [`prompt`] / [`select`] - waiting points recorded in the
//!   continuation tree, with optional edit tracking (watch mode)
//! - [`command_router`] - root flow that routes `/command` messages to their
//!   own flows and restarts cleanly when a new command arrives mid-flow
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use flowrun_core::{flow, Flow, Session, InMemoryStateStore};
//! use flowrun_prebuilt::{command_router, prompt, ChatEvent, Command};
//!
//! fn echo() -> Flow<(), ChatEvent> {
//!     flow("echo", |run| {
//!         Box::pin(async move {
//!             let message = prompt(run, false).await?;
//!             run.set("last-echo", message.text)?;
//!             Ok(())
//!         })
//!     })
//! }
//!
//! # async fn demo(event: ChatEvent) -> flowrun_core::FlowResult<()> {
//! let session = Session::new(InMemoryStateStore::new());
//! let root = command_router(vec![Command::new("/echo", "echo one message", echo())]);
//! session.handle("subject-1", event, &root).await?;
//! # Ok(())
//! # }
//! ```

pub mod event;
pub mod router;
pub mod wait;

pub use event::{ChatEvent, EventKind, IncomingMessage, Selection};
pub use router::{command_router, Command};
pub use wait::{input, prompt, select, InputOptions};
