//! # flowrun-core
//!
//! Deterministic replay engine for durable, resumable event-driven flows.
//!
//! A flow is ordinary sequential async code that suspends while waiting
//! for an external event (a message, a button press, an edit) and resumes
//! exactly where it left off, even if the process serving it terminated
//! between events. Progress survives restarts because the engine persists a
//! continuation tree (the execution trace of the flow and its subflows)
//! and replays handler bodies against it deterministically.
//!
//! # Architecture
//!
//! ```text
//! inbound event + persisted continuation (or none)
//!         │
//!         ▼
//! ┌─────────────────────────────────────────────┐
//! │  Session        load / persist / delete      │   flowrun-checkpoint
//! │  ┌─────────────────────────────────────────┐ │
//! │  │  execute (root driver)                  │ │
//! │  │   classify: Completed/Suspended/Failed  │ │
//! │  │  ┌─────────────────────────────────────┐│ │
//! │  │  │  FlowRun (run context)              ││ │
//! │  │  │   subflow dispatch · memoization    ││ │
//! │  │  │   consume/intercept/interrupt       ││ │
//! │  │  │   reset · kvs scratch space         ││ │
//! │  │  └─────────────────────────────────────┘│ │
//! │  └─────────────────────────────────────────┘ │
//! └─────────────────────────────────────────────┘
//!         │
//!         ▼
//! updated continuation tree (persisted iff suspended)
//! ```
//!
//! # The determinism contract
//!
//! Replay re-runs handler bodies from their start, consulting memoized
//! subflow results for everything resolved on earlier passes. Handlers must
//! therefore be pure functions of prior subflow results and the current
//! event; wall-clock time, randomness, and every externally visible side
//! effect belong inside a subflow (or [`FlowRun::memo`]). Divergence from
//! the recorded trace is a fatal [`FlowError::NonDeterministic`].
//!
//! # Quick start
//!
//! ```rust,no_run
//! use flowrun_core::{flow, Flow, Session};
//! use flowrun_checkpoint::InMemoryStateStore;
//!
//! fn counter() -> Flow<(), String> {
//!     flow("counter", |run| {
//!         Box::pin(async move {
//!             let mut count: i64 = 0;
//!             loop {
//!                 count += 1;
//!                 let display = count;
//!                 run.memo(async move {
//!                     // send `display` to the subject here
//!                     Ok(display)
//!                 })
//!                 .await?;
//!
//!                 let event = run.consume()?;
//!                 if event != "increment" {
//!                     return run.interrupt();
//!                 }
//!             }
//!         })
//!     })
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let session = Session::new(InMemoryStateStore::new());
//!     session.handle("chat-42", "increment".to_string(), &counter()).await?;
//!     Ok(())
//! }
//! ```
//!
//! # See also
//!
//! - [`flowrun_checkpoint`] - state store trait and implementations
//! - `flowrun-prebuilt` - chat event union, event-wait protocol, command router

pub mod driver;
pub mod error;
pub mod flow;
pub mod run;
pub mod session;
pub mod state;

pub use driver::{execute, RunOutcome, RunReport};
pub use error::{FlowError, FlowResult};
pub use flow::{flow, Flow, HandlerFn};
pub use flowrun_checkpoint::{InMemoryStateStore, JsonSerializer, SerializerProtocol, StateStore};
pub use run::FlowRun;
pub use session::Session;
pub use state::{ErrorRecord, FlowState, KV_CREATED, KV_UPDATED};
