//! # eventvisor
//!
//! **Eventvisor** is a small in-process event emitter for Tokio applications.
//!
//! Named events carry positional payloads to asynchronously invoked listeners.
//! All registration and emission requests flow through one serialized
//! dispatch loop, so the listener registry never needs a lock. Callers can
//! block until every listener started by one emission has finished, and
//! failures of the emitter itself are funnelled into a reserved `error` event.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   caller A          caller B          listener (re-entrant)
//!      │ on/once/emit    │ wait             │ emit
//!      ▼                 ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────┐
//! │              inbound queue (bounded, FIFO)                    │
//! │            (capacity: EmitterConfig::queue_capacity)          │
//! └───────────────────────────────┬───────────────────────────────┘
//!                                 ▼
//!                     ┌───────────────────────┐
//!                     │     dispatch loop     │
//!                     │  owns Registry        │
//!                     │  event → on[], once[] │
//!                     └───┬───────────────┬───┘
//!                  emit   │               │  invalid request
//!                         ▼               ▼
//!                   firing round      error event ──► ErrorLogger ──► sink
//!               ┌────────┼────────┐
//!               ▼        ▼        ▼
//!            spawn    spawn    spawn           (one task per listener)
//!               │        │        │
//!               └── drop token ───┘ ──► round-done ──► wait(event) returns
//! ```
//!
//! ### Round lifecycle
//! ```text
//! emit(event, params)
//!   ├─► entry missing         ─► error("unexpected event: <event>")
//!   └─► launch set = on[] ++ once[]   (once[] cleared)
//!         ├─► arm completion with |set|   (0 → round-done at once)
//!         ├─► spawn every listener, return to the loop
//!         └─► last invocation finishes ─► round-done
//!
//! wait(event)
//!   ├─► entry missing         ─► Err(UnexpectedEvent) + error round
//!   └─► consume the next round-done signal (FIFO)
//! ```
//!
//! ## Features
//! | Area              | Description                                                       | Key types / traits                              |
//! |-------------------|-------------------------------------------------------------------|-------------------------------------------------|
//! | **Emitter**       | Register, emit, wait, close; cheap cloneable handle.              | [`Emitter`], [`EmitterBuilder`]                 |
//! | **Listeners**     | Async listeners as trait objects or closures.                     | [`Listener`], [`ListenerFn`], [`ListenerRef`]   |
//! | **Payloads**      | Positional, dynamically typed payload values.                     | [`Params`], [`Value`], [`params!`]              |
//! | **Commands**      | Raw dispatch requests, including unknown kinds.                   | [`Command`], [`CommandKind`]                    |
//! | **Errors**        | Typed errors for dispatch failures and handle misuse.             | [`EmitterError`]                                |
//! | **Diagnostics**   | Default `error` listener and pluggable sinks.                     | [`ErrorLogger`], [`DiagnosticSink`]             |
//! | **Configuration** | Queue bound, completion policy, wait timeout, error event name.   | [`EmitterConfig`], [`CompletionPolicy`]         |
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicI64, Ordering};
//! use eventvisor::{Emitter, EmitterError, ListenerFn, Params, params};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), EmitterError> {
//!     let em = Emitter::new();
//!     let total = Arc::new(AtomicI64::new(0));
//!
//!     let acc = total.clone();
//!     em.on("add", ListenerFn::arc("sum", move |em: Emitter, p: Params| {
//!         let acc = acc.clone();
//!         async move {
//!             match p.sum_ints() {
//!                 Some(n) => { acc.fetch_add(n, Ordering::SeqCst); }
//!                 None => {
//!                     let err = EmitterError::custom(format!("invalid params: {p}"));
//!                     let _ = em.emit("error", params![err]).await;
//!                 }
//!             }
//!         }
//!     }))
//!     .await?;
//!
//!     em.emit("add", params![1, 2, 3]).await?;
//!     em.wait("add").await?;
//!     assert_eq!(total.load(Ordering::SeqCst), 6);
//!
//!     // prints "error: invalid params: [foo]" via the default error listener
//!     em.emit("add", params!["foo"]).await?;
//!     em.wait("error").await?;
//!
//!     em.close().await?;
//!     em.closed().await;
//!     Ok(())
//! }
//! ```
mod core;
mod error;
mod events;
mod listeners;

// ---- Public re-exports ----

pub use crate::core::{CompletionPolicy, Emitter, EmitterBuilder, EmitterConfig, ListenerCounts};
pub use error::EmitterError;
pub use events::{Command, CommandKind, ErrorValue, Params, Value};
pub use listeners::{
    DiagnosticSink, ErrorLogger, Listener, ListenerFn, ListenerRef, StderrSink, TracingSink,
};
