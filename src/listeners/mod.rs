//! # Event listeners.
//!
//! This module provides the [`Listener`] trait, the closure adapter
//! [`ListenerFn`], and the default `error` listener with its diagnostic sinks.
//!
//! ## Architecture
//! ```text
//! Emitter::emit("add", params)
//!        │
//!        ▼
//!  dispatch loop ──► firing round ──► spawn ──► listener1.on_event(&em, &params)
//!                                  ├─► spawn ──► listener2.on_event(&em, &params)
//!                                  └─► spawn ──► onceN.on_event(&em, &params)
//!
//! Emitter::emit("error", err) ──► ErrorLogger ──► DiagnosticSink ("error: <msg>")
//! ```
//!
//! ## Listener types
//! - **Persistent** (`on`): invoked on every round until the emitter is closed.
//! - **One-shot** (`once`): included in exactly one round's launch set.
//!
//! Both kinds share one shape: emitter handle + payload.

mod listener;
mod listener_fn;
mod log;

pub use listener::Listener;
pub use listener_fn::{ListenerFn, ListenerRef};
pub use log::{DiagnosticSink, ErrorLogger, StderrSink, TracingSink};

#[cfg(test)]
pub(crate) use log::testing;
