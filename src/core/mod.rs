//! Runtime core: dispatch loop and firing rounds.
//!
//! This module contains the embedded implementation of the emitter runtime.
//! The public API from this module is [`Emitter`] with its builder and
//! configuration types.
//!
//! Internal modules:
//! - [`emitter`]: front-end handle, packages calls into queue messages;
//! - [`dispatch`]: the single loop that owns the registry and interprets messages;
//! - [`registry`]: per-event persistent and one-shot listener lists;
//! - [`firing`]: launches one round of invocations with panic isolation;
//! - [`completion`]: counts drained rounds for `wait`.

mod builder;
mod completion;
mod config;
mod dispatch;
mod emitter;
mod firing;
mod registry;

#[cfg(test)]
pub(crate) mod testkit;

pub use builder::EmitterBuilder;
pub use config::{CompletionPolicy, EmitterConfig};
pub use emitter::Emitter;
pub use registry::ListenerCounts;
