//! Event data model: payload values, payloads, and dispatch commands.
//!
//! ## Contents
//! - [`Value`], [`ErrorValue`] one opaque payload element
//! - [`Params`] shared, immutable payload of one firing round
//! - [`Command`], [`CommandKind`] requests consumed by the dispatch loop
//!
//! See `core/mod.rs` for how commands flow through the emitter.

mod command;
mod params;
mod value;

pub use command::{Command, CommandKind};
pub use params::Params;
pub use value::{ErrorValue, Value};
