//! # Event listener trait.
//!
//! Provides [`Listener`] the unit of behavior registered per event name.
//!
//! Each invocation gets:
//! - **Dedicated task** (one per listener per firing round)
//! - **Shared payload** ([`Params`], the same `Arc` for the whole round)
//! - **Emitter handle** (listeners may register or emit re-entrantly)
//! - **Panic isolation** (panics are caught and reported on the `error` event)
//!
//! ## Architecture
//! ```text
//! firing round ──► tokio::spawn ──► listener.on_event(&emitter, &params)
//!                               └─► panic caught → error event (ListenerPanicked)
//! ```
//!
//! ## Rules
//! - Invocations of one round run concurrently; completion order is unspecified.
//! - Invocations are never cancelled; they run to completion.
//! - Calling back into the emitter is safe: it goes through the same queue.
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use eventvisor::{Emitter, Listener, Params};
//!
//! struct Audit;
//!
//! #[async_trait]
//! impl Listener for Audit {
//!     async fn on_event(&self, _em: &Emitter, params: &Params) {
//!         let _ = params.len();
//!     }
//!
//!     fn name(&self) -> &str { "audit" }
//! }
//! ```

use async_trait::async_trait;

use crate::core::Emitter;
use crate::events::Params;

/// Listener invoked when its event fires.
///
/// ### Implementation requirements
/// - Use async I/O; avoid blocking the executor.
/// - Report failures by emitting `error` (see [`EmitterError::custom`](crate::EmitterError::custom)).
/// - Never await [`Emitter::closed`] from inside a listener; shutdown waits on listeners.
#[async_trait]
pub trait Listener: Send + Sync + 'static {
    /// Handles one firing round.
    async fn on_event(&self, emitter: &Emitter, params: &Params);

    /// Returns the listener name used in diagnostics and panic reports.
    ///
    /// The default uses `type_name::<Self>()`, which can be verbose - override it when possible.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}
