//! # Per-event completion tracking.
//!
//! Every registry entry owns one [`Completion`]. A firing round arms it with the
//! number of invocations it launches; each invocation holds a [`RoundToken`]
//! and posts (drops it) when it finishes. The last post signals round-done.
//!
//! ## Architecture
//! ```text
//! arm(n) ──► [RoundToken; n] ──► invocation 1 ─┐
//!                               invocation 2 ─┼─ drop → remaining -= 1
//!                               invocation n ─┘        └─ remaining == 0 → rounds.add_permits(1)
//!
//! wait(event) ──► rounds.acquire() ──► permit.forget()
//! ```
//!
//! ## Rules
//! - `arm(0)` signals round-done immediately (nothing to wait for).
//! - Round-done signals are counted: each `wait` consumes exactly one, in FIFO
//!   order. A round that drained before its `wait` arrived is still observed.
//! - Tokens post on drop, so a panicking invocation still completes its round.
//! - `close()` fails pending and future waits with `Closed`.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::Semaphore;

use crate::error::EmitterError;

/// Round-done signal of one event.
#[derive(Debug)]
pub(crate) struct Completion {
    rounds: Semaphore,
}

impl Completion {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            rounds: Semaphore::new(0),
        })
    }

    /// Arms a round of `count` invocations and returns one token per invocation.
    pub(crate) fn arm(self: &Arc<Self>, count: usize) -> Vec<RoundToken> {
        if count == 0 {
            self.round_done();
            return Vec::new();
        }

        let round = Arc::new(Round {
            remaining: AtomicUsize::new(count),
            completion: Arc::clone(self),
        });
        (0..count).map(|_| RoundToken(Arc::clone(&round))).collect()
    }

    /// Blocks until one more round has drained.
    pub(crate) async fn next_round(&self) -> Result<(), EmitterError> {
        let permit = self
            .rounds
            .acquire()
            .await
            .map_err(|_| EmitterError::Closed)?;
        permit.forget();
        Ok(())
    }

    /// Number of drained rounds nobody has waited for yet.
    #[cfg(test)]
    pub(crate) fn unobserved(&self) -> usize {
        self.rounds.available_permits()
    }

    pub(crate) fn close(&self) {
        self.rounds.close();
    }

    fn round_done(&self) {
        self.rounds.add_permits(1);
    }
}

/// Countdown shared by the tokens of one round.
#[derive(Debug)]
struct Round {
    remaining: AtomicUsize,
    completion: Arc<Completion>,
}

/// Held by one invocation; posts to its round on drop.
#[derive(Debug)]
pub(crate) struct RoundToken(Arc<Round>);

impl Drop for RoundToken {
    fn drop(&mut self) {
        if self.0.remaining.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.0.completion.round_done();
        }
    }
}
