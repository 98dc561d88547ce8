//! Listener fixtures shared by the core tests.

use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::{EmitterBuilder, EmitterConfig};
use crate::listeners::testing::CollectSink;
use crate::{Emitter, EmitterError, ListenerFn, ListenerRef, Params, params};

/// Counts invocations.
pub(crate) fn counter(name: &'static str, hits: Arc<AtomicUsize>) -> ListenerRef {
    ListenerFn::arc(name, move |_em: Emitter, _p: Params| {
        let hits = hits.clone();
        async move {
            hits.fetch_add(1, Ordering::SeqCst);
        }
    })
}

/// Records every payload it receives.
pub(crate) fn recorder(name: &'static str, seen: Arc<Mutex<Vec<Params>>>) -> ListenerRef {
    ListenerFn::arc(name, move |_em: Emitter, p: Params| {
        let seen = seen.clone();
        async move {
            seen.lock().expect("recorder poisoned").push(p);
        }
    })
}

/// Adds integer payloads to `sum`; reports anything else on `error`.
pub(crate) fn adder(sum: Arc<AtomicI64>) -> ListenerRef {
    ListenerFn::arc("sum3", move |em: Emitter, p: Params| {
        let sum = sum.clone();
        async move {
            match p.sum_ints() {
                Some(n) => {
                    sum.fetch_add(n, Ordering::SeqCst);
                }
                None => {
                    let err = EmitterError::custom(format!("invalid params: {p}"));
                    let _ = em.emit("error", params![err]).await;
                }
            }
        }
    })
}

/// Builder wired to a collecting sink.
pub(crate) fn collecting(cfg: EmitterConfig) -> (EmitterBuilder, Arc<CollectSink>) {
    let sink = Arc::new(CollectSink::default());
    (EmitterBuilder::new(cfg).with_sink(sink.clone()), sink)
}
