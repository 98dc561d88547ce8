//! # Firing protocol: launch one round of listener invocations.
//!
//! Given the launch set of a round (persistent listeners, then one-shots, each
//! in registration order), spawns one task per listener and returns
//! immediately. Under the tracked policy the event's completion tracker is
//! armed with the launch count before anything is spawned.
//!
//! ## Flow
//! ```text
//! launch(set, params)
//!   ├─► tokens = completion.arm(|set|)        (tracked only; |set| = 0 → done at once)
//!   └─► for listener in set:
//!         tasks.spawn(invoke(listener, params, token))
//!                        ├─► listener.on_event(&emitter, &params)
//!                        ├─► panic → report ListenerPanicked
//!                        └─► drop(token)        → last one signals round-done
//! ```
//!
//! ## Rules
//! - Launch order follows registration order; completion order is unspecified.
//! - Invocations are never cancelled.
//! - A panic in a listener of the error event goes to the sink, not back to `error`.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio_util::task::TaskTracker;

use super::completion::RoundToken;
use super::emitter::Emitter;
use super::registry::RoundSet;
use crate::error::EmitterError;
use crate::events::Params;
use crate::listeners::ListenerRef;
use crate::params;

/// Spawns every invocation of one round onto `tasks`.
pub(crate) fn launch(
    emitter: &Emitter,
    tasks: &TaskTracker,
    event: Arc<str>,
    round: RoundSet,
    params: Params,
) {
    let RoundSet {
        listeners,
        completion,
    } = round;

    let mut tokens = if emitter.config().is_tracked() {
        completion.arm(listeners.len())
    } else {
        Vec::new()
    }
    .into_iter();

    tracing::trace!(event = %event, listeners = listeners.len(), "firing round");
    for listener in listeners {
        tasks.spawn(invoke(
            emitter.clone(),
            Arc::clone(&event),
            listener,
            params.clone(),
            tokens.next(),
        ));
    }
}

/// Runs one listener to completion, isolating panics.
async fn invoke(
    emitter: Emitter,
    event: Arc<str>,
    listener: ListenerRef,
    params: Params,
    token: Option<RoundToken>,
) {
    let fut = listener.on_event(&emitter, &params);
    if let Err(panic_err) = AssertUnwindSafe(fut).catch_unwind().await {
        let err = EmitterError::ListenerPanicked {
            event: Arc::clone(&event),
            listener: listener.name().into(),
            info: panic_info(&*panic_err),
        };
        report_panic(&emitter, &event, err).await;
    }
    drop(token);
}

async fn report_panic(emitter: &Emitter, event: &str, err: EmitterError) {
    let error_event = Arc::clone(&emitter.config().error_event);
    if event == &*error_event {
        emitter.sink().write_error(&err.to_string());
        return;
    }
    if let Err(e) = emitter.emit(error_event, params![err.clone()]).await {
        tracing::warn!(event = %event, error = %e, "listener panic could not be reported");
        emitter.sink().write_error(&err.to_string());
    }
}

fn panic_info(any: &(dyn Any + Send)) -> String {
    if let Some(msg) = any.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = any.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
