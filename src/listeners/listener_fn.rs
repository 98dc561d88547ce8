//! # Function-backed listener (`ListenerFn`)
//!
//! [`ListenerFn`] wraps a closure `F: Fn(Emitter, Params) -> Fut`, producing a fresh
//! future per invocation. Both arguments are cheap clones, so the future owns its
//! state and can be spawned.
//!
//! ## Concurrency semantics
//! - Every invocation creates a **new** future; rounds may overlap.
//! - Shared state across invocations must be explicit (`Arc<...>` captured by the closure).
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicI64, Ordering};
//! use eventvisor::{Emitter, Listener, ListenerFn, ListenerRef, Params};
//!
//! let sum = Arc::new(AtomicI64::new(0));
//! let acc = sum.clone();
//! let l: ListenerRef = ListenerFn::arc("sum", move |_em: Emitter, params: Params| {
//!     let acc = acc.clone();
//!     async move {
//!         if let Some(n) = params.sum_ints() {
//!             acc.fetch_add(n, Ordering::SeqCst);
//!         }
//!     }
//! });
//!
//! assert_eq!(l.name(), "sum");
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::core::Emitter;
use crate::events::Params;
use crate::listeners::Listener;

/// Shared handle to a listener.
pub type ListenerRef = Arc<dyn Listener>;

/// Function-backed listener implementation.
#[derive(Debug)]
pub struct ListenerFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> ListenerFn<F> {
    /// Creates a new function-backed listener.
    ///
    /// Prefer [`ListenerFn::arc`] when you immediately need a [`ListenerRef`].
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F, Fut> ListenerFn<F>
where
    F: Fn(Emitter, Params) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    /// Creates the listener and returns it as a shared handle (`Arc<dyn Listener>`).
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> ListenerRef {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<F, Fut> Listener for ListenerFn<F>
where
    F: Fn(Emitter, Params) -> Fut + Send + Sync + 'static, // Fn, not FnMut
    Fut: Future<Output = ()> + Send + 'static,
{
    async fn on_event(&self, emitter: &Emitter, params: &Params) {
        (self.f)(emitter.clone(), params.clone()).await
    }

    fn name(&self) -> &str {
        &self.name
    }
}
