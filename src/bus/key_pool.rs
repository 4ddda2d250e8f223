//! # Key registration pool: ephemeral, many-to-many delivery.
//!
//! Maintains the live mapping from [`RegistrationKey`](crate::RegistrationKey)
//! to listeners and executes key-scoped dispatch.
//!
//! ## Architecture
//! ```text
//! dispatch(event, {K1, K2})
//!     │
//!     ├─► union of listeners under K1 ∪ K2
//!     ├─► de-duplicate by listener identity (once per dispatch, however
//!     │   many keys matched)
//!     ├─► filter by is_handling(event)
//!     └─► start all survivors concurrently, each behind the admission gate
//!           ├─ Synchronous   → awaited before dispatch resolves
//!           └─ Asynchronous  → fire-and-forget
//! ```
//!
//! ## Rules
//! - **Isolation**: a failing or panicking listener never prevents its
//!   siblings from running, nor the dispatch call from completing; the
//!   failure is logged and dropped.
//! - **No replay**: a listener registered after a dispatch began never sees
//!   that dispatch's event.
//! - **Duplicate registration**: registering the same listener instance under
//!   the same key again collapses onto the existing entry; unregistering any
//!   of the handles removes it.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::bus::delivery::ListenerExecutor;
use crate::events::EventRef;
use crate::listener::{ExecutionMode, ListenerRef};
use crate::registrations::{KeyRef, Registration};

type KeyListeners = Arc<RwLock<HashMap<String, Vec<ListenerRef>>>>;

/// Live key → listeners mapping plus the dispatch logic over it.
pub(crate) struct KeyRegistrationPool {
    executor: ListenerExecutor,
    listeners: KeyListeners,
}

impl KeyRegistrationPool {
    pub(crate) fn new(executor: ListenerExecutor) -> Self {
        Self {
            executor,
            listeners: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Adds the listener to the set registered under `key`.
    ///
    /// Re-registering the same instance under the same key returns a fresh
    /// handle onto the same underlying entry.
    pub(crate) async fn register(&self, listener: ListenerRef, key: KeyRef) -> Registration {
        let key_id = key.as_string();

        {
            let mut map = self.listeners.write().await;
            let registered = map.entry(key_id.clone()).or_default();
            if !registered.iter().any(|l| Arc::ptr_eq(l, &listener)) {
                registered.push(listener.clone());
            }
        }

        let listeners = self.listeners.clone();
        Registration::new(Box::new(move || {
            let listeners = listeners.clone();
            let key_id = key_id.clone();
            let listener = listener.clone();
            Box::pin(async move {
                let mut map = listeners.write().await;
                if let Some(registered) = map.get_mut(&key_id) {
                    registered.retain(|l| !Arc::ptr_eq(l, &listener));
                    if registered.is_empty() {
                        map.remove(&key_id);
                    }
                }
            })
        }))
    }

    /// Delivers the event to every listener registered under any of `keys`.
    ///
    /// Completes once all matched synchronous-mode listeners have finished;
    /// asynchronous-mode work may still be in flight.
    pub(crate) async fn dispatch(&self, event: &EventRef, keys: &[KeyRef]) {
        if keys.is_empty() {
            return;
        }

        let matched: Vec<ListenerRef> = {
            let map = self.listeners.read().await;
            let mut matched = Vec::new();
            for key in keys {
                if let Some(registered) = map.get(&key.as_string()) {
                    for listener in registered {
                        if !matched.iter().any(|m| Arc::ptr_eq(m, listener)) {
                            matched.push(listener.clone());
                        }
                    }
                }
            }
            matched
        };

        let mut awaited = Vec::new();
        for listener in matched {
            if !listener.is_handling(event.as_ref()) {
                continue;
            }

            let mode = listener.execution_mode();
            let executor = self.executor.clone();
            let event = event.clone();
            let task = async move {
                if let Err(err) = executor.invoke(listener.as_ref(), event.as_ref()).await {
                    log::warn!(
                        "key listener failed: event_id={} label={} error={err}",
                        event.event_id(),
                        err.as_label(),
                    );
                }
            };

            match mode {
                ExecutionMode::Synchronous => awaited.push(tokio::spawn(task)),
                ExecutionMode::Asynchronous => {
                    tokio::spawn(task);
                }
            }
        }

        for handle in awaited {
            let _ = handle.await;
        }
    }
}
