//! # Listener invocation: admission control and panic isolation.
//!
//! [`ListenerExecutor`] is the single path through which every listener runs.
//! It enforces the bus-wide concurrency bound and converts panics into
//! [`ListenerError`] values so one misbehaving listener can never take down a
//! dispatch.
//!
//! ## Rules
//! - One semaphore per bus instance, never global: multiple buses in one
//!   process do not interfere.
//! - `(invocations started − invocations finished) ≤ execution_rate` at any
//!   instant; callers over the bound queue on the semaphore.
//! - Panics are caught with `catch_unwind` and reported as
//!   [`ListenerError::Panicked`].

use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::Semaphore;

use crate::error::ListenerError;
use crate::events::Event;
use crate::listener::EventListener;

/// Gate and isolation wrapper shared by all invocations of one bus.
#[derive(Clone)]
pub(crate) struct ListenerExecutor {
    permits: Arc<Semaphore>,
}

impl ListenerExecutor {
    /// Creates an executor bounded at `execution_rate` concurrent invocations
    /// (clamped to a minimum of 1).
    pub(crate) fn new(execution_rate: usize) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(execution_rate.max(1))),
        }
    }

    /// Runs one listener invocation behind the gate.
    ///
    /// Holds a permit for the full duration of `handle()`. Returns the
    /// listener's own error, or [`ListenerError::Panicked`] when the listener
    /// panicked.
    pub(crate) async fn invoke(
        &self,
        listener: &dyn EventListener,
        event: &dyn Event,
    ) -> Result<(), ListenerError> {
        let _permit = match self.permits.acquire().await {
            Ok(permit) => permit,
            // The bus never closes its own semaphore.
            Err(_closed) => {
                return Err(ListenerError::Fail {
                    error: "execution gate closed".into(),
                });
            }
        };

        let fut = listener.handle(event);
        match std::panic::AssertUnwindSafe(fut).catch_unwind().await {
            Ok(result) => result,
            Err(panic_err) => {
                let info = {
                    let any = &*panic_err;
                    if let Some(msg) = any.downcast_ref::<&'static str>() {
                        (*msg).to_string()
                    } else if let Some(msg) = any.downcast_ref::<String>() {
                        msg.clone()
                    } else {
                        "unknown panic".to_string()
                    }
                };
                Err(ListenerError::Panicked { info })
            }
        }
    }
}
