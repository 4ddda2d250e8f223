//! # Listener contract.
//!
//! [`EventListener`] is the extension point for plugging event handlers into
//! the bus. Listeners are registered against a [`Group`](crate::Group) (at
//! most one listener per group) or any number of
//! [`RegistrationKey`](crate::RegistrationKey)s, and are invoked by the
//! dispatch loop behind the bus's admission gate.
//!
//! ## Contract
//! - Implementations may be slow (I/O, batching) — they never block delivery
//!   to other listeners.
//! - Failures are returned as [`ListenerError`] values, captured per
//!   invocation; they never reach the dispatch caller.
//! - [`EventListener::execution_mode`] tells the dispatch loop whether to
//!   await the invocation (`Synchronous`) or fire and forget
//!   (`Asynchronous`). It is consulted explicitly — a listener cannot change
//!   mode per event.

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::ListenerError;
use crate::events::Event;
use crate::registrations::GroupRef;

/// Shared handle to a listener.
pub type ListenerRef = Arc<dyn EventListener>;

/// How the dispatch loop treats an invocation of this listener.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecutionMode {
    /// The dispatch call's completion waits for this listener.
    Synchronous,
    /// Fire-and-forget: the invocation may still be in flight when the
    /// dispatch call completes.
    Asynchronous,
}

/// # Contract for event listeners.
///
/// Invoked from bus-owned tasks; implementations should prefer async I/O and
/// cooperative waits over blocking the runtime.
#[async_trait]
pub trait EventListener: Send + Sync + 'static {
    /// Execution mode consulted by the dispatch loop.
    fn execution_mode(&self) -> ExecutionMode {
        ExecutionMode::Synchronous
    }

    /// True when this listener wants the given event.
    ///
    /// Filtered before invocation; a `false` here costs nothing.
    fn is_handling(&self, event: &dyn Event) -> bool {
        let _ = event;
        true
    }

    /// Handles a single event.
    async fn handle(&self, event: &dyn Event) -> Result<(), ListenerError>;
}

/// A listener with a home group.
///
/// Lets callers register by [`default_group`](Self::default_group) instead of
/// spelling the group out at every call site.
pub trait GroupEventListener: EventListener {
    /// The group this listener claims when registered without an explicit one.
    fn default_group(&self) -> GroupRef;
}
