//! # EventBus: the dispatch facade.
//!
//! [`EventBus`] composes the two registration pools behind one surface:
//! registration routes to the pool matching the identity kind, dispatch fans
//! out to both (plus the cluster transport), and redelivery goes straight to
//! one group.
//!
//! ## Dispatch flow
//! ```text
//! dispatch(event, keys)
//!     │
//!     ├─ event.is_noop()? ──► yes ──► done, nobody notified
//!     │
//!     └─ no ──► concurrently:
//!          ├─► GroupRegistrationPool::dispatch(event)      (always)
//!          ├─► KeyRegistrationPool::dispatch(event, keys)  (when keys non-empty)
//!          └─► transport.fan_out(event, keys)              (cluster delivery)
//!
//! completion: all synchronous-mode listener work (group and key) has
//! finished; asynchronous-mode work may still be in flight.
//! ```

use std::sync::Arc;

use crate::bus::config::BusConfig;
use crate::bus::delivery::ListenerExecutor;
use crate::bus::group_pool::GroupRegistrationPool;
use crate::bus::key_pool::KeyRegistrationPool;
use crate::bus::transport::{EventBusTransport, LocalOnlyTransport};
use crate::deadletters::EventDeadLetters;
use crate::error::BusError;
use crate::events::EventRef;
use crate::listener::{GroupEventListener, ListenerRef};
use crate::registrations::{Group, GroupRef, KeyRef, Registration};

/// In-process event bus with group and key delivery.
///
/// Each instance owns its admission gate: several buses in one process never
/// share execution slots.
pub struct EventBus {
    group_pool: GroupRegistrationPool,
    key_pool: KeyRegistrationPool,
    transport: Arc<dyn EventBusTransport>,
}

impl EventBus {
    /// Creates a bus for single-node deployments.
    pub fn new(cfg: BusConfig, dead_letters: Arc<dyn EventDeadLetters>) -> Self {
        Self::with_transport(cfg, dead_letters, Arc::new(LocalOnlyTransport))
    }

    /// Creates a bus whose dispatches also fan out over `transport`.
    pub fn with_transport(
        cfg: BusConfig,
        dead_letters: Arc<dyn EventDeadLetters>,
        transport: Arc<dyn EventBusTransport>,
    ) -> Self {
        let executor = ListenerExecutor::new(cfg.execution_rate_clamped());
        Self {
            group_pool: GroupRegistrationPool::new(executor.clone(), cfg.retry, dead_letters),
            key_pool: KeyRegistrationPool::new(executor),
            transport,
        }
    }

    /// Claims `group` for the listener.
    ///
    /// # Errors
    /// [`BusError::GroupAlreadyRegistered`] while the group has a live
    /// listener.
    pub async fn register(
        &self,
        listener: ListenerRef,
        group: GroupRef,
    ) -> Result<Registration, BusError> {
        self.group_pool.register(listener, group).await
    }

    /// Registers a [`GroupEventListener`] under its default group.
    pub async fn register_group_listener<L: GroupEventListener>(
        &self,
        listener: Arc<L>,
    ) -> Result<Registration, BusError> {
        let group = listener.default_group();
        self.group_pool.register(listener, group).await
    }

    /// Adds the listener under `key`. Key registrations never conflict.
    pub async fn register_key(&self, listener: ListenerRef, key: KeyRef) -> Registration {
        self.key_pool.register(listener, key).await
    }

    /// Delivers the event to every registered group and to the listeners
    /// behind any of `keys`.
    ///
    /// Noop events are dropped before any delivery. The returned future
    /// completes once all synchronous-mode listener work has finished;
    /// asynchronous-mode listeners may still be running.
    pub async fn dispatch(&self, event: EventRef, keys: &[KeyRef]) {
        if event.is_noop() {
            return;
        }

        let groups = self.group_pool.dispatch(&event);
        let scoped = self.key_pool.dispatch(&event, keys);
        let fan_out = self.transport.fan_out(&event, keys);

        let ((), (), transported) = tokio::join!(groups, scoped, fan_out);
        if let Err(err) = transported {
            log::error!(
                "cluster fan-out failed: event_id={} error={err}",
                event.event_id(),
            );
        }
    }

    /// Re-invokes only the local listener registered for `group`.
    ///
    /// Bypasses keys, other groups, and the cluster transport. Noop events
    /// are dropped here too.
    ///
    /// # Errors
    /// [`BusError::GroupRegistrationNotFound`] when no local listener holds
    /// the group.
    pub async fn redeliver(&self, group: &dyn Group, event: EventRef) -> Result<(), BusError> {
        if event.is_noop() {
            return Ok(());
        }
        self.group_pool.redeliver(group, &event).await
    }
}
