//! # Group registration pool: durable delivery with retry and dead letters.
//!
//! Maintains the live mapping from [`Group`](crate::Group) to its single
//! listener and executes group dispatch. Group listeners receive every
//! non-noop event the bus sees, independent of the keys a dispatch names.
//!
//! ## Delivery flow
//! ```text
//! dispatch(event)
//!     │  (snapshot of currently registered groups)
//!     ├─► group G1 ──► deliver_with_retries ──► handle()
//!     ├─► group G2 ──► deliver_with_retries ──► handle()
//!     └─► group GN ...
//!
//! deliver_with_retries:
//!   loop {
//!     ├─► invoke listener (admission-gated, panic-isolated)
//!     │     ├─ Ok  → done
//!     │     └─ Err → attempt < max_retries?
//!     │          ├─ yes → sleep(backoff.delay(attempt)) → retry
//!     │          └─ no  → EventDeadLetters::store(group, event) → done
//!   }
//! ```
//!
//! ## Rules
//! - At most one listener per group, enforced at registration time.
//! - Failures (and retry sleeps) of one group never delay another group.
//! - Exhausted failures are swallowed: the dispatch caller never sees them,
//!   the event lands in the dead-letter store instead.
//! - `redeliver` targets exactly one group's local listener and runs the same
//!   retry-then-dead-letter path.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::RwLock;
use tokio::time;

use crate::bus::delivery::ListenerExecutor;
use crate::deadletters::EventDeadLetters;
use crate::error::BusError;
use crate::events::EventRef;
use crate::listener::{ExecutionMode, ListenerRef};
use crate::policies::RetryBackoff;
use crate::registrations::{Group, GroupRef, Registration};

#[derive(Clone)]
struct GroupEntry {
    group: GroupRef,
    listener: ListenerRef,
}

type GroupRegistrations = Arc<RwLock<HashMap<String, GroupEntry>>>;

/// Live group → listener mapping plus retrying dispatch over it.
pub(crate) struct GroupRegistrationPool {
    executor: ListenerExecutor,
    retry: RetryBackoff,
    dead_letters: Arc<dyn EventDeadLetters>,
    registrations: GroupRegistrations,
}

impl GroupRegistrationPool {
    pub(crate) fn new(
        executor: ListenerExecutor,
        retry: RetryBackoff,
        dead_letters: Arc<dyn EventDeadLetters>,
    ) -> Self {
        Self {
            executor,
            retry,
            dead_letters,
            registrations: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Claims `group` for the listener.
    ///
    /// Fails with [`BusError::GroupAlreadyRegistered`] while a previous
    /// registration is live; succeeds again once it was unregistered.
    pub(crate) async fn register(
        &self,
        listener: ListenerRef,
        group: GroupRef,
    ) -> Result<Registration, BusError> {
        let key = group.as_string();

        {
            let mut map = self.registrations.write().await;
            if map.contains_key(&key) {
                return Err(BusError::GroupAlreadyRegistered { group: key });
            }
            map.insert(key.clone(), GroupEntry { group, listener });
        }

        let registrations = self.registrations.clone();
        Ok(Registration::new(Box::new(move || {
            let registrations = registrations.clone();
            let key = key.clone();
            Box::pin(async move {
                registrations.write().await.remove(&key);
            })
        })))
    }

    /// Delivers the event to every currently registered group's listener.
    ///
    /// Completes once all synchronous-mode deliveries (including their
    /// retries) have finished; asynchronous-mode work may still be in flight.
    pub(crate) async fn dispatch(&self, event: &EventRef) {
        let entries: Vec<GroupEntry> = {
            let map = self.registrations.read().await;
            map.values().cloned().collect()
        };

        let mut awaited = Vec::new();
        for entry in entries {
            if !entry.listener.is_handling(event.as_ref()) {
                continue;
            }

            let mode = entry.listener.execution_mode();
            let task = self.delivery_task(entry, event.clone());
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

    /// Re-invokes only the listener currently registered for `group`.
    ///
    /// Never forwards to other groups, key listeners, or other cluster nodes.
    pub(crate) async fn redeliver(
        &self,
        group: &dyn Group,
        event: &EventRef,
    ) -> Result<(), BusError> {
        let entry = {
            let map = self.registrations.read().await;
            map.get(&group.as_string()).cloned()
        }
        .ok_or_else(|| BusError::GroupRegistrationNotFound {
            group: group.as_string(),
        })?;

        if !entry.listener.is_handling(event.as_ref()) {
            return Ok(());
        }

        match entry.listener.execution_mode() {
            ExecutionMode::Synchronous => self.delivery_task(entry, event.clone()).await,
            ExecutionMode::Asynchronous => {
                tokio::spawn(self.delivery_task(entry, event.clone()));
            }
        }
        Ok(())
    }

    fn delivery_task(
        &self,
        entry: GroupEntry,
        event: EventRef,
    ) -> impl Future<Output = ()> + Send + 'static {
        deliver_with_retries(
            self.executor.clone(),
            self.retry,
            self.dead_letters.clone(),
            entry,
            event,
        )
    }
}

/// Runs one group delivery to completion: initial attempt, retries with
/// backoff, and the dead-letter fallback. Never returns an error — exhausted
/// failures end in the store, not at the caller.
async fn deliver_with_retries(
    executor: ListenerExecutor,
    retry: RetryBackoff,
    dead_letters: Arc<dyn EventDeadLetters>,
    entry: GroupEntry,
    event: EventRef,
) {
    let group_name = entry.group.as_string();
    let mut attempt: u32 = 0;

    loop {
        match executor.invoke(entry.listener.as_ref(), event.as_ref()).await {
            Ok(()) => return,
            Err(err) if attempt < retry.max_retries() => {
                attempt += 1;
                log::warn!(
                    "group listener failed, retry scheduled: group={group_name} event_id={} attempt={attempt} error={err}",
                    event.event_id(),
                );
                time::sleep(retry.delay(attempt)).await;
            }
            Err(err) => {
                log::error!(
                    "group listener exhausted retries: group={group_name} event_id={} label={} error={err}",
                    event.event_id(),
                    err.as_label(),
                );
                match dead_letters.store(entry.group.clone(), event.clone()).await {
                    Ok(insertion_id) => log::warn!(
                        "event stored as dead letter: group={group_name} insertion_id={insertion_id}"
                    ),
                    Err(store_err) => log::error!(
                        "dead letter store failed, event lost: group={group_name} event_id={} error={store_err}",
                        event.event_id(),
                    ),
                }
                return;
            }
        }
    }
}
