//! # Dead letters: events that exhausted group retries.
//!
//! When a group listener keeps failing past its retry budget, the bus files
//! the event here under the listener's [`Group`]. Administrators enumerate,
//! inspect, redeliver, and finally remove the entries; the bus itself only
//! ever inserts.
//!
//! The store is an externally shared capability: distributed deployments
//! point several bus instances at one backing store, so implementations must
//! tolerate concurrent access (the in-memory reference implementation is
//! [`MemoryEventDeadLetters`](crate::MemoryEventDeadLetters)).
//!
//! ## Contents
//! - [`EventDeadLetters`] — the store contract.
//! - [`InsertionId`] — addresses one failed (group, event) pair.
//! - [`EventDeadLettersHealthCheck`](crate::EventDeadLettersHealthCheck) —
//!   derived platform health status.

mod health;
mod memory;

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use futures::stream::BoxStream;
use uuid::Uuid;

use crate::error::DeadLetterError;
use crate::events::EventRef;
use crate::registrations::{Group, GroupRef};

pub use health::{EventDeadLettersHealthCheck, HealthResult};
pub use memory::MemoryEventDeadLetters;

/// Identifier minted at store time, addressing one failed (group, event) pair.
///
/// The string form round-trips through [`FromStr`] so administrative tooling
/// can address entries by id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct InsertionId(Uuid);

impl InsertionId {
    /// Mints a fresh random id.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for InsertionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for InsertionId {
    type Err = DeadLetterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| DeadLetterError::InvalidInsertionId { value: s.into() })
    }
}

/// # Per-group store of events that exhausted retries.
///
/// All operations return explicit results; a miss is a no-op or `None`, never
/// an error. Entries are keyed by (group, insertion id) and independent
/// across groups.
///
/// Concurrency contract: under interleaved `store`/`remove` from many
/// callers, the final observable state equals some serialization of the
/// individual operations — no lost updates, no phantom entries.
#[async_trait]
pub trait EventDeadLetters: Send + Sync + 'static {
    /// Persists the pair and returns a freshly minted [`InsertionId`].
    async fn store(
        &self,
        group: GroupRef,
        event: EventRef,
    ) -> Result<InsertionId, DeadLetterError>;

    /// Removes one entry; no-op when group or id is unmatched.
    async fn remove(
        &self,
        group: &dyn Group,
        insertion_id: InsertionId,
    ) -> Result<(), DeadLetterError>;

    /// Removes all entries of the group; no-op when none exist.
    async fn remove_group(&self, group: &dyn Group) -> Result<(), DeadLetterError>;

    /// Looks up one failed event without removing it.
    async fn failed_event(
        &self,
        group: &dyn Group,
        insertion_id: InsertionId,
    ) -> Result<Option<EventRef>, DeadLetterError>;

    /// Lazily enumerates the insertion ids of the group, in no particular
    /// order. Re-querying reflects current state.
    async fn failed_ids(
        &self,
        group: &dyn Group,
    ) -> Result<BoxStream<'static, InsertionId>, DeadLetterError>;

    /// Lazily enumerates the failed events of the group without removing
    /// them, in no particular order.
    async fn failed_events(
        &self,
        group: &dyn Group,
    ) -> Result<BoxStream<'static, EventRef>, DeadLetterError>;

    /// Lazily enumerates the groups holding at least one current entry.
    async fn groups_with_failed_events(
        &self,
    ) -> Result<BoxStream<'static, GroupRef>, DeadLetterError>;

    /// True iff at least one entry exists across all groups.
    async fn contain_events(&self) -> Result<bool, DeadLetterError>;
}
