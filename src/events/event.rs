//! # Domain events carried by the bus.
//!
//! The [`Event`] trait is the contract every domain event satisfies. Beyond
//! its three intrinsic properties — a globally unique [`EventId`], the owning
//! [`Username`], and the noop flag — an event is an opaque payload to the bus:
//! routing never inspects it, listeners do.
//!
//! Events are shared as [`EventRef`] (`Arc<dyn Event>`) so one dispatch can
//! hand the same instance to many concurrent listeners without copying.
//!
//! ## Rules
//! - Events are immutable once constructed.
//! - `is_noop() == true` means the event carries nothing listeners care
//!   about; the bus drops it before any delivery.
//! - The bus never persists events, except as dead letters.

use std::any::Any;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use uuid::Uuid;

/// Shared handle to a domain event.
pub type EventRef = Arc<dyn Event>;

/// # A domain event.
///
/// Implementors supply identity, ownership, and the noop flag; everything
/// else is payload that only listeners (and registered
/// [`EventCodec`](crate::EventCodec)s) understand.
///
/// # Example
/// ```
/// use std::any::Any;
/// use mailbus::{Event, EventId, Username};
///
/// #[derive(Debug)]
/// struct MailboxAdded {
///     id: EventId,
///     username: Username,
///     mailbox: String,
/// }
///
/// impl Event for MailboxAdded {
///     fn event_id(&self) -> EventId {
///         self.id
///     }
///
///     fn username(&self) -> &Username {
///         &self.username
///     }
///
///     fn as_any(&self) -> &dyn Any {
///         self
///     }
/// }
/// ```
pub trait Event: fmt::Debug + Send + Sync + 'static {
    /// Globally unique identifier of this event instance.
    fn event_id(&self) -> EventId;

    /// The principal this event belongs to.
    fn username(&self) -> &Username;

    /// True when the event carries no listener-relevant payload.
    ///
    /// Noop events are filtered by the bus and never reach any listener.
    fn is_noop(&self) -> bool {
        false
    }

    /// Concrete-type access for [`EventCodec`](crate::EventCodec)s.
    fn as_any(&self) -> &dyn Any;
}

/// Unique identifier of a single event instance.
///
/// Random UUIDs; equality by value. The string form round-trips through
/// [`FromStr`], which administrative tooling relies on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EventId(Uuid);

impl EventId {
    /// Mints a fresh random id.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for EventId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// The principal owning an event.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Username(String);

impl Username {
    /// Wraps the given name.
    pub fn of(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The raw name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
