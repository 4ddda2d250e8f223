//! Error types used by the mailbus runtime and its collaborators.
//!
//! This module defines the error enums for every surface of the crate:
//!
//! - [`BusError`] — registration conflicts and redelivery misses.
//! - [`GroupDeserializationError`] / [`KeyDeserializationError`] — failures
//!   reconstructing identities from their serialized form.
//! - [`RegistryError`] — invalid factory registrations at startup.
//! - [`ListenerError`] — failures of individual listener invocations.
//! - [`DeadLetterError`] — failures of the dead-letter store.
//! - [`SerializerError`] — event (de)serialization failures.
//! - [`TransportError`] — cluster fan-out failures.
//! - [`RetryBackoffError`] — invalid retry configuration.
//!
//! Listener failures never propagate to dispatch callers: they are captured
//! per invocation and routed to the retry/dead-letter path (group listeners)
//! or logged and dropped (key listeners). The enums that show up in logs
//! provide `as_label` for stable snake_case labels.

use thiserror::Error;

/// # Errors surfaced by the event bus API.
///
/// These are the only failures a bus caller can observe: conflicts when
/// claiming a [`Group`](crate::Group) and misses when redelivering to one.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum BusError {
    /// A second listener attempted to claim a group that already has a live one.
    #[error("group {group} already has a registered listener")]
    GroupAlreadyRegistered {
        /// Serialized form of the contested group.
        group: String,
    },

    /// Redelivery targeted a group with no locally registered listener.
    #[error("no listener registered for group {group}")]
    GroupRegistrationNotFound {
        /// Serialized form of the missing group.
        group: String,
    },
}

impl BusError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use mailbus::BusError;
    ///
    /// let err = BusError::GroupAlreadyRegistered { group: "generic-a".into() };
    /// assert_eq!(err.as_label(), "group_already_registered");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            BusError::GroupAlreadyRegistered { .. } => "group_already_registered",
            BusError::GroupRegistrationNotFound { .. } => "group_registration_not_found",
        }
    }
}

/// Failure to reconstruct a [`Group`](crate::Group) from its serialized form.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum GroupDeserializationError {
    /// The serialized form was empty.
    #[error("empty group name")]
    Empty,

    /// No factory is registered for the tag.
    #[error("unknown group: {tag}")]
    UnknownGroup {
        /// The unrecognized tag (or full serialized form when unsplittable).
        tag: String,
    },

    /// The kind is parameterized but the serialized form carried no parameter.
    #[error("group kind {tag} requires a parameter")]
    MissingParameter {
        /// Tag of the parameterized kind.
        tag: String,
    },

    /// The kind takes no parameter but the serialized form carried one.
    #[error("group kind {tag} does not take a parameter")]
    UnexpectedParameter {
        /// Tag of the parameterless kind.
        tag: String,
    },
}

/// Failure to reconstruct a [`RegistrationKey`](crate::RegistrationKey) from
/// its serialized form. An unrecognized string is always an error, never a
/// silent default.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum KeyDeserializationError {
    /// The serialized form was empty.
    #[error("empty registration key")]
    Empty,

    /// No factory is registered for the key kind.
    #[error("unknown registration key kind: {kind}")]
    UnknownKey {
        /// The unrecognized kind tag.
        kind: String,
    },

    /// The serialized form did not match `<kind>:<value>`, or the value part
    /// was rejected by the kind's factory.
    #[error("malformed registration key {value}: {reason}")]
    Malformed {
        /// The offending serialized form or value part.
        value: String,
        /// Factory-provided detail.
        reason: String,
    },
}

/// Invalid factory registration in a [`GroupRegistry`](crate::GroupRegistry)
/// or [`KeyRegistry`](crate::KeyRegistry).
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RegistryError {
    /// The tag is empty or contains the serialization separator.
    #[error("invalid registry tag: {tag}")]
    InvalidTag {
        /// The rejected tag.
        tag: String,
    },

    /// Another factory already claimed the tag.
    #[error("duplicate registry tag: {tag}")]
    DuplicateTag {
        /// The contested tag.
        tag: String,
    },
}

/// # Failure of a single listener invocation.
///
/// Produced inside the dispatch loop and never re-thrown to the caller: group
/// listener failures drive the retry/dead-letter path, key listener failures
/// are logged and dropped.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ListenerError {
    /// The listener returned an error.
    #[error("listener execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// The listener panicked; the panic was caught and isolated.
    #[error("listener panicked: {info}")]
    Panicked {
        /// Panic payload, downcast to a message when possible.
        info: String,
    },
}

impl ListenerError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use mailbus::ListenerError;
    ///
    /// let err = ListenerError::Fail { error: "boom".into() };
    /// assert_eq!(err.as_label(), "listener_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ListenerError::Fail { .. } => "listener_failed",
            ListenerError::Panicked { .. } => "listener_panicked",
        }
    }
}

/// Failure of an [`EventDeadLetters`](crate::EventDeadLetters) operation.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum DeadLetterError {
    /// The group argument serializes to an empty string.
    #[error("dead letter operation received an invalid group")]
    InvalidGroup,

    /// The insertion id could not be parsed.
    #[error("invalid insertion id: {value}")]
    InvalidInsertionId {
        /// The rejected input.
        value: String,
    },

    /// The backing store failed.
    #[error("dead letter store failure: {reason}")]
    Backend {
        /// Store-provided detail.
        reason: String,
    },
}

/// Failure of event (de)serialization for administrative tooling.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum SerializerError {
    /// No codec is registered for the type tag found in the payload.
    #[error("unknown event type: {kind}")]
    UnknownEventType {
        /// The unrecognized type tag.
        kind: String,
    },

    /// No registered codec recognizes the event value.
    #[error("no codec registered for this event")]
    UnsupportedEvent,

    /// The input was not a valid serialized event envelope.
    #[error("malformed event payload: {reason}")]
    Malformed {
        /// Parser detail.
        reason: String,
    },

    /// A codec accepted the event but failed to convert it.
    #[error("event codec failure: {reason}")]
    Codec {
        /// Codec-provided detail.
        reason: String,
    },
}

/// Failure of the cluster fan-out transport.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum TransportError {
    /// The underlying broker/transport rejected the fan-out.
    #[error("transport failure: {reason}")]
    Backend {
        /// Transport-provided detail.
        reason: String,
    },
}

/// Invalid [`RetryBackoff`](crate::RetryBackoff) configuration.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RetryBackoffError {
    /// The jitter factor must lie in `[0, 1)`.
    #[error("jitter factor {value} out of range [0, 1)")]
    InvalidJitterFactor {
        /// The rejected factor.
        value: f64,
    },
}
