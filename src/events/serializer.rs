//! # Event (de)serialization for administrative tooling.
//!
//! The dispatch path never serializes events; this module exists for the
//! surfaces around the bus — dead-letter inspection, redelivery endpoints,
//! cluster transports — that need a stable textual form.
//!
//! [`JsonEventSerializer`] wraps each event in a small JSON envelope:
//!
//! ```text
//! {"type": "<codec kind>", "event": {...codec-specific...}}
//! ```
//!
//! Codecs are registered per event type ([`EventCodec`]) and looked up by the
//! `type` tag on the way in, and by [`EventCodec::handles`] on the way out.
//! An unknown tag is an error, never a silent default.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::error::{RegistryError, SerializerError};
use crate::events::event::{Event, EventRef};

/// Converts events to and from their textual form.
pub trait EventSerializer: Send + Sync {
    /// Serializes the event to JSON.
    fn to_json(&self, event: &dyn Event) -> Result<String, SerializerError>;

    /// Reconstructs an event from JSON produced by [`to_json`](Self::to_json).
    fn from_json(&self, json: &str) -> Result<EventRef, SerializerError>;
}

/// Per-event-type codec plugged into [`JsonEventSerializer`].
pub trait EventCodec: Send + Sync + 'static {
    /// Stable type tag written to the envelope.
    fn kind(&self) -> &'static str;

    /// True when this codec can encode the given event.
    fn handles(&self, event: &dyn Event) -> bool;

    /// Encodes the event body (without the envelope).
    fn encode(&self, event: &dyn Event) -> Result<Value, SerializerError>;

    /// Decodes the event body (without the envelope).
    fn decode(&self, value: &Value) -> Result<EventRef, SerializerError>;
}

/// JSON serializer routing through registered codecs.
pub struct JsonEventSerializer {
    codecs: HashMap<&'static str, Arc<dyn EventCodec>>,
}

impl JsonEventSerializer {
    /// Creates a serializer with no codecs registered.
    pub fn new() -> Self {
        Self {
            codecs: HashMap::new(),
        }
    }

    /// Registers a codec under its type tag.
    pub fn register(&mut self, codec: Arc<dyn EventCodec>) -> Result<(), RegistryError> {
        let kind = codec.kind();
        if kind.is_empty() {
            return Err(RegistryError::InvalidTag { tag: kind.into() });
        }
        if self.codecs.contains_key(kind) {
            return Err(RegistryError::DuplicateTag { tag: kind.into() });
        }
        self.codecs.insert(kind, codec);
        Ok(())
    }
}

impl Default for JsonEventSerializer {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSerializer for JsonEventSerializer {
    fn to_json(&self, event: &dyn Event) -> Result<String, SerializerError> {
        let codec = self
            .codecs
            .values()
            .find(|c| c.handles(event))
            .ok_or(SerializerError::UnsupportedEvent)?;

        let body = codec.encode(event)?;
        let envelope = serde_json::json!({
            "type": codec.kind(),
            "event": body,
        });
        serde_json::to_string(&envelope).map_err(|e| SerializerError::Codec {
            reason: e.to_string(),
        })
    }

    fn from_json(&self, json: &str) -> Result<EventRef, SerializerError> {
        let envelope: Value = serde_json::from_str(json).map_err(|e| SerializerError::Malformed {
            reason: e.to_string(),
        })?;

        let kind = envelope
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| SerializerError::Malformed {
                reason: "missing type tag".into(),
            })?;
        let body = envelope
            .get("event")
            .ok_or_else(|| SerializerError::Malformed {
                reason: "missing event body".into(),
            })?;

        let codec = self
            .codecs
            .get(kind)
            .ok_or_else(|| SerializerError::UnknownEventType { kind: kind.into() })?;
        codec.decode(body)
    }
}
