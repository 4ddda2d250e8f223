//! # Registration keys: ephemeral, many-to-many routing tags.
//!
//! A [`RegistrationKey`] scopes delivery: listeners subscribe to zero or more
//! keys, and a dispatch names the keys its event is relevant to. Unlike
//! groups, keys are not claimed — any number of listeners may sit behind one
//! key, and one listener may sit behind many.
//!
//! ## Serialized form
//! `"<kind>:<value>"`. Each concrete key kind owns a [`KeyFactory`]
//! discoverable by kind tag in a [`KeyRegistry`]; an unrecognized string is a
//! deserialization error, never a silent default.

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::error::{KeyDeserializationError, RegistryError};

/// Shared handle to a registration key.
pub type KeyRef = Arc<dyn RegistrationKey>;

/// # A routing tag for key-scoped delivery.
///
/// Equality is by value: same kind, same value part.
pub trait RegistrationKey: fmt::Debug + Send + Sync + 'static {
    /// Stable kind tag, unique per concrete key type. Must not contain `:`.
    fn kind(&self) -> &'static str;

    /// The value part of the serialized form.
    fn value(&self) -> String;

    /// Stable serialized form: `"<kind>:<value>"`.
    fn as_string(&self) -> String {
        format!("{}:{}", self.kind(), self.value())
    }
}

impl PartialEq for dyn RegistrationKey {
    fn eq(&self, other: &Self) -> bool {
        self.kind() == other.kind() && self.value() == other.value()
    }
}

impl Eq for dyn RegistrationKey {}

impl Hash for dyn RegistrationKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind().hash(state);
        self.value().hash(state);
    }
}

/// Reconstructs one key kind from the value part of its serialized form.
pub trait KeyFactory: Send + Sync + 'static {
    /// The kind tag this factory owns.
    fn kind(&self) -> &'static str;

    /// Builds a key from the value part.
    fn from_string(&self, value: &str) -> Result<KeyRef, KeyDeserializationError>;
}

/// Kind → factory mapping used to reconstruct keys from their serialized form.
///
/// Populated at startup by each module defining key kinds.
pub struct KeyRegistry {
    factories: HashMap<&'static str, Arc<dyn KeyFactory>>,
}

impl KeyRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Registers a factory under its kind tag.
    ///
    /// Tags must be non-empty, free of `:`, and unique within the registry.
    pub fn register(&mut self, factory: Arc<dyn KeyFactory>) -> Result<(), RegistryError> {
        let tag = factory.kind();
        if tag.is_empty() || tag.contains(':') {
            return Err(RegistryError::InvalidTag { tag: tag.into() });
        }
        if self.factories.contains_key(tag) {
            return Err(RegistryError::DuplicateTag { tag: tag.into() });
        }
        self.factories.insert(tag, factory);
        Ok(())
    }

    /// Reconstructs a key from its serialized form, split at the first `:`.
    pub fn deserialize(&self, serialized: &str) -> Result<KeyRef, KeyDeserializationError> {
        if serialized.is_empty() {
            return Err(KeyDeserializationError::Empty);
        }

        let (kind, value) =
            serialized
                .split_once(':')
                .ok_or_else(|| KeyDeserializationError::Malformed {
                    value: serialized.into(),
                    reason: "expected <kind>:<value>".into(),
                })?;

        match self.factories.get(kind) {
            Some(factory) => factory.from_string(value),
            None => Err(KeyDeserializationError::UnknownKey { kind: kind.into() }),
        }
    }
}

impl Default for KeyRegistry {
    fn default() -> Self {
        Self::new()
    }
}
