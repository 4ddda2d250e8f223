//! # Groups: durable, uniquely-claimed listener identities.
//!
//! A [`Group`] names a durable subscription: at most one listener holds a
//! group at any time, and every non-noop event dispatched on the bus reaches
//! every registered group. Groups survive the listener — dead letters are
//! filed under the group so a later listener (or an administrator) can pick
//! the failed events back up.
//!
//! ## Serialized form
//! A group serializes to `"<kind>"` for parameterless kinds and
//! `"<kind>-<param>"` for parameterized ones. The parameter may itself
//! contain `-`; the kind tag may not. Reconstruction goes through
//! [`GroupRegistry`], an explicit tag → factory mapping populated at startup
//! by the modules defining group kinds — no runtime type discovery.
//!
//! ## Equality
//! Exact-kind equality: two groups are equal only when they share the same
//! registered kind tag and (for parameterized kinds) equal parameters. One
//! kind never compares equal to another, whatever their parameters.

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::error::{GroupDeserializationError, RegistryError};

/// Shared handle to a group identity.
pub type GroupRef = Arc<dyn Group>;

/// # A durable listener identity.
///
/// Implementors declare a stable kind tag and, for parameterized kinds, a
/// parameter. Serialization and equality are derived from those two.
///
/// # Example
/// ```
/// use mailbus::Group;
///
/// #[derive(Debug)]
/// struct QuotaGroup;
///
/// impl Group for QuotaGroup {
///     fn kind(&self) -> &'static str {
///         "quota"
///     }
/// }
///
/// assert_eq!(QuotaGroup.as_string(), "quota");
/// ```
pub trait Group: fmt::Debug + Send + Sync + 'static {
    /// Stable kind tag, unique per concrete group type. Must not contain `-`.
    fn kind(&self) -> &'static str;

    /// Parameter of a parameterized kind, `None` for parameterless kinds.
    fn param(&self) -> Option<String> {
        None
    }

    /// Stable serialized form: `"<kind>"` or `"<kind>-<param>"`.
    fn as_string(&self) -> String {
        match self.param() {
            Some(param) => format!("{}-{}", self.kind(), param),
            None => self.kind().to_string(),
        }
    }
}

impl PartialEq for dyn Group {
    fn eq(&self, other: &Self) -> bool {
        self.kind() == other.kind() && self.param() == other.param()
    }
}

impl Eq for dyn Group {}

impl Hash for dyn Group {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind().hash(state);
        self.param().hash(state);
    }
}

/// A group kind carrying an arbitrary string parameter.
///
/// Useful for ad-hoc subscriptions that do not warrant a dedicated kind.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct GenericGroup {
    param: String,
}

impl GenericGroup {
    /// Tag under which generic groups serialize.
    pub const KIND: &'static str = "generic";

    /// Creates a generic group for the given parameter.
    pub fn of(param: impl Into<String>) -> Self {
        Self {
            param: param.into(),
        }
    }
}

impl Group for GenericGroup {
    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn param(&self) -> Option<String> {
        Some(self.param.clone())
    }
}

/// Reconstructs one group kind from its serialized parameter.
pub trait GroupFactory: Send + Sync + 'static {
    /// The kind tag this factory owns.
    fn kind(&self) -> &'static str;

    /// Builds a group from the optional parameter part of the serialized form.
    ///
    /// Factories of parameterized kinds reject `None` with
    /// [`GroupDeserializationError::MissingParameter`]; parameterless kinds
    /// reject `Some` with [`GroupDeserializationError::UnexpectedParameter`].
    fn create(&self, param: Option<&str>) -> Result<GroupRef, GroupDeserializationError>;
}

struct GenericGroupFactory;

impl GroupFactory for GenericGroupFactory {
    fn kind(&self) -> &'static str {
        GenericGroup::KIND
    }

    fn create(&self, param: Option<&str>) -> Result<GroupRef, GroupDeserializationError> {
        match param {
            Some(param) => Ok(Arc::new(GenericGroup::of(param))),
            None => Err(GroupDeserializationError::MissingParameter {
                tag: GenericGroup::KIND.into(),
            }),
        }
    }
}

/// Tag → factory mapping used to reconstruct groups from their serialized form.
///
/// Populated at startup by each module defining group kinds.
/// `GroupRegistry::default()` already knows [`GenericGroup`].
pub struct GroupRegistry {
    factories: HashMap<&'static str, Arc<dyn GroupFactory>>,
}

impl GroupRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Registers a factory under its kind tag.
    ///
    /// Tags must be non-empty, free of `-`, and unique within the registry.
    pub fn register(&mut self, factory: Arc<dyn GroupFactory>) -> Result<(), RegistryError> {
        let tag = factory.kind();
        if tag.is_empty() || tag.contains('-') {
            return Err(RegistryError::InvalidTag { tag: tag.into() });
        }
        if self.factories.contains_key(tag) {
            return Err(RegistryError::DuplicateTag { tag: tag.into() });
        }
        self.factories.insert(tag, factory);
        Ok(())
    }

    /// Reconstructs a group from its serialized form.
    ///
    /// The whole string is tried as a bare tag first, then split at the first
    /// `-` into tag and parameter. Round-trips any value produced by
    /// [`Group::as_string`] for a registered kind.
    pub fn deserialize(&self, serialized: &str) -> Result<GroupRef, GroupDeserializationError> {
        if serialized.is_empty() {
            return Err(GroupDeserializationError::Empty);
        }

        if let Some(factory) = self.factories.get(serialized) {
            return factory.create(None);
        }

        match serialized.split_once('-') {
            Some((tag, param)) => match self.factories.get(tag) {
                Some(factory) => factory.create(Some(param)),
                None => Err(GroupDeserializationError::UnknownGroup { tag: tag.into() }),
            },
            None => Err(GroupDeserializationError::UnknownGroup {
                tag: serialized.into(),
            }),
        }
    }
}

impl Default for GroupRegistry {
    fn default() -> Self {
        let mut registry = Self::new();
        // The generic kind ships with the bus; tag uniqueness makes this infallible.
        let _ = registry.register(Arc::new(GenericGroupFactory));
        registry
    }
}
