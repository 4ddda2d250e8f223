//! Listener identities and registration handles.
//!
//! ## Contents
//! - [`Group`], [`GenericGroup`], [`GroupRegistry`] — durable, uniquely
//!   claimed identities with factory-based reconstruction.
//! - [`RegistrationKey`], [`KeyRegistry`] — ephemeral many-to-many routing
//!   tags.
//! - [`Registration`] — idempotent unregister handle.

mod group;
mod key;
mod registration;

pub use group::{GenericGroup, Group, GroupFactory, GroupRef, GroupRegistry};
pub use key::{KeyFactory, KeyRef, KeyRegistry, RegistrationKey};
pub use registration::Registration;
