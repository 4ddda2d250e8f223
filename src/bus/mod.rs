//! Bus core: admission control, the two registration pools, and the facade.
//!
//! The only public API from this module is [`EventBus`] (with its
//! [`BusConfig`] and the [`EventBusTransport`] seam); the pools and the
//! executor are internal.
//!
//! Internal modules:
//! - [`delivery`]: admission gate + panic isolation around every invocation;
//! - [`key_pool`]: key-scoped delivery;
//! - [`group_pool`]: group delivery with retry and dead letters;
//! - [`event_bus`]: the facade composing the above.

mod config;
mod delivery;
mod event_bus;
mod group_pool;
mod key_pool;
mod transport;

pub use config::BusConfig;
pub use event_bus::EventBus;
pub use transport::{EventBusTransport, LocalOnlyTransport};
