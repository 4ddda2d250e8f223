//! # mailbus
//!
//! **mailbus** is the event dispatch core of a mail-server platform: an
//! in-process publish/subscribe bus delivering domain events to durable
//! **group** listeners and ephemeral **key**-scoped listeners, with
//! at-least-once delivery to groups, isolation of listener failures, bounded
//! concurrency, and a retry-then-dead-letter recovery path.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!              dispatch(event, keys)
//!                       │
//!              ┌────────▼────────┐
//!              │    EventBus     │ drops noop events
//!              └──┬───────────┬──┘
//!                 ▼           ▼
//! ┌───────────────────┐   ┌───────────────────┐   ┌──────────────────┐
//! │ GroupRegistration │   │  KeyRegistration  │   │ EventBusTransport│
//! │       Pool        │   │       Pool        │   │ (cluster fan-out)│
//! │  one listener per │   │  many listeners   │   └──────────────────┘
//! │  Group, always    │   │  per key, union   │
//! │  notified         │   │  over the key set │
//! └────────┬──────────┘   └────────┬──────────┘
//!          │    both gated by the admission semaphore (EXECUTION_RATE)
//!          ▼                       ▼
//!   retry w/ backoff          invoke once per listener,
//!          │                  failures logged & dropped
//!          ▼
//!   EventDeadLetters  ◄── redeliver(group, event) picks entries back up
//! ```
//!
//! ### Delivery semantics
//! ```text
//! dispatch(event, keys):
//!   ├─ event.is_noop()            → nobody is notified
//!   ├─ every registered Group     → listener invoked (any keys)
//!   ├─ listeners under keys       → invoked once each, however many keys match
//!   ├─ Synchronous listeners      → awaited before dispatch resolves
//!   ├─ Asynchronous listeners     → fire-and-forget
//!   └─ listener failure           → group: retry → dead letter
//!                                   key:   logged, dropped
//! ```
//!
//! ## Features
//! | Area               | Description                                             | Key types / traits                          |
//! |--------------------|---------------------------------------------------------|---------------------------------------------|
//! | **Listeners**      | Handle events from group or key registrations.          | [`EventListener`], [`GroupEventListener`]   |
//! | **Identities**     | Durable groups and ephemeral keys, string round-trips.  | [`Group`], [`RegistrationKey`], registries  |
//! | **Dead letters**   | Park events that exhausted retries, per group.          | [`EventDeadLetters`], [`InsertionId`]       |
//! | **Retry policy**   | Exponential backoff with jitter for group delivery.     | [`RetryBackoff`]                            |
//! | **Health**         | Derived status from the dead-letter store.              | [`EventDeadLettersHealthCheck`]             |
//! | **Serialization**  | Textual event form for administrative tooling.          | [`EventSerializer`], [`EventCodec`]         |
//!
//! ## Example
//! ```rust
//! use std::any::Any;
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use mailbus::{
//!     BusConfig, Event, EventBus, EventId, EventListener, GenericGroup, ListenerError,
//!     MemoryEventDeadLetters, Username,
//! };
//!
//! #[derive(Debug)]
//! struct MessageAppended {
//!     id: EventId,
//!     username: Username,
//! }
//!
//! impl Event for MessageAppended {
//!     fn event_id(&self) -> EventId {
//!         self.id
//!     }
//!     fn username(&self) -> &Username {
//!         &self.username
//!     }
//!     fn as_any(&self) -> &dyn Any {
//!         self
//!     }
//! }
//!
//! struct Indexer;
//!
//! #[async_trait]
//! impl EventListener for Indexer {
//!     async fn handle(&self, event: &dyn Event) -> Result<(), ListenerError> {
//!         println!("indexing event {} of {}", event.event_id(), event.username());
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let bus = EventBus::new(
//!         BusConfig::default(),
//!         Arc::new(MemoryEventDeadLetters::new()),
//!     );
//!
//!     let registration = bus
//!         .register(Arc::new(Indexer), Arc::new(GenericGroup::of("indexer")))
//!         .await?;
//!
//!     bus.dispatch(
//!         Arc::new(MessageAppended {
//!             id: EventId::random(),
//!             username: Username::of("alice"),
//!         }),
//!         &[],
//!     )
//!     .await;
//!
//!     registration.unregister().await;
//!     Ok(())
//! }
//! ```

mod bus;
mod deadletters;
mod error;
mod events;
mod listener;
mod policies;
mod registrations;

#[cfg(test)]
pub(crate) mod fixtures;

// ---- Public re-exports ----

pub use bus::{BusConfig, EventBus, EventBusTransport, LocalOnlyTransport};
pub use deadletters::{
    EventDeadLetters, EventDeadLettersHealthCheck, HealthResult, InsertionId,
    MemoryEventDeadLetters,
};
pub use error::{
    BusError, DeadLetterError, GroupDeserializationError, KeyDeserializationError, ListenerError,
    RegistryError, RetryBackoffError, SerializerError, TransportError,
};
pub use events::{Event, EventCodec, EventId, EventRef, EventSerializer, JsonEventSerializer, Username};
pub use listener::{EventListener, ExecutionMode, GroupEventListener, ListenerRef};
pub use policies::RetryBackoff;
pub use registrations::{
    GenericGroup, Group, GroupFactory, GroupRef, GroupRegistry, KeyFactory, KeyRef, KeyRegistry,
    Registration, RegistrationKey,
};
