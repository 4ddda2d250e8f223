//! Shared fixtures for the crate's tests: events, groups, keys, and a small
//! zoo of listeners with controllable behavior.

use std::any::Any;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Barrier;

use crate::error::{GroupDeserializationError, KeyDeserializationError, ListenerError, SerializerError};
use crate::events::{Event, EventCodec, EventId, EventRef, Username};
use crate::listener::{EventListener, ExecutionMode};
use crate::registrations::{
    Group, GroupFactory, GroupRef, KeyFactory, KeyRef, RegistrationKey,
};

// ---- Events ----

#[derive(Debug)]
pub(crate) struct TestEvent {
    id: EventId,
    username: Username,
    noop: bool,
}

impl TestEvent {
    pub(crate) fn of(username: Username) -> Self {
        Self {
            id: EventId::random(),
            username,
            noop: false,
        }
    }

    pub(crate) fn with_id(id: EventId, username: Username, noop: bool) -> Self {
        Self { id, username, noop }
    }
}

impl Event for TestEvent {
    fn event_id(&self) -> EventId {
        self.id
    }

    fn username(&self) -> &Username {
        &self.username
    }

    fn is_noop(&self) -> bool {
        self.noop
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// An event kind the default listeners decline via `is_handling`.
#[derive(Debug)]
pub(crate) struct UnsupportedEvent {
    id: EventId,
    username: Username,
}

impl Event for UnsupportedEvent {
    fn event_id(&self) -> EventId {
        self.id
    }

    fn username(&self) -> &Username {
        &self.username
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub(crate) fn event() -> EventRef {
    Arc::new(TestEvent::of(Username::of("user")))
}

pub(crate) fn noop_event() -> EventRef {
    Arc::new(TestEvent::with_id(
        EventId::random(),
        Username::of("noop"),
        true,
    ))
}

pub(crate) fn unsupported_event() -> EventRef {
    Arc::new(UnsupportedEvent {
        id: EventId::random(),
        username: Username::of("user"),
    })
}

// ---- Groups ----

macro_rules! fixture_group {
    ($name:ident, $fn_name:ident, $tag:literal) => {
        #[derive(Debug)]
        pub(crate) struct $name;

        impl Group for $name {
            fn kind(&self) -> &'static str {
                $tag
            }
        }

        pub(crate) fn $fn_name() -> GroupRef {
            Arc::new($name)
        }
    };
}

fixture_group!(GroupA, group_a, "alpha");
fixture_group!(GroupB, group_b, "beta");
fixture_group!(GroupC, group_c, "gamma");

#[derive(Debug)]
pub(crate) struct StaticGroup;

impl Group for StaticGroup {
    fn kind(&self) -> &'static str {
        "static"
    }
}

pub(crate) struct StaticGroupFactory;

impl GroupFactory for StaticGroupFactory {
    fn kind(&self) -> &'static str {
        "static"
    }

    fn create(&self, param: Option<&str>) -> Result<GroupRef, GroupDeserializationError> {
        match param {
            None => Ok(Arc::new(StaticGroup)),
            Some(_) => Err(GroupDeserializationError::UnexpectedParameter {
                tag: "static".into(),
            }),
        }
    }
}

// ---- Keys ----

#[derive(Debug, Clone)]
pub(crate) struct TestKey {
    value: String,
}

impl RegistrationKey for TestKey {
    fn kind(&self) -> &'static str {
        "test"
    }

    fn value(&self) -> String {
        self.value.clone()
    }
}

pub(crate) struct TestKeyFactory;

impl KeyFactory for TestKeyFactory {
    fn kind(&self) -> &'static str {
        "test"
    }

    fn from_string(&self, value: &str) -> Result<KeyRef, KeyDeserializationError> {
        Ok(Arc::new(TestKey {
            value: value.into(),
        }))
    }
}

pub(crate) fn key(value: &str) -> KeyRef {
    Arc::new(TestKey {
        value: value.into(),
    })
}

// ---- Listeners ----

/// Counts invocations; declines [`UnsupportedEvent`]s.
pub(crate) struct CountingListener {
    calls: AtomicUsize,
}

impl CountingListener {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
        })
    }

    pub(crate) fn count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EventListener for CountingListener {
    fn is_handling(&self, event: &dyn Event) -> bool {
        event.as_any().downcast_ref::<UnsupportedEvent>().is_none()
    }

    async fn handle(&self, _event: &dyn Event) -> Result<(), ListenerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Fails the first `succeed_after` invocations, then succeeds.
pub(crate) struct FailingListener {
    calls: AtomicUsize,
    succeed_after: usize,
}

impl FailingListener {
    /// Fails every invocation.
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            succeed_after: usize::MAX,
        })
    }

    /// Fails `failures` times, then succeeds.
    pub(crate) fn succeeding_after(failures: usize) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            succeed_after: failures,
        })
    }

    pub(crate) fn count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EventListener for FailingListener {
    async fn handle(&self, _event: &dyn Event) -> Result<(), ListenerError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.succeed_after {
            Err(ListenerError::Fail {
                error: "deliberate failure".into(),
            })
        } else {
            Ok(())
        }
    }
}

/// Panics on every invocation.
pub(crate) struct PanickingListener {
    message: &'static str,
}

impl PanickingListener {
    pub(crate) fn new(message: &'static str) -> Self {
        Self { message }
    }
}

#[async_trait]
impl EventListener for PanickingListener {
    async fn handle(&self, _event: &dyn Event) -> Result<(), ListenerError> {
        panic!("{}", self.message);
    }
}

/// Sleeps inside `handle` and records the in-flight peak.
pub(crate) struct SleepingListener {
    mode: ExecutionMode,
    sleep: Duration,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl SleepingListener {
    pub(crate) fn synchronous(sleep: Duration) -> Arc<Self> {
        Self::with_mode(ExecutionMode::Synchronous, sleep)
    }

    pub(crate) fn asynchronous(sleep: Duration) -> Arc<Self> {
        Self::with_mode(ExecutionMode::Asynchronous, sleep)
    }

    fn with_mode(mode: ExecutionMode, sleep: Duration) -> Arc<Self> {
        Arc::new(Self {
            mode,
            sleep,
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        })
    }

    pub(crate) fn count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub(crate) async fn wait_for(&self, invocations: usize) {
        while self.count() < invocations {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }
}

#[async_trait]
impl EventListener for SleepingListener {
    fn execution_mode(&self) -> ExecutionMode {
        self.mode
    }

    async fn handle(&self, _event: &dyn Event) -> Result<(), ListenerError> {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        tokio::time::sleep(self.sleep).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Blocks in `handle` until every sibling on the same barrier arrived.
pub(crate) struct BarrierListener {
    barrier: Arc<Barrier>,
}

impl BarrierListener {
    pub(crate) fn shared(parties: usize) -> Arc<Barrier> {
        Arc::new(Barrier::new(parties))
    }

    pub(crate) fn on(barrier: &Arc<Barrier>) -> Arc<Self> {
        Arc::new(Self {
            barrier: barrier.clone(),
        })
    }
}

#[async_trait]
impl EventListener for BarrierListener {
    async fn handle(&self, _event: &dyn Event) -> Result<(), ListenerError> {
        self.barrier.wait().await;
        Ok(())
    }
}

// ---- Serialization ----

pub(crate) struct TestEventCodec;

impl EventCodec for TestEventCodec {
    fn kind(&self) -> &'static str {
        "test-event"
    }

    fn handles(&self, event: &dyn Event) -> bool {
        event.as_any().is::<TestEvent>()
    }

    fn encode(&self, event: &dyn Event) -> Result<Value, SerializerError> {
        let event = event
            .as_any()
            .downcast_ref::<TestEvent>()
            .ok_or(SerializerError::UnsupportedEvent)?;
        Ok(serde_json::json!({
            "eventId": event.event_id().to_string(),
            "username": event.username().as_str(),
            "noop": event.is_noop(),
        }))
    }

    fn decode(&self, value: &Value) -> Result<EventRef, SerializerError> {
        let id = value
            .get("eventId")
            .and_then(Value::as_str)
            .ok_or_else(|| SerializerError::Codec {
                reason: "missing eventId".into(),
            })?
            .parse()
            .map_err(|_| SerializerError::Codec {
                reason: "bad eventId".into(),
            })?;
        let username = value
            .get("username")
            .and_then(Value::as_str)
            .ok_or_else(|| SerializerError::Codec {
                reason: "missing username".into(),
            })?;
        let noop = value.get("noop").and_then(Value::as_bool).unwrap_or(false);
        Ok(Arc::new(TestEvent::with_id(
            id,
            Username::of(username),
            noop,
        )))
    }
}
