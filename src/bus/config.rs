//! # Bus configuration.
//!
//! Provides [`BusConfig`], the per-instance settings of an
//! [`EventBus`](crate::EventBus).
//!
//! ## Field semantics
//! - `execution_rate`: bound on concurrently in-flight listener invocations
//!   (clamped to a minimum of 1; there is no "unlimited" sentinel — the gate
//!   exists to protect downstream resources)
//! - `retry`: backoff curve applied to failing group listeners

use crate::policies::RetryBackoff;

/// Per-instance configuration of an event bus.
#[derive(Clone, Debug)]
pub struct BusConfig {
    /// Maximum number of listener invocations in flight at once.
    ///
    /// Shared by every invocation the bus issues — group or key, synchronous
    /// or asynchronous. Callers over the bound queue, they are never
    /// rejected.
    pub execution_rate: usize,

    /// Retry backoff applied to group-listener failures.
    pub retry: RetryBackoff,
}

impl BusConfig {
    /// Default bound on concurrent listener invocations.
    pub const EXECUTION_RATE: usize = 16;

    /// Returns the execution rate clamped to a minimum of 1.
    #[inline]
    pub fn execution_rate_clamped(&self) -> usize {
        self.execution_rate.max(1)
    }
}

impl Default for BusConfig {
    /// Default configuration:
    ///
    /// - `execution_rate = 16`
    /// - `retry = RetryBackoff::default()` (8 retries, 100ms first backoff,
    ///   jitter factor 0.5)
    fn default() -> Self {
        Self {
            execution_rate: Self::EXECUTION_RATE,
            retry: RetryBackoff::default(),
        }
    }
}
