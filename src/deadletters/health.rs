//! Platform health derived from the dead-letter store.
//!
//! Pure derived state: a check queries [`EventDeadLetters::contain_events`]
//! and maps the answer to a status, with no side effects.

use std::sync::Arc;

use crate::deadletters::EventDeadLetters;

/// Advisory attached to the degraded status.
const DEGRADED_MESSAGE: &str =
    "EventDeadLetters contain events. This might indicate transient failures during event processing.";

/// Outcome of a health check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HealthResult {
    /// No dead letters anywhere.
    Healthy,
    /// At least one dead letter exists; delivery keeps working, but events
    /// have been parked for an administrator.
    Degraded {
        /// Fixed advisory message.
        message: String,
    },
    /// The store query itself failed.
    Unhealthy {
        /// Store-provided detail.
        cause: String,
    },
}

impl HealthResult {
    /// True only for [`HealthResult::Healthy`].
    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthResult::Healthy)
    }
}

/// Health check over an [`EventDeadLetters`] store.
pub struct EventDeadLettersHealthCheck {
    dead_letters: Arc<dyn EventDeadLetters>,
}

impl EventDeadLettersHealthCheck {
    /// Creates a check over the given store.
    pub fn new(dead_letters: Arc<dyn EventDeadLetters>) -> Self {
        Self { dead_letters }
    }

    /// Stable component name for health reporting surfaces.
    pub fn component_name(&self) -> &'static str {
        "event-dead-letters"
    }

    /// Queries the store and derives the status.
    pub async fn check(&self) -> HealthResult {
        match self.dead_letters.contain_events().await {
            Ok(false) => HealthResult::Healthy,
            Ok(true) => HealthResult::Degraded {
                message: DEGRADED_MESSAGE.to_string(),
            },
            Err(err) => HealthResult::Unhealthy {
                cause: err.to_string(),
            },
        }
    }
}
