//! Cluster fan-out seam.
//!
//! The bus is process-local; an [`EventBusTransport`] carries dispatches to
//! the other nodes of a cluster, where each node's own pools deliver them.
//! Group delivery must reach all nodes; `redeliver` never crosses the
//! transport — it targets the local registration only.

use async_trait::async_trait;

use crate::error::TransportError;
use crate::events::EventRef;
use crate::registrations::KeyRef;

/// Carries non-noop dispatches to the rest of the cluster.
#[async_trait]
pub trait EventBusTransport: Send + Sync + 'static {
    /// Fans the event (and its key set) out to the other nodes.
    async fn fan_out(&self, event: &EventRef, keys: &[KeyRef]) -> Result<(), TransportError>;
}

/// Transport for single-node deployments: delivers nowhere, always succeeds.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalOnlyTransport;

#[async_trait]
impl EventBusTransport for LocalOnlyTransport {
    async fn fan_out(&self, _event: &EventRef, _keys: &[KeyRef]) -> Result<(), TransportError> {
        Ok(())
    }
}
