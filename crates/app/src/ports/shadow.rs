//! Shadow ports — the device-shadow transport (driven) and the handler that
//! transport adapters feed incoming events into (driving).

use std::future::Future;
use std::sync::Arc;

use gardenhub_domain::error::GardenHubError;
use gardenhub_domain::shadow::ShadowEvent;

/// Publish side of the device-shadow channel.
///
/// Desired and reported events go to separate topics; the implementation
/// picks the topic from the event variant. Delivery is best-effort and
/// unordered. A failed publish must surface as
/// [`GardenHubError::Transport`], never be swallowed.
pub trait ShadowTransport {
    fn publish(&self, event: ShadowEvent) -> impl Future<Output = Result<(), GardenHubError>> + Send;
}

impl<T: ShadowTransport + Send + Sync> ShadowTransport for Arc<T> {
    fn publish(&self, event: ShadowEvent) -> impl Future<Output = Result<(), GardenHubError>> + Send {
        (**self).publish(event)
    }
}

/// Entry point for shadow events arriving from outside (MQTT subscription,
/// HTTP push).
///
/// Each call is an independent invocation; implementations must not assume
/// ordering between calls.
pub trait ShadowEventHandler: Send + Sync {
    fn handle(&self, event: ShadowEvent) -> impl Future<Output = Result<(), GardenHubError>> + Send;
}

impl<T: ShadowEventHandler> ShadowEventHandler for Arc<T> {
    fn handle(&self, event: ShadowEvent) -> impl Future<Output = Result<(), GardenHubError>> + Send {
        (**self).handle(event)
    }
}
