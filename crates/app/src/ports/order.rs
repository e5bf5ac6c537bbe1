//! Order port — the command API consumed by front ends and by the timer
//! fence.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use gardenhub_domain::error::GardenHubError;
use gardenhub_domain::id::DeviceId;
use gardenhub_domain::order::OrderOutcome;

/// Send a desired on/off state to a device.
pub trait OrderSender {
    /// Evaluate and, when allowed, publish the order. With a `timeout`, wait
    /// up to that long for the device to report the new state.
    fn send_order(
        &self,
        device_id: DeviceId,
        status: bool,
        timeout: Option<Duration>,
    ) -> impl Future<Output = Result<OrderOutcome, GardenHubError>> + Send;
}

impl<T: OrderSender + Send + Sync> OrderSender for Arc<T> {
    fn send_order(
        &self,
        device_id: DeviceId,
        status: bool,
        timeout: Option<Duration>,
    ) -> impl Future<Output = Result<OrderOutcome, GardenHubError>> + Send {
        (**self).send_order(device_id, status, timeout)
    }
}
