//! Command dispatcher — evaluates, publishes and optionally confirms orders.
//!
//! ```text
//! send_order(id, status, timeout?)
//!   ├─ device already in `status`      → EXISTING        (no publish)
//!   ├─ fenced (turning on only)        → *_FENCED        (no publish)
//!   ├─ publish desired state
//!   ├─ no timeout                      → UNCONFIRMED
//!   └─ wait ≤ timeout for registry     → CONFIRMED | FAILED
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::{Instant, sleep_until};

use gardenhub_domain::device::Device;
use gardenhub_domain::error::{GardenHubError, NotFoundError};
use gardenhub_domain::fence::FenceVerdict;
use gardenhub_domain::id::DeviceId;
use gardenhub_domain::order::OrderOutcome;
use gardenhub_domain::shadow::ShadowEvent;

use crate::ports::{DeviceRepository, OrderSender, ShadowTransport, WeatherProvider};
use crate::services::fence_evaluator::FenceEvaluator;
use crate::status_bus::{self, InProcessStatusBus, StatusChange};

/// Interval between registry reads while waiting for confirmation.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Upper bound for confirmation waits, about thirty years.
const MAX_WAIT: Duration = Duration::from_secs(86_400 * 365 * 30);

/// Application service behind the command API.
pub struct CommandDispatcher<R, T, W> {
    repo: R,
    transport: T,
    fences: FenceEvaluator<R, W>,
    status_bus: Option<Arc<InProcessStatusBus>>,
    poll_interval: Duration,
}

impl<R, T, W> CommandDispatcher<R, T, W>
where
    R: DeviceRepository + Clone,
    T: ShadowTransport,
    W: WeatherProvider,
{
    /// Create a dispatcher polling every [`DEFAULT_POLL_INTERVAL`].
    pub fn new(repo: R, transport: T, weather: W) -> Self {
        Self {
            fences: FenceEvaluator::new(repo.clone(), weather),
            repo,
            transport,
            status_bus: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Wake confirmation waits as soon as the reconciler reports a change,
    /// instead of on the next poll tick.
    #[must_use]
    pub fn with_status_bus(mut self, bus: Arc<InProcessStatusBus>) -> Self {
        self.status_bus = Some(bus);
        self
    }

    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Evaluate an order and publish it when allowed.
    ///
    /// The returned future only reads while waiting and can be dropped at
    /// any point, so callers may bound it with their own request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`GardenHubError::NotFound`] when the device does not exist,
    /// [`GardenHubError::Transport`] when publishing fails, or a storage
    /// error from the registry.
    #[tracing::instrument(skip(self))]
    pub async fn send_order(
        &self,
        device_id: DeviceId,
        status: bool,
        timeout: Option<Duration>,
    ) -> Result<OrderOutcome, GardenHubError> {
        let device = self.get_device(device_id).await?;

        if device.status == status {
            tracing::info!("device already in requested state");
            return Ok(OrderOutcome::existing(status));
        }

        match self.fences.evaluate(&device, status).await? {
            FenceVerdict::Allow => {}
            FenceVerdict::DeviceFenced(blocking) => {
                return Ok(OrderOutcome::device_fenced(blocking));
            }
            FenceVerdict::WeatherFenced => return Ok(OrderOutcome::weather_fenced()),
        }

        // Subscribe before publishing so a fast device cannot slip past us.
        let updates = timeout
            .and(self.status_bus.as_ref())
            .map(|bus| bus.subscribe());

        self.transport
            .publish(ShadowEvent::desired(device_id, status))
            .await?;
        tracing::info!("desired state published");

        match timeout {
            None => Ok(OrderOutcome::unconfirmed()),
            Some(timeout) => self.confirm(device_id, status, timeout, updates).await,
        }
    }

    async fn confirm(
        &self,
        device_id: DeviceId,
        desired: bool,
        timeout: Duration,
        mut updates: Option<broadcast::Receiver<StatusChange>>,
    ) -> Result<OrderOutcome, GardenHubError> {
        let deadline = far_instant(timeout);
        if Instant::now() >= deadline {
            return Ok(OrderOutcome::failed());
        }

        loop {
            let wake_at = far_instant(self.poll_interval).min(deadline);
            let bus_closed = match updates.as_mut() {
                Some(rx) => tokio::select! {
                    () = sleep_until(wake_at) => false,
                    alive = status_bus::changed(rx, device_id) => !alive,
                },
                None => {
                    sleep_until(wake_at).await;
                    false
                }
            };
            if bus_closed {
                updates = None;
            }

            let current = self.get_device(device_id).await?;
            if current.status == desired {
                tracing::info!("device status confirmed");
                return Ok(OrderOutcome::confirmed());
            }
            if Instant::now() >= deadline {
                tracing::warn!(timeout_secs = timeout.as_secs(), "device status not confirmed");
                return Ok(OrderOutcome::failed());
            }
        }
    }

    async fn get_device(&self, id: DeviceId) -> Result<Device, GardenHubError> {
        self.repo.get_by_id(id).await?.ok_or_else(|| {
            NotFoundError {
                entity: "Device",
                id: id.to_string(),
            }
            .into()
        })
    }
}

/// `now + wait`, saturated at [`MAX_WAIT`] so oversized waits never overflow.
fn far_instant(wait: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(wait.min(MAX_WAIT)).unwrap_or(now)
}

impl<R, T, W> OrderSender for CommandDispatcher<R, T, W>
where
    R: DeviceRepository + Clone + Send + Sync,
    T: ShadowTransport + Send + Sync,
    W: WeatherProvider + Send + Sync,
{
    async fn send_order(
        &self,
        device_id: DeviceId,
        status: bool,
        timeout: Option<Duration>,
    ) -> Result<OrderOutcome, GardenHubError> {
        CommandDispatcher::send_order(self, device_id, status, timeout).await
    }
}
