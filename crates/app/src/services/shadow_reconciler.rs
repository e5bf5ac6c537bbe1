//! Shadow reconciler — keeps the registry in line with what devices report
//! and fans every shadow change out to subscribers.

use std::sync::Arc;

use gardenhub_domain::error::{GardenHubError, NotFoundError};
use gardenhub_domain::notification::Notification;
use gardenhub_domain::shadow::ShadowEvent;

use crate::ports::{DeviceRepository, Notifier};
use crate::status_bus::{InProcessStatusBus, StatusChange};

/// Sole writer of a device's `status`.
pub struct ShadowReconciler<R, N> {
    repo: R,
    notifier: N,
    status_bus: Option<Arc<InProcessStatusBus>>,
}

impl<R, N> ShadowReconciler<R, N>
where
    R: DeviceRepository,
    N: Notifier,
{
    pub fn new(repo: R, notifier: N) -> Self {
        Self {
            repo,
            notifier,
            status_bus: None,
        }
    }

    /// Announce persisted status changes on `bus`.
    #[must_use]
    pub fn with_status_bus(mut self, bus: Arc<InProcessStatusBus>) -> Self {
        self.status_bus = Some(bus);
        self
    }

    /// Forward `event` to the notifier and, for reported events only,
    /// persist the reported status.
    ///
    /// Desired events are intent, not fact, and never touch the registry.
    /// Re-delivering the same reported event is harmless.
    ///
    /// # Errors
    ///
    /// Returns [`GardenHubError::NotFound`] for an unknown device, or any
    /// notifier / storage error.
    #[tracing::instrument(
        skip(self),
        fields(action = %event.action(), device_id = %event.device_id())
    )]
    pub async fn dispatch(&self, event: ShadowEvent) -> Result<(), GardenHubError> {
        let device_id = event.device_id();
        if self.repo.get_by_id(device_id).await?.is_none() {
            return Err(NotFoundError {
                entity: "Device",
                id: device_id.to_string(),
            }
            .into());
        }

        self.notifier.notify(Notification::new(event)).await?;

        if let ShadowEvent::Reported(state) = event {
            self.repo.set_status(device_id, state.is_on).await?;
            tracing::info!(is_on = state.is_on, "reported status stored");
            if let Some(bus) = &self.status_bus {
                bus.publish(StatusChange {
                    device_id,
                    is_on: state.is_on,
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{InMemoryDeviceRepo, RecordingNotifier};
    use gardenhub_domain::device::Device;
    use gardenhub_domain::id::DeviceId;

    fn pool() -> Device {
        Device::builder()
            .name("Pool")
            .position(1)
            .gpio(4)
            .build()
            .unwrap()
    }

    fn setup(
        device: Device,
    ) -> (
        ShadowReconciler<Arc<InMemoryDeviceRepo>, Arc<RecordingNotifier>>,
        Arc<InMemoryDeviceRepo>,
        Arc<RecordingNotifier>,
    ) {
        let repo = Arc::new(InMemoryDeviceRepo::with([device]));
        let notifier = Arc::new(RecordingNotifier::default());
        let reconciler = ShadowReconciler::new(Arc::clone(&repo), Arc::clone(&notifier));
        (reconciler, repo, notifier)
    }

    #[tokio::test]
    async fn should_store_status_from_reported_event() {
        let device = pool();
        let id = device.id;
        let (reconciler, repo, _) = setup(device);

        reconciler
            .dispatch(ShadowEvent::reported(id, true))
            .await
            .unwrap();

        assert_eq!(repo.status_of(id), Some(true));
    }

    #[tokio::test]
    async fn should_not_touch_status_for_desired_event() {
        let device = pool();
        let id = device.id;
        let (reconciler, repo, notifier) = setup(device);

        reconciler
            .dispatch(ShadowEvent::desired(id, true))
            .await
            .unwrap();

        assert_eq!(repo.status_of(id), Some(false));
        assert_eq!(notifier.sent().len(), 1);
    }

    #[tokio::test]
    async fn should_notify_for_every_event() {
        let device = pool();
        let id = device.id;
        let (reconciler, _, notifier) = setup(device);

        reconciler
            .dispatch(ShadowEvent::desired(id, true))
            .await
            .unwrap();
        reconciler
            .dispatch(ShadowEvent::reported(id, true))
            .await
            .unwrap();

        let sent = notifier.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].attributes()["action"], "desired");
        assert_eq!(sent[1].attributes()["action"], "reported");
    }

    #[tokio::test]
    async fn should_be_idempotent_on_duplicate_reported_event() {
        let device = pool();
        let id = device.id;
        let (reconciler, repo, _) = setup(device);

        for _ in 0..2 {
            reconciler
                .dispatch(ShadowEvent::reported(id, true))
                .await
                .unwrap();
        }

        assert_eq!(repo.status_of(id), Some(true));
    }

    #[tokio::test]
    async fn should_return_not_found_for_unknown_device() {
        let (reconciler, _, notifier) = setup(pool());

        let result = reconciler
            .dispatch(ShadowEvent::reported(DeviceId::new(), true))
            .await;

        assert!(matches!(result, Err(GardenHubError::NotFound(_))));
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn should_announce_reported_change_on_status_bus() {
        let device = pool();
        let id = device.id;
        let (reconciler, _, _) = setup(device);
        let bus = Arc::new(InProcessStatusBus::new(4));
        let mut rx = bus.subscribe();
        let reconciler = reconciler.with_status_bus(bus);

        reconciler
            .dispatch(ShadowEvent::reported(id, true))
            .await
            .unwrap();

        assert_eq!(
            rx.recv().await.unwrap(),
            StatusChange {
                device_id: id,
                is_on: true
            }
        );
    }
}
