//! Timer-fence controller — arms auto-shutoff runs and acts on them when
//! they fire.
//!
//! A device switched on, off and on again before its first run fires ends up
//! with two runs. Only the newest one may turn it off: when a run fires while
//! another run for the same device is still pending, the firing is stale.
//!
//! The staleness check is list-then-act and therefore racy when two runs
//! fire at nearly the same instant. The worst outcome is one extra turn-off
//! order, which is accepted rather than adding distributed locking.

use gardenhub_domain::error::{GardenHubError, NotFoundError};
use gardenhub_domain::id::DeviceId;
use gardenhub_domain::shadow::ShadowEvent;
use gardenhub_domain::timer::{self, TimerRun, TimerRunName, Timestamp};

use crate::ports::{DeviceRepository, OrderSender, WorkflowOrchestrator};

/// What a fired run ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FiringOutcome {
    /// The device was ordered off.
    TurnedOff,
    /// A newer run for the same device is pending.
    Stale,
}

pub struct TimerFenceController<R, O, S> {
    repo: R,
    workflows: O,
    orders: S,
}

impl<R, O, S> TimerFenceController<R, O, S>
where
    R: DeviceRepository,
    O: WorkflowOrchestrator,
    S: OrderSender,
{
    pub fn new(repo: R, workflows: O, orders: S) -> Self {
        Self {
            repo,
            workflows,
            orders,
        }
    }

    /// Arm an auto-shutoff run for a device that reported it turned on.
    ///
    /// Returns the started run, or `None` when the device has no timer
    /// fence.
    ///
    /// # Errors
    ///
    /// Returns [`GardenHubError::NotFound`] for an unknown device, or the
    /// orchestrator's error.
    pub async fn on_reported_on(
        &self,
        event: ShadowEvent,
    ) -> Result<Option<TimerRunName>, GardenHubError> {
        self.arm_at(event, timer::now()).await
    }

    /// [`on_reported_on`](Self::on_reported_on) with the run's start time
    /// given explicitly; the run name derives from it.
    ///
    /// # Errors
    ///
    /// Same as [`on_reported_on`](Self::on_reported_on).
    #[tracing::instrument(skip(self), fields(device_id = %event.device_id()))]
    pub async fn arm_at(
        &self,
        event: ShadowEvent,
        started_at: Timestamp,
    ) -> Result<Option<TimerRunName>, GardenHubError> {
        let device_id = event.device_id();
        let device = self.repo.get_by_id(device_id).await?.ok_or_else(|| NotFoundError {
            entity: "Device",
            id: device_id.to_string(),
        })?;

        if !device.has_timer_fence() {
            return Ok(None);
        }

        let run = TimerRun::arm(event, device.timer_fence, started_at);
        let name = run.name.clone();
        self.workflows.start(run).await?;
        tracing::info!(run = %name, delay_secs = device.timer_fence, "timer fence armed");
        Ok(Some(name))
    }

    /// Handle a run whose delay elapsed.
    ///
    /// # Errors
    ///
    /// Returns the orchestrator's error, or whatever the turn-off order
    /// fails with.
    #[tracing::instrument(skip(self))]
    pub async fn on_workflow_fired(
        &self,
        device_id: DeviceId,
        run_name: &TimerRunName,
    ) -> Result<FiringOutcome, GardenHubError> {
        let running = self.workflows.list_running(device_id).await?;
        if running.iter().any(|name| name != run_name) {
            tracing::info!("newer timer run pending, ignoring stale firing");
            return Ok(FiringOutcome::Stale);
        }

        let outcome = self.orders.send_order(device_id, false, None).await?;
        tracing::info!(result = %outcome.err, "timer fence turned device off");
        Ok(FiringOutcome::TurnedOff)
    }

    /// Stop every pending run for `device_id`.
    ///
    /// # Errors
    ///
    /// Returns the orchestrator's error.
    pub async fn disarm(&self, device_id: DeviceId) -> Result<usize, GardenHubError> {
        disarm(&self.workflows, device_id).await
    }
}

/// Stop every pending run for `device_id`, returning how many were stopped.
///
/// # Errors
///
/// Returns the orchestrator's error.
#[tracing::instrument(skip(workflows))]
pub async fn disarm<O: WorkflowOrchestrator>(
    workflows: &O,
    device_id: DeviceId,
) -> Result<usize, GardenHubError> {
    let running = workflows.list_running(device_id).await?;
    for name in &running {
        workflows.stop(name).await?;
    }
    if !running.is_empty() {
        tracing::info!(stopped = running.len(), "timer fence disarmed");
    }
    Ok(running.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeOrchestrator, InMemoryDeviceRepo, RecordingOrders};
    use chrono::{TimeZone, Utc};
    use gardenhub_domain::device::Device;
    use std::sync::Arc;
    use std::time::Duration;

    type Controller = TimerFenceController<
        Arc<InMemoryDeviceRepo>,
        Arc<FakeOrchestrator>,
        Arc<RecordingOrders>,
    >;

    fn setup(
        timer_fence: u32,
    ) -> (
        Controller,
        DeviceId,
        Arc<FakeOrchestrator>,
        Arc<RecordingOrders>,
    ) {
        let device = Device::builder()
            .name("Pool")
            .position(1)
            .gpio(4)
            .timer_fence(timer_fence)
            .build()
            .unwrap();
        let id = device.id;
        let workflows = Arc::new(FakeOrchestrator::default());
        let orders = Arc::new(RecordingOrders::default());
        let controller = TimerFenceController::new(
            Arc::new(InMemoryDeviceRepo::with([device])),
            Arc::clone(&workflows),
            Arc::clone(&orders),
        );
        (controller, id, workflows, orders)
    }

    #[tokio::test]
    async fn should_not_arm_when_timer_fence_disabled() {
        let (controller, id, workflows, _) = setup(0);

        let armed = controller
            .on_reported_on(ShadowEvent::reported(id, true))
            .await
            .unwrap();

        assert!(armed.is_none());
        assert!(workflows.started().is_empty());
    }

    #[tokio::test]
    async fn should_arm_run_with_configured_delay() {
        let (controller, id, workflows, _) = setup(900);
        let event = ShadowEvent::reported(id, true);

        let armed = controller.on_reported_on(event).await.unwrap().unwrap();

        let started = workflows.started();
        assert_eq!(started.len(), 1);
        assert_eq!(started[0].name, armed);
        assert_eq!(started[0].delay, Duration::from_secs(900));
        assert_eq!(started[0].event, event);
        assert!(armed.belongs_to(id));
    }

    #[tokio::test]
    async fn should_turn_device_off_when_latest_run_fires() {
        let (controller, id, workflows, orders) = setup(60);
        let name = controller
            .on_reported_on(ShadowEvent::reported(id, true))
            .await
            .unwrap()
            .unwrap();

        workflows.finish(&name);
        let outcome = controller.on_workflow_fired(id, &name).await.unwrap();

        assert_eq!(outcome, FiringOutcome::TurnedOff);
        assert_eq!(orders.calls(), vec![(id, false, None)]);
    }

    #[tokio::test]
    async fn should_ignore_stale_run_while_newer_one_is_pending() {
        let (controller, id, workflows, orders) = setup(60);
        let first_on = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let older = controller
            .arm_at(ShadowEvent::reported(id, true), first_on)
            .await
            .unwrap()
            .unwrap();
        let newer = controller
            .arm_at(
                ShadowEvent::reported(id, true),
                first_on + chrono::Duration::seconds(5),
            )
            .await
            .unwrap()
            .unwrap();
        assert_ne!(older, newer);

        workflows.finish(&older);
        let outcome = controller.on_workflow_fired(id, &older).await.unwrap();

        assert_eq!(outcome, FiringOutcome::Stale);
        assert!(orders.calls().is_empty());
    }

    #[tokio::test]
    async fn should_tolerate_firing_run_still_listed_as_running() {
        let (controller, id, _, orders) = setup(60);
        let name = controller
            .on_reported_on(ShadowEvent::reported(id, true))
            .await
            .unwrap()
            .unwrap();

        let outcome = controller.on_workflow_fired(id, &name).await.unwrap();

        assert_eq!(outcome, FiringOutcome::TurnedOff);
        assert_eq!(orders.calls().len(), 1);
    }

    #[tokio::test]
    async fn should_stop_all_pending_runs_on_disarm() {
        let (controller, id, workflows, _) = setup(60);
        controller
            .on_reported_on(ShadowEvent::reported(id, true))
            .await
            .unwrap();

        let stopped = controller.disarm(id).await.unwrap();

        assert_eq!(stopped, 1);
        assert_eq!(workflows.stopped().len(), 1);
        assert!(workflows.list_running(id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_return_not_found_when_arming_unknown_device() {
        let (controller, _, _, _) = setup(60);

        let result = controller
            .on_reported_on(ShadowEvent::reported(DeviceId::new(), true))
            .await;

        assert!(matches!(result, Err(GardenHubError::NotFound(_))));
    }
}
