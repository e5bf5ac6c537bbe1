//! Workflow port — named, delayed executions used for timer fences.

use std::future::Future;
use std::sync::Arc;

use gardenhub_domain::error::GardenHubError;
use gardenhub_domain::id::DeviceId;
use gardenhub_domain::timer::{TimerRun, TimerRunName};

/// Starts, lists and stops [`TimerRun`]s.
///
/// When a run's delay elapses the orchestrator hands it back to the
/// application (see
/// [`TimerFenceController::on_workflow_fired`](crate::services::timer_fence::TimerFenceController::on_workflow_fired)).
pub trait WorkflowOrchestrator {
    /// Schedule a run.
    fn start(&self, run: TimerRun) -> impl Future<Output = Result<(), GardenHubError>> + Send;

    /// Names of the runs for `device_id` that have not fired or been stopped.
    fn list_running(
        &self,
        device_id: DeviceId,
    ) -> impl Future<Output = Result<Vec<TimerRunName>, GardenHubError>> + Send;

    /// Cancel a run. Stopping an unknown or finished run is not an error.
    fn stop(
        &self,
        name: &TimerRunName,
    ) -> impl Future<Output = Result<(), GardenHubError>> + Send;
}

impl<T: WorkflowOrchestrator + Send + Sync> WorkflowOrchestrator for Arc<T> {
    fn start(&self, run: TimerRun) -> impl Future<Output = Result<(), GardenHubError>> + Send {
        (**self).start(run)
    }

    fn list_running(
        &self,
        device_id: DeviceId,
    ) -> impl Future<Output = Result<Vec<TimerRunName>, GardenHubError>> + Send {
        (**self).list_running(device_id)
    }

    fn stop(
        &self,
        name: &TimerRunName,
    ) -> impl Future<Output = Result<(), GardenHubError>> + Send {
        (**self).stop(name)
    }
}
