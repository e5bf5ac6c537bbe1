//! Shadow pipeline — routes incoming shadow events to the services that
//! care about them.
//!
//! | Event | Reconciler | Activation bridge | Timer fence |
//! |-------|------------|-------------------|-------------|
//! | desired | notify | echo as reported (if enabled) | |
//! | reported, on | notify + store | | arm |
//! | reported, off | notify + store | | |

use std::sync::Arc;

use gardenhub_domain::error::GardenHubError;
use gardenhub_domain::shadow::ShadowEvent;

use crate::ports::{
    DeviceRepository, Notifier, OrderSender, ShadowEventHandler, ShadowTransport,
    WorkflowOrchestrator,
};
use crate::services::activation_bridge::ActivationBridge;
use crate::services::shadow_reconciler::ShadowReconciler;
use crate::services::timer_fence::TimerFenceController;

/// [`ShadowEventHandler`] implementation wiring reconciler, timer fence and
/// (optionally) the activation bridge together.
pub struct ShadowPipeline<R, T, N, O, S> {
    reconciler: ShadowReconciler<R, N>,
    timers: Arc<TimerFenceController<R, O, S>>,
    bridge: Option<ActivationBridge<R, T>>,
}

impl<R, T, N, O, S> ShadowPipeline<R, T, N, O, S>
where
    R: DeviceRepository,
    T: ShadowTransport,
    N: Notifier,
    O: WorkflowOrchestrator,
    S: OrderSender,
{
    pub fn new(
        reconciler: ShadowReconciler<R, N>,
        timers: Arc<TimerFenceController<R, O, S>>,
    ) -> Self {
        Self {
            reconciler,
            timers,
            bridge: None,
        }
    }

    /// Simulate hardware acknowledgements for desired events.
    #[must_use]
    pub fn with_activation_bridge(mut self, bridge: ActivationBridge<R, T>) -> Self {
        self.bridge = Some(bridge);
        self
    }

    /// The timer-fence controller events are routed to.
    #[must_use]
    pub fn timers(&self) -> &Arc<TimerFenceController<R, O, S>> {
        &self.timers
    }

    /// Route one event.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by a downstream service.
    pub async fn route(&self, event: ShadowEvent) -> Result<(), GardenHubError> {
        self.reconciler.dispatch(event).await?;

        match event {
            ShadowEvent::Desired(_) => {
                if let Some(bridge) = &self.bridge {
                    bridge.simulate(event).await?;
                }
            }
            ShadowEvent::Reported(state) if state.is_on => {
                self.timers.on_reported_on(event).await?;
            }
            ShadowEvent::Reported(_) => {}
        }

        Ok(())
    }
}

impl<R, T, N, O, S> ShadowEventHandler for ShadowPipeline<R, T, N, O, S>
where
    R: DeviceRepository + Send + Sync,
    T: ShadowTransport + Send + Sync,
    N: Notifier + Send + Sync,
    O: WorkflowOrchestrator + Send + Sync,
    S: OrderSender + Send + Sync,
{
    async fn handle(&self, event: ShadowEvent) -> Result<(), GardenHubError> {
        self.route(event).await
    }
}
