//! Shared application state for axum handlers.

use std::sync::Arc;

use gardenhub_app::ports::{
    DeviceRepository, OrderSender, ShadowEventHandler, WorkflowOrchestrator,
};
use gardenhub_app::services::device_service::DeviceService;

/// Application state shared across all axum handlers.
///
/// Generic over the device repository, the order sender (command
/// dispatcher), the shadow event handler (pipeline) and the workflow
/// orchestrator to avoid dynamic dispatch. `Clone` is implemented manually so
/// the underlying types themselves do not need to be `Clone`; only the
/// `Arc` wrappers are cloned.
pub struct AppState<R, D, H, O> {
    /// Device CRUD service.
    pub device_service: Arc<DeviceService<R>>,
    /// Evaluates and publishes on/off orders.
    pub orders: Arc<D>,
    /// Routes ingested shadow events.
    pub shadow: Arc<H>,
    /// Timer-fence runs, disarmed when a device is deleted.
    pub workflows: Arc<O>,
}

impl<R, D, H, O> Clone for AppState<R, D, H, O> {
    fn clone(&self) -> Self {
        Self {
            device_service: Arc::clone(&self.device_service),
            orders: Arc::clone(&self.orders),
            shadow: Arc::clone(&self.shadow),
            workflows: Arc::clone(&self.workflows),
        }
    }
}

impl<R, D, H, O> AppState<R, D, H, O>
where
    R: DeviceRepository + Send + Sync + 'static,
    D: OrderSender + Send + Sync + 'static,
    H: ShadowEventHandler + 'static,
    O: WorkflowOrchestrator + Send + Sync + 'static,
{
    /// Create a new application state from pre-wrapped `Arc` services.
    ///
    /// Services are shared with background tasks (MQTT listener, workflow
    /// drain) before the HTTP state is built.
    pub fn from_arcs(
        device_service: Arc<DeviceService<R>>,
        orders: Arc<D>,
        shadow: Arc<H>,
        workflows: Arc<O>,
    ) -> Self {
        Self {
            device_service,
            orders,
            shadow,
            workflows,
        }
    }
}
