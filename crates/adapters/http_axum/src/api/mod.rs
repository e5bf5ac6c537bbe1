//! JSON REST API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod devices;
#[allow(clippy::missing_errors_doc)]
pub mod shadow;

use axum::Router;
use axum::routing::{get, post};

use gardenhub_app::ports::{
    DeviceRepository, OrderSender, ShadowEventHandler, WorkflowOrchestrator,
};
use gardenhub_domain::error::GardenHubError;
use gardenhub_domain::id::DeviceId;

use crate::error::ApiError;
use crate::state::AppState;

/// Build the `/api` sub-router.
pub fn routes<R, D, H, O>() -> Router<AppState<R, D, H, O>>
where
    R: DeviceRepository + Send + Sync + 'static,
    D: OrderSender + Send + Sync + 'static,
    H: ShadowEventHandler + 'static,
    O: WorkflowOrchestrator + Send + Sync + 'static,
{
    Router::new()
        .route(
            "/devices",
            get(devices::list::<R, D, H, O>).post(devices::create::<R, D, H, O>),
        )
        .route(
            "/devices/{id}",
            get(devices::get::<R, D, H, O>)
                .patch(devices::update::<R, D, H, O>)
                .delete(devices::delete::<R, D, H, O>),
        )
        .route("/devices/{id}/order", post(devices::order::<R, D, H, O>))
        .route("/shadow", post(shadow::ingest::<R, D, H, O>))
}

pub(crate) fn parse_device_id(raw: &str) -> Result<DeviceId, ApiError> {
    DeviceId::parse(raw).map_err(|err| ApiError::from(GardenHubError::from(err)))
}
