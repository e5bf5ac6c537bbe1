//! JSON REST handlers for devices and their orders.

use std::time::Duration;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use gardenhub_app::ports::{
    DeviceRepository, OrderSender, ShadowEventHandler, WorkflowOrchestrator,
};
use gardenhub_app::services::timer_fence;
use gardenhub_domain::device::{Device, DeviceUpdate};
use gardenhub_domain::error::GardenHubError;
use gardenhub_domain::id::DeviceId;
use gardenhub_domain::order::OrderOutcome;

use crate::api::parse_device_id;
use crate::error::ApiError;
use crate::state::AppState;

/// Request body for registering a device.
///
/// `status` is not accepted: it only ever comes from the hardware.
#[derive(Deserialize)]
pub struct CreateDeviceRequest {
    pub name: String,
    pub description: Option<String>,
    pub position: u32,
    pub gpio: u32,
    #[serde(default)]
    pub weather_fence: u8,
    #[serde(default)]
    pub timer_fence: u32,
    #[serde(default)]
    pub device_fence: Vec<DeviceId>,
}

/// Request body for an on/off order.
#[derive(Deserialize)]
pub struct OrderRequest {
    pub status: bool,
    /// Seconds to wait for the device to confirm. Absent means do not wait.
    #[serde(default)]
    pub timeout: Option<u64>,
}

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<Device>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the get and update endpoints.
pub enum GetResponse {
    Ok(Json<Device>),
}

impl IntoResponse for GetResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the create endpoint.
pub enum CreateResponse {
    Created(Json<Device>),
}

impl IntoResponse for CreateResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created(json) => (StatusCode::CREATED, json).into_response(),
        }
    }
}

/// Possible responses from the delete endpoint.
pub enum DeleteResponse {
    NoContent,
}

impl IntoResponse for DeleteResponse {
    fn into_response(self) -> Response {
        match self {
            Self::NoContent => StatusCode::NO_CONTENT.into_response(),
        }
    }
}

/// Possible responses from the order endpoint. Fenced and unconfirmed
/// orders are outcomes, not errors, and still answer `200`.
pub enum OrderResponse {
    Ok(Json<OrderOutcome>),
}

impl IntoResponse for OrderResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `GET /api/devices`
pub async fn list<R, D, H, O>(
    State(state): State<AppState<R, D, H, O>>,
) -> Result<ListResponse, ApiError>
where
    R: DeviceRepository + Send + Sync + 'static,
    D: OrderSender + Send + Sync + 'static,
    H: ShadowEventHandler + 'static,
    O: WorkflowOrchestrator + Send + Sync + 'static,
{
    let devices = state.device_service.list_devices().await?;
    Ok(ListResponse::Ok(Json(devices)))
}

/// `GET /api/devices/{id}`
pub async fn get<R, D, H, O>(
    State(state): State<AppState<R, D, H, O>>,
    Path(id): Path<String>,
) -> Result<GetResponse, ApiError>
where
    R: DeviceRepository + Send + Sync + 'static,
    D: OrderSender + Send + Sync + 'static,
    H: ShadowEventHandler + 'static,
    O: WorkflowOrchestrator + Send + Sync + 'static,
{
    let device_id = parse_device_id(&id)?;
    let device = state.device_service.get_device(device_id).await?;
    Ok(GetResponse::Ok(Json(device)))
}

/// `POST /api/devices`
pub async fn create<R, D, H, O>(
    State(state): State<AppState<R, D, H, O>>,
    Json(req): Json<CreateDeviceRequest>,
) -> Result<CreateResponse, ApiError>
where
    R: DeviceRepository + Send + Sync + 'static,
    D: OrderSender + Send + Sync + 'static,
    H: ShadowEventHandler + 'static,
    O: WorkflowOrchestrator + Send + Sync + 'static,
{
    let mut builder = Device::builder()
        .name(req.name)
        .position(req.position)
        .gpio(req.gpio)
        .weather_fence(req.weather_fence)
        .timer_fence(req.timer_fence)
        .device_fence(req.device_fence);
    if let Some(description) = req.description {
        builder = builder.description(description);
    }

    let device = builder.build().map_err(GardenHubError::from)?;
    let created = state.device_service.create_device(device).await?;
    Ok(CreateResponse::Created(Json(created)))
}

/// `PATCH /api/devices/{id}`
pub async fn update<R, D, H, O>(
    State(state): State<AppState<R, D, H, O>>,
    Path(id): Path<String>,
    Json(update): Json<DeviceUpdate>,
) -> Result<GetResponse, ApiError>
where
    R: DeviceRepository + Send + Sync + 'static,
    D: OrderSender + Send + Sync + 'static,
    H: ShadowEventHandler + 'static,
    O: WorkflowOrchestrator + Send + Sync + 'static,
{
    let device_id = parse_device_id(&id)?;
    let device = state.device_service.update_device(device_id, update).await?;
    Ok(GetResponse::Ok(Json(device)))
}

/// `DELETE /api/devices/{id}`
///
/// Pending timer-fence runs are stopped once the device is gone.
pub async fn delete<R, D, H, O>(
    State(state): State<AppState<R, D, H, O>>,
    Path(id): Path<String>,
) -> Result<DeleteResponse, ApiError>
where
    R: DeviceRepository + Send + Sync + 'static,
    D: OrderSender + Send + Sync + 'static,
    H: ShadowEventHandler + 'static,
    O: WorkflowOrchestrator + Send + Sync + 'static,
{
    let device_id = parse_device_id(&id)?;
    state.device_service.delete_device(device_id).await?;
    if let Err(err) = timer_fence::disarm(state.workflows.as_ref(), device_id).await {
        tracing::warn!(%device_id, error = %err, "failed to disarm timer fence of deleted device");
    }
    Ok(DeleteResponse::NoContent)
}

/// `POST /api/devices/{id}/order`
pub async fn order<R, D, H, O>(
    State(state): State<AppState<R, D, H, O>>,
    Path(id): Path<String>,
    Json(req): Json<OrderRequest>,
) -> Result<OrderResponse, ApiError>
where
    R: DeviceRepository + Send + Sync + 'static,
    D: OrderSender + Send + Sync + 'static,
    H: ShadowEventHandler + 'static,
    O: WorkflowOrchestrator + Send + Sync + 'static,
{
    let device_id = parse_device_id(&id)?;
    let outcome = state
        .orders
        .send_order(device_id, req.status, req.timeout.map(Duration::from_secs))
        .await?;
    Ok(OrderResponse::Ok(Json(outcome)))
}
