//! Shadow ingestion for platforms that push shadow messages over HTTP
//! instead of MQTT.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use gardenhub_app::ports::{
    DeviceRepository, OrderSender, ShadowEventHandler, WorkflowOrchestrator,
};
use gardenhub_domain::shadow::ShadowEvent;

use crate::error::ApiError;
use crate::state::AppState;

/// Possible responses from the ingest endpoint.
pub enum IngestResponse {
    Accepted,
}

impl IntoResponse for IngestResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Accepted => StatusCode::ACCEPTED.into_response(),
        }
    }
}

/// `POST /api/shadow`
///
/// The body is a raw `{"state": {"desired"|"reported": {...}}}` envelope.
pub async fn ingest<R, D, H, O>(
    State(state): State<AppState<R, D, H, O>>,
    Json(envelope): Json<serde_json::Value>,
) -> Result<IngestResponse, ApiError>
where
    R: DeviceRepository + Send + Sync + 'static,
    D: OrderSender + Send + Sync + 'static,
    H: ShadowEventHandler + 'static,
    O: WorkflowOrchestrator + Send + Sync + 'static,
{
    let event = ShadowEvent::from_value(envelope)
        .map_err(|err| ApiError::Malformed(err.to_string()))?;
    state.shadow.handle(event).await?;
    Ok(IngestResponse::Accepted)
}
