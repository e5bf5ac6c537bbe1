//! Axum router assembly.

use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use gardenhub_app::ports::{
    DeviceRepository, OrderSender, ShadowEventHandler, WorkflowOrchestrator,
};

use crate::state::AppState;

/// Build the top-level axum [`Router`].
///
/// Serves API routes under `/api` plus a `/health` probe. Includes a
/// [`TraceLayer`] that logs each HTTP request/response at the `DEBUG` level
/// using the `tracing` ecosystem.
pub fn build<R, D, H, O>(state: AppState<R, D, H, O>) -> Router
where
    R: DeviceRepository + Send + Sync + 'static,
    D: OrderSender + Send + Sync + 'static,
    H: ShadowEventHandler + 'static,
    O: WorkflowOrchestrator + Send + Sync + 'static,
{
    Router::new()
        .route("/health", get(health_check))
        .nest("/api", crate::api::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
