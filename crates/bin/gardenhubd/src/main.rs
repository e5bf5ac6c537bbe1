//! # gardenhubd — gardenhub daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Load configuration (`gardenhub.toml`, env vars)
//! - Initialize tracing
//! - Initialize the `SQLite` connection pool and run migrations
//! - Connect to the MQTT broker and build the shadow transport and notifier
//! - Construct application services, injecting adapters via port traits
//! - Drain fired timer runs into the timer-fence controller
//! - Run the shadow listener, which subscribes on every broker connection
//! - Build the axum router, bind and serve with graceful shutdown on Ctrl-C
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer. No domain logic belongs here.

mod config;

use std::sync::Arc;

use anyhow::Context;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use gardenhub_adapter_http_axum::state::AppState;
use gardenhub_adapter_mqtt::{MqttNotifier, MqttShadowTransport, ShadowListener};
use gardenhub_adapter_storage_sqlite_sqlx::{Config as DatabaseConfig, SqliteDeviceRepository};
use gardenhub_adapter_weather_openweather::OpenWeatherClient;
use gardenhub_app::ports::{DeviceRepository, OrderSender, WorkflowOrchestrator};
use gardenhub_app::services::activation_bridge::ActivationBridge;
use gardenhub_app::services::command_dispatcher::CommandDispatcher;
use gardenhub_app::services::device_service::DeviceService;
use gardenhub_app::services::shadow_pipeline::ShadowPipeline;
use gardenhub_app::services::shadow_reconciler::ShadowReconciler;
use gardenhub_app::services::timer_fence::TimerFenceController;
use gardenhub_app::status_bus::InProcessStatusBus;
use gardenhub_app::workflow_runner::InProcessWorkflows;
use gardenhub_domain::timer::TimerRun;

use crate::config::Config;

const STATUS_BUS_CAPACITY: usize = 256;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("loading configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.logging.filter)?)
        .init();

    // Database
    let db = DatabaseConfig {
        database_url: config.database_url().to_string(),
    }
    .build()
    .await
    .context("opening device registry")?;
    let repo = SqliteDeviceRepository::new(db.pool().clone());

    // Outbound adapters
    let (client, eventloop) = gardenhub_adapter_mqtt::connect(&config.mqtt);
    let transport = MqttShadowTransport::new(client.clone(), &config.mqtt);
    let notifier = MqttNotifier::new(client.clone(), &config.mqtt);
    let weather =
        OpenWeatherClient::new(config.weather.clone()).context("building weather client")?;

    // Services
    let status_bus = Arc::new(InProcessStatusBus::new(STATUS_BUS_CAPACITY));
    let orders = Arc::new(
        CommandDispatcher::new(repo.clone(), transport.clone(), weather)
            .with_status_bus(Arc::clone(&status_bus))
            .with_poll_interval(config.orders.poll_interval()),
    );

    let (workflows, fired) = InProcessWorkflows::new();
    let workflows = Arc::new(workflows);
    let timers = Arc::new(TimerFenceController::new(
        repo.clone(),
        Arc::clone(&workflows),
        Arc::clone(&orders),
    ));

    let reconciler =
        ShadowReconciler::new(repo.clone(), notifier).with_status_bus(Arc::clone(&status_bus));
    let mut pipeline = ShadowPipeline::new(reconciler, Arc::clone(&timers));
    if config.simulation.enabled {
        tracing::warn!("activation bridge enabled, desired states will be echoed as reported");
        pipeline = pipeline.with_activation_bridge(
            ActivationBridge::new(repo.clone(), transport)
                .with_settle_delay(config.simulation.settle_delay()),
        );
    }
    let pipeline = Arc::new(pipeline);

    // Background tasks
    tokio::spawn(drain_fired_runs(fired, timers));

    let listener = ShadowListener::new(Arc::clone(&pipeline), &config.mqtt);
    tokio::spawn(listener.run(client, eventloop));

    // HTTP
    let state = AppState::from_arcs(
        Arc::new(DeviceService::new(repo)),
        orders,
        pipeline,
        workflows,
    );
    let app = gardenhub_adapter_http_axum::router::build(state);

    let bind_addr = config.bind_addr();
    let tcp = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding {bind_addr}"))?;
    tracing::info!(addr = %bind_addr, "gardenhubd listening");

    axum::serve(tcp, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("gardenhubd stopped");
    Ok(())
}

/// Hand every fired timer run to the timer-fence controller, each on its own
/// task so a slow turn-off never delays the next firing.
async fn drain_fired_runs<R, O, S>(
    mut fired: mpsc::UnboundedReceiver<TimerRun>,
    timers: Arc<TimerFenceController<R, O, S>>,
) where
    R: DeviceRepository + Send + Sync + 'static,
    O: WorkflowOrchestrator + Send + Sync + 'static,
    S: OrderSender + Send + Sync + 'static,
{
    while let Some(run) = fired.recv().await {
        let timers = Arc::clone(&timers);
        tokio::spawn(async move {
            if let Err(err) = timers.on_workflow_fired(run.device_id, &run.name).await {
                tracing::error!(run = %run.name, error = %err, "timer fence firing failed");
            }
        });
    }
    tracing::debug!("fired-run channel closed");
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
