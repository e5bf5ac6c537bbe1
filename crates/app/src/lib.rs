//! # gardenhub-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `DeviceRepository` — the device registry
//!   - `ShadowTransport` — publish desired/reported shadow events
//!   - `Notifier` — fan shadow events out to subscribers
//!   - `WeatherProvider` — current humidity for weather fences
//!   - `WorkflowOrchestrator` — named, delayed runs for timer fences
//! - Define **driving/inbound ports** as use-case structs/traits:
//!   - `CommandDispatcher` — evaluate fences, publish and confirm orders
//!   - `ShadowPipeline` — reconcile, notify and arm timers for shadow events
//!   - `DeviceService` — register, update, list, delete devices
//! - Provide **in-process infrastructure** that doesn't need IO (status bus,
//!   timer workflow runner)
//!
//! ## Dependency rule
//! Depends on `gardenhub-domain` only (plus `tokio` for channels and timers).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod ports;
pub mod services;
pub mod status_bus;
pub mod workflow_runner;

#[cfg(test)]
mod testing;
