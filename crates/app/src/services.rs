//! Application services — use-case implementations.
//!
//! Each service struct accepts port trait implementations via generic parameters
//! (constructor injection), keeping this layer decoupled from concrete adapters.

pub mod activation_bridge;
pub mod command_dispatcher;
pub mod device_service;
pub mod fence_evaluator;
pub mod shadow_pipeline;
pub mod shadow_reconciler;
pub mod timer_fence;
