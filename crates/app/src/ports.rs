//! Port definitions — traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the outside world.
//! They are defined here (in `app`) so that both the use-case layer and the
//! adapter layer can depend on them without creating circular dependencies.

pub mod notifier;
pub mod order;
pub mod shadow;
pub mod storage;
pub mod weather;
pub mod workflow;

pub use notifier::Notifier;
pub use order::OrderSender;
pub use shadow::{ShadowEventHandler, ShadowTransport};
pub use storage::DeviceRepository;
pub use weather::WeatherProvider;
pub use workflow::WorkflowOrchestrator;
