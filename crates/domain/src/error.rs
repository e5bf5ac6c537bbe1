//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`GardenHubError`] at port boundaries. Outcomes that are part of normal
//! operation (fenced, already in state, unconfirmed) are *not* errors: they
//! are reported through [`OrderStatus`](crate::order::OrderStatus).

type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Top-level error shared by every crate in the workspace.
#[derive(Debug, thiserror::Error)]
pub enum GardenHubError {
    /// A domain invariant was violated.
    #[error("validation error")]
    Validation(#[from] ValidationError),

    /// A referenced record does not exist.
    #[error("not found")]
    NotFound(#[from] NotFoundError),

    /// A unique attribute collides with another record.
    #[error("conflict")]
    Conflict(#[from] ConflictError),

    /// Publishing to or subscribing on the shadow transport failed.
    #[error("transport error")]
    Transport(#[source] BoxedError),

    /// A third-party service (weather lookup) could not be reached or
    /// answered with garbage.
    #[error("upstream unavailable")]
    Upstream(#[source] BoxedError),

    /// The device registry failed.
    #[error("storage error")]
    Storage(#[source] BoxedError),
}

/// Domain invariant violations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// The device name is empty or only whitespace.
    #[error("name must not be empty")]
    EmptyName,

    /// The humidity threshold is not a percentage.
    #[error("weather fence must be between 0 and 100, got {0}")]
    WeatherFenceOutOfRange(u8),

    /// A device lists itself in its own device fence.
    #[error("device cannot fence itself")]
    SelfFence,

    /// An identifier could not be parsed.
    #[error("invalid identifier {0:?}")]
    InvalidId(String),
}

/// A lookup by identifier found nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} with id {id} was not found")]
pub struct NotFoundError {
    /// Kind of record (e.g. `"Device"`).
    pub entity: &'static str,
    /// Identifier that was looked up.
    pub id: String,
}

/// A unique slot is already taken by another device.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConflictError {
    /// The `position` slot is used by another device.
    #[error("position {position} is already used by device {owner}")]
    Position {
        /// Requested position.
        position: u32,
        /// Device currently holding it.
        owner: String,
    },

    /// The GPIO pin is used by another device.
    #[error("GPIO {gpio} is already used by device {owner}")]
    Gpio {
        /// Requested pin.
        gpio: u32,
        /// Device currently holding it.
        owner: String,
    },

    /// The store rejected the write on a unique index it did not name.
    #[error("unique constraint violated")]
    Unique,
}

impl GardenHubError {
    /// Wrap an adapter error as a transport failure.
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Box::new(err))
    }

    /// Wrap an adapter error as an upstream failure.
    pub fn upstream(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Upstream(Box::new(err))
    }
}
