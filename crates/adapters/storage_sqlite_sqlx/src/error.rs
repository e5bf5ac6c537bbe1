//! Storage-specific error type wrapping sqlx errors.

use gardenhub_domain::error::{ConflictError, GardenHubError};

/// Errors originating from the `SQLite` storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A query or connection failed.
    #[error("database error")]
    Database(#[from] sqlx::Error),

    /// Failed to (de)serialize the stored device fence.
    #[error("JSON serialization error")]
    Json(#[from] serde_json::Error),

    /// Failed to run migrations.
    #[error("migration error")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl StorageError {
    /// Whether a write was rejected by one of the unique indexes.
    #[must_use]
    pub fn is_unique_violation(&self) -> bool {
        match self {
            Self::Database(sqlx::Error::Database(err)) => err.is_unique_violation(),
            _ => false,
        }
    }
}

impl From<StorageError> for GardenHubError {
    fn from(err: StorageError) -> Self {
        if err.is_unique_violation() {
            return Self::Conflict(ConflictError::Unique);
        }
        Self::Storage(Box::new(err))
    }
}
