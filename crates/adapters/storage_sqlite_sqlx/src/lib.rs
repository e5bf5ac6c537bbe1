//! # gardenhub-adapter-storage-sqlite-sqlx
//!
//! `SQLite` device registry using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement [`DeviceRepository`](gardenhub_app::ports::DeviceRepository)
//! - Manage `SQLite` connection pool lifecycle
//! - Run database migrations (using sqlx embedded migrations)
//! - Map between domain types and database rows
//!
//! ## Dependency rule
//! Depends on `gardenhub-app` (for port traits) and `gardenhub-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

pub mod device_repo;
pub mod error;
pub mod pool;

pub use device_repo::SqliteDeviceRepository;
pub use pool::{Config, Database};
