//! # gardenhub-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve the **command API**: turn a device on or off, optionally waiting
//!   for the hardware to confirm (`POST /api/devices/{id}/order`)
//! - Serve **device CRUD** (`/api/devices`, `/api/devices/{id}`)
//! - Accept shadow envelopes pushed over HTTP (`POST /api/shadow`)
//! - Map application results and errors into JSON responses
//!
//! ## Dependency rule
//! Depends on `gardenhub-app` (for port traits and services) and
//! `gardenhub-domain` (for domain types used in request/response mapping).
//! Never leaks axum types into the domain.

pub mod api;
pub mod error;
pub mod router;
pub mod state;
