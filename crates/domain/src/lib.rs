//! # gardenhub-domain
//!
//! Pure domain model for the gardenhub device controller.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Devices** and their fences (weather, timer, device)
//! - Define **Shadow events** (desired / reported state messages)
//! - Define **Order outcomes** returned to voice and HTTP callers
//! - Define **Notifications** broadcast on every shadow change
//! - Define **Timer runs** (auto-shutoff executions and their naming rules)
//! - Contain the fence decision rules
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;

pub mod device;
pub mod fence;
pub mod notification;
pub mod order;
pub mod shadow;
pub mod timer;
