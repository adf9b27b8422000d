//! # devrack-domain
//!
//! Pure domain model for the devrack device simulator.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **`RequestDescriptor`** (the normalized view of an incoming HTTP
//!   request that handlers and gateway collaborators receive)
//! - Define **`StateFrame`** (a snapshot of a device's live-view data,
//!   published on the state broadcast channel)
//! - Define **`MetricPoint`** (a single sampled metric value)
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod metric;
pub mod request;
pub mod state;
pub mod time;
