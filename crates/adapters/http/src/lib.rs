//! # devrack-adapter-http
//!
//! HTTP front door built on [axum](https://docs.rs/axum).
//!
//! There is no fixed route table. Every incoming method+path combination is a
//! candidate route: the [`resolve`](resolve::resolve) function derives a
//! handler identifier from it by convention (`GET /cpu/stats` →
//! `GETCpuStats`), and the [`HandlerRegistry`](registry::HandlerRegistry)
//! maps identifiers to handler functions registered once at startup.
//!
//! ## Request flow
//!
//! ```text
//! axum fallback → RequestDescriptor → resolve() → registry lookup
//!     → handler (may await a gateway call) → ResponseEnvelope → JSON
//! ```
//!
//! The [`Dispatcher`](dispatch::Dispatcher) owns the registry and the
//! `requests_served` counter, publishes a state frame for every accepted
//! request, and converts every outcome — success, missing handler, handler
//! failure — into exactly one JSON response. Nothing propagates past it.
//!
//! ## Dependency rule
//! Depends on `devrack-app` (ports, gateway) and `devrack-domain`. Never
//! leaks axum types into the domain.

pub mod dispatch;
pub mod error;
pub mod registry;
pub mod resolve;
pub mod server;

pub use dispatch::{Dispatcher, ResponseEnvelope};
pub use error::HandlerError;
pub use registry::HandlerRegistry;
pub use resolve::resolve;
