//! # devrack-app
//!
//! Application layer — **port definitions** (traits) and the in-process
//! infrastructure that backs them.
//!
//! ## Responsibilities
//! - Define **port traits** that the rest of the system programs against:
//!   - [`ports::StatePublisher`] — publish live-state snapshots to observers
//!   - [`ports::MetricSink`] — record sampled metric values
//! - Provide **in-process implementations** that don't need IO:
//!   - [`state_bus::InProcessStateBus`] — tokio broadcast channel
//!   - [`metric_sink::InMemoryMetricSink`] — bounded in-memory buffer
//! - Provide the **gateway channel** ([`gateway`]) — a request/reply
//!   primitive that suspends the caller until a correlated reply arrives,
//!   failing fast when no collaborator is connected
//! - Provide **output ports** ([`signal`]) — fire-and-forget device outputs
//!   where pushing to a disconnected port is a no-op
//!
//! ## Dependency rule
//! Depends on `devrack-domain` only (plus `tokio::sync` for channels).
//! Never imports adapter crates. Adapters depend on *this* crate, not the
//! reverse.

pub mod gateway;
pub mod metric_sink;
pub mod ports;
pub mod signal;
pub mod state_bus;
