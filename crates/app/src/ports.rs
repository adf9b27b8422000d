//! Port definitions — traits that infrastructure implements.
//!
//! Ports are the boundaries between the application core and the outside
//! world. They are defined here so that both device implementations and the
//! HTTP adapter can depend on them without creating circular dependencies.

pub mod metric;
pub mod state;

pub use metric::MetricSink;
pub use state::StatePublisher;
