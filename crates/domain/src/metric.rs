//! Metric point — a single sampled value from a device.
//!
//! Devices with periodic behavior (bulb consumption, heater state, sensor
//! temperature) emit one point per tick. Storage and retention policies live
//! behind the `MetricSink` port in the `app` crate.

use serde::Serialize;

use crate::id::DeviceId;
use crate::time::{Timestamp, now};

/// One sampled metric value.
#[derive(Debug, Clone, Serialize)]
pub struct MetricPoint {
    /// Identifier of the emitting device instance.
    pub device: DeviceId,
    /// Metric name (e.g. `"brightness"`, `"heater.on"`, `"temp.value"`).
    pub name: &'static str,
    /// Sampled value.
    pub value: f64,
    /// When the sample was taken.
    pub at: Timestamp,
}

impl MetricPoint {
    /// Build a point timestamped with the current time.
    #[must_use]
    pub fn new(device: DeviceId, name: &'static str, value: f64) -> Self {
        Self {
            device,
            name,
            value,
            at: now(),
        }
    }
}
