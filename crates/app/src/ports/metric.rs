//! Metric sink port — record sampled values for later inspection.

use std::future::Future;

use devrack_domain::metric::MetricPoint;

/// Accepts metric samples from devices.
///
/// Recording is best-effort: sinks may evict old samples under pressure and
/// never report failure back to the emitting device.
pub trait MetricSink {
    /// Record one sample.
    fn record(&self, point: MetricPoint) -> impl Future<Output = ()> + Send;
}

impl<T: MetricSink + Send + Sync> MetricSink for std::sync::Arc<T> {
    fn record(&self, point: MetricPoint) -> impl Future<Output = ()> + Send {
        (**self).record(point)
    }
}
