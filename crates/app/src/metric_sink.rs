//! Bounded in-memory metric sink.
//!
//! Keeps the most recent samples in a ring buffer. A real deployment would
//! hand samples to a time-series store; the in-memory sink is enough for the
//! simulator and for tests.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::Mutex;

use devrack_domain::metric::MetricPoint;

use crate::ports::MetricSink;

/// Metric sink that retains the last `capacity` samples.
pub struct InMemoryMetricSink {
    points: Mutex<VecDeque<MetricPoint>>,
    capacity: usize,
}

impl InMemoryMetricSink {
    /// Create a sink retaining at most `capacity` samples.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            points: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    /// Copy out the currently retained samples, oldest first.
    #[must_use]
    pub fn snapshot(&self) -> Vec<MetricPoint> {
        self.lock().iter().cloned().collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<MetricPoint>> {
        self.points
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl MetricSink for InMemoryMetricSink {
    fn record(&self, point: MetricPoint) -> impl Future<Output = ()> + Send {
        {
            let mut points = self.lock();
            if points.len() == self.capacity {
                points.pop_front();
            }
            points.push_back(point);
        }
        async {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use devrack_domain::id::DeviceId;

    #[tokio::test]
    async fn should_retain_recorded_samples() {
        let sink = InMemoryMetricSink::new(8);
        let device = DeviceId::new();

        sink.record(MetricPoint::new(device, "brightness", 40.0)).await;
        sink.record(MetricPoint::new(device, "consumption", 2.0)).await;

        let points = sink.snapshot();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].name, "brightness");
        assert_eq!(points[1].name, "consumption");
    }

    #[tokio::test]
    async fn should_evict_oldest_sample_when_full() {
        let sink = InMemoryMetricSink::new(2);
        let device = DeviceId::new();

        sink.record(MetricPoint::new(device, "temp.value", 1.0)).await;
        sink.record(MetricPoint::new(device, "temp.value", 2.0)).await;
        sink.record(MetricPoint::new(device, "temp.value", 3.0)).await;

        let points = sink.snapshot();
        assert_eq!(points.len(), 2);
        assert!((points[0].value - 2.0).abs() < f64::EPSILON);
        assert!((points[1].value - 3.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn should_return_empty_snapshot_when_nothing_recorded() {
        let sink = InMemoryMetricSink::new(4);
        assert!(sink.snapshot().is_empty());
    }
}
