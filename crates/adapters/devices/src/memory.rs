//! Memory monitor — samples process memory and answers gateway requests.
//!
//! The monitor refreshes its report once per second via the
//! [`memory-stats`](https://docs.rs/memory-stats) crate and replies to every
//! gateway request with the latest report. It is the collaborator behind
//! `GET /memory`: the HTTP handler forwards the request descriptor through a
//! gateway channel and serializes whatever comes back.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use devrack_app::gateway::GatewayServer;
use devrack_app::ports::StatePublisher;
use devrack_domain::id::DeviceId;
use devrack_domain::request::RequestDescriptor;
use devrack_domain::state::StateFrame;

const SAMPLE_INTERVAL: Duration = Duration::from_secs(1);
const MIB: usize = 1024 * 1024;

/// Point-in-time memory usage of this process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryReport {
    /// Resident set size in whole mebibytes (rounded).
    pub rss_mb: u64,
    /// Virtual address space in whole mebibytes (rounded).
    pub virtual_mb: u64,
    /// Seconds since the monitor started.
    pub uptime_secs: u64,
}

impl MemoryReport {
    /// Build a report from raw byte counts and an uptime.
    #[must_use]
    pub fn from_usage(physical_bytes: usize, virtual_bytes: usize, uptime: Duration) -> Self {
        Self {
            rss_mb: to_mib(physical_bytes),
            virtual_mb: to_mib(virtual_bytes),
            uptime_secs: uptime.as_secs(),
        }
    }
}

fn to_mib(bytes: usize) -> u64 {
    ((bytes + MIB / 2) / MIB) as u64
}

/// A device that tracks this process's memory usage.
pub struct MemoryMonitor<P> {
    device_id: DeviceId,
    publisher: P,
    started: Instant,
    report: MemoryReport,
}

impl<P: StatePublisher + Send + Sync> MemoryMonitor<P> {
    /// Create a monitor with an empty initial report.
    pub fn new(publisher: P) -> Self {
        Self {
            device_id: DeviceId::new(),
            publisher,
            started: Instant::now(),
            report: MemoryReport {
                rss_mb: 0,
                virtual_mb: 0,
                uptime_secs: 0,
            },
        }
    }

    /// The most recent report.
    #[must_use]
    pub fn report(&self) -> &MemoryReport {
        &self.report
    }

    /// Refresh the report from the OS and publish the new state.
    ///
    /// Platforms where memory statistics are unavailable keep the previous
    /// report.
    pub async fn sample(&mut self) {
        if let Some(usage) = memory_stats::memory_stats() {
            self.report = MemoryReport::from_usage(
                usage.physical_mem,
                usage.virtual_mem,
                self.started.elapsed(),
            );
        }
        self.publish_state().await;
    }

    /// Sample once per second and answer gateway requests with the latest
    /// report, until every client is gone.
    pub async fn run(mut self, mut requests: GatewayServer<RequestDescriptor, MemoryReport>) {
        self.sample().await;
        let mut tick = tokio::time::interval(SAMPLE_INTERVAL);
        loop {
            tokio::select! {
                _ = tick.tick() => self.sample().await,
                maybe = requests.recv() => match maybe {
                    Some((descriptor, responder)) => {
                        tracing::debug!(path = %descriptor.path, "memory report requested");
                        responder.send(self.report.clone());
                    }
                    None => break,
                },
            }
        }
    }

    async fn publish_state(&self) {
        let frame = StateFrame::new(
            self.device_id,
            "memory-monitor",
            serde_json::json!({
                "rss_mb": self.report.rss_mb,
                "virtual_mb": self.report.virtual_mb,
                "uptime_secs": self.report.uptime_secs,
            }),
        );
        self.publisher.publish(frame).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use devrack_app::gateway::reply_channel;
    use devrack_app::state_bus::InProcessStateBus;
    use std::collections::HashMap;
    use std::sync::Arc;

    #[test]
    fn should_round_byte_counts_to_mebibytes() {
        let report = MemoryReport::from_usage(42 * MIB, 100 * MIB, Duration::from_secs(7));
        assert_eq!(report.rss_mb, 42);
        assert_eq!(report.virtual_mb, 100);
        assert_eq!(report.uptime_secs, 7);
    }

    #[test]
    fn should_round_half_mebibyte_up() {
        let report = MemoryReport::from_usage(MIB + MIB / 2, MIB / 2 - 1, Duration::ZERO);
        assert_eq!(report.rss_mb, 2);
        assert_eq!(report.virtual_mb, 0);
    }

    #[test]
    fn should_roundtrip_report_through_serde_json() {
        let report = MemoryReport {
            rss_mb: 42,
            virtual_mb: 128,
            uptime_secs: 3600,
        };
        let json = serde_json::to_string(&report).unwrap();
        let parsed: MemoryReport = serde_json::from_str(&json).unwrap();
        assert_eq!(report, parsed);
    }

    #[tokio::test]
    async fn should_refresh_report_on_sample() {
        let mut monitor = MemoryMonitor::new(Arc::new(InProcessStateBus::new(16)));
        monitor.sample().await;
        // a running process always has a nonzero resident set
        assert!(monitor.report().rss_mb > 0);
    }

    #[tokio::test]
    async fn should_publish_state_on_sample() {
        let bus = Arc::new(InProcessStateBus::new(16));
        let mut rx = bus.subscribe();
        let mut monitor = MemoryMonitor::new(Arc::clone(&bus));

        monitor.sample().await;

        let frame = rx.recv().await.unwrap();
        assert_eq!(frame.source, "memory-monitor");
        assert!(frame.shares["rss_mb"].is_u64());
    }

    #[tokio::test]
    async fn should_answer_gateway_requests_with_latest_report() {
        let (client, server) = reply_channel(4, Duration::from_secs(1));
        let monitor = MemoryMonitor::new(Arc::new(InProcessStateBus::new(16)));
        tokio::spawn(monitor.run(server));

        let descriptor = RequestDescriptor::new("GET", "/memory", HashMap::new());
        let report = client.call(descriptor).await.unwrap();
        assert!(report.rss_mb > 0);
    }
}
