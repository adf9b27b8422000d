//! Heater simulator — obeys power commands, reports its state as a metric.

use std::time::Duration;

use tokio::sync::mpsc;

use devrack_app::ports::{MetricSink, StatePublisher};
use devrack_domain::id::DeviceId;
use devrack_domain::metric::MetricPoint;
use devrack_domain::state::StateFrame;

const METRIC_INTERVAL: Duration = Duration::from_secs(1);

/// A simulated heater driven by a thermostat.
pub struct HeaterSimulator<P, M> {
    device_id: DeviceId,
    publisher: P,
    metrics: M,
    is_on: bool,
}

impl<P, M> HeaterSimulator<P, M>
where
    P: StatePublisher + Send + Sync,
    M: MetricSink + Send + Sync,
{
    /// Create a heater that starts off.
    pub fn new(publisher: P, metrics: M) -> Self {
        Self {
            device_id: DeviceId::new(),
            publisher,
            metrics,
            is_on: false,
        }
    }

    /// Whether the heater is on.
    #[must_use]
    pub fn is_on(&self) -> bool {
        self.is_on
    }

    /// Textual status for the live view.
    #[must_use]
    pub fn status(&self) -> &'static str {
        if self.is_on { "on" } else { "off" }
    }

    /// Power input from the thermostat.
    pub async fn input_power(&mut self, on: bool) {
        self.is_on = on;
        self.publish_state().await;
        tracing::info!(status = self.status(), "heater power changed");
    }

    /// Consume power commands and emit the per-second state metric until
    /// all senders are gone.
    pub async fn run(mut self, mut power: mpsc::Receiver<bool>) {
        self.publish_state().await;
        let mut tick = tokio::time::interval(METRIC_INTERVAL);
        loop {
            tokio::select! {
                maybe = power.recv() => match maybe {
                    Some(on) => self.input_power(on).await,
                    None => break,
                },
                _ = tick.tick() => {
                    let value = if self.is_on { 1.0 } else { 0.0 };
                    self.metrics
                        .record(MetricPoint::new(self.device_id, "heater.on", value))
                        .await;
                }
            }
        }
    }

    async fn publish_state(&self) {
        let frame = StateFrame::new(
            self.device_id,
            "heater",
            serde_json::json!({
                "isOn": self.is_on,
                "status": self.status(),
            }),
        );
        self.publisher.publish(frame).await;
    }
}
