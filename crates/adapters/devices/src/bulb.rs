//! Smart bulb — lights up, reports consumption.
//!
//! Consumption model: 4 W at full brightness, scaled linearly and rounded,
//! zero when off. Brightness and consumption are sampled as metrics once per
//! second while the bulb's run loop is alive.

use std::time::Duration;

use tokio::sync::mpsc;

use devrack_app::ports::{MetricSink, StatePublisher};
use devrack_domain::id::DeviceId;
use devrack_domain::metric::MetricPoint;
use devrack_domain::state::StateFrame;

const METRIC_INTERVAL: Duration = Duration::from_secs(1);

/// A simulated light bulb with power and brightness inputs.
pub struct SmartBulb<P, M> {
    device_id: DeviceId,
    publisher: P,
    metrics: M,
    is_on: bool,
    brightness: i64,
}

impl<P, M> SmartBulb<P, M>
where
    P: StatePublisher + Send + Sync,
    M: MetricSink + Send + Sync,
{
    /// Create a bulb that starts switched off.
    pub fn new(publisher: P, metrics: M) -> Self {
        Self {
            device_id: DeviceId::new(),
            publisher,
            metrics,
            is_on: false,
            brightness: 0,
        }
    }

    /// Whether the bulb is lit.
    #[must_use]
    pub fn is_on(&self) -> bool {
        self.is_on
    }

    /// Current brightness level.
    #[must_use]
    pub fn brightness(&self) -> i64 {
        self.brightness
    }

    /// Current power draw in watts.
    #[must_use]
    pub fn power_consumption(&self) -> i64 {
        if self.is_on {
            // 4 W at full brightness, rounded to the nearest watt
            (self.brightness * 4 + 50) / 100
        } else {
            0
        }
    }

    /// Textual status for the live view.
    #[must_use]
    pub fn status(&self) -> String {
        if self.is_on {
            format!("on ({}%)", self.brightness)
        } else {
            "off".to_string()
        }
    }

    /// Power input: switch the bulb on or off.
    pub async fn input_power(&mut self, on: bool) {
        self.is_on = on;
        self.publish_state().await;
        tracing::info!(on, "bulb power changed");
    }

    /// Brightness input: set the level (clamped to 0–100).
    pub async fn input_brightness(&mut self, level: i64) {
        self.brightness = level.clamp(0, 100);
        self.publish_state().await;
        tracing::debug!(level = self.brightness, "bulb brightness changed");
    }

    /// Consume input channels and emit per-second metrics until all senders
    /// are gone.
    pub async fn run(mut self, mut power: mpsc::Receiver<bool>, mut brightness: mpsc::Receiver<i64>) {
        self.publish_state().await;
        let mut tick = tokio::time::interval(METRIC_INTERVAL);
        loop {
            tokio::select! {
                maybe = power.recv() => match maybe {
                    Some(on) => self.input_power(on).await,
                    None => break,
                },
                maybe = brightness.recv() => match maybe {
                    Some(level) => self.input_brightness(level).await,
                    None => break,
                },
                _ = tick.tick() => self.record_metrics().await,
            }
        }
    }

    async fn record_metrics(&self) {
        let brightness = self.brightness as f64;
        let consumption = self.power_consumption() as f64;
        self.metrics
            .record(MetricPoint::new(self.device_id, "brightness", brightness))
            .await;
        self.metrics
            .record(MetricPoint::new(self.device_id, "consumption", consumption))
            .await;
    }

    async fn publish_state(&self) {
        let frame = StateFrame::new(
            self.device_id,
            "bulb",
            serde_json::json!({
                "isOn": self.is_on,
                "brightness": self.brightness,
                "status": self.status(),
                "powerConsumption": self.power_consumption(),
            }),
        );
        self.publisher.publish(frame).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use devrack_app::metric_sink::InMemoryMetricSink;
    use devrack_app::state_bus::InProcessStateBus;
    use std::sync::Arc;

    fn bulb() -> SmartBulb<Arc<InProcessStateBus>, Arc<InMemoryMetricSink>> {
        SmartBulb::new(
            Arc::new(InProcessStateBus::new(16)),
            Arc::new(InMemoryMetricSink::new(64)),
        )
    }

    #[tokio::test]
    async fn should_start_switched_off() {
        let bulb = bulb();
        assert!(!bulb.is_on());
        assert_eq!(bulb.brightness(), 0);
        assert_eq!(bulb.status(), "off");
        assert_eq!(bulb.power_consumption(), 0);
    }

    #[tokio::test]
    async fn should_consume_nothing_while_off() {
        let mut bulb = bulb();
        bulb.input_brightness(100).await;
        assert_eq!(bulb.power_consumption(), 0);
    }

    #[tokio::test]
    async fn should_scale_consumption_with_brightness() {
        let mut bulb = bulb();
        bulb.input_power(true).await;

        bulb.input_brightness(100).await;
        assert_eq!(bulb.power_consumption(), 4);

        bulb.input_brightness(50).await;
        assert_eq!(bulb.power_consumption(), 2);

        bulb.input_brightness(57).await;
        assert_eq!(bulb.power_consumption(), 2);

        bulb.input_brightness(63).await;
        assert_eq!(bulb.power_consumption(), 3);
    }

    #[tokio::test]
    async fn should_report_status_with_brightness_when_on() {
        let mut bulb = bulb();
        bulb.input_power(true).await;
        bulb.input_brightness(75).await;
        assert_eq!(bulb.status(), "on (75%)");
    }

    #[tokio::test]
    async fn should_clamp_brightness_input() {
        let mut bulb = bulb();
        bulb.input_brightness(300).await;
        assert_eq!(bulb.brightness(), 100);
        bulb.input_brightness(-1).await;
        assert_eq!(bulb.brightness(), 0);
    }

    #[tokio::test]
    async fn should_publish_state_on_power_change() {
        let bus = Arc::new(InProcessStateBus::new(16));
        let mut rx = bus.subscribe();
        let mut bulb = SmartBulb::new(Arc::clone(&bus), Arc::new(InMemoryMetricSink::new(64)));

        bulb.input_power(true).await;

        let frame = rx.recv().await.unwrap();
        assert_eq!(frame.source, "bulb");
        assert_eq!(frame.shares["isOn"], true);
    }

    #[tokio::test(start_paused = true)]
    async fn should_record_metrics_on_tick() {
        let sink = Arc::new(InMemoryMetricSink::new(64));
        let bulb = SmartBulb::new(
            Arc::new(InProcessStateBus::new(16)),
            Arc::clone(&sink),
        );

        let (power_tx, power_rx) = mpsc::channel(4);
        let (brightness_tx, brightness_rx) = mpsc::channel(4);
        let task = tokio::spawn(bulb.run(power_rx, brightness_rx));

        tokio::time::sleep(Duration::from_millis(1100)).await;

        drop(power_tx);
        drop(brightness_tx);
        task.await.unwrap();

        let names: Vec<_> = sink.snapshot().iter().map(|p| p.name).collect();
        assert!(names.contains(&"brightness"));
        assert!(names.contains(&"consumption"));
    }
}
