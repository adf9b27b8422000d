//! Temperature sensor — generates a smooth sinusoidal reading.
//!
//! The simulated temperature follows `22.5 + 3.5·sin(2πt/60)` (19–26 °C over
//! a 60-second period), rounded to one decimal, sampled every two seconds.

use std::f64::consts::TAU;
use std::time::Duration;

use tokio::sync::mpsc;

use devrack_app::ports::{MetricSink, StatePublisher};
use devrack_app::signal::OutputPort;
use devrack_domain::id::DeviceId;
use devrack_domain::metric::MetricPoint;
use devrack_domain::state::StateFrame;

const BASE_TEMP: f64 = 22.5;
const AMPLITUDE: f64 = 3.5;
const PERIOD_SECS: f64 = 60.0;
const SAMPLE_INTERVAL: Duration = Duration::from_secs(2);

/// The simulated temperature at `unix_seconds`.
#[must_use]
pub fn temperature_at(unix_seconds: f64) -> f64 {
    let sine = (TAU * unix_seconds / PERIOD_SECS).sin();
    round_one_decimal(BASE_TEMP + AMPLITUDE * sine)
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// A simulated temperature sensor with a temperature output.
pub struct TemperatureSensor<P, M> {
    device_id: DeviceId,
    publisher: P,
    metrics: M,
    temperature_out: OutputPort<f64>,
    temp: f64,
}

impl<P, M> TemperatureSensor<P, M>
where
    P: StatePublisher + Send + Sync,
    M: MetricSink + Send + Sync,
{
    /// Create a sensor reporting the base temperature until the first sample.
    pub fn new(publisher: P, metrics: M, temperature_out: OutputPort<f64>) -> Self {
        Self {
            device_id: DeviceId::new(),
            publisher,
            metrics,
            temperature_out,
            temp: BASE_TEMP,
        }
    }

    /// Latest sampled temperature.
    #[must_use]
    pub fn temp(&self) -> f64 {
        self.temp
    }

    /// Take one sample for the given time, record the metric, push the value
    /// to the output, and publish the new state.
    pub async fn sample(&mut self, unix_seconds: f64) {
        self.temp = temperature_at(unix_seconds);
        self.metrics
            .record(MetricPoint::new(self.device_id, "temp.value", self.temp))
            .await;
        self.temperature_out.push(self.temp).await;
        self.publish_state().await;
    }

    /// Sample immediately and then every two seconds, forever.
    pub async fn run(mut self) {
        let mut tick = tokio::time::interval(SAMPLE_INTERVAL);
        loop {
            tick.tick().await;
            let millis = devrack_domain::time::now().timestamp_millis();
            self.sample(millis as f64 / 1000.0).await;
        }
    }

    async fn publish_state(&self) {
        let frame = StateFrame::new(
            self.device_id,
            "temp-sensor",
            serde_json::json!({"temp": self.temp}),
        );
        self.publisher.publish(frame).await;
    }
}
