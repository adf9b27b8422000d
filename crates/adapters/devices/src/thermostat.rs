//! Smart thermostat — hysteresis control over a heater output.
//!
//! Heating switches on when the target exceeds the current temperature by
//! more than 0.5 °C and off otherwise; the 0.5 °C band keeps the heater from
//! chattering around the setpoint. Temperatures below 10 °C or above 40 °C
//! raise a critical alert.

use serde::Serialize;
use tokio::sync::mpsc;

use devrack_app::gateway::GatewayServer;
use devrack_app::ports::StatePublisher;
use devrack_app::signal::OutputPort;
use devrack_domain::error::ValidationError;
use devrack_domain::id::DeviceId;
use devrack_domain::state::StateFrame;

/// Requests served by the thermostat's run loop.
#[derive(Debug)]
pub enum ThermostatAction {
    /// Validated target update.
    SetTarget(f64),
    /// Read the full status snapshot.
    GetStatus,
}

/// Replies to [`ThermostatAction`] requests.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ThermostatReply {
    Ack(TargetAck),
    Status(ThermostatStatus),
}

const HYSTERESIS: f64 = 0.5;
const CRITICAL_LOW: f64 = 10.0;
const CRITICAL_HIGH: f64 = 40.0;
const TARGET_MIN: f64 = 10.0;
const TARGET_MAX: f64 = 35.0;

/// Result of the `set_target` action.
#[derive(Debug, Serialize)]
pub struct TargetAck {
    pub success: bool,
    pub target: f64,
}

/// Snapshot returned by the `get_status` action.
#[derive(Debug, Serialize)]
pub struct ThermostatStatus {
    pub current_temp: Option<f64>,
    pub target_temp: f64,
    pub heater_on: bool,
    pub status: String,
}

/// A simulated thermostat driving a heater output.
pub struct SmartThermostat<P> {
    device_id: DeviceId,
    publisher: P,
    heater_out: OutputPort<bool>,
    current_temp: Option<f64>,
    target_temp: f64,
    heater_on: bool,
}

impl<P: StatePublisher + Send + Sync> SmartThermostat<P> {
    /// Create a thermostat with the given initial target temperature.
    pub fn new(publisher: P, heater_out: OutputPort<bool>, target_temp: f64) -> Self {
        Self {
            device_id: DeviceId::new(),
            publisher,
            heater_out,
            current_temp: None,
            target_temp,
            heater_on: false,
        }
    }

    /// Whether the heater is currently commanded on.
    #[must_use]
    pub fn heater_on(&self) -> bool {
        self.heater_on
    }

    /// The configured target temperature.
    #[must_use]
    pub fn target_temp(&self) -> f64 {
        self.target_temp
    }

    /// Temperature input from the sensor.
    pub async fn input_temperature(&mut self, temp: f64) {
        self.current_temp = Some(temp);
        self.evaluate_heater().await;
        self.publish_state().await;
    }

    /// Target input from another device (no validation, mirroring the
    /// permissive input-port contract).
    pub async fn input_set_target(&mut self, target: f64) {
        self.set_target(target).await;
    }

    /// `set_target` action: validated target update.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] when `target` is outside 10–35 °C.
    pub async fn action_set_target(&mut self, target: f64) -> Result<TargetAck, ValidationError> {
        if !(TARGET_MIN..=TARGET_MAX).contains(&target) {
            return Err(ValidationError::new(
                "target",
                format!("must be between {TARGET_MIN} and {TARGET_MAX} \u{b0}C"),
            ));
        }
        self.set_target(target).await;
        Ok(TargetAck {
            success: true,
            target: self.target_temp,
        })
    }

    /// `get_status` action: full snapshot.
    #[must_use]
    pub fn action_get_status(&self) -> ThermostatStatus {
        ThermostatStatus {
            current_temp: self.current_temp,
            target_temp: self.target_temp,
            heater_on: self.heater_on,
            status: self.status(),
        }
    }

    /// Consume sensor readings and target updates, and serve action
    /// requests, until all senders are gone.
    pub async fn run(
        mut self,
        mut temperature: mpsc::Receiver<f64>,
        mut target: mpsc::Receiver<f64>,
        mut actions: GatewayServer<ThermostatAction, Result<ThermostatReply, ValidationError>>,
    ) {
        self.publish_state().await;
        loop {
            tokio::select! {
                maybe = temperature.recv() => match maybe {
                    Some(temp) => self.input_temperature(temp).await,
                    None => break,
                },
                maybe = target.recv() => match maybe {
                    Some(value) => self.input_set_target(value).await,
                    None => break,
                },
                maybe = actions.recv() => match maybe {
                    Some((action, responder)) => {
                        responder.send(self.handle_action(action).await);
                    }
                    None => break,
                },
            }
        }
    }

    async fn handle_action(
        &mut self,
        action: ThermostatAction,
    ) -> Result<ThermostatReply, ValidationError> {
        match action {
            ThermostatAction::SetTarget(value) => {
                self.action_set_target(value).await.map(ThermostatReply::Ack)
            }
            ThermostatAction::GetStatus => Ok(ThermostatReply::Status(self.action_get_status())),
        }
    }

    async fn set_target(&mut self, target: f64) {
        self.target_temp = target;
        self.evaluate_heater().await;
        tracing::info!(target, "target temperature set");
        self.publish_state().await;
    }

    async fn evaluate_heater(&mut self) {
        let Some(current) = self.current_temp else {
            return;
        };

        let should_heat = self.target_temp - current > HYSTERESIS;
        if should_heat != self.heater_on {
            self.heater_on = should_heat;
            self.heater_out.push(should_heat).await;
            tracing::info!(heater_on = should_heat, "heater state changed");
        }

        if !(CRITICAL_LOW..=CRITICAL_HIGH).contains(&current) {
            tracing::warn!(temp = current, "critical temperature");
        }
    }

    fn status(&self) -> String {
        if self.current_temp.is_none() {
            "waiting for data".to_string()
        } else if self.heater_on {
            "heating on".to_string()
        } else {
            "heating off".to_string()
        }
    }

    async fn publish_state(&self) {
        let frame = StateFrame::new(
            self.device_id,
            "thermostat",
            serde_json::json!({
                "currentTemp": self.current_temp,
                "targetTemp": self.target_temp,
                "heaterOn": self.heater_on,
                "status": self.status(),
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
    use std::sync::Arc;
    use std::time::Duration;

    fn thermostat() -> SmartThermostat<Arc<InProcessStateBus>> {
        SmartThermostat::new(
            Arc::new(InProcessStateBus::new(16)),
            OutputPort::disconnected(),
            23.0,
        )
    }

    #[tokio::test]
    async fn should_wait_for_data_before_any_reading() {
        let thermostat = thermostat();
        assert!(!thermostat.heater_on());
        assert_eq!(thermostat.action_get_status().status, "waiting for data");
    }

    #[tokio::test]
    async fn should_heat_when_more_than_half_degree_below_target() {
        let mut thermostat = thermostat();
        thermostat.input_temperature(22.0).await;
        assert!(thermostat.heater_on());
    }

    #[tokio::test]
    async fn should_not_heat_within_hysteresis_band() {
        let mut thermostat = thermostat();
        thermostat.input_temperature(22.6).await;
        assert!(!thermostat.heater_on());
    }

    #[tokio::test]
    async fn should_stop_heating_once_target_reached() {
        let mut thermostat = thermostat();
        thermostat.input_temperature(20.0).await;
        assert!(thermostat.heater_on());
        thermostat.input_temperature(23.5).await;
        assert!(!thermostat.heater_on());
    }

    #[tokio::test]
    async fn should_push_heater_command_only_on_change() {
        let (tx, mut rx) = mpsc::channel(4);
        let mut thermostat = SmartThermostat::new(
            Arc::new(InProcessStateBus::new(16)),
            OutputPort::wired(tx),
            23.0,
        );

        thermostat.input_temperature(20.0).await;
        assert_eq!(rx.recv().await, Some(true));

        // still below target: no second command
        thermostat.input_temperature(20.5).await;
        assert!(rx.try_recv().is_err());

        thermostat.input_temperature(24.0).await;
        assert_eq!(rx.recv().await, Some(false));
    }

    #[tokio::test]
    async fn should_reevaluate_when_target_changes() {
        let mut thermostat = thermostat();
        thermostat.input_temperature(22.0).await;
        assert!(thermostat.heater_on());

        thermostat.action_set_target(20.0).await.unwrap();
        assert!(!thermostat.heater_on());
    }

    #[tokio::test]
    async fn should_reject_target_outside_allowed_range() {
        let mut thermostat = thermostat();
        assert!(thermostat.action_set_target(9.9).await.is_err());
        assert!(thermostat.action_set_target(35.1).await.is_err());
        assert!((thermostat.target_temp() - 23.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn should_accept_target_at_range_bounds() {
        let mut thermostat = thermostat();
        let ack = thermostat.action_set_target(35.0).await.unwrap();
        assert!(ack.success);
        assert!((ack.target - 35.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn should_not_validate_target_from_input_port() {
        let mut thermostat = thermostat();
        thermostat.input_set_target(50.0).await;
        assert!((thermostat.target_temp() - 50.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn should_publish_state_with_reading() {
        let bus = Arc::new(InProcessStateBus::new(16));
        let mut rx = bus.subscribe();
        let mut thermostat =
            SmartThermostat::new(Arc::clone(&bus), OutputPort::disconnected(), 23.0);

        thermostat.input_temperature(21.0).await;

        let frame = rx.recv().await.unwrap();
        assert_eq!(frame.source, "thermostat");
        assert_eq!(frame.shares["currentTemp"], 21.0);
        assert_eq!(frame.shares["heaterOn"], true);
        assert_eq!(frame.shares["status"], "heating on");
    }

    #[tokio::test]
    async fn should_drive_heater_through_run_loop() {
        let (heater_tx, mut heater_rx) = mpsc::channel(4);
        let thermostat = SmartThermostat::new(
            Arc::new(InProcessStateBus::new(16)),
            OutputPort::wired(heater_tx),
            23.0,
        );

        let (temp_tx, temp_rx) = mpsc::channel(4);
        let (target_tx, target_rx) = mpsc::channel(4);
        let (_actions, actions_rx) = reply_channel(4, Duration::from_secs(1));
        let task = tokio::spawn(thermostat.run(temp_rx, target_rx, actions_rx));

        temp_tx.send(20.0).await.unwrap();
        assert_eq!(heater_rx.recv().await, Some(true));

        target_tx.send(19.0).await.unwrap();
        assert_eq!(heater_rx.recv().await, Some(false));

        drop(temp_tx);
        drop(target_tx);
        task.await.unwrap();
    }

    #[tokio::test]
    async fn should_serve_actions_through_run_loop() {
        let thermostat = thermostat();
        let (temp_tx, temp_rx) = mpsc::channel(4);
        let (target_tx, target_rx) = mpsc::channel(4);
        let (client, actions_rx) = reply_channel(4, Duration::from_secs(1));
        let task = tokio::spawn(thermostat.run(temp_rx, target_rx, actions_rx));

        let reply = client.call(ThermostatAction::SetTarget(21.0)).await.unwrap();
        let ThermostatReply::Ack(ack) = reply.unwrap() else {
            panic!("expected an ack");
        };
        assert!(ack.success);
        assert!((ack.target - 21.0).abs() < f64::EPSILON);

        let rejected = client.call(ThermostatAction::SetTarget(50.0)).await.unwrap();
        assert!(rejected.is_err());

        let reply = client.call(ThermostatAction::GetStatus).await.unwrap();
        let ThermostatReply::Status(status) = reply.unwrap() else {
            panic!("expected a status");
        };
        assert!((status.target_temp - 21.0).abs() < f64::EPSILON);
        assert_eq!(status.status, "waiting for data");

        drop(temp_tx);
        drop(target_tx);
        task.await.unwrap();
    }
}
