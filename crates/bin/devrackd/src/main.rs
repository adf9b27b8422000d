//! devrackd — wires the simulated devices together behind the HTTP front
//! door and runs the server.
//!
//! Device graph (when everything is enabled):
//!
//! ```text
//! toggle switch ──power──▶ smart bulb ◀──brightness── dimmer
//! temp sensor ──temp──▶ thermostat ──power──▶ heater
//! memory monitor ◀──gateway── GET /memory handler
//! ```
//!
//! The dimmer, toggle switch, and thermostat additionally serve validated
//! action requests over gateway channels; their endpoints reply with the
//! device's own acknowledgement instead of a fire-and-forget note.
//!
//! Every device publishes state frames on a shared in-process bus; a
//! dedicated task forwards those frames to the log.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tracing_subscriber::EnvFilter;

use devrack_adapter_devices::{
    Dimmer, DimmerAction, HeaterSimulator, MemoryMonitor, SmartBulb, SmartThermostat,
    TemperatureSensor, ThermostatAction, ToggleAction, ToggleSwitch,
};
use devrack_adapter_http::registry::RegistryError;
use devrack_adapter_http::{Dispatcher, HandlerError, HandlerRegistry, server};
use devrack_app::gateway::reply_channel;
use devrack_app::metric_sink::InMemoryMetricSink;
use devrack_app::signal::OutputPort;
use devrack_app::state_bus::InProcessStateBus;
use devrack_domain::request::RequestDescriptor;
use devrack_domain::state::StateFrame;

use crate::config::Config;

mod config;

const STATE_BUS_CAPACITY: usize = 256;
const METRIC_CAPACITY: usize = 4096;
const SIGNAL_CAPACITY: usize = 8;
const DIMMER_STEP: i64 = 10;
const ECO_TARGET: f64 = 18.0;
const COMFORT_TARGET: f64 = 23.0;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();

    let bus = Arc::new(InProcessStateBus::new(STATE_BUS_CAPACITY));
    let metrics = Arc::new(InMemoryMetricSink::new(METRIC_CAPACITY));

    tokio::spawn(log_state_frames(bus.subscribe()));

    let mut registry = HandlerRegistry::new();
    registry.register("GETHealth", |_| async {
        Ok(serde_json::json!({"status": "ok"}))
    })?;

    if config.devices.lighting {
        wire_lighting(
            &mut registry,
            &bus,
            &metrics,
            config.devices.initial_brightness,
            config.gateway.reply_timeout(),
        )?;
    }
    if config.devices.climate {
        wire_climate(
            &mut registry,
            &bus,
            &metrics,
            config.devices.initial_target,
            config.gateway.reply_timeout(),
        )?;
    }
    if config.devices.memory {
        wire_memory(&mut registry, &bus, &config)?;
    }

    tracing::info!(handlers = registry.len(), "handlers registered");

    let dispatcher = Arc::new(Dispatcher::new(registry, Arc::clone(&bus)));
    dispatcher.publish_state().await;

    let router = server::build(dispatcher);
    let listener = TcpListener::bind(config.bind_addr()).await?;
    tracing::info!(addr = %config.bind_addr(), "listening");
    axum::serve(listener, router).await?;
    Ok(())
}

/// Toggle switch → smart bulb ← dimmer, plus the lighting endpoints.
fn wire_lighting(
    registry: &mut HandlerRegistry,
    bus: &Arc<InProcessStateBus>,
    metrics: &Arc<InMemoryMetricSink>,
    initial_brightness: i64,
    reply_timeout: Duration,
) -> Result<(), RegistryError> {
    let (power_tx, power_rx) = mpsc::channel(SIGNAL_CAPACITY);
    let (brightness_tx, brightness_rx) = mpsc::channel(SIGNAL_CAPACITY);

    let bulb = SmartBulb::new(Arc::clone(bus), Arc::clone(metrics));
    tokio::spawn(bulb.run(power_rx, brightness_rx));

    let switch = ToggleSwitch::new(Arc::clone(bus), OutputPort::wired(power_tx));
    let (toggle_client, toggle_actions) = reply_channel(SIGNAL_CAPACITY, reply_timeout);
    tokio::spawn(switch.run(toggle_actions));

    let dimmer = Dimmer::new(
        Arc::clone(bus),
        OutputPort::wired(brightness_tx),
        initial_brightness,
    );
    let (set_level_tx, set_level_rx) = mpsc::channel(SIGNAL_CAPACITY);
    let (adjust_tx, adjust_rx) = mpsc::channel(SIGNAL_CAPACITY);
    let (dimmer_client, dimmer_actions) = reply_channel(SIGNAL_CAPACITY, reply_timeout);
    tokio::spawn(dimmer.run(set_level_rx, adjust_rx, dimmer_actions));

    registry.register("POSTLightingToggle", {
        let client = toggle_client.clone();
        move |_| {
            let client = client.clone();
            async move {
                let reply = client.call(ToggleAction::Toggle).await?;
                Ok(serde_json::to_value(reply)?)
            }
        }
    })?;

    registry.register("GETLighting", move |_| {
        let client = toggle_client.clone();
        async move {
            let reply = client.call(ToggleAction::GetState).await?;
            Ok(serde_json::to_value(reply)?)
        }
    })?;

    registry.register("POSTDimmerUp", {
        let adjust = adjust_tx.clone();
        move |_| {
            let adjust = adjust.clone();
            async move {
                adjust
                    .send(DIMMER_STEP)
                    .await
                    .map_err(|_| HandlerError::failed("dimmer is offline"))?;
                Ok(serde_json::json!({"success": true, "adjustment": DIMMER_STEP}))
            }
        }
    })?;

    registry.register("POSTDimmerDown", move |_| {
        let adjust = adjust_tx.clone();
        async move {
            adjust
                .send(-DIMMER_STEP)
                .await
                .map_err(|_| HandlerError::failed("dimmer is offline"))?;
            Ok(serde_json::json!({"success": true, "adjustment": -DIMMER_STEP}))
        }
    })?;

    registry.register("POSTDimmerReset", move |_| {
        let set_level = set_level_tx.clone();
        async move {
            set_level
                .send(initial_brightness)
                .await
                .map_err(|_| HandlerError::failed("dimmer is offline"))?;
            Ok(serde_json::json!({"success": true, "brightness": initial_brightness}))
        }
    })?;

    registry.register("POSTDimmerSet", {
        let client = dimmer_client.clone();
        move |descriptor| {
            let client = client.clone();
            async move {
                let level = header_value(&descriptor, "x-brightness")?;
                let reply = client
                    .call(DimmerAction::SetBrightness(level))
                    .await?
                    .map_err(|err| HandlerError::failed(err.to_string()))?;
                Ok(serde_json::to_value(reply)?)
            }
        }
    })?;

    registry.register("GETDimmer", move |_| {
        let client = dimmer_client.clone();
        async move {
            let reply = client
                .call(DimmerAction::GetBrightness)
                .await?
                .map_err(|err| HandlerError::failed(err.to_string()))?;
            Ok(serde_json::to_value(reply)?)
        }
    })?;

    Ok(())
}

/// Temp sensor → thermostat → heater, plus the target presets.
fn wire_climate(
    registry: &mut HandlerRegistry,
    bus: &Arc<InProcessStateBus>,
    metrics: &Arc<InMemoryMetricSink>,
    initial_target: f64,
    reply_timeout: Duration,
) -> Result<(), RegistryError> {
    let (temp_tx, temp_rx) = mpsc::channel(SIGNAL_CAPACITY);
    let (heater_tx, heater_rx) = mpsc::channel(SIGNAL_CAPACITY);
    let (target_tx, target_rx) = mpsc::channel(SIGNAL_CAPACITY);

    let sensor = TemperatureSensor::new(
        Arc::clone(bus),
        Arc::clone(metrics),
        OutputPort::wired(temp_tx),
    );
    tokio::spawn(sensor.run());

    let thermostat = SmartThermostat::new(
        Arc::clone(bus),
        OutputPort::wired(heater_tx),
        initial_target,
    );
    let (thermostat_client, thermostat_actions) = reply_channel(SIGNAL_CAPACITY, reply_timeout);
    tokio::spawn(thermostat.run(temp_rx, target_rx, thermostat_actions));

    let heater = HeaterSimulator::new(Arc::clone(bus), Arc::clone(metrics));
    tokio::spawn(heater.run(heater_rx));

    registry.register("POSTThermostatEco", {
        let target = target_tx.clone();
        move |_| {
            let target = target.clone();
            async move {
                target
                    .send(ECO_TARGET)
                    .await
                    .map_err(|_| HandlerError::failed("thermostat is offline"))?;
                Ok(serde_json::json!({"success": true, "target": ECO_TARGET}))
            }
        }
    })?;

    registry.register("POSTThermostatComfort", move |_| {
        let target = target_tx.clone();
        async move {
            target
                .send(COMFORT_TARGET)
                .await
                .map_err(|_| HandlerError::failed("thermostat is offline"))?;
            Ok(serde_json::json!({"success": true, "target": COMFORT_TARGET}))
        }
    })?;

    registry.register("POSTThermostatTarget", {
        let client = thermostat_client.clone();
        move |descriptor| {
            let client = client.clone();
            async move {
                let target = header_value(&descriptor, "x-target")?;
                let reply = client
                    .call(ThermostatAction::SetTarget(target))
                    .await?
                    .map_err(|err| HandlerError::failed(err.to_string()))?;
                Ok(serde_json::to_value(reply)?)
            }
        }
    })?;

    registry.register("GETThermostat", move |_| {
        let client = thermostat_client.clone();
        async move {
            let reply = client
                .call(ThermostatAction::GetStatus)
                .await?
                .map_err(|err| HandlerError::failed(err.to_string()))?;
            Ok(serde_json::to_value(reply)?)
        }
    })?;

    Ok(())
}

/// Memory monitor behind a gateway channel, answering `GET /memory`.
fn wire_memory(
    registry: &mut HandlerRegistry,
    bus: &Arc<InProcessStateBus>,
    config: &Config,
) -> Result<(), RegistryError> {
    let (client, gateway_server) = reply_channel::<RequestDescriptor, _>(
        SIGNAL_CAPACITY,
        config.gateway.reply_timeout(),
    );

    let monitor = MemoryMonitor::new(Arc::clone(bus));
    tokio::spawn(monitor.run(gateway_server));

    registry.register("GETMemory", move |descriptor| {
        let client = client.clone();
        async move {
            let report = client.call(descriptor).await?;
            Ok(serde_json::to_value(report)?)
        }
    })?;

    Ok(())
}

/// Read a typed argument from a request header.
///
/// The front door carries no request bodies, so parameterized actions take
/// their argument from a header (`x-brightness`, `x-target`). A missing or
/// unparsable header fails the handler; out-of-range values are rejected by
/// the device's own validation.
fn header_value<T: FromStr>(
    descriptor: &RequestDescriptor,
    name: &str,
) -> Result<T, HandlerError> {
    let raw = descriptor
        .headers
        .get(name)
        .ok_or_else(|| HandlerError::failed(format!("missing `{name}` header")))?;
    raw.parse()
        .map_err(|_| HandlerError::failed(format!("invalid `{name}` header: `{raw}`")))
}

/// Forward every state frame on the bus to the log until the bus is gone.
async fn log_state_frames(mut frames: broadcast::Receiver<StateFrame>) {
    loop {
        match frames.recv().await {
            Ok(frame) => {
                tracing::info!(
                    source = frame.source,
                    device = %frame.device,
                    shares = %frame.shares,
                    "state",
                );
            }
            Err(broadcast::error::RecvError::Lagged(missed)) => {
                tracing::warn!(missed, "state log fell behind");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
