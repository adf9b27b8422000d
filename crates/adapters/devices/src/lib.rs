//! # devrack-adapter-devices
//!
//! Simulated devices hosted in the rack.
//!
//! | Device | Inputs | Actions | Outputs | Periodic behaviour |
//! |--------|--------|---------|---------|--------------------|
//! | [`Dimmer`] | `set_level`, `adjust` | [`DimmerAction`] | brightness level | — |
//! | [`SmartBulb`] | `power`, `brightness` | — | — | per-second metrics |
//! | [`ToggleSwitch`] | — | [`ToggleAction`] | on/off state | — |
//! | [`SmartThermostat`] | `temperature`, `set_target` | [`ThermostatAction`] | heater control | — |
//! | [`TemperatureSensor`] | — | — | temperature | 2 s sinusoidal sample |
//! | [`HeaterSimulator`] | `power` | — | — | per-second metric |
//! | [`MemoryMonitor`] | — | gateway requests | — | 1 s memory sample |
//!
//! Each device is a plain struct whose state transitions are synchronous
//! methods (easy to test), plus a `run` loop that consumes its input
//! channels, serves its action requests, and ticks its timers on a tokio
//! task. Inputs are fire-and-forget and clamp out-of-range values; actions
//! go through a gateway channel, validate their arguments, and reply to the
//! caller. Devices publish a
//! [`StateFrame`](devrack_domain::state::StateFrame) after every change and
//! once at startup.
//!
//! ## Dependency rule
//!
//! Depends on `devrack-app` (ports, gateway, output ports) and
//! `devrack-domain` only.

mod bulb;
mod dimmer;
mod heater;
mod memory;
mod temp_sensor;
mod thermostat;
mod toggle;

pub use bulb::SmartBulb;
pub use dimmer::{BrightnessAck, BrightnessReading, Dimmer, DimmerAction, DimmerReply};
pub use heater::HeaterSimulator;
pub use memory::{MemoryMonitor, MemoryReport};
pub use temp_sensor::TemperatureSensor;
pub use thermostat::{
    SmartThermostat, TargetAck, ThermostatAction, ThermostatReply, ThermostatStatus,
};
pub use toggle::{ToggleAck, ToggleAction, ToggleReply, ToggleSwitch};
