//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `devrack.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::time::Duration;

use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Gateway call settings.
    pub gateway: GatewayConfig,
    /// Device toggles and initial values.
    pub devices: DevicesConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port; restricted to the non-privileged range 1024–65535.
    pub port: u16,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// Gateway request/reply configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// How long a handler waits for a collaborator's reply, in seconds.
    pub reply_timeout_secs: u64,
}

/// Per-device toggles and initial values.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DevicesConfig {
    /// Enable the lighting devices (dimmer, bulb, toggle switch).
    pub lighting: bool,
    /// Enable the climate devices (sensor, thermostat, heater).
    pub climate: bool,
    /// Enable the memory monitor (and the `/memory` endpoint).
    pub memory: bool,
    /// Dimmer level at startup (0–100).
    pub initial_brightness: i64,
    /// Thermostat target at startup, °C (10–35).
    pub initial_target: f64,
}

impl Config {
    /// Load configuration from `devrack.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting values fail validation.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("devrack.toml")?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(val) = std::env::var("DEVRACK_HOST") {
            self.server.host = val;
        }
        if let Ok(val) = std::env::var("DEVRACK_PORT") {
            self.server.port = parse_port(&val)?;
        }
        if let Ok(val) = std::env::var("DEVRACK_BIND") {
            let Some((host, port)) = val.rsplit_once(':') else {
                return Err(ConfigError::Validation(format!(
                    "invalid bind address `{val}`, expected `host:port`"
                )));
            };
            self.server.host = host.to_string();
            self.server.port = parse_port(port)?;
        }
        if let Ok(val) = std::env::var("DEVRACK_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port < 1024 {
            return Err(ConfigError::Validation(format!(
                "port must be between 1024 and 65535, got {}",
                self.server.port
            )));
        }
        if !(0..=100).contains(&self.devices.initial_brightness) {
            return Err(ConfigError::Validation(format!(
                "initial_brightness must be between 0 and 100, got {}",
                self.devices.initial_brightness
            )));
        }
        if !(10.0..=35.0).contains(&self.devices.initial_target) {
            return Err(ConfigError::Validation(format!(
                "initial_target must be between 10 and 35, got {}",
                self.devices.initial_target
            )));
        }
        if self.gateway.reply_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "reply_timeout_secs must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Parse an overridden port value, rejecting garbage instead of falling back
/// to the file/default value silently.
fn parse_port(value: &str) -> Result<u16, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::Validation(format!("invalid port `{value}`")))
}

impl GatewayConfig {
    /// The reply timeout as a [`Duration`].
    #[must_use]
    pub fn reply_timeout(&self) -> Duration {
        Duration::from_secs(self.reply_timeout_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8090,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "devrackd=info,devrack=info,tower_http=debug".to_string(),
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            reply_timeout_secs: 5,
        }
    }
}

impl Default for DevicesConfig {
    fn default() -> Self {
        Self {
            lighting: true,
            climate: true,
            memory: true,
            initial_brightness: 50,
            initial_target: 23.0,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
