//! Session configuration.
//!
//! Defaults match the headset host's expectations. With the `config`
//! feature a [`SessionConfig`] can also be loaded from TOML and overridden
//! from the environment:
//!
//! ```toml
//! send_port = 5555
//! receive_port = 5556
//! bind_address = "0.0.0.0"
//! heartbeat_timeout_ms = 1000
//! touch_move_interval_ms = 50
//! device_info_interval_ms = 20
//! recv_buffer_size = 1024
//! tick_interval_ms = 10
//! ```
//!
//! Env overrides: `XDTK_SEND_PORT`, `XDTK_RECEIVE_PORT`,
//! `XDTK_HEARTBEAT_TIMEOUT_MS`, `XDTK_TICK_INTERVAL_MS`.

use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use crate::core::ConfigError;
use crate::core::constants::{
    DEFAULT_RECEIVE_PORT, DEFAULT_RECV_BUFFER_SIZE, DEFAULT_SEND_PORT, DEVICE_INFO_INTERVAL,
    HEARTBEAT_TIMEOUT, TICK_INTERVAL, TOUCH_MOVE_INTERVAL,
};
use crate::transport::TransportOptions;

/// Session parameters.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(serde::Deserialize))]
#[cfg_attr(feature = "config", serde(default, deny_unknown_fields))]
pub struct SessionConfig {
    /// Remote port telemetry is sent to.
    pub send_port: u16,

    /// Local port control messages arrive on.
    pub receive_port: u16,

    /// Local address the receive port is bound on.
    pub bind_address: IpAddr,

    /// Liveness window after the last heartbeat.
    #[cfg_attr(
        feature = "config",
        serde(rename = "heartbeat_timeout_ms", deserialize_with = "duration_ms")
    )]
    pub heartbeat_timeout: Duration,

    /// Minimum interval between TOUCH_MOVE frames.
    #[cfg_attr(
        feature = "config",
        serde(rename = "touch_move_interval_ms", deserialize_with = "duration_ms")
    )]
    pub touch_move_interval: Duration,

    /// Minimum interval between DEVICE_INFO frames.
    #[cfg_attr(
        feature = "config",
        serde(rename = "device_info_interval_ms", deserialize_with = "duration_ms")
    )]
    pub device_info_interval: Duration,

    /// Inbound datagram buffer size in bytes.
    pub recv_buffer_size: usize,

    /// Sensor flush cadence.
    #[cfg_attr(
        feature = "config",
        serde(rename = "tick_interval_ms", deserialize_with = "duration_ms")
    )]
    pub tick_interval: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            send_port: DEFAULT_SEND_PORT,
            receive_port: DEFAULT_RECEIVE_PORT,
            bind_address: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            heartbeat_timeout: HEARTBEAT_TIMEOUT,
            touch_move_interval: TOUCH_MOVE_INTERVAL,
            device_info_interval: DEVICE_INFO_INTERVAL,
            recv_buffer_size: DEFAULT_RECV_BUFFER_SIZE,
            tick_interval: TICK_INTERVAL,
        }
    }
}

impl SessionConfig {
    /// Start a builder from the defaults.
    pub fn builder() -> SessionConfigBuilder {
        SessionConfigBuilder::new()
    }

    /// Check that every interval and the receive buffer are non-zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let zero_durations = [
            ("heartbeat_timeout", self.heartbeat_timeout),
            ("touch_move_interval", self.touch_move_interval),
            ("device_info_interval", self.device_info_interval),
            ("tick_interval", self.tick_interval),
        ];
        if let Some((name, _)) = zero_durations.iter().find(|(_, d)| d.is_zero()) {
            return Err(ConfigError::Invalid(format!("{name} must be greater than zero")));
        }
        if self.recv_buffer_size == 0 {
            return Err(ConfigError::Invalid(
                "recv_buffer_size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Socket options derived from this config.
    pub fn transport_options(&self) -> TransportOptions {
        TransportOptions {
            bind_address: self.bind_address,
            recv_buffer_size: self.recv_buffer_size,
        }
    }
}

#[cfg(feature = "config")]
impl SessionConfig {
    /// Parse a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Read and parse a TOML file.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Defaults, then the file (if any), then the environment; validated.
    pub fn load(path: Option<&std::path::Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply `XDTK_*` overrides from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply `XDTK_*` overrides from `lookup`. Unparsable values are ignored.
    pub fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let parse = |key: &str| lookup(key).and_then(|v| v.trim().parse::<u64>().ok());

        if let Some(port) = parse("XDTK_SEND_PORT").and_then(|p| u16::try_from(p).ok()) {
            self.send_port = port;
        }
        if let Some(port) = parse("XDTK_RECEIVE_PORT").and_then(|p| u16::try_from(p).ok()) {
            self.receive_port = port;
        }
        if let Some(ms) = parse("XDTK_HEARTBEAT_TIMEOUT_MS") {
            self.heartbeat_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = parse("XDTK_TICK_INTERVAL_MS") {
            self.tick_interval = Duration::from_millis(ms);
        }
    }
}

#[cfg(feature = "config")]
fn duration_ms<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let ms = <u64 as serde::Deserialize>::deserialize(deserializer)?;
    Ok(Duration::from_millis(ms))
}

/// Builder for [`SessionConfig`].
#[derive(Debug)]
pub struct SessionConfigBuilder {
    config: SessionConfig,
}

impl SessionConfigBuilder {
    /// Create a new builder with default values.
    pub fn new() -> Self {
        Self {
            config: SessionConfig::default(),
        }
    }

    /// Set the remote telemetry port.
    pub fn send_port(mut self, port: u16) -> Self {
        self.config.send_port = port;
        self
    }

    /// Set the local receive port (0 = ephemeral).
    pub fn receive_port(mut self, port: u16) -> Self {
        self.config.receive_port = port;
        self
    }

    /// Set the local bind address.
    pub fn bind_address(mut self, addr: IpAddr) -> Self {
        self.config.bind_address = addr;
        self
    }

    /// Set the liveness window.
    pub fn heartbeat_timeout(mut self, timeout: Duration) -> Self {
        self.config.heartbeat_timeout = timeout;
        self
    }

    /// Set the TOUCH_MOVE rate-limit floor.
    pub fn touch_move_interval(mut self, interval: Duration) -> Self {
        self.config.touch_move_interval = interval;
        self
    }

    /// Set the DEVICE_INFO rate-limit floor.
    pub fn device_info_interval(mut self, interval: Duration) -> Self {
        self.config.device_info_interval = interval;
        self
    }

    /// Set the inbound datagram buffer size.
    pub fn recv_buffer_size(mut self, size: usize) -> Self {
        self.config.recv_buffer_size = size;
        self
    }

    /// Set the sensor flush cadence.
    pub fn tick_interval(mut self, interval: Duration) -> Self {
        self.config.tick_interval = interval;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> SessionConfig {
        self.config
    }
}

impl Default for SessionConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
