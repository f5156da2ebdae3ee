//! Channel and network configuration table.
//!
//! Supplied once at construction time and immutable afterwards:
//! - `ChannelConfig` - per logical channel `(default_mode, max_mode, timeout_ms)`
//! - `NetworkConfig` - per physical bus (driver, baud rate, owning channel)
//! - `ComStackConfig` - the whole table, loaded from TOML
//!
//! # TOML Example
//!
//! ```toml
//! [shared]
//! service_name = "ecu-comstack"
//!
//! [[channels]]
//! id = 0
//! name = "can"
//! default_mode = "full"
//! max_mode = "full"
//! timeout_ms = 1000
//! wakeup_support = true
//!
//! [[networks]]
//! name = "can0"
//! driver = "simulation"
//! baud_rate = 2000000
//! channel = 0
//! ```

use crate::comm::mode::{ChannelId, ComMode};
use crate::config::{ConfigError, SharedConfig};
use crate::consts::{DEFAULT_BAUD_RATE, MAX_CHANNELS, MAX_NETWORKS};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

fn default_baud_rate() -> u32 {
    DEFAULT_BAUD_RATE
}

fn default_max_mode() -> ComMode {
    ComMode::FullCommunication
}

fn default_driver() -> String {
    "simulation".to_string()
}

/// Static configuration of one logical channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// Stable channel id; ids are dense `0..n`.
    pub id: ChannelId,
    /// Human-readable name used in logs.
    pub name: String,
    /// Mode a requester may seed at startup.
    #[serde(default)]
    pub default_mode: ComMode,
    /// Highest mode a requester may ask for.
    #[serde(default = "default_max_mode")]
    pub max_mode: ComMode,
    /// Inactivity timeout in milliseconds (0 = none).
    #[serde(default)]
    pub timeout_ms: u32,
    /// Channel can be woken from the bus.
    #[serde(default)]
    pub wakeup_support: bool,
}

/// Static configuration of one physical network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub name: String,
    /// Bridge driver name registered with the HAL driver registry.
    #[serde(default = "default_driver")]
    pub driver: String,
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
    /// Logical channel this network realizes.
    pub channel: ChannelId,
}

/// Complete com stack configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComStackConfig {
    #[serde(default)]
    pub shared: SharedConfig,
    pub channels: Vec<ChannelConfig>,
    #[serde(default)]
    pub networks: Vec<NetworkConfig>,
}

impl ComStackConfig {
    /// Built-in four-channel table with one CAN-FD network.
    pub fn default_table() -> Self {
        let channel = |id: ChannelId,
                       name: &str,
                       default_mode: ComMode,
                       timeout_ms: u32,
                       wakeup_support: bool| {
            ChannelConfig {
                id,
                name: name.to_string(),
                default_mode,
                max_mode: ComMode::FullCommunication,
                timeout_ms,
                wakeup_support,
            }
        };

        Self {
            shared: SharedConfig::default(),
            channels: vec![
                channel(ChannelId::CAN, "can", ComMode::FullCommunication, 1000, true),
                channel(ChannelId::LIN, "lin", ComMode::SilentCommunication, 500, false),
                channel(ChannelId::FLEXRAY, "flexray", ComMode::NoCommunication, 0, false),
                channel(ChannelId::ETHERNET, "eth", ComMode::FullCommunication, 2000, true),
            ],
            networks: vec![NetworkConfig {
                name: "can0".to_string(),
                driver: default_driver(),
                baud_rate: DEFAULT_BAUD_RATE,
                channel: ChannelId::CAN,
            }],
        }
    }

    /// Look up a channel by id.
    pub fn channel(&self, id: ChannelId) -> Option<&ChannelConfig> {
        self.channels.iter().find(|c| c.id == id)
    }

    /// Validate the table.
    ///
    /// # Validation Rules
    /// 1. `1 <= channels.len() <= MAX_CHANNELS`
    /// 2. Channel ids unique and dense `0..n`
    /// 3. `default_mode <= max_mode`
    /// 4. `networks.len() <= MAX_NETWORKS`, names unique and non-empty
    /// 5. `baud_rate > 0`, network channel exists
    /// 6. A network's channel allows `FullCommunication`
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;

        if self.channels.is_empty() {
            return Err(ConfigError::ValidationError(
                "at least one channel is required".to_string(),
            ));
        }
        if self.channels.len() > MAX_CHANNELS {
            return Err(ConfigError::ValidationError(format!(
                "Too many channels: {} (max {})",
                self.channels.len(),
                MAX_CHANNELS
            )));
        }

        let mut ids = HashSet::new();
        for channel in &self.channels {
            if !ids.insert(channel.id) {
                return Err(ConfigError::ValidationError(format!(
                    "Duplicate channel id: {}",
                    channel.id
                )));
            }
            if channel.id.index() >= self.channels.len() {
                return Err(ConfigError::ValidationError(format!(
                    "Channel id {} out of range (ids must be 0..{})",
                    channel.id,
                    self.channels.len()
                )));
            }
            if channel.default_mode > channel.max_mode {
                return Err(ConfigError::ValidationError(format!(
                    "Channel {} ({}): default_mode {:?} exceeds max_mode {:?}",
                    channel.id, channel.name, channel.default_mode, channel.max_mode
                )));
            }
        }

        if self.networks.len() > MAX_NETWORKS {
            return Err(ConfigError::ValidationError(format!(
                "Too many networks: {} (max {})",
                self.networks.len(),
                MAX_NETWORKS
            )));
        }

        let mut names = HashSet::new();
        for network in &self.networks {
            if network.name.is_empty() {
                return Err(ConfigError::ValidationError(
                    "network name cannot be empty".to_string(),
                ));
            }
            if !names.insert(network.name.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "Duplicate network name: {}",
                    network.name
                )));
            }
            if network.baud_rate == 0 {
                return Err(ConfigError::ValidationError(format!(
                    "Network {}: baud_rate must be greater than 0",
                    network.name
                )));
            }
            let Some(channel) = self.channel(network.channel) else {
                return Err(ConfigError::ValidationError(format!(
                    "Network {} references unknown channel {}",
                    network.name, network.channel
                )));
            };
            if channel.max_mode < ComMode::FullCommunication {
                return Err(ConfigError::ValidationError(format!(
                    "Network {}: channel {} ({}) max_mode {:?} does not allow full communication",
                    network.name, channel.id, channel.name, channel.max_mode
                )));
            }
        }

        Ok(())
    }
}
