/*!
Configuration management for the fan bridge.
*/

use anyhow::{Context, Result};
use fan_protocol::protocol::{DEFAULT_DEVICE_ID, DEFAULT_PASSWORD, DEFAULT_PORT};
use fan_protocol::{ChecksumPolicy, Credentials};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

/// Hostname a fresh configuration points at; replaced by discovery
pub const DEFAULT_HOSTNAME: &str = "127.0.0.1";

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub fan: FanConfig,
    pub bridge: BridgeConfig,
}

impl AppConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: AppConfig =
            toml::from_str(&content).with_context(|| "Failed to parse config file as TOML")?;

        Ok(config)
    }

    /// Load configuration, using defaults only when the file does not exist.
    ///
    /// Any other read or parse failure is returned.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let exists = path
            .try_exists()
            .with_context(|| format!("Failed to access config file: {}", path.display()))?;
        if !exists {
            warn!("Config file {} not found; using defaults", path.display());
            return Ok(Self::default());
        }

        let config = Self::load_from_file(path)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content =
            toml::to_string_pretty(self).with_context(|| "Failed to serialize config to TOML")?;

        std::fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        Ok(())
    }
}

/// Connection settings for one fan controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FanConfig {
    /// Controller hostname or IP address
    pub hostname: String,

    /// Controller UDP port
    pub port: u16,

    /// Controller password, at most 99 characters
    pub password: String,

    /// 16 character device identifier
    pub device_id: String,

    /// Friendly name
    pub name: String,

    /// Whether response checksums are verified
    pub checksum_policy: ChecksumPolicy,

    /// How long to wait for a response, in milliseconds
    pub response_timeout_ms: u64,
}

impl FanConfig {
    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.device_id.clone(), self.password.clone())
    }
}

impl Default for FanConfig {
    fn default() -> Self {
        Self {
            hostname: DEFAULT_HOSTNAME.to_string(),
            port: DEFAULT_PORT,
            password: DEFAULT_PASSWORD.to_string(),
            device_id: DEFAULT_DEVICE_ID.to_string(),
            name: String::new(),
            checksum_policy: ChecksumPolicy::Ignore,
            response_timeout_ms: 5000,
        }
    }
}

/// Host loop settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Seconds between status polls
    pub poll_interval_secs: u64,

    /// Run discovery before polling to fill in hostname/device id
    pub discover_on_start: bool,

    /// UDP port used for discovery broadcasts
    pub discovery_port: u16,

    /// Number of discovery probes
    pub discovery_probes: usize,

    /// Status channel buffer size
    pub channel_buffer_size: usize,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 5,
            discover_on_start: true,
            discovery_port: DEFAULT_PORT,
            discovery_probes: 10,
            channel_buffer_size: 16,
        }
    }
}
