//! Engine configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::serde_utils::{duration_millis, duration_secs};
use crate::error::ConfigError;

/// Configuration for the sync engine
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Push-channel endpoint, e.g. `ws://localhost:8080/channel`
    pub channel_url: String,

    /// REST base URL, e.g. `http://localhost:8080`
    pub api_url: String,

    /// Reconnection policy for the push channel
    pub reconnect: ReconnectConfig,

    /// Heartbeat probe settings
    pub heartbeat: HeartbeatConfig,

    /// Mutation coalescing settings
    pub debounce: DebounceConfig,

    /// Valid ranges for seating assignments
    pub limits: AssignmentLimits,

    /// Connectivity sampling settings
    pub health: HealthConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            channel_url: "ws://localhost:8080/channel".to_string(),
            api_url: "http://localhost:8080".to_string(),
            reconnect: ReconnectConfig::default(),
            heartbeat: HeartbeatConfig::default(),
            debounce: DebounceConfig::default(),
            limits: AssignmentLimits::default(),
            health: HealthConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Check the parts of the config that cannot work when empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.channel_url.is_empty() {
            return Err(ConfigError::Invalid("channel_url is empty".to_string()));
        }
        if self.api_url.is_empty() {
            return Err(ConfigError::Invalid("api_url is empty".to_string()));
        }
        if self.reconnect.multiplier < 1.0 {
            return Err(ConfigError::Invalid(format!(
                "reconnect.multiplier must be >= 1.0, got {}",
                self.reconnect.multiplier
            )));
        }
        Ok(())
    }
}

/// Bounded-retry reconnection configuration.
///
/// After a drop, attempts are spaced by `base_delay` growing by
/// `multiplier` per attempt; once `max_attempts` have failed the channel
/// settles disconnected until an explicit connect.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconnectConfig {
    /// Whether automatic reconnection runs at all
    pub enabled: bool,

    /// Attempts before settling disconnected
    pub max_attempts: u32,

    /// Delay before the first retry
    #[serde(with = "duration_millis")]
    pub base_delay: Duration,

    /// Growth factor per attempt
    pub multiplier: f64,

    /// Jitter factor (0.0 to 1.0); 0 keeps the schedule exact
    pub jitter: f64,

    /// Timeout for a single dial
    #[serde(with = "duration_secs")]
    pub connect_timeout: Duration,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_attempts: 5,
            base_delay: Duration::from_millis(1000),
            multiplier: 1.5,
            jitter: 0.0,
            connect_timeout: Duration::from_secs(20),
        }
    }
}

/// Heartbeat probe configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HeartbeatConfig {
    /// Whether the probe runs while connected
    pub enabled: bool,

    /// Time between probes
    #[serde(with = "duration_secs")]
    pub interval: Duration,

    /// How long to wait for the reply before treating the transport as dead
    #[serde(with = "duration_secs")]
    pub timeout: Duration,
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval: Duration::from_secs(30),
            timeout: Duration::from_secs(5),
        }
    }
}

/// Mutation coalescing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DebounceConfig {
    /// Submits for the same key within this window collapse into one request
    #[serde(with = "duration_millis")]
    pub quiet_period: Duration,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            quiet_period: Duration::from_millis(500),
        }
    }
}

/// Valid ranges for numeric seating fields, checked before any request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssignmentLimits {
    /// Lowest valid table number
    pub table_min: u32,
    /// Highest valid table number
    pub table_max: u32,
    /// Lowest valid seat position
    pub position_min: u32,
    /// Highest valid seat position
    pub position_max: u32,
}

impl Default for AssignmentLimits {
    fn default() -> Self {
        Self {
            table_min: 1,
            table_max: 29,
            position_min: 1,
            position_max: 10,
        }
    }
}

/// Connectivity sampling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthConfig {
    /// How often the boolean connectivity signal is re-sampled
    #[serde(with = "duration_millis")]
    pub sample_interval: Duration,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            sample_interval: Duration::from_millis(2000),
        }
    }
}
