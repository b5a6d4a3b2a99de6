use naobridge_catalog::{Condition, GestureStyle};
use naobridge_core::WireFormat;
pub use naobridge_relay_core::AckPolicy;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use validator::Validate;

/// Environment variable holding the config file path
pub const CONFIG_PATH_ENV: &str = "NAOBRIDGE_CONFIG";

/// Configuration error
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load config: {0}")]
    LoadError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// Relay server configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct RelayConfig {
    #[validate(length(min = 1))]
    pub log_level: String,
    #[validate(length(min = 1))]
    pub host: String,
    /// Port the game connects to (0 lets the OS choose)
    pub game_port: u16,
    /// Port the robot connects to (0 lets the OS choose)
    pub robot_port: u16,
    pub condition: Condition,
    /// Pin the RISK gesture style instead of drawing it per session
    pub gesture_style: Option<GestureStyle>,
    pub wire_format: WireFormat,
    pub ack_policy: AckPolicy,
    #[validate(range(min = 1, max = 10000))]
    pub poll_interval_ms: u64,
    #[validate(range(min = 1, max = 600000))]
    pub ack_timeout_ms: u64,
}

impl RelayConfig {
    pub fn game_addr(&self) -> String {
        format!("{}:{}", self.host, self.game_port)
    }

    pub fn robot_addr(&self) -> String {
        format!("{}:{}", self.host, self.robot_port)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn ack_timeout(&self) -> Duration {
        Duration::from_millis(self.ack_timeout_ms)
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            host: "0.0.0.0".to_string(),
            game_port: 9999,
            robot_port: 9998,
            condition: Condition::Control,
            gesture_style: None,
            wire_format: WireFormat::Legacy,
            ack_policy: AckPolicy::Always,
            poll_interval_ms: 100,
            ack_timeout_ms: 5000,
        }
    }
}

/// Robot-side adapter configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct RobotConfig {
    #[validate(length(min = 1))]
    pub log_level: String,
    /// Relay downstream address, `host:port`
    #[validate(length(min = 1))]
    pub server_addr: String,
    pub wire_format: WireFormat,
    #[validate(range(min = 1))]
    pub reconnect_interval_ms: u64,
    /// Directory holding the robot's audio clips
    #[validate(length(min = 1))]
    pub audio_dir: String,
}

impl RobotConfig {
    pub fn reconnect_interval(&self) -> Duration {
        Duration::from_millis(self.reconnect_interval_ms)
    }
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            server_addr: "localhost:9998".to_string(),
            wire_format: WireFormat::Legacy,
            reconnect_interval_ms: 5000,
            audio_dir: "/home/nao/audio_files".to_string(),
        }
    }
}

/// Load configuration from file
pub fn load_config<T>(path: &str) -> Result<T, ConfigError>
where
    T: for<'de> Deserialize<'de> + Validate,
{
    let config: T = config::Config::builder()
        .add_source(config::File::with_name(path))
        .add_source(config::Environment::with_prefix("NAOBRIDGE"))
        .build()
        .map_err(|e| ConfigError::LoadError(e.to_string()))?
        .try_deserialize()
        .map_err(|e| ConfigError::LoadError(e.to_string()))?;

    config
        .validate()
        .map_err(|e| ConfigError::ValidationError(e.to_string()))?;
    Ok(config)
}

/// Load from `path` when given, else from `NAOBRIDGE_CONFIG`, else built-in
/// defaults with `NAOBRIDGE_*` environment overrides
pub fn load_or_default<T>(path: Option<&str>) -> Result<T, ConfigError>
where
    T: for<'de> Deserialize<'de> + Validate,
{
    let env_path = std::env::var(CONFIG_PATH_ENV).ok();
    if let Some(path) = path.or(env_path.as_deref()) {
        return load_config(path);
    }

    let config: T = config::Config::builder()
        .add_source(config::Environment::with_prefix("NAOBRIDGE"))
        .build()
        .map_err(|e| ConfigError::LoadError(e.to_string()))?
        .try_deserialize()
        .map_err(|e| ConfigError::LoadError(e.to_string()))?;

    config
        .validate()
        .map_err(|e| ConfigError::ValidationError(e.to_string()))?;
    Ok(config)
}

/// Load configuration from YAML string (for testing)
pub fn load_from_yaml<T>(yaml: &str) -> Result<T, ConfigError>
where
    T: for<'de> Deserialize<'de> + Validate,
{
    let config: T =
        serde_yaml::from_str(yaml).map_err(|e| ConfigError::LoadError(e.to_string()))?;
    config
        .validate()
        .map_err(|e| ConfigError::ValidationError(e.to_string()))?;
    Ok(config)
}
