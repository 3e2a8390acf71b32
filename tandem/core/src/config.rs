//! TOML Configuration File Support
//!
//! Centralized configuration loading for a tandem session, supporting a TOML
//! configuration file at `~/.config/tandem/session.toml`.
//!
//! # Configuration Priority
//!
//! Configuration values are loaded with the following priority (highest first):
//! 1. Environment variables
//! 2. TOML configuration file
//! 3. Default values
//!
//! # XDG Base Directory Compliance
//!
//! The configuration file follows XDG Base Directory specification:
//! - `$XDG_CONFIG_HOME/tandem/session.toml` (typically `~/.config/tandem/session.toml`)
//!
//! # Example Configuration
//!
//! ```toml
//! [bridge]
//! base_url = "http://127.0.0.1:8000"
//! timeout_secs = 120
//!
//! [limits]
//! max_context_turns = 10
//! max_message_bytes = 65536
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

// =============================================================================
// Configuration Source Tracking
// =============================================================================

/// Tracks where a configuration value came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Value from environment variable
    Env,
    /// Value from TOML configuration file
    File,
    /// Default value
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Env => write!(f, "environment"),
            Self::File => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// Bridge section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeToml {
    /// Base URL of the assistant bridge
    pub base_url: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: Option<u64>,
}

/// Limits section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsToml {
    /// Maximum prior turns sent as context with each call
    pub max_context_turns: Option<usize>,

    /// Maximum accepted panel message size in bytes
    pub max_message_bytes: Option<usize>,
}

/// Top-level TOML configuration structure
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionToml {
    /// Bridge configuration section
    pub bridge: BridgeToml,

    /// Limits configuration section
    pub limits: LimitsToml,
}

// =============================================================================
// Main Configuration Struct
// =============================================================================

/// Connection settings for the assistant bridge
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeSettings {
    /// Base URL the bridge listens on
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            timeout_secs: 120, // assistant calls can run long
        }
    }
}

impl BridgeSettings {
    /// Request timeout as a [`Duration`]
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Centralized configuration for a session
///
/// Consolidates all configuration from multiple sources and tracks where the
/// values came from. Use [`load_config`] to load configuration with proper
/// priority handling.
#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// Assistant bridge connection settings
    pub bridge: BridgeSettings,

    /// Maximum prior turns sent as context with each call
    pub max_context_turns: usize,

    /// Maximum accepted panel message size in bytes
    pub max_message_bytes: usize,

    /// Path to the config file that was loaded (if any)
    pub config_file_path: Option<PathBuf>,

    /// Source of configuration values
    source: ConfigSource,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            bridge: BridgeSettings::default(),
            max_context_turns: 10,
            max_message_bytes: 64 * 1024,
            config_file_path: None,
            source: ConfigSource::Default,
        }
    }
}

impl SessionConfig {
    /// Create a new configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the primary source of this configuration
    #[must_use]
    pub fn source(&self) -> ConfigSource {
        self.source
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] describing the first invalid
    /// value found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bridge.base_url.is_empty() {
            return Err(ConfigError::ValidationError(
                "bridge base_url cannot be empty".to_string(),
            ));
        }
        if !self.bridge.base_url.starts_with("http://")
            && !self.bridge.base_url.starts_with("https://")
        {
            return Err(ConfigError::ValidationError(format!(
                "bridge base_url must be an http(s) URL, got: {}",
                self.bridge.base_url
            )));
        }
        if self.bridge.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "bridge timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.max_message_bytes == 0 {
            return Err(ConfigError::ValidationError(
                "max_message_bytes must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Get the default configuration file path
///
/// Returns `$XDG_CONFIG_HOME/tandem/session.toml` or
/// `~/.config/tandem/session.toml` if `XDG_CONFIG_HOME` is not set.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("tandem").join("session.toml"))
}

/// Load configuration from all sources with proper priority
///
/// Priority order (highest first):
/// 1. Environment variables
/// 2. TOML configuration file
/// 3. Default values
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be parsed, or if the
/// resulting configuration fails validation. A missing config file is not an
/// error (defaults are used).
pub fn load_config() -> Result<SessionConfig, ConfigError> {
    load_config_from_path(default_config_path())
}

/// Load configuration from a specific path
///
/// # Arguments
///
/// * `path` - Optional path to the configuration file. If `None`, only
///   defaults and environment variables are used.
///
/// # Errors
///
/// Returns an error if the specified config file cannot be read or parsed, or
/// if the resulting configuration fails validation.
pub fn load_config_from_path(path: Option<PathBuf>) -> Result<SessionConfig, ConfigError> {
    // Start with defaults
    let mut config = SessionConfig::default();

    // Try to load from file
    if let Some(ref config_path) = path {
        if config_path.exists() {
            let toml_content =
                std::fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
                    path: config_path.clone(),
                    source: e,
                })?;

            let toml_config: SessionToml = toml::from_str(&toml_content)?;
            apply_toml_config(&mut config, &toml_config);
            config.config_file_path = Some(config_path.clone());
            config.source = ConfigSource::File;

            tracing::info!(
                path = %config_path.display(),
                "Loaded configuration from file"
            );
        } else {
            tracing::debug!(
                path = %config_path.display(),
                "Config file not found, using defaults"
            );
        }
    }

    // Apply environment variables (overrides file values)
    apply_env_config(&mut config);

    config.validate()?;

    Ok(config)
}

/// Apply TOML configuration values to the config struct
fn apply_toml_config(config: &mut SessionConfig, toml: &SessionToml) {
    // Bridge settings
    if let Some(ref url) = toml.bridge.base_url {
        config.bridge.base_url = url.clone();
    }
    if let Some(timeout) = toml.bridge.timeout_secs {
        config.bridge.timeout_secs = timeout;
    }

    // Limits
    if let Some(turns) = toml.limits.max_context_turns {
        config.max_context_turns = turns;
    }
    if let Some(bytes) = toml.limits.max_message_bytes {
        config.max_message_bytes = bytes;
    }
}

/// Apply environment variable overrides to the config
fn apply_env_config(config: &mut SessionConfig) {
    if let Ok(url) = std::env::var("TANDEM_BRIDGE_URL") {
        config.bridge.base_url = url;
        config.source = ConfigSource::Env;
    }
    if let Ok(timeout) = std::env::var("TANDEM_BRIDGE_TIMEOUT_SECS") {
        if let Ok(secs) = timeout.parse::<u64>() {
            config.bridge.timeout_secs = secs;
            config.source = ConfigSource::Env;
        }
    }
    if let Ok(turns) = std::env::var("TANDEM_MAX_CONTEXT_TURNS") {
        if let Ok(n) = turns.parse::<usize>() {
            config.max_context_turns = n;
            config.source = ConfigSource::Env;
        }
    }
    if let Ok(bytes) = std::env::var("TANDEM_MAX_MESSAGE_BYTES") {
        if let Ok(n) = bytes.parse::<usize>() {
            config.max_message_bytes = n;
            config.source = ConfigSource::Env;
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
