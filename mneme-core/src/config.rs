//! Configuration types for Mneme

use serde::{Deserialize, Serialize};

/// Main configuration for Mneme
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct MnemeConfig {
    /// Store handling
    pub store: StoreConfig,

    /// Which instrumentation wrappers are applied
    pub recorder: RecorderConfig,

    /// Replay behavior
    pub replay: ReplayConfig,
}

/// Store configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Remove every key when a cache is constructed
    pub flush_on_start: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            flush_on_start: true,
        }
    }
}

/// Recorder configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecorderConfig {
    /// Count invocation attempts
    pub count_calls: bool,

    /// Record input/output history
    pub record_history: bool,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            count_calls: true,
            record_history: true,
        }
    }
}

/// Replay configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ReplayConfig {
    /// Keep only the most recent calls in a trace
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_calls: Option<usize>,
}

/// Builder for MnemeConfig
pub struct ConfigBuilder {
    config: MnemeConfig,
}

impl ConfigBuilder {
    /// Create a new configuration builder
    pub fn new() -> Self {
        Self {
            config: MnemeConfig::default(),
        }
    }

    /// Set store configuration
    pub fn store(mut self, config: StoreConfig) -> Self {
        self.config.store = config;
        self
    }

    /// Set recorder configuration
    pub fn recorder(mut self, config: RecorderConfig) -> Self {
        self.config.recorder = config;
        self
    }

    /// Set replay configuration
    pub fn replay(mut self, config: ReplayConfig) -> Self {
        self.config.replay = config;
        self
    }

    /// Build the configuration
    pub fn build(self) -> MnemeConfig {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MnemeConfig {
    /// Load configuration from file and environment variables.
    ///
    /// Loads in this order:
    /// 1. Default configuration
    /// 2. Configuration file (mneme.toml)
    /// 3. Environment variable overrides (`MNEME_RECORDER__COUNT_CALLS=false`)
    /// 4. Configuration file at MNEME_CONFIG_PATH, if set
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration source is invalid.
    pub fn load() -> crate::error::Result<Self> {
        use figment::{
            Figment,
            providers::{Env, Format, Serialized, Toml},
        };

        let mut figment = Figment::from(Serialized::defaults(MnemeConfig::default()))
            .merge(Toml::file("mneme.toml"))
            .merge(Env::prefixed("MNEME_").ignore(&["CONFIG_PATH"]).split("__"));

        if let Ok(path) = std::env::var("MNEME_CONFIG_PATH") {
            figment = figment.merge(Toml::file(path));
        }

        let config: MnemeConfig = figment.extract().map_err(|e| {
            crate::error::MnemeError::Configuration(format!("Failed to load configuration: {}", e))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::error::Result<Self> {
        use figment::{
            Figment,
            providers::{Format, Serialized, Toml},
        };

        let config: MnemeConfig = Figment::from(Serialized::defaults(MnemeConfig::default()))
            .merge(Toml::file(path))
            .extract()
            .map_err(|e| {
                crate::error::MnemeError::Configuration(format!(
                    "Failed to load configuration file: {}",
                    e
                ))
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    fn validate(&self) -> crate::error::Result<()> {
        if self.replay.max_calls == Some(0) {
            return Err(crate::error::MnemeError::Configuration(
                "replay.max_calls must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
