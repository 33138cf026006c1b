//! Configuration
//!
//! Sources are merged in this order (later sources override earlier):
//! 1. Default values from `BankerConfig::default()`
//! 2. TOML configuration file (if given and present)
//! 3. Environment variables prefixed with `BANKER_`, nested keys separated
//!    by `__` (e.g. `BANKER_LIMITS__MAX_PROCESSES=16`)

use std::path::{Path, PathBuf};

use banker_core::Limits;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Result, SessionError};

/// Default environment variable prefix
pub const CONFIG_ENV_PREFIX: &str = "BANKER";

/// Logging configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Emit JSON lines instead of human-readable text
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

/// Top-level configuration
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BankerConfig {
    /// Ledger dimension limits
    pub limits: Limits,
    /// Logging settings
    pub logging: LoggingConfig,
}

/// Configuration loader
#[derive(Clone, Debug)]
pub struct ConfigLoader {
    /// Configuration file path
    config_path: Option<PathBuf>,
    /// Environment prefix
    env_prefix: String,
}

impl ConfigLoader {
    /// Create a loader with the default environment prefix and no file.
    pub fn new() -> Self {
        Self {
            config_path: None,
            env_prefix: CONFIG_ENV_PREFIX.to_string(),
        }
    }

    /// Set the configuration file path
    pub fn with_config_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set the environment variable prefix
    pub fn with_env_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Load configuration from all sources.
    pub fn load(&self) -> Result<BankerConfig> {
        let mut figment = Figment::new().merge(Serialized::defaults(BankerConfig::default()));

        if let Some(path) = &self.config_path {
            if path.exists() {
                figment = figment.merge(Toml::file(path));
                info!(path = %path.display(), "Configuration loaded");
            } else {
                warn!(path = %path.display(), "Configuration file not found, using defaults");
            }
        }

        figment = figment.merge(Env::prefixed(&format!("{}_", self.env_prefix)).split("__"));

        let config: BankerConfig = figment
            .extract()
            .map_err(|e| SessionError::config(e.to_string()))?;

        validate_config(&config)?;
        Ok(config)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_config(config: &BankerConfig) -> Result<()> {
    if config.limits.max_processes == 0 {
        return Err(SessionError::config("limits.max_processes must be positive"));
    }
    if config.limits.max_resource_types == 0 {
        return Err(SessionError::config("limits.max_resource_types must be positive"));
    }
    crate::logging::parse_log_level(&config.logging.level)?;
    Ok(())
}
