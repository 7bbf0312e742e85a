//! Application settings
//!
//! Loaded from ~/.healthtrack/config.toml, then overridden from the
//! environment. Every field has a default, so a missing file is fine.

use crate::config::DatabaseTarget;
use crate::config::connections::SslMode;
use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Application settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub database: DatabaseTarget,

    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Logging preferences consumed by the binary's subscriber setup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,
}

/// Log line format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
        }
    }
}

impl Settings {
    /// Apply `HEALTHTRACK_*` overrides from the process environment
    pub fn with_env_overrides(self) -> ConfigResult<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup (tests pass a map here)
    pub fn with_overrides<F>(mut self, lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("HEALTHTRACK_DB_HOST") {
            self.database.host = host;
        }
        if let Some(port) = lookup("HEALTHTRACK_DB_PORT") {
            self.database.port = port
                .parse::<u16>()
                .map_err(|_| ConfigError::Invalid(format!("Invalid port: {}", port)))?;
        }
        if let Some(name) = lookup("HEALTHTRACK_DB_NAME") {
            self.database.name = name;
        }
        if let Some(mode) = lookup("HEALTHTRACK_DB_SSLMODE") {
            self.database.ssl_mode = SslMode::parse(&mode)?;
        }
        if let Some(format) = lookup("HEALTHTRACK_LOG_FORMAT") {
            self.logging.format = match format.as_str() {
                "json" => LogFormat::Json,
                "pretty" => LogFormat::Pretty,
                other => {
                    return Err(ConfigError::Invalid(format!("Unknown log format: {}", other)));
                }
            };
        }
        Ok(self)
    }
}

/// Load settings from the default config file, then the environment
pub fn load_settings() -> ConfigResult<Settings> {
    let path = DatabaseTarget::config_dir()?.join("config.toml");
    load_settings_from(&path)?.with_env_overrides()
}

/// Load settings from a specific file (no environment overrides)
pub fn load_settings_from(path: &Path) -> ConfigResult<Settings> {
    if !path.exists() {
        return Ok(Settings::default());
    }
    let content = std::fs::read_to_string(path)?;
    let settings: Settings = toml::from_str(&content)?;
    Ok(settings)
}
