//! Database target configuration
//!
//! The host, port, database name and TLS mode are fixed per deployment.
//! Only the user and password vary, and those arrive per request through
//! an [`AuthContext`](crate::session::AuthContext).

use crate::error::{ConfigError, ConfigResult};
use crate::session::AuthContext;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where the health database lives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseTarget {
    /// Database host
    #[serde(default = "default_host")]
    pub host: String,

    /// Database port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Database name
    #[serde(default = "default_database")]
    pub name: String,

    /// SSL mode
    #[serde(default)]
    pub ssl_mode: SslMode,
}

/// SSL connection mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SslMode {
    Disable,
    #[default]
    Prefer,
    Require,
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    5432
}

fn default_database() -> String {
    "mbd".to_string()
}

impl Default for DatabaseTarget {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            name: default_database(),
            ssl_mode: SslMode::default(),
        }
    }
}

impl SslMode {
    /// Parse the libpq spelling of an ssl mode
    pub fn parse(value: &str) -> ConfigResult<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "disable" => Ok(SslMode::Disable),
            "prefer" => Ok(SslMode::Prefer),
            "require" => Ok(SslMode::Require),
            other => Err(ConfigError::Invalid(format!("Unknown sslmode: {}", other))),
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            SslMode::Disable => "disable",
            SslMode::Prefer => "prefer",
            SslMode::Require => "require",
        }
    }
}

impl DatabaseTarget {
    /// Describe the target for a user (never includes the password)
    pub fn connection_string(&self, user: &str) -> String {
        format!(
            "host={} port={} dbname={} user={} sslmode={}",
            self.host,
            self.port,
            self.name,
            user,
            self.ssl_mode.as_str()
        )
    }

    /// Build a driver config carrying the request's credentials.
    ///
    /// Uses the typed builder rather than a formatted string so passwords
    /// with spaces or quotes need no escaping.
    pub fn pg_config(&self, auth: &AuthContext) -> tokio_postgres::Config {
        let mut config = tokio_postgres::Config::new();
        config
            .host(&self.host)
            .port(self.port)
            .dbname(&self.name)
            .user(auth.db_user())
            .password(auth.db_password())
            .ssl_mode(match self.ssl_mode {
                SslMode::Disable => tokio_postgres::config::SslMode::Disable,
                SslMode::Prefer => tokio_postgres::config::SslMode::Prefer,
                SslMode::Require => tokio_postgres::config::SslMode::Require,
            });
        config
    }

    /// Get the config directory path (~/.healthtrack/)
    pub fn config_dir() -> ConfigResult<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(home.join(".healthtrack"))
    }
}
