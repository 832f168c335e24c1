//! Server configuration

use std::net::SocketAddr;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Server configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server bind address (e.g., "0.0.0.0:8080")
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// SQLite database URL (e.g., "sqlite://calendar.db"). Events are kept in
    /// memory when unset.
    #[serde(default)]
    pub database_url: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Whether to enable CORS
    #[serde(default = "default_enable_cors")]
    pub enable_cors: bool,

    /// Allowed CORS origins. Any origin is allowed when empty.
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Maximum number of characters in an event title
    #[serde(default = "default_max_title_length")]
    pub max_title_length: usize,

    /// Shortest allowed timed event, and the length given to timed events
    /// posted without an end
    #[serde(default = "default_minimum_event_seconds")]
    pub minimum_event_seconds: i64,
}

fn default_bind_address() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_enable_cors() -> bool {
    true
}

fn default_max_title_length() -> usize {
    100
}

fn default_minimum_event_seconds() -> i64 {
    3600
}

const SECONDS_PER_DAY: i64 = 86_400;

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            database_url: None,
            log_level: default_log_level(),
            enable_cors: default_enable_cors(),
            cors_origins: Vec::new(),
            max_title_length: default_max_title_length(),
            minimum_event_seconds: default_minimum_event_seconds(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from the first config file found, then the
    /// environment. Environment variables take precedence.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let contents = match Self::find_config_file() {
            Some(path) => {
                tracing::debug!(path = %path.display(), "Reading config file");
                Some(std::fs::read_to_string(&path)?)
            }
            None => None,
        };

        Self::from_sources(contents.as_deref(), |key| std::env::var(key).ok())
    }

    /// Builds a configuration from optional TOML contents and an environment
    /// lookup.
    pub fn from_sources(
        file: Option<&str>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = match file {
            Some(contents) => toml::from_str::<ServerConfig>(contents)?,
            None => Self::default(),
        };

        if let Some(addr) = env("CALENDAR_BIND_ADDRESS") {
            config.bind_address = addr;
        }

        if let Some(url) = env("CALENDAR_DATABASE_URL") {
            config.database_url = Some(url).filter(|u| !u.trim().is_empty());
        }

        if let Some(level) = env("CALENDAR_LOG_LEVEL") {
            config.log_level = level;
        }

        if let Some(val) = env("CALENDAR_ENABLE_CORS") {
            config.enable_cors = parse_env("CALENDAR_ENABLE_CORS", &val)?;
        }

        if let Some(origins) = env("CALENDAR_CORS_ORIGINS") {
            config.cors_origins = origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        if let Some(val) = env("CALENDAR_MAX_TITLE_LENGTH") {
            config.max_title_length = parse_env("CALENDAR_MAX_TITLE_LENGTH", &val)?;
        }

        if let Some(val) = env("CALENDAR_MINIMUM_EVENT_SECONDS") {
            config.minimum_event_seconds = parse_env("CALENDAR_MINIMUM_EVENT_SECONDS", &val)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Find the config file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        let locations = [
            Some(PathBuf::from("calendar-server.toml")),
            Some(PathBuf::from("/etc/calendar-server/server.toml")),
            dirs::config_dir().map(|p| p.join("calendar-server").join("server.toml")),
        ];

        locations.into_iter().flatten().find(|p| p.exists())
    }

    /// Validate the configuration
    fn validate(&self) -> Result<(), ConfigError> {
        if self.bind_address.parse::<SocketAddr>().is_err() {
            return Err(ConfigError::InvalidValue {
                key: "bind_address",
                value: self.bind_address.clone(),
            });
        }

        if self.max_title_length == 0 {
            return Err(ConfigError::InvalidValue {
                key: "max_title_length",
                value: self.max_title_length.to_string(),
            });
        }

        if self.minimum_event_seconds <= 0 || self.minimum_event_seconds >= SECONDS_PER_DAY {
            return Err(ConfigError::InvalidValue {
                key: "minimum_event_seconds",
                value: self.minimum_event_seconds.to_string(),
            });
        }

        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: value.to_string(),
    })
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },

    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}
