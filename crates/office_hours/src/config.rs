/// Server configuration, loaded from a JSON file
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::schedule::resolver::DEFAULT_HORIZON_DAYS;

/// Environment variable naming the configuration file.
pub const CONFIG_PATH_ENV: &str = "OFFICE_HOURS_CONFIG";

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not parse config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Top-level server configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to
    pub address: String,
    /// Port to bind to
    pub port: u16,
    /// Path of the SQLite database file
    pub database_path: String,
    /// Calendar days scanned when resolving upcoming sessions
    pub horizon_days: u32,
    /// Bearer token required on admin routes; admin routes are open when unset
    pub admin_token: Option<String>,
    /// Zoom link written to an empty store on first start
    pub default_zoom_link: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1".to_string(),
            port: 3000,
            database_path: "office_hours.db".to_string(),
            horizon_days: DEFAULT_HORIZON_DAYS,
            admin_token: None,
            default_zoom_link: crate::db::FALLBACK_ZOOM_LINK.to_string(),
        }
    }
}

impl ServerConfig {
    /// Loads and validates the config at `path`. Missing keys take their defaults.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: ServerConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks ranges and formats that serde cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=366).contains(&self.horizon_days) {
            return Err(ConfigError::Invalid(format!(
                "horizon_days must be between 1 and 366, got {}",
                self.horizon_days
            )));
        }

        if self.database_path.trim().is_empty() {
            return Err(ConfigError::Invalid("database_path is empty".to_string()));
        }

        if matches!(self.admin_token.as_deref(), Some(t) if t.trim().is_empty()) {
            return Err(ConfigError::Invalid("admin_token is empty".to_string()));
        }

        url::Url::parse(&self.default_zoom_link).map_err(|e| {
            ConfigError::Invalid(format!(
                "default_zoom_link {:?} is not a URL: {}",
                self.default_zoom_link, e
            ))
        })?;

        Ok(())
    }

    /// `address:port`, suitable for binding
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = ServerConfig::default();
        config.validate().unwrap();
        assert_eq!(config.bind_address(), "127.0.0.1:3000");
        assert_eq!(config.horizon_days, 30);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let path = std::env::temp_dir()
            .join(format!("office_hours_config_{}.json", std::process::id()));
        let mut file = fs::File::create(&path).unwrap();
        write!(file, r#"{{"port": 8080, "admin_token": "secret"}}"#).unwrap();
        drop(file);

        let config = ServerConfig::load_from_file(&path).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.admin_token.as_deref(), Some("secret"));
        assert_eq!(config.database_path, "office_hours.db");
    }

    #[test]
    fn test_rejects_bad_values() {
        let config = ServerConfig {
            horizon_days: 0,
            ..ServerConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let config = ServerConfig {
            default_zoom_link: "not a link".to_string(),
            ..ServerConfig::default()
        };
        assert!(config.validate().is_err());

        let config = ServerConfig {
            admin_token: Some("  ".to_string()),
            ..ServerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err =
            ServerConfig::load_from_file(Path::new("/nonexistent/office_hours.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
