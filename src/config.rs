use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::domain::DeletePolicy;
use crate::error::{AppError, Result};

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub shows: ShowsConfig,
    pub logging: LoggingConfig,
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub static_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            static_dir: PathBuf::from("static"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("fyuur.db"),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ShowsConfig {
    /// What deleting a venue does to its shows.
    pub delete_policy: DeletePolicy,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub directory: PathBuf,
    pub file_name: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("logs"),
            file_name: "fyuur.log".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
}

impl Config {
    /// Load `path` if it exists, otherwise start from defaults. Environment
    /// overrides are applied on top either way.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let config_content = fs::read_to_string(path).map_err(|e| {
                AppError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
            })?;
            Self::from_toml(&config_content)?
        } else {
            debug!("No config file at {}, using defaults", path.display());
            Self::default()
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply `FYUUR_*` overrides read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("FYUUR_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("FYUUR_PORT") {
            self.server.port = port
                .parse()
                .map_err(|e| AppError::Config(format!("FYUUR_PORT '{port}': {e}")))?;
        }
        if let Some(path) = lookup("FYUUR_DATABASE_PATH") {
            self.database.path = PathBuf::from(path);
        }
        if let Some(policy) = lookup("FYUUR_DELETE_POLICY") {
            self.shows.delete_policy = policy.parse().map_err(AppError::Config)?;
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_when_sections_missing() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.database.path, PathBuf::from("fyuur.db"));
        assert_eq!(config.shows.delete_policy, DeletePolicy::Reject);
        assert!(!config.metrics.enabled);
    }

    #[test]
    fn parses_all_sections() {
        let config = Config::from_toml(
            r#"
            [server]
            host = "0.0.0.0"
            port = 8080

            [database]
            path = "/var/lib/fyuur/data.db"

            [shows]
            delete_policy = "cascade"

            [logging]
            directory = "/var/log/fyuur"

            [metrics]
            enabled = true
            "#,
        )
        .unwrap();
        assert_eq!(config.bind_addr(), "0.0.0.0:8080");
        assert_eq!(config.shows.delete_policy, DeletePolicy::Cascade);
        assert_eq!(config.logging.file_name, "fyuur.log");
        assert!(config.metrics.enabled);
    }

    #[test]
    fn unknown_delete_policy_is_an_error() {
        let err = Config::from_toml("[shows]\ndelete_policy = \"orphan\"\n").unwrap_err();
        assert!(matches!(err, AppError::Toml(_)));
    }

    #[test]
    fn env_overrides_file_values() {
        let env: HashMap<&str, &str> = [
            ("FYUUR_PORT", "9000"),
            ("FYUUR_DATABASE_PATH", "/tmp/other.db"),
            ("FYUUR_DELETE_POLICY", "Cascade"),
        ]
        .into_iter()
        .collect();
        let mut config = Config::default();
        config
            .apply_env(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.database.path, PathBuf::from("/tmp/other.db"));
        assert_eq!(config.shows.delete_policy, DeletePolicy::Cascade);
    }

    #[test]
    fn bad_env_port_is_rejected() {
        let mut config = Config::default();
        let err = config
            .apply_env(|key| (key == "FYUUR_PORT").then(|| "http".to_string()))
            .unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }
}
