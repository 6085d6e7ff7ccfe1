use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use log::info;
use serde::Deserialize;
use sqlx::postgres::{PgConnectOptions, PgSslMode};
use thiserror::Error;

use crate::db::identifier::TrustedIdentifier;

pub const DEFAULT_CONFIG_PATH: &str = "configs/dbconfig.json";
pub const DEFAULT_SERVER_ADDRESS: &str = "localhost:8080";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read database config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed database config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("unknown ssl mode '{0}'")]
    TlsMode(String),
    #[error("invalid database name '{name}': {reason}")]
    DatabaseName { name: String, reason: &'static str },
}

// Shape of configs/dbconfig.json as written by operators
#[derive(Deserialize)]
struct RawDbConfig {
    user: String,
    password: String,
    #[serde(rename = "dbname", alias = "database_name")]
    dbname: String,
    #[serde(rename = "ssl", alias = "tls_mode")]
    ssl: String,
    #[serde(default = "default_host")]
    host: String,
    #[serde(default = "default_port")]
    port: u16,
    #[serde(default = "default_admin_database")]
    admin_database: String,
    #[serde(default = "default_max_connections")]
    max_connections: u32,
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    5432
}

fn default_admin_database() -> String {
    "postgres".to_string()
}

fn default_max_connections() -> u32 {
    5
}

/// Connection parameters loaded once at startup.
///
/// The password never leaves this struct except through [`DbConfig::connect_options`].
pub struct DbConfig {
    pub user: String,
    password: String,
    pub database: TrustedIdentifier,
    pub ssl_mode: PgSslMode,
    pub host: String,
    pub port: u16,
    pub admin_database: String,
    pub max_connections: u32,
}

impl DbConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let data = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&data).map_err(|e| match e {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })?;
        info!(
            "Loaded database config from {} (database: {}, ssl: {:?})",
            path.display(),
            config.database,
            config.ssl_mode
        );
        Ok(config)
    }

    pub fn from_json(data: &str) -> Result<Self, ConfigError> {
        let raw: RawDbConfig = serde_json::from_str(data).map_err(|source| ConfigError::Parse {
            path: PathBuf::new(),
            source,
        })?;

        let ssl_mode = PgSslMode::from_str(&raw.ssl).map_err(|_| ConfigError::TlsMode(raw.ssl.clone()))?;
        let database = TrustedIdentifier::from_config(raw.dbname)?;

        Ok(DbConfig {
            user: raw.user,
            password: raw.password,
            database,
            ssl_mode,
            host: raw.host,
            port: raw.port,
            admin_database: raw.admin_database,
            max_connections: raw.max_connections,
        })
    }

    /// Options for a connection to `database` with this config's credentials.
    pub fn connect_options(&self, database: &str) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(database)
            .ssl_mode(self.ssl_mode)
    }
}

pub fn config_path() -> PathBuf {
    env::var("DB_CONFIG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
}

pub fn server_address() -> String {
    env::var("SERVER_ADDRESS").unwrap_or_else(|_| DEFAULT_SERVER_ADDRESS.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_original_key_names() {
        let config = DbConfig::from_json(
            r#"{"user": "app", "password": "secret", "dbname": "tasks", "ssl": "disable"}"#,
        )
        .unwrap();

        assert_eq!(config.user, "app");
        assert_eq!(config.database.as_str(), "tasks");
        assert!(matches!(config.ssl_mode, PgSslMode::Disable));
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 5432);
        assert_eq!(config.admin_database, "postgres");
        assert_eq!(config.max_connections, 5);
    }

    #[test]
    fn accepts_long_key_aliases_and_overrides() {
        let config = DbConfig::from_json(
            r#"{
                "user": "app",
                "password": "secret",
                "database_name": "tasks_dev",
                "tls_mode": "require",
                "host": "db.internal",
                "port": 6543,
                "max_connections": 12
            }"#,
        )
        .unwrap();

        assert_eq!(config.database.as_str(), "tasks_dev");
        assert!(matches!(config.ssl_mode, PgSslMode::Require));
        assert_eq!(config.host, "db.internal");
        assert_eq!(config.port, 6543);
        assert_eq!(config.max_connections, 12);
    }

    #[test]
    fn rejects_unknown_ssl_mode() {
        let err = DbConfig::from_json(
            r#"{"user": "app", "password": "secret", "dbname": "tasks", "ssl": "sometimes"}"#,
        )
        .err()
        .unwrap();

        assert!(matches!(err, ConfigError::TlsMode(mode) if mode == "sometimes"));
    }

    #[test]
    fn rejects_injection_shaped_database_name() {
        let err = DbConfig::from_json(
            r#"{"user": "app", "password": "secret", "dbname": "tasks; DROP DATABASE postgres", "ssl": "disable"}"#,
        )
        .err()
        .unwrap();

        assert!(matches!(err, ConfigError::DatabaseName { .. }));
    }

    #[test]
    fn missing_field_is_a_parse_error() {
        let err = DbConfig::from_json(r#"{"user": "app"}"#).err().unwrap();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = DbConfig::load("does/not/exist.json").err().unwrap();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
