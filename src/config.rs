//! Startup configuration from the environment.
//!
//! Everything is read through a key lookup closure so parsing can be tested
//! without touching the process environment. `app::run` loads `.env` first.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::data::api::{DEFAULT_BASE_URL, DEFAULT_LEAGUE_ID};
use crate::error::ConfigError;

pub const API_KEY_VAR: &str = "API_FOOTBALL_KEY";
pub const BASE_URL_VAR: &str = "API_FOOTBALL_BASE_URL";
pub const LEAGUE_VAR: &str = "EPL_LEAGUE_ID";
pub const DRIVER_VAR: &str = "SQL_DRIVER";
pub const HOST_VAR: &str = "SQL_SERVER";
pub const PORT_VAR: &str = "SQL_PORT";
pub const DATABASE_VAR: &str = "SQL_DATABASE";
pub const USER_VAR: &str = "SQL_USERNAME";
pub const PASSWORD_VAR: &str = "SQL_PASSWORD";
pub const SCHEMA_VAR: &str = "SQL_SCHEMA";
pub const LOG_FILE_VAR: &str = "PIPELINE_LOG_FILE";

pub const DEFAULT_SCHEMA: &str = "public";
pub const DEFAULT_PORT: u16 = 5432;
pub const DEFAULT_LOG_FILE: &str = "pipeline.log";

/// API credentials and target league.
#[derive(Clone)]
pub struct ApiConfig {
    pub api_key: String,
    pub base_url: String,
    pub league_id: u32,
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            api_key: required(&lookup, API_KEY_VAR)?,
            base_url: optional(&lookup, BASE_URL_VAR).unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            league_id: parsed(&lookup, LEAGUE_VAR, DEFAULT_LEAGUE_ID)?,
        })
    }

    /// First few characters of the key, for logs.
    pub fn key_hint(&self) -> String {
        let prefix: String = self.api_key.chars().take(4).collect();
        format!("{prefix}...")
    }
}

impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("api_key", &self.key_hint())
            .field("base_url", &self.base_url)
            .field("league_id", &self.league_id)
            .finish()
    }
}

/// Warehouse driver identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Driver {
    Postgres,
    Sqlite,
}

impl FromStr for Driver {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(Driver::Postgres),
            "sqlite" | "sqlite3" => Ok(Driver::Sqlite),
            other => Err(format!("unsupported driver '{other}' (expected postgres or sqlite)")),
        }
    }
}

/// Connection parameters for a PostgreSQL warehouse.
#[derive(Clone)]
pub struct PostgresConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
    pub schema: String,
}

impl fmt::Debug for PostgresConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostgresConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"***")
            .field("schema", &self.schema)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub enum WarehouseConfig {
    Postgres(PostgresConfig),
    /// `SQL_DATABASE` is the database file; there is no schema.
    Sqlite { path: PathBuf },
}

impl WarehouseConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let driver: Driver = parsed(&lookup, DRIVER_VAR, Driver::Postgres)?;
        let database = required(&lookup, DATABASE_VAR)?;

        match driver {
            Driver::Sqlite => Ok(WarehouseConfig::Sqlite {
                path: PathBuf::from(database),
            }),
            Driver::Postgres => Ok(WarehouseConfig::Postgres(PostgresConfig {
                host: required(&lookup, HOST_VAR)?,
                port: parsed(&lookup, PORT_VAR, DEFAULT_PORT)?,
                database,
                user: required(&lookup, USER_VAR)?,
                password: required(&lookup, PASSWORD_VAR)?,
                schema: optional(&lookup, SCHEMA_VAR).unwrap_or_else(|| DEFAULT_SCHEMA.to_string()),
            })),
        }
    }

    pub fn driver(&self) -> Driver {
        match self {
            WarehouseConfig::Postgres(_) => Driver::Postgres,
            WarehouseConfig::Sqlite { .. } => Driver::Sqlite,
        }
    }
}

/// Log file path from `PIPELINE_LOG_FILE`, or `pipeline.log`.
pub fn log_file_from_env() -> PathBuf {
    optional(&env_lookup, LOG_FILE_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE))
}

fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Non-blank value for `key`, trimmed.
fn optional(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<String, ConfigError> {
    optional(lookup, key).ok_or(ConfigError::Missing(key))
}

fn parsed<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match optional(lookup, key) {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: format!("'{raw}': {e}"),
        }),
    }
}
