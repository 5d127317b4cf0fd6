use std::collections::HashMap;
use std::env;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{key} has an invalid value '{value}'")]
    Invalid { key: &'static str, value: String },
}

/// Process-wide settings, loaded once in `main` and handed to the server.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub token_secret: String,
    pub enforce_status_transitions: bool,
    pub db_pool_size: u32,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(env::vars().collect())
    }

    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self, ConfigError> {
        let get = |key: &'static str| vars.get(key).filter(|v| !v.is_empty());
        let required = |key: &'static str| get(key).cloned().ok_or(ConfigError::Missing(key));
        let or_default =
            |key: &'static str, default: &str| get(key).cloned().unwrap_or_else(|| default.to_string());

        let port = or_default("PORT", "8080");
        let enforce = or_default("ENFORCE_STATUS_TRANSITIONS", "true");
        let pool_size = or_default("DB_POOL_SIZE", "10");

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            host: or_default("HOST", "0.0.0.0"),
            port: port.parse::<u16>().map_err(|_| ConfigError::Invalid {
                key: "PORT",
                value: port.clone(),
            })?,
            token_secret: required("TOKEN_SECRET")?,
            enforce_status_transitions: parse_bool(&enforce).ok_or(ConfigError::Invalid {
                key: "ENFORCE_STATUS_TRANSITIONS",
                value: enforce.clone(),
            })?,
            db_pool_size: pool_size
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or(ConfigError::Invalid {
                    key: "DB_POOL_SIZE",
                    value: pool_size.clone(),
                })?,
        })
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
