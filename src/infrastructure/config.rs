use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use crate::application::use_cases::run_ingestion::DEFAULT_CONCURRENCY;

pub const DEFAULT_EMBEDDING_DIMENSION: u64 = 1024;

const DEFAULT_CORS_ORIGINS: [&str; 2] = ["http://localhost:5173", "http://127.0.0.1:5173"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),
    #[error("Invalid value for {key}: `{value}`")]
    Invalid { key: &'static str, value: String },
}

/// Reads a variable, treating blank values as unset.
pub(crate) fn optional(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

pub(crate) fn required(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<String, ConfigError> {
    optional(lookup, key).ok_or(ConfigError::Missing(key))
}

pub(crate) fn parsed<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match optional(lookup, key) {
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}

pub(crate) fn seconds(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: u64,
) -> Result<Duration, ConfigError> {
    parsed(lookup, key, default).map(Duration::from_secs)
}

pub(crate) fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let cors_origins = match optional(&lookup, "CORS_ORIGINS") {
            Some(origins) => origins
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(String::from)
                .collect(),
            None => DEFAULT_CORS_ORIGINS.iter().map(|o| o.to_string()).collect(),
        };

        Ok(Self {
            host: optional(&lookup, "HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parsed(&lookup, "PORT", 8000)?,
            cors_origins,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestionConfig {
    pub data_dir: PathBuf,
    pub concurrency: usize,
}

impl IngestionConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let concurrency = parsed(&lookup, "INGEST_CONCURRENCY", DEFAULT_CONCURRENCY)?;
        if concurrency == 0 {
            return Err(ConfigError::Invalid {
                key: "INGEST_CONCURRENCY",
                value: "0".to_string(),
            });
        }

        Ok(Self {
            data_dir: PathBuf::from(
                optional(&lookup, "DATA_DIR").unwrap_or_else(|| "data".to_string()),
            ),
            concurrency,
        })
    }
}

pub fn embedding_dimension(lookup: impl Fn(&str) -> Option<String>) -> Result<u64, ConfigError> {
    parsed(&lookup, "EMBEDDING_DIMENSION", DEFAULT_EMBEDDING_DIMENSION)
}

#[cfg(test)]
pub(crate) fn lookup_from(
    pairs: &[(&'static str, &'static str)],
) -> impl Fn(&str) -> Option<String> {
    let pairs: Vec<(String, String)> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key: &str| {
        pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    }
}
