use serde::Deserialize;
use thiserror::Error;

use crate::FetchConfig;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

pub const BASE_URL_VAR: &str = "SCHEDULER_BASE_URL";
pub const WITH_CREDENTIALS_VAR: &str = "SCHEDULER_WITH_CREDENTIALS";
pub const TIMEOUT_MS_VAR: &str = "SCHEDULER_TIMEOUT_MS";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}")]
    InvalidValue { key: &'static str, value: String },
}

/// Request defaults shared by every request the application issues.
///
/// Built once at startup and never mutated afterwards. `Default` holds the
/// development values; deployments supply their own through [`AppConfig::from_env`]
/// or by deserializing the struct.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
    #[serde(alias = "baseURL")]
    pub base_url: String,
    pub with_credentials: bool,
    /// Zero disables the timeout
    pub timeout_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            with_credentials: true,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl AppConfig {
    /// Reads the `SCHEDULER_*` environment variables, keeping defaults for unset ones.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(base_url) = lookup(BASE_URL_VAR) {
            if base_url.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    key: BASE_URL_VAR,
                    value: base_url,
                });
            }
            config.base_url = base_url.trim().to_string();
        }
        if let Some(value) = lookup(WITH_CREDENTIALS_VAR) {
            config.with_credentials = parse_bool(&value).ok_or(ConfigError::InvalidValue {
                key: WITH_CREDENTIALS_VAR,
                value: value.clone(),
            })?;
        }
        if let Some(value) = lookup(TIMEOUT_MS_VAR) {
            config.timeout_ms = value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue {
                    key: TIMEOUT_MS_VAR,
                    value: value.clone(),
                })?;
        }

        log::debug!("loaded {config:?}");
        Ok(config)
    }

    pub fn fetch_config(&self) -> FetchConfig {
        FetchConfig {
            timeout_ms: Some(self.timeout_ms).filter(|timeout| *timeout > 0),
            with_credentials: self.with_credentials,
            ..Default::default()
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}
