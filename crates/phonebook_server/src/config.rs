//! Environment configuration for the HTTP server.
//!
//! # Responsibility
//! - Read every externally supplied setting once, at startup.
//! - Reject malformed values before any socket or store is opened.

use phonebook_core::{default_log_level, LogTarget, StoreLocation};
use std::env;
use std::fmt::{Display, Formatter};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;
use thiserror::Error;

pub const DATABASE_URL_VAR: &str = "PHONEBOOK_DATABASE_URL";
pub const PORT_VAR: &str = "PORT";
pub const HOST_VAR: &str = "PHONEBOOK_HOST";
pub const ENV_VAR: &str = "PHONEBOOK_ENV";
pub const REQUEST_TIMEOUT_VAR: &str = "PHONEBOOK_REQUEST_TIMEOUT_MS";
pub const LOG_LEVEL_VAR: &str = "PHONEBOOK_LOG_LEVEL";
pub const LOG_DIR_VAR: &str = "PHONEBOOK_LOG_DIR";
pub const DOCS_URL_VAR: &str = "API_DOCS_URL";

const DEFAULT_DATABASE_URL: &str = "sqlite://phonebook.sqlite3";
const DEFAULT_PORT: u16 = 3001;
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_DOCS_URL: &str = "See documentation for details";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid {key} value `{value}`: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    fn invalid(key: &'static str, value: &str, reason: impl Display) -> Self {
        Self::Invalid {
            key,
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Whether error responses may expose internal details.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Development,
    Production,
}

impl RunMode {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Some(Self::Development),
            "production" | "prod" => Some(Self::Production),
            _ => None,
        }
    }

    pub fn exposes_details(self) -> bool {
        self == Self::Development
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }
}

impl Display for RunMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub store: StoreLocation,
    pub host: IpAddr,
    pub port: u16,
    pub mode: RunMode,
    pub request_timeout: Duration,
    pub log_level: String,
    pub log_target: LogTarget,
    pub docs_url: String,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from any key lookup; unset and blank keys take defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let database_url = var(DATABASE_URL_VAR).unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());
        let store = StoreLocation::parse(&database_url)
            .map_err(|err| ConfigError::invalid(DATABASE_URL_VAR, &database_url, err))?;

        let port = match var(PORT_VAR) {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|err| ConfigError::invalid(PORT_VAR, &raw, err))?,
            None => DEFAULT_PORT,
        };

        let host = match var(HOST_VAR) {
            Some(raw) => raw
                .trim()
                .parse::<IpAddr>()
                .map_err(|err| ConfigError::invalid(HOST_VAR, &raw, err))?,
            None => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        };

        let mode = match var(ENV_VAR) {
            Some(raw) => RunMode::parse(&raw).ok_or_else(|| {
                ConfigError::invalid(ENV_VAR, &raw, "expected development|production")
            })?,
            None => RunMode::Production,
        };

        let timeout_ms = match var(REQUEST_TIMEOUT_VAR) {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(0) => return Err(ConfigError::invalid(REQUEST_TIMEOUT_VAR, &raw, "must be positive")),
                Ok(ms) => ms,
                Err(err) => return Err(ConfigError::invalid(REQUEST_TIMEOUT_VAR, &raw, err)),
            },
            None => DEFAULT_REQUEST_TIMEOUT_MS,
        };

        let log_target = match var(LOG_DIR_VAR) {
            Some(raw) => LogTarget::directory(&raw)
                .map_err(|reason| ConfigError::invalid(LOG_DIR_VAR, &raw, reason))?,
            None => LogTarget::Stderr,
        };

        Ok(Self {
            store,
            host,
            port,
            mode,
            request_timeout: Duration::from_millis(timeout_ms),
            log_level: var(LOG_LEVEL_VAR).unwrap_or_else(|| default_log_level().to_string()),
            log_target,
            docs_url: var(DOCS_URL_VAR).unwrap_or_else(|| DEFAULT_DOCS_URL.to_string()),
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn config_from(pairs: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = config_from(&[]).unwrap();
        assert_eq!(
            config.store,
            StoreLocation::SqliteFile(PathBuf::from("phonebook.sqlite3"))
        );
        assert_eq!(config.port, 3001);
        assert_eq!(config.mode, RunMode::Production);
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(config.log_target, LogTarget::Stderr);
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:3001");
    }

    #[test]
    fn explicit_values_override_defaults() {
        let config = config_from(&[
            (DATABASE_URL_VAR, "memory:"),
            (PORT_VAR, "8080"),
            (HOST_VAR, "127.0.0.1"),
            (ENV_VAR, "Development"),
            (REQUEST_TIMEOUT_VAR, "250"),
            (LOG_LEVEL_VAR, "warn"),
            (DOCS_URL_VAR, "https://example.com/docs"),
        ])
        .unwrap();
        assert_eq!(config.store, StoreLocation::Memory);
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:8080");
        assert!(config.mode.exposes_details());
        assert_eq!(config.request_timeout, Duration::from_millis(250));
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.docs_url, "https://example.com/docs");
    }

    #[test]
    fn malformed_values_are_rejected_with_their_key() {
        for (key, value) in [
            (PORT_VAR, "http"),
            (PORT_VAR, "70000"),
            (ENV_VAR, "staging"),
            (REQUEST_TIMEOUT_VAR, "0"),
            (LOG_DIR_VAR, "relative/logs"),
            (DATABASE_URL_VAR, "mongodb://localhost/phonebook"),
        ] {
            let err = config_from(&[(key, value)]).unwrap_err();
            let ConfigError::Invalid { key: reported, .. } = err;
            assert_eq!(reported, key);
        }
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = config_from(&[(PORT_VAR, "  "), (ENV_VAR, "")]).unwrap();
        assert_eq!(config.port, 3001);
        assert_eq!(config.mode, RunMode::Production);
    }
}
