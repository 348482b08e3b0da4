//! Environment-driven report and server configuration.

use std::env;
use std::net::SocketAddr;

use thiserror::Error;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
pub const DEFAULT_CURRENCY_PREFIX: &str = "R$";
pub const DEFAULT_CACHE_CAPACITY: usize = 32;

#[derive(Debug, Clone, PartialEq)]
pub struct ReportConfig {
    pub initial_bankroll: f64,
    pub currency_prefix: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            initial_bankroll: 0.0,
            currency_prefix: DEFAULT_CURRENCY_PREFIX.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub max_upload_bytes: usize,
    /// Distinct uploads kept in the report cache before the oldest is evicted.
    pub cache_capacity: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {var}: '{value}'")]
    InvalidValue { var: &'static str, value: String },
}

pub fn report_config_from_env() -> Result<ReportConfig, ConfigError> {
    let mut config = ReportConfig::default();

    if let Some(raw) = non_empty_var("PNL_REPORT_INITIAL_BANKROLL") {
        config.initial_bankroll = raw
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .ok_or_else(|| invalid("PNL_REPORT_INITIAL_BANKROLL", &raw))?;
    }

    if let Ok(prefix) = env::var("PNL_REPORT_CURRENCY_PREFIX") {
        config.currency_prefix = prefix.trim().to_string();
    }

    Ok(config)
}

pub fn server_config_from_env() -> Result<ServerConfig, ConfigError> {
    let mut config = ServerConfig::default();

    if let Some(raw) = non_empty_var("PNL_REPORT_ADDR") {
        config.bind_addr = raw
            .parse()
            .map_err(|_| invalid("PNL_REPORT_ADDR", &raw))?;
    }

    if let Some(raw) = non_empty_var("PNL_REPORT_MAX_UPLOAD_BYTES") {
        config.max_upload_bytes = raw
            .parse::<usize>()
            .ok()
            .filter(|value| *value > 0)
            .ok_or_else(|| invalid("PNL_REPORT_MAX_UPLOAD_BYTES", &raw))?;
    }

    if let Some(raw) = non_empty_var("PNL_REPORT_CACHE_CAPACITY") {
        config.cache_capacity = raw
            .parse::<usize>()
            .ok()
            .filter(|value| *value > 0)
            .ok_or_else(|| invalid("PNL_REPORT_CACHE_CAPACITY", &raw))?;
    }

    Ok(config)
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
}

fn invalid(var: &'static str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        var,
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observability::tests::with_env_vars;

    const VARS: [&str; 5] = [
        "PNL_REPORT_INITIAL_BANKROLL",
        "PNL_REPORT_CURRENCY_PREFIX",
        "PNL_REPORT_ADDR",
        "PNL_REPORT_MAX_UPLOAD_BYTES",
        "PNL_REPORT_CACHE_CAPACITY",
    ];

    fn cleared() -> Vec<(&'static str, Option<&'static str>)> {
        VARS.iter().map(|var| (*var, None)).collect()
    }

    #[test]
    fn defaults_when_env_missing() {
        let (report, server) = with_env_vars(&cleared(), || {
            (report_config_from_env(), server_config_from_env())
        });

        assert_eq!(report.unwrap(), ReportConfig::default());
        let server = server.unwrap();
        assert_eq!(server, ServerConfig::default());
        assert_eq!(server.bind_addr.to_string(), DEFAULT_BIND_ADDR);
    }

    #[test]
    fn parses_all_values_from_env() {
        let (report, server) = with_env_vars(
            &[
                ("PNL_REPORT_INITIAL_BANKROLL", Some(" 250.5 ")),
                ("PNL_REPORT_CURRENCY_PREFIX", Some("US$")),
                ("PNL_REPORT_ADDR", Some("0.0.0.0:9000")),
                ("PNL_REPORT_MAX_UPLOAD_BYTES", Some("2048")),
                ("PNL_REPORT_CACHE_CAPACITY", Some("4")),
            ],
            || (report_config_from_env(), server_config_from_env()),
        );

        let report = report.unwrap();
        assert_eq!(report.initial_bankroll, 250.5);
        assert_eq!(report.currency_prefix, "US$");

        let server = server.unwrap();
        assert_eq!(server.bind_addr.to_string(), "0.0.0.0:9000");
        assert_eq!(server.max_upload_bytes, 2048);
        assert_eq!(server.cache_capacity, 4);
    }

    #[test]
    fn invalid_values_are_reported_not_defaulted() {
        let (report, server) = with_env_vars(
            &[
                ("PNL_REPORT_INITIAL_BANKROLL", Some("lots")),
                ("PNL_REPORT_CURRENCY_PREFIX", None),
                ("PNL_REPORT_ADDR", Some("localhost")),
                ("PNL_REPORT_MAX_UPLOAD_BYTES", None),
            ],
            || (report_config_from_env(), server_config_from_env()),
        );

        assert_eq!(
            report.unwrap_err(),
            ConfigError::InvalidValue {
                var: "PNL_REPORT_INITIAL_BANKROLL",
                value: "lots".to_string()
            }
        );
        assert!(matches!(
            server.unwrap_err(),
            ConfigError::InvalidValue {
                var: "PNL_REPORT_ADDR",
                ..
            }
        ));
    }

    #[test]
    fn zero_upload_limit_is_rejected() {
        let server = with_env_vars(
            &[
                ("PNL_REPORT_ADDR", None),
                ("PNL_REPORT_MAX_UPLOAD_BYTES", Some("0")),
                ("PNL_REPORT_CACHE_CAPACITY", None),
            ],
            server_config_from_env,
        );
        assert!(server.is_err());
    }

    #[test]
    fn zero_cache_capacity_is_rejected() {
        let server = with_env_vars(
            &[
                ("PNL_REPORT_ADDR", None),
                ("PNL_REPORT_MAX_UPLOAD_BYTES", None),
                ("PNL_REPORT_CACHE_CAPACITY", Some("0")),
            ],
            server_config_from_env,
        );
        assert_eq!(
            server.unwrap_err(),
            ConfigError::InvalidValue {
                var: "PNL_REPORT_CACHE_CAPACITY",
                value: "0".to_string()
            }
        );
    }
}
