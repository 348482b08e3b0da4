//! Logging setup for the report server and its lifecycle events.

use std::env;
use std::net::SocketAddr;
use std::str::FromStr;

use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::{ReportConfig, ServerConfig};

const LEVEL_VAR: &str = "PNL_REPORT_LOG_LEVEL";
const FORMAT_VAR: &str = "PNL_REPORT_LOG_FORMAT";
const TARGET_VAR: &str = "PNL_REPORT_LOG_TARGET";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

impl FromStr for LogFormat {
    type Err = ();

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
    pub include_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            include_target: true,
        }
    }
}

#[derive(Debug, Error)]
pub enum LoggingInitError {
    #[error("logging already initialized: {0}")]
    AlreadyInitialized(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// Unset or unrecognised values keep the default; logging never blocks startup.
pub fn logging_config_from_env() -> LoggingConfig {
    let defaults = LoggingConfig::default();

    LoggingConfig {
        level: env::var(LEVEL_VAR)
            .ok()
            .map(|level| level.trim().to_string())
            .filter(|level| !level.is_empty())
            .unwrap_or(defaults.level),
        format: env::var(FORMAT_VAR)
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(defaults.format),
        include_target: env::var(TARGET_VAR)
            .ok()
            .and_then(|raw| parse_switch(&raw))
            .unwrap_or(defaults.include_target),
    }
}

pub fn init_logging(config: &LoggingConfig) -> Result<(), LoggingInitError> {
    let env_filter =
        EnvFilter::try_new(config.level.clone()).unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(config.include_target)
        .with_ansi(matches!(config.format, LogFormat::Pretty));

    match config.format {
        LogFormat::Json => tracing::subscriber::set_global_default(builder.json().finish())?,
        LogFormat::Pretty => tracing::subscriber::set_global_default(builder.pretty().finish())?,
    }

    Ok(())
}

/// One startup event with everything that shapes a report.
pub fn log_app_start(logging: &LoggingConfig, report: &ReportConfig, server: &ServerConfig) {
    info!(
        component = "report_server",
        event = "app.start",
        log_level = %logging.level,
        log_format = ?logging.format,
        initial_bankroll = report.initial_bankroll,
        currency_prefix = %report.currency_prefix,
        max_upload_bytes = server.max_upload_bytes,
        cache_capacity = server.cache_capacity
    );
}

pub fn log_app_bind(bound_addr: SocketAddr) {
    info!(
        component = "report_server",
        event = "app.bind",
        bind_addr = %bound_addr,
        form_route = "/",
        report_route = "/report"
    );
}

fn parse_switch(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
