//! Profit/loss report generator for betting-exchange exports.
//!
//! One uploaded CSV flows one way through the crate:
//! - `loader` checks the schema, cleans amounts and parses settlement dates
//! - `market` and `teams` classify each record's market description
//! - `report` aggregates summary metrics, bankroll series and leaderboards
//! - `render` and `server` turn the outcome into HTML pages

mod config;
mod dates;
mod loader;
mod market;
mod observability;
mod pipeline;
mod render;
mod report;
mod server;
mod teams;

pub use config::{
    report_config_from_env, server_config_from_env, ConfigError, ReportConfig, ServerConfig,
    DEFAULT_BIND_ADDR, DEFAULT_CACHE_CAPACITY, DEFAULT_CURRENCY_PREFIX, DEFAULT_MAX_UPLOAD_BYTES,
};
pub use dates::{normalize_months, parse_export_timestamp, DATE_FORMAT};
pub use loader::{
    clean_profit_loss, load_records, load_records_from_bytes, LoadError, LoadedRecords, Record,
    MARKET_COLUMN, PROFIT_LOSS_COLUMN, REQUIRED_COLUMNS, SETTLED_DATE_COLUMN, START_TIME_COLUMN,
};
pub use market::{classify_market, MarketCategory, MARKET_RULES};
pub use observability::{
    init_logging, log_app_bind, log_app_start, logging_config_from_env, LogFormat, LoggingConfig,
    LoggingInitError,
};
pub use pipeline::{content_key, run_pipeline, ReportCache};
pub use render::{
    format_currency, format_optional_currency, render_bankroll_chart, render_empty_page,
    render_error_page, render_report_page, render_upload_page, NOT_APPLICABLE,
};
pub use report::{
    average_daily_profit_loss, bankroll_series, build_outcome, category_table, classify_records,
    summary_metrics, team_ranking, BankrollPoint, CategorySummary, ClassifiedRecord, Report,
    ReportOutcome, SummaryMetrics, TeamSummary, LEADERBOARD_SIZE,
};
pub use server::{report_router, UPLOAD_FIELD};
pub use teams::{extract_teams, is_unknown_team, TeamRule, TEAM_RULES, UNKNOWN_TEAM};
