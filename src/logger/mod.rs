//! Logger module
//!
//! Installs the global `tracing` subscriber:
//! - level filter from `RUST_LOG`, else the configured level
//! - `text` or `json` line format
//! - info output to the access target, warnings and errors to the error
//!   target (stdout/stderr unless files are configured)

pub mod writer;

use crate::config::{Config, LoggingConfig};
use std::net::SocketAddr;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;
use writer::LogTarget;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    #[error("cannot open log file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid log level filter '{level}': {source}")]
    Filter {
        level: String,
        source: tracing_subscriber::filter::ParseError,
    },
    #[error("unknown log format '{0}' (expected text or json)")]
    Format(String),
    #[error("failed to install subscriber: {0}")]
    Init(String),
}

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &LoggingConfig) -> Result<(), LoggerError> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(&config.level).map_err(|source| LoggerError::Filter {
            level: config.level.clone(),
            source,
        })?
    };

    let access = LogTarget::open(config.access_log_file.as_deref(), LogTarget::Stdout)?;
    let errors = LogTarget::open(config.error_log_file.as_deref(), LogTarget::Stderr)?;
    let ansi = access.is_terminal() && errors.is_terminal();
    let make_writer = errors.with_max_level(Level::WARN).or_else(access);

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(make_writer)
        .with_ansi(ansi)
        .with_target(false);

    let result = match config.format.as_str() {
        "text" => builder.try_init(),
        "json" => builder.json().try_init(),
        other => return Err(LoggerError::Format(other.to_string())),
    };
    result.map_err(|e| LoggerError::Init(e.to_string()))
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    tracing::info!(
        listen = %addr,
        route_prefix = %config.http.route_prefix,
        index_name = config.storage.index_name().unwrap_or("-"),
        host_name = config.frontend.host_name.as_deref().unwrap_or("-"),
        workers = config.server.workers.unwrap_or(0),
        "blobsite started"
    );
    if config.storage.is_in_memory() {
        tracing::warn!(
            connection_string = %config.storage.connection_string,
            "in-memory storage has no containers, every request will fail; set storage.connection_string to LocalRoot=<dir>"
        );
    }
    if let Some(ref path) = config.logging.access_log_file {
        tracing::info!(path = %path, "access log");
    }
    if let Some(ref path) = config.logging.error_log_file {
        tracing::info!(path = %path, "error log");
    }
}

pub fn log_connection_error(err: &impl std::fmt::Display) {
    tracing::error!(error = %err, "failed to serve connection");
}
