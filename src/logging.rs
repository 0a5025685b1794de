//! Logging for fileshare.
//!
//! Lines go to stdout and, unless `logging.file` is empty, to a log file.
//! `RUST_LOG` replaces the configured filter entirely when set.

use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Arc;

use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::Result;

/// Parse log level string to tracing Level.
fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

/// Filter directives for the configured level.
///
/// The crate logs at `level`. Request spans from `tower_http` are shown at
/// debug when `http_trace` is on and silenced otherwise; sqlx statement
/// logging stays at warn.
fn filter_directives(config: &LoggingConfig) -> String {
    let level = parse_level(&config.level).to_string().to_lowercase();
    let http = if config.http_trace { "debug" } else { "off" };
    format!("{level},fileshare={level},tower_http={http},sqlx=warn")
}

fn build_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter_directives(config)))
}

/// Initialize logging to stdout and the configured log file.
pub fn init(config: &LoggingConfig) -> Result<()> {
    if config.file.is_empty() {
        init_console_only(config);
        return Ok(());
    }

    if let Some(parent) = Path::new(&config.file).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }

    let log_file = OpenOptions::new()
        .create(true)
        .write(true)
        .append(config.append)
        .truncate(!config.append)
        .open(&config.file)?;
    let writer = std::io::stdout.and(Arc::new(log_file));

    // No ANSI codes, they end up in the file too
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true),
        )
        .with(build_filter(config))
        .init();

    Ok(())
}

/// Initialize console-only logging.
///
/// Used when the log file cannot be opened, and for development.
pub fn init_console_only(config: &LoggingConfig) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stdout)
                .with_ansi(true)
                .with_target(true),
        )
        .with(build_filter(config))
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(level: &str, http_trace: bool) -> LoggingConfig {
        LoggingConfig {
            level: level.to_string(),
            http_trace,
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_level_known() {
        assert_eq!(parse_level("trace"), Level::TRACE);
        assert_eq!(parse_level("DEBUG"), Level::DEBUG);
        assert_eq!(parse_level("info"), Level::INFO);
        assert_eq!(parse_level("warning"), Level::WARN);
        assert_eq!(parse_level("error"), Level::ERROR);
    }

    #[test]
    fn test_parse_level_default() {
        assert_eq!(parse_level("verbose"), Level::INFO);
        assert_eq!(parse_level(""), Level::INFO);
    }

    #[test]
    fn test_filter_directives_http_trace() {
        assert_eq!(
            filter_directives(&config("info", true)),
            "info,fileshare=info,tower_http=debug,sqlx=warn"
        );
        assert_eq!(
            filter_directives(&config("WARNING", false)),
            "warn,fileshare=warn,tower_http=off,sqlx=warn"
        );
    }

    #[test]
    fn test_filter_directives_parse() {
        for level in ["trace", "debug", "info", "warn", "error", "bogus"] {
            for http_trace in [true, false] {
                let directives = filter_directives(&config(level, http_trace));
                assert!(EnvFilter::try_new(&directives).is_ok(), "{directives}");
            }
        }
    }
}
