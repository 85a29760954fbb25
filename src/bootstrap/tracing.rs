//! Tracing configuration for CookMate
//!
//! Installs the global `tracing-subscriber` registry: an env-filter for level
//! control, a stdout fmt layer, and an optional file layer when a log
//! directory is configured.
//!
//! ## Output format / 输出格式
//!
//! `2026-01-15 10:30:45.123 INFO src/file.rs:42 target: message`

use std::{fs, io, path::Path, sync::OnceLock};

use anyhow::Context;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{fmt, fmt::writer::BoxMakeWriter, prelude::*, registry};

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

const LOG_FILE_PREFIX: &str = "cookmate.log";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Check if running in development environment
fn is_development() -> bool {
    cfg!(debug_assertions)
}

/// Build the default filter directives for tracing
///
/// ## Behavior / 行为
/// - **Development**: debug level for everything
/// - **Production**: info level for everything
/// - **HTTP stack**: hyper / reqwest internals stay at warn
fn build_filter_directives(is_dev: bool) -> Vec<String> {
    vec![
        if is_dev { "debug" } else { "info" }.to_string(),
        "hyper=warn".to_string(),
        "hyper_util=warn".to_string(),
        "reqwest=warn".to_string(),
        if is_dev { "cm_app=debug" } else { "cm_app=info" }.to_string(),
        if is_dev { "cm_infra=debug" } else { "cm_infra=info" }.to_string(),
    ]
}

/// Initialize the tracing subscriber with appropriate configuration
///
/// ## Behavior / 行为
///
/// - **Environment filter**: Respects RUST_LOG, with sensible defaults
/// - **stdout**: Always on
/// - **File**: Daily rolling file under `log_dir` when given; falls back to
///   stdout only if the directory cannot be created
///
/// ## Call this / 调用位置
///
/// Call in `main.rs` once the configuration is resolved:
///
/// ```ignore
/// let config = bootstrap::resolve_config(cli.config.as_deref())?;
/// bootstrap::tracing::init_tracing_subscriber(bootstrap::configured_log_dir(&config))?;
/// ```
///
/// ## Errors / 错误
///
/// Returns `Err` if a subscriber is already registered.
pub fn init_tracing_subscriber(log_dir: Option<&Path>) -> anyhow::Result<()> {
    let filter_directives = build_filter_directives(is_development());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter_directives.join(",")));

    let file_writer = match log_dir.map(build_file_writer).transpose() {
        Ok(writer) => writer,
        Err(err) => {
            eprintln!("Failed to initialize file logging, falling back to stdout: {err:#}");
            None
        }
    };

    // Logs go to stderr so command output on stdout stays clean.
    let stderr_layer = fmt::layer()
        .with_timer(fmt::time::ChronoUtc::new(TIMESTAMP_FORMAT.to_string()))
        .with_level(true)
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .with_ansi(cfg!(not(test)))
        .with_writer(BoxMakeWriter::new(io::stderr));

    let file_layer = file_writer.map(|writer| {
        fmt::layer()
            .with_timer(fmt::time::ChronoUtc::new(TIMESTAMP_FORMAT.to_string()))
            .with_level(true)
            .with_file(true)
            .with_line_number(true)
            .with_target(true)
            .with_ansi(false)
            .with_writer(writer)
    });

    registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(())
}

fn build_file_writer(log_dir: &Path) -> anyhow::Result<NonBlocking> {
    fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory: {}", log_dir.display()))?;
    let appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    if LOG_GUARD.set(guard).is_err() {
        eprintln!("Log guard already initialized");
    }
    Ok(writer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_directives_follow_build_profile() {
        let dev = build_filter_directives(true);
        assert_eq!(dev[0], "debug");
        assert!(dev.contains(&"cm_app=debug".to_string()));
        assert!(dev.contains(&"cm_infra=debug".to_string()));

        let prod = build_filter_directives(false);
        assert_eq!(prod[0], "info");
        assert!(prod.contains(&"cm_infra=info".to_string()));
        assert!(prod.contains(&"reqwest=warn".to_string()));
    }

    #[test]
    fn test_filter_directives_parse() {
        let directives = build_filter_directives(false).join(",");
        assert!(tracing_subscriber::EnvFilter::try_new(directives).is_ok());
    }

    #[test]
    fn test_file_writer_creates_log_directory() {
        let temp = tempfile::tempdir().unwrap();
        let log_dir = temp.path().join("logs");

        build_file_writer(&log_dir).unwrap();

        assert!(log_dir.is_dir());
    }
}
