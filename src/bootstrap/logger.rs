//! Logging initialisation via tracing-subscriber.
//!
//! Call [`init`] once at startup, after the configuration is resolved.

use std::fs::OpenOptions;
use std::path::Path;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

use crate::core::error::AppError;

/// Initialise the global tracing subscriber.
///
/// `level` is either a bare level (`"info"`) or a full filter directive
/// (`"classnotes=debug,tower_http=info"`).
///
/// With `prefer_level`, `level` wins and `RUST_LOG` is only the fallback for an
/// invalid `level`. Without it, `RUST_LOG` wins when set.
///
/// When `log_file` is given, output is appended there without ANSI colours;
/// its parent directory is created if needed.
pub fn init(level: &str, prefer_level: bool, log_file: Option<&Path>) -> Result<(), AppError> {
    let filter = if prefer_level {
        match EnvFilter::try_new(level) {
            Ok(filter) => filter,
            Err(level_err) => EnvFilter::try_from_default_env().map_err(|env_err| {
                AppError::Logger(format!(
                    "invalid log level '{level}': {level_err}; RUST_LOG parse failed: {env_err}"
                ))
            })?,
        }
    } else {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(level))
            .map_err(|e| AppError::Logger(format!("invalid log level '{level}': {e}")))?
    };

    let (writer, ansi) = match log_file {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).map_err(|e| {
                    AppError::Logger(format!(
                        "failed to create log directory '{}': {e}",
                        parent.display()
                    ))
                })?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| {
                    AppError::Logger(format!("failed to open log file '{}': {e}", path.display()))
                })?;
            (BoxMakeWriter::new(file), false)
        }
        None => (BoxMakeWriter::new(std::io::stderr), true),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(ansi)
        .with_target(true)
        .try_init()
        .map_err(|e| AppError::Logger(format!("failed to set subscriber: {e}")))?;

    Ok(())
}

/// Map the CLI's `-v` count to a level. `None` leaves the configured level alone.
pub fn verbosity_level(count: u8) -> Option<&'static str> {
    match count {
        0 => None,
        1 => Some("warn"),
        2 => Some("info"),
        3 => Some("debug"),
        _ => Some("trace"),
    }
}

/// Parse a log level or filter directive, rejecting unknown level names.
///
/// Each comma-separated directive must be a bare level or `target=level`.
/// Returns the most verbose level named.
pub fn parse_level(level: &str) -> Result<LevelFilter, AppError> {
    if level.trim().is_empty() {
        return Err(AppError::Logger("log level must not be empty".into()));
    }
    let mut max = LevelFilter::OFF;
    for directive in level.split(',').map(str::trim).filter(|d| !d.is_empty()) {
        let name = directive.rsplit_once('=').map_or(directive, |(_, l)| l);
        let parsed = name
            .parse::<LevelFilter>()
            .map_err(|_| AppError::Logger(format!("unrecognised log level: '{level}'")))?;
        max = max.max(parsed);
    }
    Ok(max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_levels_parse() {
        for l in &["error", "warn", "info", "debug", "trace"] {
            assert!(parse_level(l).is_ok(), "expected '{l}' to be valid");
        }
    }

    #[test]
    fn invalid_level_errors() {
        assert!(parse_level("verbose").is_err());
        assert!(parse_level("").is_err());
        assert!(parse_level("INFO_LEVEL").is_err());
        assert!(parse_level("classnotes=loud").is_err());
    }

    #[test]
    fn directives_parse_to_most_verbose_level() {
        assert_eq!(
            parse_level("classnotes=debug,tower_http=info").unwrap(),
            LevelFilter::DEBUG
        );
        assert_eq!(parse_level("warn").unwrap(), LevelFilter::WARN);
    }

    #[test]
    fn verbosity_maps_counts() {
        assert_eq!(verbosity_level(0), None);
        assert_eq!(verbosity_level(1), Some("warn"));
        assert_eq!(verbosity_level(3), Some("debug"));
        assert_eq!(verbosity_level(9), Some("trace"));
    }

    #[test]
    fn init_to_file_succeeds_or_already_init() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("logs").join("test.log");
        // A subscriber may already be installed by another test in this process.
        match init("info", true, Some(&path)) {
            Ok(()) => assert!(path.exists()),
            Err(AppError::Logger(msg)) if msg.contains("set subscriber") => {}
            Err(e) => panic!("unexpected error: {e}"),
        }
    }
}
