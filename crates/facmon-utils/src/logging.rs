/*
 * Copyright (c) 2025 Facmon Contributors
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

//! # Facmon Logging Module
//!
//! Custom logging framework backed by the `log` facade.
//!
//! ## Usage
//!
//! 1. Initialize the logger once at startup:
//!    ```ignore
//!    facmon_utils::logging::init("info").expect("Failed to initialize logger");
//!    ```
//!
//! 2. Use the standard log macros throughout the code:
//!    ```ignore
//!    info!("ingestion run complete");
//!    warn!("feed returned an empty body");
//!    ```
//!
//! The logger is thread-safe; the level and format can be changed at runtime.
//! Output goes to stderr in either human-readable text or structured JSON.

use log::{LevelFilter, Metadata, Record, SetLoggerError};
use once_cell::sync::OnceCell;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

pub use log::{debug, error, info, trace, warn};

static LOGGER: FacmonLogger = FacmonLogger;
static CURRENT_LEVEL: AtomicUsize = AtomicUsize::new(LevelFilter::Info as usize);
static JSON_FORMAT: AtomicBool = AtomicBool::new(false);
static INIT: OnceCell<()> = OnceCell::new();

/// Custom logger for the facmon crates
pub struct FacmonLogger;

impl log::Log for FacmonLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level()
            <= level_filter_from_usize(CURRENT_LEVEL.load(Ordering::Relaxed))
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            if JSON_FORMAT.load(Ordering::Relaxed) {
                let log_entry = serde_json::json!({
                    "timestamp": chrono::Utc::now().to_rfc3339(),
                    "level": record.level().to_string().to_lowercase(),
                    "target": record.target(),
                    "message": format!("{}", record.args()),
                    "module": record.module_path(),
                    "file": record.file(),
                    "line": record.line()
                });
                eprintln!("{}", log_entry);
            } else {
                eprintln!(
                    "{} - {}: {}",
                    chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                    record.level(),
                    record.args()
                );
            }
        }
    }

    fn flush(&self) {}
}

/// Initializes logging with the specified level and the text format.
pub fn init(level: &str) -> Result<(), SetLoggerError> {
    init_with_format(level, "text")
}

/// Initializes logging with the specified level and format.
///
/// # Arguments
/// * `level` - "off", "error", "warn", "info", "debug", or "trace";
///   unknown values fall back to "info"
/// * `format` - "text" for human-readable output, "json" for structured JSON
pub fn init_with_format(level: &str, format: &str) -> Result<(), SetLoggerError> {
    let level_filter = str_to_level_filter(level);
    let use_json = format.eq_ignore_ascii_case("json");

    INIT.get_or_init(|| {
        log::set_logger(&LOGGER)
            .map(|()| log::set_max_level(LevelFilter::Trace))
            .expect("Failed to set logger");
    });

    JSON_FORMAT.store(use_json, Ordering::Relaxed);
    CURRENT_LEVEL.store(level_filter as usize, Ordering::Relaxed);
    log::set_max_level(level_filter);
    Ok(())
}

/// Updates the current log level at runtime.
pub fn update_log_level(level: &str) {
    let new_level = str_to_level_filter(level);
    CURRENT_LEVEL.store(new_level as usize, Ordering::Relaxed);
    log::set_max_level(new_level);
}

fn str_to_level_filter(level: &str) -> LevelFilter {
    match level.to_lowercase().as_str() {
        "off" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    }
}

fn level_filter_from_usize(v: usize) -> LevelFilter {
    match v {
        0 => LevelFilter::Off,
        1 => LevelFilter::Error,
        2 => LevelFilter::Warn,
        3 => LevelFilter::Info,
        4 => LevelFilter::Debug,
        5 => LevelFilter::Trace,
        _ => LevelFilter::Off,
    }
}

pub mod prelude {
    pub use log::{debug, error, info, trace, warn};
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::LevelFilter;

    #[test]
    fn test_init() {
        assert!(init("info").is_ok());
        assert_eq!(
            CURRENT_LEVEL.load(Ordering::Relaxed),
            LevelFilter::Info as usize
        );
    }

    #[test]
    fn test_update_log_level() {
        init("info").expect("Failed to initialize logger");

        update_log_level("debug");
        assert_eq!(
            CURRENT_LEVEL.load(Ordering::Relaxed),
            LevelFilter::Debug as usize
        );

        update_log_level("warn");
        assert_eq!(
            CURRENT_LEVEL.load(Ordering::Relaxed),
            LevelFilter::Warn as usize
        );
    }

    #[test]
    fn test_invalid_log_level_falls_back_to_info() {
        assert!(init("invalid_level").is_ok());
        assert_eq!(
            CURRENT_LEVEL.load(Ordering::Relaxed),
            LevelFilter::Info as usize
        );
    }

    #[test]
    #[allow(clippy::assertions_on_constants)]
    fn test_log_macros() {
        init("debug").expect("Failed to initialize logger");

        debug!("This is a debug message");
        info!("This is an info message");
        warn!("This is a warning message");
        error!("This is an error message");

        assert!(true);
    }
}
