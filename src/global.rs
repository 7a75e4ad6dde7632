//! Process-wide logger
//!
//! The global logger is created on first use and lives until the process
//! exits. Rust runs no destructors for statics, so call [`shutdown`] before
//! returning from `main`, or hold an [`ExitGuard`] there, to make sure
//! queued records reach the sinks.
//!
//! ```
//! use rust_fanout_logger::global;
//! use rust_fanout_logger::prelude::*;
//!
//! let _guard = global::ExitGuard::new();
//! let logger = global::logger().unwrap();
//! let db = logger.register_module("db", LogLevel::Warn, true).unwrap();
//! logger.log(&db, LogLevel::Error, Location::unknown(), format_args!("disk full"));
//! ```

use crate::core::{
    Level, Location, LogLevel, LogOutcome, Logger, LoggerConfig, LoggerError, ModuleHandle,
    ModuleRef, Result, Sink, SinkHandle,
};
use parking_lot::Mutex;
use std::fmt;
use std::sync::OnceLock;

static GLOBAL: OnceLock<Logger> = OnceLock::new();
static INIT: Mutex<()> = parking_lot::const_mutex(());

/// Bootstrap the global logger with `config`
///
/// Fails if the global logger already exists.
pub fn init(config: LoggerConfig) -> Result<&'static Logger> {
    let _init = INIT.lock();
    if GLOBAL.get().is_some() {
        return Err(LoggerError::config(
            "global",
            "the global logger is already initialized",
        ));
    }
    let logger = Logger::with_config(config)?;
    Ok(GLOBAL.get_or_init(|| logger))
}

/// The global logger, bootstrapped with the default config on first call
pub fn logger() -> Result<&'static Logger> {
    if let Some(logger) = GLOBAL.get() {
        return Ok(logger);
    }
    let _init = INIT.lock();
    if let Some(logger) = GLOBAL.get() {
        return Ok(logger);
    }
    let logger = Logger::new()?;
    Ok(GLOBAL.get_or_init(|| logger))
}

/// Register a module on the global logger, bootstrapping it if needed
pub fn register_module(name: &str, level: impl Into<Level>, enabled: bool) -> Result<ModuleHandle> {
    logger()?.register_module(name, level, enabled)
}

/// Register a sink on the global logger, bootstrapping it if needed
pub fn register_sink(
    name: &str,
    level: impl Into<Level>,
    enabled: bool,
    sink: impl Sink + 'static,
) -> Result<SinkHandle> {
    logger()?.register_sink(name, level, enabled, sink)
}

/// Log through the global logger
///
/// A logger that failed to bootstrap filters everything.
pub fn log<'a>(
    module: impl Into<ModuleRef<'a>>,
    level: LogLevel,
    location: Location,
    args: fmt::Arguments<'_>,
) -> LogOutcome {
    match logger() {
        Ok(logger) => logger.log(module, level, location, args),
        Err(_) => LogOutcome::FilteredOut,
    }
}

/// Whether the global logger has been bootstrapped
pub fn is_initialized() -> bool {
    GLOBAL.get().is_some()
}

/// Drain and close the global logger; a no-op if it was never used
///
/// Idempotent. Records logged afterwards are dropped.
pub fn shutdown() -> Result<()> {
    match GLOBAL.get() {
        Some(logger) => logger.shutdown(),
        None => Ok(()),
    }
}

/// Runs [`shutdown`] when dropped
///
/// Bind one at the top of `main`; it drains the global logger on the way out,
/// including when `main` returns early with an error.
#[must_use = "the guard shuts the logger down when dropped"]
#[derive(Debug, Default)]
pub struct ExitGuard {
    _private: (),
}

impl ExitGuard {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Drop for ExitGuard {
    fn drop(&mut self) {
        if let Err(e) = shutdown() {
            eprintln!("[LOGGER ERROR] Global logger shutdown failed: {}", e);
        }
    }
}
