//! Basic logger usage example
//!
//! Demonstrates the default stderr sink, modules and runtime level changes.
//!
//! Run with: cargo run --example basic_usage

use rust_fanout_logger::prelude::*;
use rust_fanout_logger::{debug, error, fatal, info, trace, warn};

fn main() -> Result<()> {
    println!("=== Rust Fan-out Logger - Basic Usage Example ===\n");

    // Bootstraps the "main" module and the "stderr" sink
    let logger = Logger::builder().default_level(LogLevel::Trace).build()?;

    println!("1. Logging at different levels:");
    trace!(logger, "This is a trace message");
    debug!(logger, "This is a debug message");
    info!(logger, "This is an info message");
    warn!(logger, "This is a warning message");
    error!(logger, "This is an error message");
    fatal!(logger, "This is a fatal message");
    logger.flush()?;

    println!("\n2. A module with its own threshold:");
    let db = logger.register_module("db", LogLevel::Warn, true)?;
    info!(logger, &db, "Connected (hidden, below WARN)");
    warn!(logger, &db, "Slow query: {} ms", 1200);

    println!("\n3. Modules that inherit the default level:");
    let net = logger.register_module("net", Level::Inherit, true)?;
    debug!(logger, &net, "Visible while the default level is TRACE");
    logger.set_default_level(LogLevel::Info)?;
    debug!(logger, &net, "Debug message (hidden)");
    info!(logger, &net, "Info message (visible)");

    // Drains the queue and closes the sinks
    logger.shutdown()?;

    println!("\n=== Example completed successfully! ===");
    Ok(())
}
