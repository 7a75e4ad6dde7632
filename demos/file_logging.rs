//! File logging example
//!
//! Demonstrates logging to stderr and a file at different thresholds.
//!
//! Run with: cargo run --example file_logging

use rust_fanout_logger::prelude::*;
use rust_fanout_logger::{debug, error, info, warn};

fn main() -> Result<()> {
    println!("=== Rust Fan-out Logger - File Logging Example ===\n");

    let logger = Logger::builder().default_level(LogLevel::Debug).build()?;

    // Errors only on stderr, everything from DEBUG up in the file
    let stderr = logger.find_sink("stderr").ok_or_else(|| LoggerError::other("no stderr sink"))?;
    logger.set_sink_level(&stderr, LogLevel::Error);
    logger.register_sink("file", LogLevel::Debug, true, FileSink::new("application.log"))?;

    println!("1. Logging to both stderr and file:");
    info!(logger, "Application started");
    debug!(logger, "Loading configuration...");
    info!(logger, "Configuration loaded successfully");
    warn!(logger, "Using default settings for some options");
    error!(logger, "Failed to load optional plugin");

    println!("\n2. Performing some operations:");
    for i in 1..=5 {
        info!(logger, "Processing item {}/5", i);
        if i == 3 {
            warn!(logger, "Item 3 took longer than expected");
        }
    }
    info!(logger, "All operations completed");

    logger.shutdown()?;

    println!("\n=== Example completed successfully! ===");
    println!("Check 'application.log' for the full log output");
    Ok(())
}
