//! Multiple sink example
//!
//! Registers sinks with different formats and thresholds, then prints what
//! each one received along with the delivery counters.
//!
//! Run with: cargo run --example multi_sink

use rust_fanout_logger::global;
use rust_fanout_logger::prelude::*;
use rust_fanout_logger::{error, info, warn};

fn main() -> Result<()> {
    println!("=== Rust Fan-out Logger - Multiple Sinks Example ===\n");

    let _guard = global::ExitGuard::new();
    let logger = global::logger()?;

    let text = MemorySink::new();
    let json = MemorySink::new();
    let (text_out, json_out) = (text.clone(), json.clone());

    let text_sink = logger.register_sink("text", LogLevel::Info, true, text)?;
    let json_sink = logger.register_sink_with(
        "json",
        SinkOptions::new(LogLevel::Warn).format(OutputFormat::Json),
        json,
    )?;

    let api = logger.register_module("api", LogLevel::Debug, true)?;
    info!(logger, &api, "GET /users 200");
    warn!(logger, &api, "GET /orders took {} ms", 850);
    error!(logger, &api, "POST /orders 500");

    global::shutdown()?;

    println!("Text sink:");
    for line in text_out.lines() {
        print!("  {}", line);
    }
    println!("\nJSON sink:");
    for line in json_out.lines() {
        print!("  {}", line);
    }

    for sink in [&text_sink, &json_sink] {
        let stats = logger.sink_stats(sink);
        println!(
            "\n{}: written={} skipped={} failed={}",
            sink.name(),
            stats.written(),
            stats.skipped(),
            stats.failed()
        );
    }
    Ok(())
}
