//! # Rust Fan-out Logger
//!
//! An in-process logging engine. Call sites hand records to a bounded queue
//! and return; one dispatch worker drains the queue and offers every record
//! to every registered sink, each running on its own thread.
//!
//! ## Features
//!
//! - **Named modules**: per-module threshold and enable flag, checked at the call site
//! - **Multiple sinks**: stderr, file, TCP, in-memory and custom sinks, each with its own threshold
//! - **Ordered fan-out**: every sink sees records in queue order
//! - **Clean shutdown**: everything accepted before shutdown is delivered, then sinks are flushed and closed
//!
//! ```
//! use rust_fanout_logger::prelude::*;
//! use rust_fanout_logger::{error, info};
//!
//! let memory = MemorySink::new();
//! let captured = memory.clone();
//! let logger = Logger::builder()
//!     .default_sink(false)
//!     .sink("memory", SinkOptions::new(LogLevel::Trace), memory)
//!     .build()
//!     .unwrap();
//!
//! let db = logger.register_module("db", LogLevel::Warn, true).unwrap();
//! info!(logger, &db, "connected");
//! error!(logger, &db, "query failed");
//!
//! logger.shutdown().unwrap();
//! assert_eq!(captured.lines().len(), 1);
//! ```

#[macro_use]
pub mod macros;

pub mod core;
pub mod global;
pub mod sinks;

pub mod prelude {
    pub use crate::core::{
        Admission, ColorMode, Level, Location, LogLevel, LogOutcome, LogRecord, Logger,
        LoggerBuilder, LoggerConfig, LoggerError, LoggerMetrics, ModuleHandle, ModuleRef,
        OutputFormat, Result, Sink, SinkHandle, SinkOptions, SinkStats,
    };
    pub use crate::sinks::{MemorySink, StderrSink};

    #[cfg(feature = "file")]
    pub use crate::sinks::FileSink;

    #[cfg(feature = "network")]
    pub use crate::sinks::TcpSink;
}

pub use self::core::{
    format_record, format_timestamp, Admission, ColorMode, FieldBounds, Level, Location,
    LogLevel, LogOutcome, LogRecord, Logger, LoggerBuilder, LoggerConfig, LoggerError,
    LoggerMetrics, ModuleHandle, ModuleRef, OutputFormat, Result, Sink, SinkHandle, SinkOptions,
    SinkStats, WorkerState,
};
pub use sinks::{MemorySink, StderrSink};
