//! Core logger types and traits

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod fanout;
pub mod log_level;
pub mod log_record;
pub mod logger;
pub mod metrics;
pub mod module_registry;
pub mod output_format;
mod registry;
pub mod ring_buffer;
pub mod sink;
pub mod sink_registry;
pub mod timestamp;

pub use config::LoggerConfig;
pub use dispatcher::WorkerState;
pub use error::{LoggerError, RegistryKind, Result};
pub use fanout::{Delivery, FanOutBarrier, Participant, Step};
pub use log_level::{Level, LogLevel};
pub use log_record::{current_thread_id, sanitize_message, Location, LogRecord};
pub use logger::{LogOutcome, Logger, LoggerBuilder, ModuleRef};
pub use metrics::{LoggerMetrics, SinkStats};
pub use module_registry::{Admission, ModuleHandle, ModuleRegistry};
pub use output_format::{format_record, ColorMode, FieldBounds, OutputFormat};
pub use ring_buffer::{QueueClosed, RingBuffer};
pub use sink::Sink;
pub use sink_registry::{SinkHandle, SinkOptions, SinkRegistry};
pub use timestamp::{format_timestamp, MonotonicClock};
