//! Main logger implementation
//!
//! A [`Logger`] is a cheap, cloneable handle on one running pipeline:
//! module and sink registries, the bounded queue, the dispatch worker and
//! one sink task per registered sink. The pipeline shuts down when
//! [`Logger::shutdown`] is called or the last handle is dropped, whichever
//! comes first.

use super::config::LoggerConfig;
use super::dispatcher::{spawn_sink_task, spawn_worker, Pipeline, WorkerState};
use super::error::{LoggerError, Result};
use super::log_level::{Level, LogLevel};
use super::log_record::{Location, LogRecord};
use super::metrics::{LoggerMetrics, SinkStats};
use super::module_registry::{Admission, ModuleEntry, ModuleHandle, ModuleRegistry};
use super::output_format::{ColorMode, OutputFormat};
use super::sink::Sink;
use super::sink_registry::{SinkEntry, SinkHandle, SinkOptions, SinkRegistry};
use super::timestamp::MonotonicClock;
use crate::sinks::StderrSink;
use parking_lot::Mutex;
use std::borrow::Cow;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

/// What happened to a log call
///
/// Logging never fails the caller; the outcome is informational.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogOutcome {
    /// Accepted; every sink task will be offered the record
    Queued,
    /// Unknown or disabled module, or level below the threshold
    FilteredOut,
    /// Shutdown had begun, the record was dropped
    ShutdownInProgress,
}

/// Which module a log call belongs to
#[derive(Debug, Clone, Copy)]
pub enum ModuleRef<'a> {
    /// The built-in default module
    Default,
    Handle(&'a ModuleHandle),
    Name(&'a str),
}

impl<'a> From<&'a ModuleHandle> for ModuleRef<'a> {
    fn from(handle: &'a ModuleHandle) -> Self {
        ModuleRef::Handle(handle)
    }
}

impl<'a> From<&'a str> for ModuleRef<'a> {
    fn from(name: &'a str) -> Self {
        ModuleRef::Name(name)
    }
}

impl<'a> From<&'a String> for ModuleRef<'a> {
    fn from(name: &'a String) -> Self {
        ModuleRef::Name(name)
    }
}

#[derive(Clone)]
pub struct Logger {
    inner: Arc<LoggerInner>,
}

struct LoggerInner {
    config: LoggerConfig,
    clock: MonotonicClock,
    modules: ModuleRegistry,
    sinks: SinkRegistry,
    pipeline: Arc<Pipeline>,
    default_module: ModuleHandle,
    default_sink: Mutex<Option<SinkHandle>>,
    worker: Mutex<Option<JoinHandle<()>>>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
    closing: AtomicBool,
    shut_down: Mutex<bool>,
}

impl Logger {
    /// Start a logger with the default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(LoggerConfig::default())
    }

    /// Bootstrap: registries, default module and sink, worker and sink tasks
    pub fn with_config(config: LoggerConfig) -> Result<Self> {
        config.validate()?;

        let clock = MonotonicClock::new();
        let pipeline = Arc::new(Pipeline::new(
            config.queue_capacity,
            config.default_level,
            config.field_bounds(),
        ));

        let modules = ModuleRegistry::new(config.max_modules, config.module_name_length);
        let default_module = modules.register(
            &config.default_module_name,
            Level::Concrete(config.default_level),
            true,
        )?;
        let sinks = SinkRegistry::new(config.max_sinks, config.sink_name_length);

        let worker = spawn_worker(Arc::clone(&pipeline))
            .map_err(|e| LoggerError::io_operation("starting dispatch worker", "spawn failed", e))?;

        let logger = Self {
            inner: Arc::new(LoggerInner {
                config,
                clock,
                modules,
                sinks,
                pipeline,
                default_module,
                default_sink: Mutex::new(None),
                worker: Mutex::new(Some(worker)),
                tasks: Mutex::new(Vec::new()),
                closing: AtomicBool::new(false),
                shut_down: Mutex::new(false),
            }),
        };

        if logger.inner.config.default_sink {
            let options = SinkOptions::new(LogLevel::Trace)
                .color_mode(logger.inner.config.default_sink_color_mode);
            let name = logger.inner.config.default_sink_name.clone();
            let handle = logger.register_sink_with(&name, options, StderrSink::new())?;
            *logger.inner.default_sink.lock() = Some(handle);
        }

        Ok(logger)
    }

    /// Log one record; a no-op when the module or level filters it out
    pub fn log<'a>(
        &self,
        module: impl Into<ModuleRef<'a>>,
        level: LogLevel,
        location: Location,
        args: fmt::Arguments<'_>,
    ) -> LogOutcome {
        let inner = &*self.inner;
        let entry: Arc<ModuleEntry> = match module.into() {
            ModuleRef::Default => Arc::clone(&inner.default_module.0),
            ModuleRef::Handle(handle) => Arc::clone(&handle.0),
            ModuleRef::Name(name) => match inner.modules.find(name) {
                Some(handle) => handle.0,
                None => return inner.filtered(),
            },
        };

        let default = inner.pipeline.default_level();
        if !entry.check(level).admits(level, default) {
            return inner.filtered();
        }

        let message: Cow<'_, str> = match args.as_str() {
            Some(s) => Cow::Borrowed(s),
            None => Cow::Owned(args.to_string()),
        };
        let record = LogRecord::new(
            inner.clock.now_nanos(),
            level,
            entry.shared_name(),
            location,
            &message,
            inner.config.message_length,
        );

        match inner.pipeline.queue.enqueue(record) {
            Ok(()) => {
                inner.pipeline.metrics.record_queued();
                LogOutcome::Queued
            }
            Err(_) => {
                inner.pipeline.metrics.record_dropped();
                LogOutcome::ShutdownInProgress
            }
        }
    }

    #[track_caller]
    fn log_default(&self, level: LogLevel, message: &str) -> LogOutcome {
        let caller = std::panic::Location::caller();
        let location = Location::new(caller.file(), caller.line(), "unknown");
        self.log(ModuleRef::Default, level, location, format_args!("{}", message))
    }

    /// Log a plain message to the default module
    ///
    /// `trace` through `fatal` record the caller's file and line, but the
    /// function name is always `unknown`. Use the [`trace!`](crate::trace)
    /// family of macros to capture the enclosing function and to format
    /// arguments lazily.
    #[track_caller]
    pub fn trace(&self, message: &str) -> LogOutcome {
        self.log_default(LogLevel::Trace, message)
    }

    #[track_caller]
    pub fn debug(&self, message: &str) -> LogOutcome {
        self.log_default(LogLevel::Debug, message)
    }

    #[track_caller]
    pub fn info(&self, message: &str) -> LogOutcome {
        self.log_default(LogLevel::Info, message)
    }

    #[track_caller]
    pub fn warn(&self, message: &str) -> LogOutcome {
        self.log_default(LogLevel::Warn, message)
    }

    #[track_caller]
    pub fn error(&self, message: &str) -> LogOutcome {
        self.log_default(LogLevel::Error, message)
    }

    #[track_caller]
    pub fn fatal(&self, message: &str) -> LogOutcome {
        self.log_default(LogLevel::Fatal, message)
    }

    pub fn register_module(
        &self,
        name: &str,
        level: impl Into<Level>,
        enabled: bool,
    ) -> Result<ModuleHandle> {
        self.inner.ensure_running()?;
        self.inner.modules.register(name, level.into(), enabled)
    }

    /// Register a sink; `open` runs on this thread before anything else
    pub fn register_sink(
        &self,
        name: &str,
        level: impl Into<Level>,
        enabled: bool,
        sink: impl Sink + 'static,
    ) -> Result<SinkHandle> {
        self.register_sink_with(name, SinkOptions::new(level).enabled(enabled), sink)
    }

    pub fn register_sink_with(
        &self,
        name: &str,
        options: SinkOptions,
        sink: impl Sink + 'static,
    ) -> Result<SinkHandle> {
        self.register_boxed_sink(name, options, Box::new(sink))
    }

    pub fn register_boxed_sink(
        &self,
        name: &str,
        options: SinkOptions,
        sink: Box<dyn Sink>,
    ) -> Result<SinkHandle> {
        let inner = &*self.inner;
        inner.ensure_running()?;
        inner
            .sinks
            .register(name, options, sink, |entry| inner.start_sink_task(entry))
    }

    pub fn find_module(&self, name: &str) -> Option<ModuleHandle> {
        self.inner.modules.find(name)
    }

    pub fn find_sink(&self, name: &str) -> Option<SinkHandle> {
        self.inner.sinks.find(name)
    }

    pub fn default_module(&self) -> ModuleHandle {
        self.inner.default_module.clone()
    }

    /// The built-in stderr sink, unless disabled in the config
    pub fn default_sink(&self) -> Option<SinkHandle> {
        self.inner.default_sink.lock().clone()
    }

    pub fn set_module_level(&self, module: &ModuleHandle, level: impl Into<Level>) {
        self.inner.modules.set_level(module, level.into());
    }

    pub fn set_module_enabled(&self, module: &ModuleHandle, enabled: bool) {
        self.inner.modules.set_enabled(module, enabled);
    }

    pub fn module_check(&self, module: &ModuleHandle, level: LogLevel) -> Admission {
        self.inner.modules.check(module, level)
    }

    pub fn set_sink_level(&self, sink: &SinkHandle, level: impl Into<Level>) {
        self.inner.sinks.set_level(sink, level.into());
    }

    pub fn set_sink_enabled(&self, sink: &SinkHandle, enabled: bool) {
        self.inner.sinks.set_enabled(sink, enabled);
    }

    /// Snapshot of a sink's delivery counters
    pub fn sink_stats(&self, sink: &SinkHandle) -> SinkStats {
        sink.stats().clone()
    }

    pub fn set_sink_format(&self, sink: &SinkHandle, format: OutputFormat) {
        sink.0.set_format(format);
    }

    pub fn set_sink_color_mode(&self, sink: &SinkHandle, color_mode: ColorMode) {
        sink.0.set_color_mode(color_mode);
    }

    /// Change the level every `Inherit` threshold resolves to
    pub fn set_default_level(&self, level: impl Into<Level>) -> Result<()> {
        match level.into() {
            Level::Concrete(level) => {
                *self.inner.pipeline.default_level.write() = level;
                Ok(())
            }
            Level::Inherit => Err(LoggerError::invalid_level(
                "default level (Inherit has nothing to inherit from)",
            )),
        }
    }

    pub fn default_level(&self) -> LogLevel {
        self.inner.pipeline.default_level()
    }

    /// Flush one sink now, from the calling thread
    pub fn flush_sink(&self, sink: &SinkHandle) -> Result<()> {
        sink.0.flush()
    }

    /// Flush every open sink; returns the first error
    pub fn flush(&self) -> Result<()> {
        let mut result = Ok(());
        for entry in self.inner.sinks.entries() {
            if entry.is_closed() {
                continue;
            }
            if let Err(e) = entry.flush() {
                eprintln!("[LOGGER ERROR] Sink '{}' flush failed: {}", entry.name(), e);
                if result.is_ok() {
                    result = Err(e);
                }
            }
        }
        result
    }

    pub fn config(&self) -> &LoggerConfig {
        &self.inner.config
    }

    pub fn metrics(&self) -> &LoggerMetrics {
        &self.inner.pipeline.metrics
    }

    pub fn worker_state(&self) -> WorkerState {
        self.inner.pipeline.state()
    }

    /// Records waiting in the queue
    pub fn queued(&self) -> usize {
        self.inner.pipeline.queue.len()
    }

    pub fn module_count(&self) -> usize {
        self.inner.modules.len()
    }

    pub fn sink_count(&self) -> usize {
        self.inner.sinks.len()
    }

    pub fn is_shut_down(&self) -> bool {
        self.inner.closing.load(Ordering::Acquire)
    }

    /// Drain the queue, close every sink and join all threads
    ///
    /// Every record accepted before this call is offered to every sink
    /// before it returns. Idempotent; concurrent callers all return after
    /// the drain has finished.
    pub fn shutdown(&self) -> Result<()> {
        self.inner.shutdown()
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("default_level", &self.default_level())
            .field("modules", &self.module_count())
            .field("sinks", &self.sink_count())
            .field("state", &self.worker_state())
            .finish()
    }
}

impl LoggerInner {
    fn filtered(&self) -> LogOutcome {
        self.pipeline.metrics.record_filtered();
        LogOutcome::FilteredOut
    }

    fn ensure_running(&self) -> Result<()> {
        if self.closing.load(Ordering::Acquire) {
            return Err(LoggerError::ShutdownInProgress);
        }
        Ok(())
    }

    /// Join the barrier and spawn the sink's task
    ///
    /// Runs while the sink registry is locked. On failure the already opened
    /// sink is closed again.
    fn start_sink_task(&self, entry: &Arc<SinkEntry>) -> Result<()> {
        let mut tasks = self.tasks.lock();
        let participant = match self.pipeline.barrier.join() {
            Ok(participant) => participant,
            Err(e) => {
                let _ = entry.flush_and_close();
                return Err(e);
            }
        };

        match spawn_sink_task(Arc::clone(&self.pipeline), Arc::clone(entry), participant) {
            Ok(handle) => {
                tasks.push(handle);
                Ok(())
            }
            Err(e) => {
                let _ = entry.flush_and_close();
                Err(LoggerError::io_operation(
                    "starting sink task",
                    entry.name().to_string(),
                    e,
                ))
            }
        }
    }

    fn shutdown(&self) -> Result<()> {
        let mut shut_down = self.shut_down.lock();
        if *shut_down {
            return Ok(());
        }
        self.closing.store(true, Ordering::Release);
        self.pipeline.begin_shutdown();

        let mut result = Ok(());
        if let Some(worker) = self.worker.lock().take() {
            if worker.join().is_err() {
                eprintln!("[LOGGER ERROR] Dispatch worker panicked during shutdown");
                result = Err(LoggerError::WorkerPanicked {
                    thread: "log-dispatch".to_string(),
                });
            }
        }

        // The worker normally runs the exit round itself
        if self.pipeline.state() != WorkerState::Stopped {
            self.pipeline.barrier.exit_round();
        }

        let tasks: Vec<JoinHandle<()>> = self.tasks.lock().drain(..).collect();
        for task in tasks {
            let thread = task.thread().name().unwrap_or("log-sink").to_string();
            if task.join().is_err() {
                eprintln!("[LOGGER ERROR] Sink task '{}' panicked during shutdown", thread);
                if result.is_ok() {
                    result = Err(LoggerError::WorkerPanicked { thread });
                }
            }
        }

        for entry in self.sinks.entries() {
            if !entry.is_closed() {
                let _ = entry.flush_and_close();
            }
        }

        let dropped = self.pipeline.metrics.dropped();
        if dropped > 0 {
            eprintln!(
                "[LOGGER WARNING] Logger shut down; {} records were dropped after shutdown began",
                dropped
            );
        }

        self.sinks.clear();
        self.modules.clear();
        *shut_down = true;
        result
    }
}

impl Drop for LoggerInner {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            eprintln!("[LOGGER ERROR] Failed to shut down cleanly: {}", e);
        }
    }
}

/// Builder for constructing a Logger with a fluent API
///
/// # Example
/// ```
/// use rust_fanout_logger::prelude::*;
///
/// let logger = Logger::builder()
///     .default_level(LogLevel::Debug)
///     .queue_capacity(256)
///     .sink("memory", SinkOptions::new(LogLevel::Trace), MemorySink::new())
///     .module("db", LogLevel::Warn, true)
///     .build()
///     .unwrap();
///
/// assert!(logger.find_module("db").is_some());
/// assert!(logger.find_sink("memory").is_some());
/// ```
pub struct LoggerBuilder {
    config: LoggerConfig,
    modules: Vec<(String, Level, bool)>,
    sinks: Vec<(String, SinkOptions, Box<dyn Sink>)>,
}

impl LoggerBuilder {
    pub fn new() -> Self {
        Self {
            config: LoggerConfig::default(),
            modules: Vec::new(),
            sinks: Vec::new(),
        }
    }

    /// Replace the whole configuration
    #[must_use = "builder methods return a new value"]
    pub fn config(mut self, config: LoggerConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn default_level(mut self, level: LogLevel) -> Self {
        self.config.default_level = level;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.config.queue_capacity = capacity;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn max_modules(mut self, max: usize) -> Self {
        self.config.max_modules = max;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn max_sinks(mut self, max: usize) -> Self {
        self.config.max_sinks = max;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn message_length(mut self, length: usize) -> Self {
        self.config.message_length = length;
        self
    }

    /// Whether the built-in stderr sink is registered
    #[must_use = "builder methods return a new value"]
    pub fn default_sink(mut self, enabled: bool) -> Self {
        self.config.default_sink = enabled;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn default_sink_color_mode(mut self, color_mode: ColorMode) -> Self {
        self.config.default_sink_color_mode = color_mode;
        self
    }

    /// Register a module right after bootstrap
    #[must_use = "builder methods return a new value"]
    pub fn module(mut self, name: &str, level: impl Into<Level>, enabled: bool) -> Self {
        self.modules.push((name.to_string(), level.into(), enabled));
        self
    }

    /// Register a sink right after bootstrap
    #[must_use = "builder methods return a new value"]
    pub fn sink(mut self, name: &str, options: SinkOptions, sink: impl Sink + 'static) -> Self {
        self.sinks.push((name.to_string(), options, Box::new(sink)));
        self
    }

    /// Build and start the Logger
    pub fn build(self) -> Result<Logger> {
        let logger = Logger::with_config(self.config)?;
        for (name, options, sink) in self.sinks {
            logger.register_boxed_sink(&name, options, sink)?;
        }
        for (name, level, enabled) in self.modules {
            logger.register_module(&name, level, enabled)?;
        }
        Ok(logger)
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger {
    /// Create a builder for Logger
    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sinks::MemorySink;

    fn quiet_logger() -> Logger {
        Logger::builder().default_sink(false).build().unwrap()
    }

    fn here() -> Location {
        Location::new(file!(), line!(), "here")
    }

    #[test]
    fn test_bootstrap_defaults() {
        let logger = Logger::builder()
            .default_sink_color_mode(ColorMode::Never)
            .build()
            .unwrap();
        assert_eq!(logger.default_module().name(), "main");
        assert_eq!(
            logger.default_module().level(),
            Level::Concrete(LogLevel::Info)
        );
        let stderr = logger.default_sink().unwrap();
        assert_eq!(stderr.name(), "stderr");
        assert_eq!(stderr.level(), Level::Concrete(LogLevel::Trace));
        assert_eq!(logger.worker_state(), WorkerState::Running);
        logger.shutdown().unwrap();
    }

    #[test]
    fn test_builder_rejects_bad_config() {
        let err = Logger::builder().queue_capacity(0).build().unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_log_outcomes() {
        let logger = quiet_logger();
        let db = logger.register_module("db", LogLevel::Warn, true).unwrap();

        assert_eq!(
            logger.log(&db, LogLevel::Info, here(), format_args!("x")),
            LogOutcome::FilteredOut
        );
        assert_eq!(
            logger.log(&db, LogLevel::Error, here(), format_args!("y")),
            LogOutcome::Queued
        );
        assert_eq!(
            logger.log("missing", LogLevel::Fatal, here(), format_args!("z")),
            LogOutcome::FilteredOut
        );
        assert_eq!(logger.metrics().filtered(), 2);

        logger.shutdown().unwrap();
        assert_eq!(
            logger.log(&db, LogLevel::Error, here(), format_args!("late")),
            LogOutcome::ShutdownInProgress
        );
        assert_eq!(logger.metrics().dropped(), 1);
    }

    #[test]
    fn test_set_default_level_rejects_inherit() {
        let logger = quiet_logger();
        let err = logger.set_default_level(Level::Inherit).unwrap_err();
        assert!(matches!(err, LoggerError::InvalidLevel { .. }));
        logger.set_default_level(LogLevel::Error).unwrap();
        assert_eq!(logger.default_level(), LogLevel::Error);
    }

    #[test]
    fn test_inherit_module_follows_default() {
        let logger = quiet_logger();
        let net = logger.register_module("net", Level::Inherit, true).unwrap();

        let debug = || logger.log(&net, LogLevel::Debug, here(), format_args!("d"));
        assert_eq!(debug(), LogOutcome::FilteredOut);
        logger.set_default_level(LogLevel::Debug).unwrap();
        assert_eq!(debug(), LogOutcome::Queued);
    }

    #[test]
    fn test_registration_after_shutdown_fails() {
        let logger = quiet_logger();
        logger.shutdown().unwrap();
        logger.shutdown().unwrap();
        assert!(logger.is_shut_down());
        assert!(matches!(
            logger.register_module("late", LogLevel::Info, true),
            Err(LoggerError::ShutdownInProgress)
        ));

        let memory = MemorySink::new();
        let captured = memory.clone();
        assert!(matches!(
            logger.register_sink("late", LogLevel::Info, true, memory),
            Err(LoggerError::ShutdownInProgress)
        ));
        assert!(captured.events().is_empty());
    }

    #[test]
    fn test_drop_drains_pending_records() {
        let memory = MemorySink::new();
        let captured = memory.clone();
        {
            let logger = Logger::builder()
                .default_sink(false)
                .sink("mem", SinkOptions::new(LogLevel::Trace), memory)
                .build()
                .unwrap();
            for i in 0..10 {
                logger.info(&format!("record {}", i));
            }
        }
        assert_eq!(captured.lines().len(), 10);
        assert_eq!(captured.events().last(), Some(&"close"));
    }

    #[test]
    fn test_message_truncated_to_config() {
        let memory = MemorySink::new();
        let captured = memory.clone();
        let logger = Logger::builder()
            .default_sink(false)
            .message_length(5)
            .sink("mem", SinkOptions::new(LogLevel::Trace), memory)
            .build()
            .unwrap();
        logger.warn("0123456789");
        logger.shutdown().unwrap();

        let lines = captured.lines();
        assert!(lines[0].ends_with(": 01234\n"));
    }

    #[test]
    fn test_track_caller_location() {
        let memory = MemorySink::new();
        let captured = memory.clone();
        let logger = Logger::builder()
            .default_sink(false)
            .sink("mem", SinkOptions::new(LogLevel::Trace), memory)
            .build()
            .unwrap();
        logger.error("where am I");
        logger.shutdown().unwrap();
        assert!(captured.lines()[0].contains("logger.rs:"));
    }
}
