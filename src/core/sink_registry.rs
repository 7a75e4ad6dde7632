//! Sink registry
//!
//! Same shape as the module registry, plus the sink itself and its output
//! options. Each sink task only ever checks its own entry, so two sinks can
//! accept or reject the same record independently.

use super::error::{LoggerError, RegistryKind, Result};
use super::log_level::{Level, LogLevel};
use super::metrics::SinkStats;
use super::module_registry::{Admission, Threshold};
use super::output_format::{ColorMode, OutputFormat};
use super::registry::{Named, Registry};
use super::sink::Sink;
use parking_lot::{Mutex, RwLock};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Registration options of a sink
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkOptions {
    pub level: Level,
    pub enabled: bool,
    pub format: OutputFormat,
    pub color_mode: ColorMode,
}

impl SinkOptions {
    pub fn new(level: impl Into<Level>) -> Self {
        Self {
            level: level.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    #[must_use]
    pub fn format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    #[must_use]
    pub fn color_mode(mut self, color_mode: ColorMode) -> Self {
        self.color_mode = color_mode;
        self
    }
}

impl Default for SinkOptions {
    fn default() -> Self {
        Self {
            level: Level::Inherit,
            enabled: true,
            format: OutputFormat::Text,
            color_mode: ColorMode::Auto,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct SinkOutput {
    pub(crate) format: OutputFormat,
    pub(crate) color_mode: ColorMode,
}

pub struct SinkEntry {
    name: Arc<str>,
    threshold: RwLock<Threshold>,
    output: RwLock<SinkOutput>,
    sink: Mutex<Box<dyn Sink>>,
    closed: AtomicBool,
    stats: SinkStats,
}

impl SinkEntry {
    fn new(name: &str, options: SinkOptions, sink: Box<dyn Sink>) -> Self {
        Self {
            name: Arc::from(name),
            threshold: RwLock::new(Threshold {
                level: options.level,
                enabled: options.enabled,
            }),
            output: RwLock::new(SinkOutput {
                format: options.format,
                color_mode: options.color_mode,
            }),
            sink: Mutex::new(sink),
            closed: AtomicBool::new(false),
            stats: SinkStats::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn level(&self) -> Level {
        self.threshold.read().level
    }

    pub fn is_enabled(&self) -> bool {
        self.threshold.read().enabled
    }

    pub fn check(&self, level: LogLevel) -> Admission {
        self.threshold.read().check(level)
    }

    pub fn stats(&self) -> &SinkStats {
        &self.stats
    }

    pub(crate) fn output(&self) -> SinkOutput {
        *self.output.read()
    }

    pub(crate) fn sink(&self) -> &Mutex<Box<dyn Sink>> {
        &self.sink
    }

    pub(crate) fn set_level(&self, level: Level) {
        self.threshold.write().level = level;
    }

    pub(crate) fn set_enabled(&self, enabled: bool) {
        self.threshold.write().enabled = enabled;
    }

    pub(crate) fn set_format(&self, format: OutputFormat) {
        self.output.write().format = format;
    }

    pub(crate) fn set_color_mode(&self, color_mode: ColorMode) {
        self.output.write().color_mode = color_mode;
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Flush the sink unless it is already closed
    pub(crate) fn flush(&self) -> Result<()> {
        let mut sink = self.sink.lock();
        if self.is_closed() {
            return Err(LoggerError::ShutdownInProgress);
        }
        sink.flush()
    }

    /// Flush, then close; only the first call reaches the sink
    pub(crate) fn flush_and_close(&self) -> Result<()> {
        let mut sink = self.sink.lock();
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        let flushed = sink.flush();
        let closed = sink.close();
        flushed.and(closed)
    }
}

impl Named for SinkEntry {
    fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for SinkEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let threshold = *self.threshold.read();
        f.debug_struct("SinkEntry")
            .field("name", &self.name)
            .field("level", &threshold.level)
            .field("enabled", &threshold.enabled)
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Handle to a registered sink
#[derive(Debug, Clone)]
pub struct SinkHandle(pub(crate) Arc<SinkEntry>);

impl SinkHandle {
    pub fn name(&self) -> &str {
        self.0.name()
    }

    pub fn level(&self) -> Level {
        self.0.level()
    }

    pub fn is_enabled(&self) -> bool {
        self.0.is_enabled()
    }

    pub fn stats(&self) -> &SinkStats {
        self.0.stats()
    }
}

impl PartialEq for SinkHandle {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for SinkHandle {}

pub struct SinkRegistry {
    inner: Registry<SinkEntry>,
}

impl SinkRegistry {
    pub fn new(capacity: usize, max_name_len: usize) -> Self {
        Self {
            inner: Registry::new(RegistryKind::Sink, capacity, max_name_len),
        }
    }

    /// Open `sink` and append it
    ///
    /// `start` receives the new entry before it becomes visible and launches
    /// its sink task. A failing `open` or `start` leaves the registry as it was.
    pub(crate) fn register<F>(
        &self,
        name: &str,
        options: SinkOptions,
        mut sink: Box<dyn Sink>,
        start: F,
    ) -> Result<SinkHandle>
    where
        F: FnOnce(&Arc<SinkEntry>) -> Result<()>,
    {
        self.inner
            .register_with(name, || {
                sink.open().map_err(|e| LoggerError::sink_open(name, e))?;
                let entry = Arc::new(SinkEntry::new(name, options, sink));
                start(&entry)?;
                Ok(entry)
            })
            .map(SinkHandle)
    }

    pub fn find(&self, name: &str) -> Option<SinkHandle> {
        self.inner.find(name).map(SinkHandle)
    }

    pub fn set_level(&self, handle: &SinkHandle, level: Level) {
        handle.0.set_level(level);
    }

    pub fn set_enabled(&self, handle: &SinkHandle, enabled: bool) {
        handle.0.set_enabled(enabled);
    }

    pub fn check(&self, handle: &SinkHandle, level: LogLevel) -> Admission {
        handle.0.check(level)
    }

    pub(crate) fn entries(&self) -> Vec<Arc<SinkEntry>> {
        self.inner.snapshot()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.inner.capacity()
    }

    pub(crate) fn clear(&self) {
        self.inner.clear();
    }
}
