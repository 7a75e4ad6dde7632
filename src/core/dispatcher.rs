//! Dispatch worker and sink task loops
//!
//! The worker is the only consumer of the queue and the only driver of the
//! fan-out barrier. Each sink task filters every round against its own
//! entry, formats the record with its own output options and writes it.
//! A failing or panicking sink only affects itself.

use super::fanout::{FanOutBarrier, Participant, Step};
use super::log_level::LogLevel;
use super::log_record::LogRecord;
use super::metrics::LoggerMetrics;
use super::output_format::FieldBounds;
use super::ring_buffer::RingBuffer;
use super::sink_registry::SinkEntry;
use parking_lot::RwLock;
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Lifecycle of the dispatch worker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    /// Accepting and delivering records
    Running,
    /// Queue closed, delivering what is left
    Draining,
    /// Exit round done, every sink closed
    Stopped,
}

impl WorkerState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => WorkerState::Running,
            1 => WorkerState::Draining,
            _ => WorkerState::Stopped,
        }
    }
}

/// State shared by call sites, the worker and the sink tasks
pub(crate) struct Pipeline {
    pub(crate) queue: RingBuffer<LogRecord>,
    pub(crate) barrier: FanOutBarrier<Arc<LogRecord>>,
    pub(crate) default_level: RwLock<LogLevel>,
    pub(crate) metrics: LoggerMetrics,
    pub(crate) bounds: FieldBounds,
    state: AtomicU8,
}

impl Pipeline {
    pub(crate) fn new(queue_capacity: usize, default_level: LogLevel, bounds: FieldBounds) -> Self {
        Self {
            queue: RingBuffer::new(queue_capacity),
            barrier: FanOutBarrier::new(),
            default_level: RwLock::new(default_level),
            metrics: LoggerMetrics::new(),
            bounds,
            state: AtomicU8::new(WorkerState::Running as u8),
        }
    }

    #[inline]
    pub(crate) fn default_level(&self) -> LogLevel {
        *self.default_level.read()
    }

    pub(crate) fn state(&self) -> WorkerState {
        WorkerState::from_u8(self.state.load(Ordering::Acquire))
    }

    fn set_state(&self, state: WorkerState) {
        self.state.store(state as u8, Ordering::Release);
    }

    /// Close the queue; the worker drains it and then stops
    pub(crate) fn begin_shutdown(&self) {
        if self.state() == WorkerState::Running {
            self.set_state(WorkerState::Draining);
        }
        self.queue.close();
    }
}

pub(crate) fn spawn_worker(pipeline: Arc<Pipeline>) -> std::io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("log-dispatch".to_string())
        .spawn(move || run_worker(&pipeline))
}

fn run_worker(pipeline: &Pipeline) {
    while let Some(record) = pipeline.queue.dequeue() {
        pipeline.barrier.run_round(Arc::new(record));
        pipeline.metrics.record_dispatched();
    }

    pipeline.barrier.exit_round();
    pipeline.set_state(WorkerState::Stopped);
}

pub(crate) fn spawn_sink_task(
    pipeline: Arc<Pipeline>,
    entry: Arc<SinkEntry>,
    participant: Participant<Arc<LogRecord>>,
) -> std::io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name(format!("log-sink-{}", entry.name()))
        .spawn(move || run_sink_task(&pipeline, &entry, participant))
}

fn run_sink_task(
    pipeline: &Pipeline,
    entry: &SinkEntry,
    participant: Participant<Arc<LogRecord>>,
) {
    loop {
        match participant.wait() {
            Step::Deliver(delivery) => {
                deliver(entry, &delivery.item, pipeline.default_level(), &pipeline.bounds);
            }
            Step::Exit(_ended) => {
                close_sink(entry);
                break;
            }
        }
    }
}

/// Filter, format and write one record to one sink
pub(crate) fn deliver(
    entry: &SinkEntry,
    record: &LogRecord,
    default: LogLevel,
    bounds: &FieldBounds,
) {
    let stats = entry.stats();
    if !entry.check(record.level).admits(record.level, default) {
        stats.record_skipped();
        return;
    }

    let output = entry.output();
    let mut sink = entry.sink().lock();
    let use_colors = output.color_mode.use_colors(sink.is_terminal());
    let line = output.format.format(record, use_colors, bounds);

    match catch_unwind(AssertUnwindSafe(|| sink.write(line.as_bytes()))) {
        Ok(Ok(())) => stats.record_written(),
        Ok(Err(e)) => {
            stats.record_failed();
            eprintln!("[LOGGER ERROR] Sink '{}' failed: {}", entry.name(), e);
        }
        Err(panic_info) => {
            stats.record_failed();
            eprintln!(
                "[LOGGER CRITICAL] Sink '{}' panicked: {}. \
                 Other sinks continue to function.",
                entry.name(),
                panic_message(&*panic_info)
            );
        }
    }
}

fn close_sink(entry: &SinkEntry) {
    match catch_unwind(AssertUnwindSafe(|| entry.flush_and_close())) {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            eprintln!("[LOGGER ERROR] Sink '{}' failed to close: {}", entry.name(), e);
        }
        Err(panic_info) => {
            eprintln!(
                "[LOGGER CRITICAL] Sink '{}' panicked during close: {}",
                entry.name(),
                panic_message(&*panic_info)
            );
        }
    }
}

pub(crate) fn panic_message(panic_info: &(dyn Any + Send)) -> String {
    if let Some(s) = panic_info.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic_info.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::{LoggerError, Result};
    use crate::core::log_level::Level;
    use crate::core::log_record::Location;
    use crate::core::sink::Sink;
    use crate::core::sink_registry::{SinkOptions, SinkRegistry};
    use crate::sinks::MemorySink;

    struct PanickingSink;

    impl Sink for PanickingSink {
        fn open(&mut self) -> Result<()> {
            Ok(())
        }
        fn close(&mut self) -> Result<()> {
            Ok(())
        }
        fn write(&mut self, _formatted: &[u8]) -> Result<()> {
            panic!("sink exploded");
        }
        fn flush(&mut self) -> Result<()> {
            Err(LoggerError::writer("nothing to flush"))
        }
    }

    fn record(level: LogLevel, message: &str) -> LogRecord {
        LogRecord::new(0, level, Arc::from("main"), Location::unknown(), message, 512)
    }

    fn start<'a>(
        pipeline: &Arc<Pipeline>,
        tasks: &'a parking_lot::Mutex<Vec<JoinHandle<()>>>,
    ) -> impl FnOnce(&Arc<SinkEntry>) -> crate::core::error::Result<()> + 'a {
        let pipeline = Arc::clone(pipeline);
        move |entry| {
            let participant = pipeline.barrier.join()?;
            let handle = spawn_sink_task(Arc::clone(&pipeline), Arc::clone(entry), participant)?;
            tasks.lock().push(handle);
            Ok(())
        }
    }

    #[test]
    fn test_deliver_respects_sink_threshold() {
        let registry = SinkRegistry::new(4, 16);
        let memory = MemorySink::new();
        let captured = memory.clone();
        let handle = registry
            .register("mem", SinkOptions::new(LogLevel::Warn), Box::new(memory), |_| Ok(()))
            .unwrap();

        let bounds = FieldBounds::default();
        deliver(&handle.0, &record(LogLevel::Info, "quiet"), LogLevel::Trace, &bounds);
        deliver(&handle.0, &record(LogLevel::Error, "loud"), LogLevel::Trace, &bounds);

        let lines = captured.lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("loud"));
        assert_eq!(handle.stats().skipped(), 1);
        assert_eq!(handle.stats().written(), 1);
    }

    #[test]
    fn test_deliver_inherit_uses_default() {
        let registry = SinkRegistry::new(4, 16);
        let memory = MemorySink::new();
        let captured = memory.clone();
        let handle = registry
            .register("mem", SinkOptions::new(Level::Inherit), Box::new(memory), |_| Ok(()))
            .unwrap();

        let bounds = FieldBounds::default();
        deliver(&handle.0, &record(LogLevel::Debug, "a"), LogLevel::Info, &bounds);
        deliver(&handle.0, &record(LogLevel::Debug, "b"), LogLevel::Debug, &bounds);
        assert_eq!(captured.lines().len(), 1);
    }

    #[test]
    fn test_panicking_sink_is_isolated() {
        let registry = SinkRegistry::new(4, 16);
        let handle = registry
            .register(
                "boom",
                SinkOptions::new(LogLevel::Trace),
                Box::new(PanickingSink),
                |_| Ok(()),
            )
            .unwrap();

        deliver(&handle.0, &record(LogLevel::Info, "x"), LogLevel::Info, &FieldBounds::default());
        assert_eq!(handle.stats().failed(), 1);
    }

    #[test]
    fn test_worker_drains_then_closes_sinks() {
        let pipeline = Arc::new(Pipeline::new(16, LogLevel::Trace, FieldBounds::default()));
        let registry = SinkRegistry::new(4, 16);
        let tasks = parking_lot::Mutex::new(Vec::new());

        let memory = MemorySink::new();
        let captured = memory.clone();
        registry
            .register(
                "mem",
                SinkOptions::new(LogLevel::Trace),
                Box::new(memory),
                start(&pipeline, &tasks),
            )
            .unwrap();

        for i in 0..5 {
            pipeline.queue.enqueue(record(LogLevel::Info, &format!("m{}", i))).unwrap();
        }
        let worker = spawn_worker(Arc::clone(&pipeline)).unwrap();
        pipeline.begin_shutdown();
        worker.join().unwrap();
        for task in tasks.lock().drain(..) {
            task.join().unwrap();
        }

        assert_eq!(pipeline.state(), WorkerState::Stopped);
        assert_eq!(pipeline.metrics.dispatched(), 5);
        let lines = captured.lines();
        assert_eq!(lines.len(), 5);
        for (i, line) in lines.iter().enumerate() {
            assert!(line.contains(&format!("m{}", i)));
        }
        assert_eq!(captured.events().last(), Some(&"close"));
    }

    #[test]
    fn test_panic_message() {
        let boxed: Box<dyn Any + Send> = Box::new("static str");
        assert_eq!(panic_message(&*boxed), "static str");
        let boxed: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(&*boxed), "owned");
        let boxed: Box<dyn Any + Send> = Box::new(42);
        assert_eq!(panic_message(&*boxed), "Unknown panic");
    }
}
