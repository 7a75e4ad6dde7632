//! Logger metrics for observability
//!
//! Counters for the logging pipeline (records queued, filtered at the call
//! site, dropped because shutdown had begun, dispatch rounds) and per-sink
//! counters kept by each sink task.

use std::sync::atomic::{AtomicU64, Ordering};

/// Pipeline-wide counters
///
/// # Example
///
/// ```
/// use rust_fanout_logger::LoggerMetrics;
///
/// let metrics = LoggerMetrics::new();
/// metrics.record_queued();
/// metrics.record_filtered();
///
/// assert_eq!(metrics.queued(), 1);
/// assert_eq!(metrics.filtered(), 1);
/// ```
#[derive(Debug)]
pub struct LoggerMetrics {
    /// Records accepted into the queue
    queued: AtomicU64,

    /// Log calls rejected by module or default level
    filtered: AtomicU64,

    /// Records refused because shutdown had begun
    dropped: AtomicU64,

    /// Fan-out rounds completed by the dispatch worker
    dispatched: AtomicU64,
}

impl LoggerMetrics {
    pub const fn new() -> Self {
        Self {
            queued: AtomicU64::new(0),
            filtered: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
            dispatched: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn queued(&self) -> u64 {
        self.queued.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn filtered(&self) -> u64 {
        self.filtered.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn dispatched(&self) -> u64 {
        self.dispatched.load(Ordering::Relaxed)
    }

    /// Records accepted but not yet handed to the sinks
    pub fn in_flight(&self) -> u64 {
        self.queued().saturating_sub(self.dispatched())
    }

    #[inline]
    pub fn record_queued(&self) -> u64 {
        self.queued.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_filtered(&self) -> u64 {
        self.filtered.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_dropped(&self) -> u64 {
        self.dropped.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_dispatched(&self) -> u64 {
        self.dispatched.fetch_add(1, Ordering::Relaxed)
    }
}

impl Default for LoggerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for LoggerMetrics {
    /// Create a snapshot of the current metrics values
    fn clone(&self) -> Self {
        Self {
            queued: AtomicU64::new(self.queued()),
            filtered: AtomicU64::new(self.filtered()),
            dropped: AtomicU64::new(self.dropped()),
            dispatched: AtomicU64::new(self.dispatched()),
        }
    }
}

/// Counters of one sink task
#[derive(Debug)]
pub struct SinkStats {
    /// Records written successfully
    written: AtomicU64,

    /// Records skipped by the sink's own level or enable flag
    skipped: AtomicU64,

    /// Writes that returned an error or panicked
    failed: AtomicU64,
}

impl SinkStats {
    pub const fn new() -> Self {
        Self {
            written: AtomicU64::new(0),
            skipped: AtomicU64::new(0),
            failed: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn written(&self) -> u64 {
        self.written.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn skipped(&self) -> u64 {
        self.skipped.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    /// Every record offered to this sink, whatever the outcome
    pub fn offered(&self) -> u64 {
        self.written() + self.skipped() + self.failed()
    }

    #[inline]
    pub(crate) fn record_written(&self) {
        self.written.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_skipped(&self) {
        self.skipped.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }
}

impl Default for SinkStats {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for SinkStats {
    fn clone(&self) -> Self {
        Self {
            written: AtomicU64::new(self.written()),
            skipped: AtomicU64::new(self.skipped()),
            failed: AtomicU64::new(self.failed()),
        }
    }
}
