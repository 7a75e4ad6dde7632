//! Log record structure

use super::log_level::LogLevel;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_THREAD_ID: AtomicU64 = AtomicU64::new(1);

// Numeric thread ids, assigned on first use so they can be rendered as hex
thread_local! {
    static THREAD_ID: u64 = NEXT_THREAD_ID.fetch_add(1, Ordering::Relaxed);
}

/// Identifier of the calling thread, stable for the thread's lifetime
pub fn current_thread_id() -> u64 {
    THREAD_ID.with(|id| *id)
}

/// Source location of a log call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub file: &'static str,
    pub line: u32,
    pub func: &'static str,
}

impl Location {
    pub const fn new(file: &'static str, line: u32, func: &'static str) -> Self {
        Self { file, line, func }
    }

    pub const fn unknown() -> Self {
        Self {
            file: "unknown",
            line: 0,
            func: "unknown",
        }
    }
}

/// One log event, immutable once built
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    /// Nanoseconds since the Unix epoch
    pub timestamp: i64,
    pub level: LogLevel,
    pub thread_id: u64,
    pub module: Arc<str>,
    pub file: String,
    pub line: u32,
    pub func: String,
    pub message: String,
}

impl LogRecord {
    /// Build a record, capping the message at `max_message_len` bytes
    pub fn new(
        timestamp: i64,
        level: LogLevel,
        module: Arc<str>,
        location: Location,
        message: &str,
        max_message_len: usize,
    ) -> Self {
        Self {
            timestamp,
            level,
            thread_id: current_thread_id(),
            module,
            file: location.file.to_string(),
            line: location.line,
            func: location.func.to_string(),
            message: truncate(&sanitize_message(message), max_message_len).to_string(),
        }
    }
}

/// Replace newlines, carriage returns and tabs with escape sequences
///
/// Keeps one record on one line and stops callers from injecting fake entries.
pub fn sanitize_message(message: &str) -> std::borrow::Cow<'_, str> {
    if !message.contains(['\n', '\r', '\t']) {
        return std::borrow::Cow::Borrowed(message);
    }
    std::borrow::Cow::Owned(
        message
            .replace('\n', "\\n")
            .replace('\r', "\\r")
            .replace('\t', "\\t"),
    )
}

/// Longest prefix of `s` that fits in `max_len` bytes without splitting a char
pub fn truncate(s: &str, max_len: usize) -> &str {
    if s.len() <= max_len {
        return s;
    }
    let mut end = max_len;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
