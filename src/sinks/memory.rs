//! In-memory sink
//!
//! Captures formatted records for tests and for embedding applications that
//! want to inspect their own output. Clones share the same buffer, so keep a
//! clone to read the output back before handing the sink to the logger.

use crate::core::{LoggerError, Result, Sink};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

#[derive(Default)]
struct MemoryState {
    lines: Vec<String>,
    events: Vec<&'static str>,
}

#[derive(Clone, Default)]
pub struct MemorySink {
    state: Arc<Mutex<MemoryState>>,
    fail_writes: bool,
    write_delay: Option<Duration>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink whose every write fails
    pub fn failing() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    /// Sleep before each write, to simulate a slow destination
    #[must_use]
    pub fn with_write_delay(mut self, delay: Duration) -> Self {
        self.write_delay = Some(delay);
        self
    }

    /// Every record written so far, newline included
    pub fn lines(&self) -> Vec<String> {
        self.state.lock().lines.clone()
    }

    /// Lifecycle calls seen so far: `open`, `flush` and `close`
    pub fn events(&self) -> Vec<&'static str> {
        self.state.lock().events.clone()
    }

    pub fn clear(&self) {
        self.state.lock().lines.clear();
    }
}

impl Sink for MemorySink {
    fn open(&mut self) -> Result<()> {
        self.state.lock().events.push("open");
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.state.lock().events.push("close");
        Ok(())
    }

    fn write(&mut self, formatted: &[u8]) -> Result<()> {
        if let Some(delay) = self.write_delay {
            std::thread::sleep(delay);
        }
        if self.fail_writes {
            return Err(LoggerError::writer("memory sink configured to fail"));
        }
        let line = String::from_utf8_lossy(formatted).into_owned();
        self.state.lock().lines.push(line);
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.state.lock().events.push("flush");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_buffer() {
        let mut sink = MemorySink::new();
        let captured = sink.clone();
        sink.open().unwrap();
        sink.write(b"hello\n").unwrap();
        sink.flush().unwrap();
        sink.close().unwrap();

        assert_eq!(captured.lines(), vec!["hello\n"]);
        assert_eq!(captured.events(), vec!["open", "flush", "close"]);
    }

    #[test]
    fn test_failing_sink() {
        let mut sink = MemorySink::failing();
        let captured = sink.clone();
        assert!(sink.write(b"lost\n").is_err());
        assert!(captured.lines().is_empty());
    }
}
