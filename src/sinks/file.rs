//! File sink implementation

use crate::core::{LoggerError, Result, Sink};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Writes records to a file, buffered
///
/// The file is created (or truncated) when the sink is registered and held
/// under an exclusive advisory lock until the sink is closed, so two
/// loggers never interleave into the same file.
///
/// # Example
///
/// ```no_run
/// use rust_fanout_logger::prelude::*;
///
/// let logger = Logger::new().unwrap();
/// logger
///     .register_sink("file", LogLevel::Debug, true, FileSink::new("/tmp/app.log"))
///     .unwrap();
/// ```
pub struct FileSink {
    path: PathBuf,
    append: bool,
    writer: Option<BufWriter<File>>,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            append: false,
            writer: None,
        }
    }

    /// Keep existing content instead of truncating on open
    #[must_use]
    pub fn with_append(mut self, append: bool) -> Self {
        self.append = append;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Sink for FileSink {
    fn open(&mut self) -> Result<()> {
        let path = self.path.display().to_string();
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .append(self.append)
            .open(&self.path)
            .map_err(|e| LoggerError::io_operation("opening log file", path.clone(), e))?;

        // Truncate only once the lock is held
        file.try_lock_exclusive()
            .map_err(|e| LoggerError::io_operation("locking log file", path.clone(), e))?;
        if !self.append {
            file.set_len(0)
                .map_err(|e| LoggerError::io_operation("truncating log file", path, e))?;
        }

        self.writer = Some(BufWriter::new(file));
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
            writer.get_ref().unlock()?;
        }
        Ok(())
    }

    fn write(&mut self, formatted: &[u8]) -> Result<()> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| LoggerError::writer("File writer not initialized"))?;
        writer.write_all(formatted)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        if let Some(ref mut writer) = self.writer {
            writer.flush()?;
        }
        Ok(())
    }
}

impl Drop for FileSink {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_open_truncates_and_writes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.log");
        std::fs::write(&path, "stale\n").unwrap();

        let mut sink = FileSink::new(&path);
        sink.open().unwrap();
        sink.write(b"first\n").unwrap();
        sink.write(b"second\n").unwrap();
        sink.flush().unwrap();
        sink.close().unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "first\nsecond\n");
    }

    #[test]
    fn test_append_keeps_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.log");
        std::fs::write(&path, "kept\n").unwrap();

        let mut sink = FileSink::new(&path).with_append(true);
        sink.open().unwrap();
        sink.write(b"added\n").unwrap();
        sink.close().unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "kept\nadded\n");
    }

    #[test]
    fn test_write_before_open_fails() {
        let dir = tempdir().unwrap();
        let mut sink = FileSink::new(dir.path().join("never.log"));
        assert!(sink.write(b"x").is_err());
    }

    #[test]
    fn test_open_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let mut sink = FileSink::new(dir.path().join("missing").join("app.log"));
        let err = sink.open().unwrap_err();
        assert!(matches!(err, LoggerError::IoOperation { .. }));
    }
}
