//! Sink trait for log output destinations

use super::error::Result;

/// An output destination driven by its own sink task thread
///
/// `open` runs once on the registering thread; a failure aborts the
/// registration. `write` receives one fully formatted record and must not
/// block indefinitely. `flush` runs before `close` at shutdown and whenever
/// the application asks for it; `close` runs exactly once.
pub trait Sink: Send {
    fn open(&mut self) -> Result<()>;
    fn close(&mut self) -> Result<()>;
    fn write(&mut self, formatted: &[u8]) -> Result<()>;
    fn flush(&mut self) -> Result<()>;

    /// Whether `write` ends up on a terminal, used by `ColorMode::Auto`
    fn is_terminal(&self) -> bool {
        false
    }
}
