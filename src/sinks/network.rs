//! Network sink for remote logging
//!
//! Sends formatted records to a remote server over TCP.

use crate::core::{LoggerError, Result, Sink};
use std::io::Write;
use std::net::TcpStream;
use std::time::Duration;

const WRITE_TIMEOUT: Duration = Duration::from_secs(5);

/// Sink that streams records to a TCP server
///
/// The connection is made when the sink is registered; a refused connection
/// fails the registration.
///
/// # Example
///
/// ```no_run
/// use rust_fanout_logger::prelude::*;
///
/// let logger = Logger::new().unwrap();
/// logger
///     .register_sink("remote", LogLevel::Warn, true, TcpSink::new("127.0.0.1:5140"))
///     .expect("Failed to connect to log server");
/// ```
pub struct TcpSink {
    address: String,
    stream: Option<TcpStream>,
    reconnect_on_error: bool,
}

impl TcpSink {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            stream: None,
            reconnect_on_error: true,
        }
    }

    /// Enable or disable one reconnect attempt after a failed write
    ///
    /// Default: enabled
    #[must_use]
    pub fn with_reconnect(mut self, enable: bool) -> Self {
        self.reconnect_on_error = enable;
        self
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    fn connect(&mut self) -> Result<()> {
        let stream = TcpStream::connect(&self.address)
            .map_err(|e| LoggerError::io_operation("connecting", self.address.clone(), e))?;
        stream.set_write_timeout(Some(WRITE_TIMEOUT))?;
        stream.set_nodelay(true)?;
        self.stream = Some(stream);
        Ok(())
    }
}

impl Sink for TcpSink {
    fn open(&mut self) -> Result<()> {
        self.connect()
    }

    fn close(&mut self) -> Result<()> {
        if let Some(mut stream) = self.stream.take() {
            stream.flush()?;
        }
        Ok(())
    }

    fn write(&mut self, formatted: &[u8]) -> Result<()> {
        let result = match self.stream.as_mut() {
            Some(stream) => stream.write_all(formatted),
            None => return Err(LoggerError::writer("Network stream not connected")),
        };

        let Err(e) = result else {
            return Ok(());
        };
        self.stream = None;
        if !self.reconnect_on_error {
            return Err(e.into());
        }

        match self.connect() {
            Ok(()) => {
                if let Some(ref mut stream) = self.stream {
                    stream.write_all(formatted)?;
                }
                Ok(())
            }
            Err(reconnect_err) => Err(LoggerError::writer(format!(
                "Failed to send log and reconnect: {} (reconnect: {})",
                e, reconnect_err
            ))),
        }
    }

    fn flush(&mut self) -> Result<()> {
        if let Some(ref mut stream) = self.stream {
            stream.flush()?;
        }
        Ok(())
    }
}
