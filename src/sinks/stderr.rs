//! Standard error sink, registered at bootstrap as the default sink

use crate::core::{Result, Sink};
use std::io::{self, IsTerminal, Write};

pub struct StderrSink {
    terminal: bool,
}

impl StderrSink {
    pub fn new() -> Self {
        Self {
            terminal: io::stderr().is_terminal(),
        }
    }
}

impl Default for StderrSink {
    fn default() -> Self {
        Self::new()
    }
}

impl Sink for StderrSink {
    fn open(&mut self) -> Result<()> {
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }

    fn write(&mut self, formatted: &[u8]) -> Result<()> {
        // One write_all per record keeps lines whole under the stderr lock
        let mut stderr = io::stderr().lock();
        stderr.write_all(formatted)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        io::stderr().flush()?;
        Ok(())
    }

    fn is_terminal(&self) -> bool {
        self.terminal
    }
}
