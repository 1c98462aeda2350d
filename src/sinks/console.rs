//! Console sink

use crate::core::{LoggerError, Result, Sink};
use std::io::{self, Write};

/// Standard stream a [`ConsoleSink`] writes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConsoleTarget {
    #[default]
    Stdout,
    Stderr,
}

/// Writes records to stdout or stderr, flushing after each one
#[derive(Debug, Default)]
pub struct ConsoleSink {
    target: ConsoleTarget,
}

impl ConsoleSink {
    pub fn new(target: ConsoleTarget) -> Self {
        Self { target }
    }

    pub fn stdout() -> Self {
        Self::new(ConsoleTarget::Stdout)
    }

    pub fn stderr() -> Self {
        Self::new(ConsoleTarget::Stderr)
    }

    pub fn target(&self) -> ConsoleTarget {
        self.target
    }
}

impl Sink for ConsoleSink {
    fn write_record(&mut self, record: &[u8]) -> Result<()> {
        let result = match self.target {
            ConsoleTarget::Stdout => {
                let mut out = io::stdout().lock();
                out.write_all(record).and_then(|()| out.flush())
            }
            ConsoleTarget::Stderr => {
                let mut err = io::stderr().lock();
                err.write_all(record).and_then(|()| err.flush())
            }
        };
        result.map_err(|e| LoggerError::sink_write(self.name(), record.len(), e))
    }

    fn flush(&mut self) -> Result<()> {
        match self.target {
            ConsoleTarget::Stdout => io::stdout().flush()?,
            ConsoleTarget::Stderr => io::stderr().flush()?,
        }
        Ok(())
    }

    fn name(&self) -> &str {
        match self.target {
            ConsoleTarget::Stdout => "stdout",
            ConsoleTarget::Stderr => "stderr",
        }
    }
}
