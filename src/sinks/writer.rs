//! Sink over any byte-stream writer

use crate::core::{LoggerError, Result, Sink};
use std::io::Write;

/// Adapts any `io::Write` into a [`Sink`]
///
/// # Example
///
/// ```
/// use rust_structured_logger::{Logger, WriterSink};
///
/// let logger = Logger::builder()
///     .sink(WriterSink::new(Vec::new()))
///     .build();
/// logger.info("to a vector");
/// ```
pub struct WriterSink<W: Write + Send> {
    writer: W,
    name: String,
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            name: "writer".to_string(),
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> Sink for WriterSink<W> {
    fn write_record(&mut self, record: &[u8]) -> Result<()> {
        self.writer
            .write_all(record)
            .map_err(|e| LoggerError::sink_write(self.name.as_str(), record.len(), e))
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
