//! Sink trait for record output destinations

use super::error::Result;

/// Destination for finished records
///
/// A sink receives each record as one complete, newline-terminated byte
/// slice. Calls are serialized by the logger, so implementations need
/// `Send` but not `Sync`.
pub trait Sink: Send {
    fn write_record(&mut self, record: &[u8]) -> Result<()>;
    fn flush(&mut self) -> Result<()>;
    fn name(&self) -> &str;
}

impl<S: Sink + ?Sized> Sink for Box<S> {
    fn write_record(&mut self, record: &[u8]) -> Result<()> {
        (**self).write_record(record)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
