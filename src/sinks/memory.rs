//! In-memory sink for capturing output

use crate::core::{Result, Sink};
use parking_lot::Mutex;
use std::sync::Arc;

/// Collects records in a shared buffer
///
/// Clones share the same buffer, so one clone can be handed to a logger
/// while another inspects what was written.
///
/// # Example
///
/// ```
/// use rust_structured_logger::{Logger, MemorySink};
///
/// let sink = MemorySink::new();
/// let logger = Logger::builder().sink(sink.clone()).layout("%L %l").build();
///
/// logger.warn("low disk");
/// assert_eq!(sink.contents(), "[WARN] low disk\n");
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    state: Arc<Mutex<Captured>>,
}

/// Bytes and write count, always updated together
#[derive(Debug, Default)]
struct Captured {
    bytes: Vec<u8>,
    writes: usize,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bytes(&self) -> Vec<u8> {
        self.state.lock().bytes.clone()
    }

    /// Everything written so far, lossily decoded as UTF-8
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.state.lock().bytes).into_owned()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_owned).collect()
    }

    /// Number of `write_record` calls received
    pub fn write_count(&self) -> usize {
        self.state.lock().writes
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().bytes.is_empty()
    }

    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.bytes.clear();
        state.writes = 0;
    }
}

impl Sink for MemorySink {
    fn write_record(&mut self, record: &[u8]) -> Result<()> {
        let mut state = self.state.lock();
        state.bytes.extend_from_slice(record);
        state.writes += 1;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
