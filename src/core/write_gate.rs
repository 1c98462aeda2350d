//! Serialized access to the output sink
//!
//! Every finished record crosses the gate as one `write_record` call made
//! while holding the sink lock, so records from concurrent threads never
//! interleave. Sink, minimum level, layout and caller flag are all changed
//! under that same lock.
//!
//! Hot-path reads avoid it: the minimum level and caller flag are mirrored
//! in atomics and the layout sits behind a read-mostly `RwLock`, so a
//! filtered call touches nothing but one atomic load.

use super::{
    error::{LoggerError, Result},
    layout::Layout,
    log_level::LogLevel,
    sink::Sink,
};
use parking_lot::{Mutex, RwLock};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;

pub struct WriteGate {
    sink: Mutex<Box<dyn Sink>>,
    min_level: AtomicU8,
    include_caller: AtomicBool,
    layout: RwLock<Arc<Layout>>,
}

impl WriteGate {
    pub fn new(
        sink: Box<dyn Sink>,
        min_level: LogLevel,
        layout: Layout,
        include_caller: bool,
    ) -> Self {
        Self {
            sink: Mutex::new(sink),
            min_level: AtomicU8::new(min_level.as_u8()),
            include_caller: AtomicBool::new(include_caller),
            layout: RwLock::new(Arc::new(layout)),
        }
    }

    /// Whether a record at `level` passes the current minimum
    #[inline]
    pub fn enabled(&self, level: LogLevel) -> bool {
        level.as_u8() >= self.min_level.load(Ordering::Relaxed)
    }

    pub fn min_level(&self) -> LogLevel {
        LogLevel::from_u8(self.min_level.load(Ordering::Relaxed))
    }

    pub fn include_caller(&self) -> bool {
        self.include_caller.load(Ordering::Relaxed)
    }

    /// The layout in effect now; a concurrent `set_layout` does not affect
    /// a record already holding this handle.
    pub fn layout(&self) -> Arc<Layout> {
        Arc::clone(&self.layout.read())
    }

    /// Write one finished record to the sink
    ///
    /// A panicking sink is isolated: the panic is caught and reported as
    /// [`LoggerError::SinkPanicked`] so the gate stays usable.
    pub fn write(&self, record: &[u8]) -> Result<()> {
        let mut sink = self.sink.lock();
        match catch_unwind(AssertUnwindSafe(|| sink.write_record(record))) {
            Ok(result) => result,
            Err(payload) => Err(LoggerError::sink_panicked(sink.name(), payload.as_ref())),
        }
    }

    pub fn flush(&self) -> Result<()> {
        let mut sink = self.sink.lock();
        match catch_unwind(AssertUnwindSafe(|| sink.flush())) {
            Ok(result) => result,
            Err(payload) => Err(LoggerError::sink_panicked(sink.name(), payload.as_ref())),
        }
    }

    /// Install a new sink, returning the previous one unflushed
    pub fn set_sink(&self, sink: Box<dyn Sink>) -> Box<dyn Sink> {
        let mut current = self.sink.lock();
        std::mem::replace(&mut *current, sink)
    }

    /// Name of the installed sink
    pub fn sink_name(&self) -> String {
        self.sink.lock().name().to_string()
    }

    pub fn set_min_level(&self, level: LogLevel) {
        let _sink = self.sink.lock();
        self.min_level.store(level.as_u8(), Ordering::Relaxed);
    }

    pub fn set_include_caller(&self, include: bool) {
        let _sink = self.sink.lock();
        self.include_caller.store(include, Ordering::Relaxed);
    }

    pub fn set_layout(&self, layout: Layout) {
        let _sink = self.sink.lock();
        *self.layout.write() = Arc::new(layout);
    }
}

impl std::fmt::Debug for WriteGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WriteGate")
            .field("sink", &self.sink_name())
            .field("min_level", &self.min_level())
            .field("include_caller", &self.include_caller())
            .field("layout", &self.layout.read().template())
            .finish_non_exhaustive()
    }
}
