//! # Rust Structured Logger
//!
//! A leveled logger producing either plain-text lines from a compiled
//! layout or one-object-per-line JSON records from typed fields.
//!
//! ## Features
//!
//! - **Cheap when filtered**: a record below the minimum level costs one
//!   atomic load; no buffer, no formatting, no lock
//! - **Pooled buffers**: records are assembled in size-tiered recycled
//!   buffers outside any lock
//! - **Typed fields**: strings, integers, floats, booleans, errors,
//!   durations, timestamps and any `Serialize` value
//! - **Thread safe**: each record reaches the sink in a single serialized
//!   write, so concurrent records never interleave
//!
//! ```
//! use rust_structured_logger::prelude::*;
//!
//! let sink = MemorySink::new();
//! let logger = Logger::builder()
//!     .layout("%L %l")
//!     .timestamp_format(TimestampFormat::Unix)
//!     .sink(sink.clone())
//!     .build();
//!
//! logger.info("service ready");
//! logger.info_s(&[Field::string("user", "john"), Field::int("count", 42)]);
//!
//! let lines = sink.lines();
//! assert_eq!(lines[0], "[INFO] service ready");
//! assert!(lines[1].ends_with(r#""level":"INFO","user":"john","count":42}"#));
//! ```

pub mod core;
pub mod macros;
pub mod sinks;

pub mod prelude {
    pub use crate::args;
    pub use crate::core::{
        BufferRecycler, CallerInfo, Field, FieldKind, Layout, LogLevel, Logger, LoggerBuilder,
        LoggerConfig, LoggerError, LoggerMetrics, OutputTarget, RecordBuilder, Result, Sink,
        TimestampFormat, Value,
    };
    pub use crate::sinks::{ConsoleSink, FileSink, MemorySink, WriterSink};
}

pub use crate::core::{
    sprintf, AnyValue, BufferRecycler, CallerInfo, ErrorValue, Field, FieldKind, Layout,
    LayoutToken, LogLevel, Logger, LoggerBuilder, LoggerConfig, LoggerError, LoggerMetrics,
    OutputTarget, PoolMetrics, PooledBuffer, RecordBuilder, Result, Sink, Tier, TimestampFormat,
    Value, DEFAULT_LAYOUT,
};
pub use crate::sinks::{ConsoleSink, ConsoleTarget, FileSink, MemorySink, WriterSink};
