//! Main logger implementation
//!
//! A [`Logger`] assembles each record in a leased buffer, outside any
//! lock, then hands the finished bytes to its [`WriteGate`]. Records come
//! in two shapes:
//!
//! - plain text, rendered through the compiled line [`Layout`]
//! - structured JSON, one object per line with a fixed header:
//!   `{"timestamp":..,"level":"INFO"[,"caller":"file.rs:42"],"key":value,..}`

use super::{
    buffer_pool::{BufferRecycler, DEFAULT_TIER_DEPTH},
    caller::{short_file, CallerInfo},
    config::LoggerConfig,
    error::Result,
    field::{append_int, Field, Value},
    format::sprintf,
    layout::{Layout, Message, RecordContext},
    log_level::LogLevel,
    metrics::LoggerMetrics,
    record_builder::RecordBuilder,
    sink::Sink,
    timestamp::TimestampFormat,
    write_gate::WriteGate,
};
use crate::sinks::ConsoleSink;
use chrono::Utc;
use std::fmt;
use std::sync::Arc;

/// Header allowance on top of the message for text records
const TEXT_RECORD_OVERHEAD: usize = 200;
/// Header allowance for structured records
const STRUCTURED_RECORD_OVERHEAD: usize = 200;
/// Rough encoded size of one field
const FIELD_SIZE_ESTIMATE: usize = 50;

/// Unwind payload of a structured Panic emit that produced no record
const EMPTY_PANIC_PAYLOAD: &str = "panic";

pub struct Logger {
    gate: WriteGate,
    recycler: Arc<BufferRecycler>,
    metrics: Arc<LoggerMetrics>,
    timestamp_format: TimestampFormat,
}

impl Logger {
    /// Logger writing to stdout at `Info` with the default layout
    #[must_use]
    pub fn new() -> Self {
        LoggerBuilder::new().build()
    }

    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    /// Build a logger from configuration, opening its output
    pub fn from_config(config: &LoggerConfig) -> Result<Self> {
        let sink = config.output.open()?;
        Ok(LoggerBuilder::new()
            .min_level(config.level)
            .layout(&config.layout)
            .include_caller(config.include_caller)
            .timestamp_format(config.timestamp_format.clone())
            .boxed_sink(sink)
            .build())
    }

    /// Emit a plain-text record
    ///
    /// Returns the sink's error if the write failed. A `Panic` record
    /// unwinds with the message as a `String` payload once written.
    #[track_caller]
    pub fn log(&self, level: LogLevel, message: &str) -> Result<()> {
        let caller = CallerInfo::here();
        self.emit_text(level, Message::Text(message), &[], Some(&caller))
    }

    /// Emit a plain-text record rendered from a printf-style template
    ///
    /// See [`crate::core::format`] for the supported verbs.
    #[track_caller]
    pub fn logf(&self, level: LogLevel, template: &str, args: &[Value]) -> Result<()> {
        let caller = CallerInfo::here();
        self.emit_text(level, Message::Format(template, args), &[], Some(&caller))
    }

    /// Emit a structured JSON record; no fields means no record
    #[track_caller]
    pub fn log_fields(&self, level: LogLevel, fields: &[Field]) -> Result<()> {
        let caller = CallerInfo::here();
        self.emit_structured(level, fields, Some(&caller))
    }

    /// Emit a plain-text record with ` key=value` pairs after the message
    #[track_caller]
    pub fn log_with(&self, level: LogLevel, message: &str, fields: &[Field]) -> Result<()> {
        let caller = CallerInfo::here();
        self.emit_text(level, Message::Text(message), fields, Some(&caller))
    }

    /// Emit a plain-text record with an explicitly supplied caller
    ///
    /// `None` renders as file `???` line `0`.
    pub fn log_at(&self, level: LogLevel, message: &str, caller: Option<CallerInfo>) -> Result<()> {
        self.emit_text(level, Message::Text(message), &[], caller.as_ref())
    }

    /// Whether a record at `level` would currently be written
    #[inline]
    pub fn is_enabled(&self, level: LogLevel) -> bool {
        self.gate.enabled(level)
    }

    pub(crate) fn emit_text(
        &self,
        level: LogLevel,
        message: Message<'_>,
        fields: &[Field],
        caller: Option<&CallerInfo>,
    ) -> Result<()> {
        if !self.gate.enabled(level) {
            self.metrics.record_filtered();
            return Ok(());
        }

        let timestamp = Utc::now();
        let layout = self.gate.layout();
        let ctx = RecordContext::new(timestamp, level, message)
            .with_fields(fields)
            .with_caller(caller.filter(|_| layout.needs_caller()));

        let mut buf = self.recycler.lease(
            message.size_hint() + TEXT_RECORD_OVERHEAD + fields.len() * FIELD_SIZE_ESTIMATE,
        );
        layout.render(&ctx, &mut buf);
        ensure_newline(&mut buf);
        let result = self.write(&buf);
        drop(buf);

        if level == LogLevel::Panic {
            let payload = match message {
                Message::Text(text) => text.to_owned(),
                Message::Format(template, args) => sprintf(template, args),
            };
            std::panic::panic_any(payload);
        }
        result
    }

    pub(crate) fn emit_structured(
        &self,
        level: LogLevel,
        fields: &[Field],
        caller: Option<&CallerInfo>,
    ) -> Result<()> {
        if !self.gate.enabled(level) {
            self.metrics.record_filtered();
            return Ok(());
        }
        if fields.is_empty() {
            if level == LogLevel::Panic {
                std::panic::panic_any(EMPTY_PANIC_PAYLOAD.to_string());
            }
            return Ok(());
        }

        let timestamp = Utc::now();
        let include_caller = self.gate.include_caller();

        let mut buf = self
            .recycler
            .lease(STRUCTURED_RECORD_OVERHEAD + fields.len() * FIELD_SIZE_ESTIMATE);
        buf.extend_from_slice(b"{\"timestamp\":");
        self.timestamp_format.append_json(&mut buf, &timestamp);
        buf.extend_from_slice(b",\"level\":\"");
        buf.extend_from_slice(level.to_str().as_bytes());
        buf.push(b'"');
        if include_caller {
            let unknown = CallerInfo::unknown();
            let caller = caller.unwrap_or(&unknown);
            buf.extend_from_slice(b",\"caller\":\"");
            buf.extend_from_slice(short_file(caller.file()).as_bytes());
            buf.push(b':');
            append_int(&mut buf, i64::from(caller.line()));
            buf.push(b'"');
        }
        for field in fields {
            field.encode_json(&mut buf);
        }
        buf.push(b'}');
        ensure_newline(&mut buf);
        let result = self.write(&buf);

        if level == LogLevel::Panic {
            let line = &buf[..buf.len() - 1];
            let payload = String::from_utf8_lossy(line).into_owned();
            drop(buf);
            std::panic::panic_any(payload);
        }
        result
    }

    fn write(&self, record: &[u8]) -> Result<()> {
        match self.gate.write(record) {
            Ok(()) => {
                self.metrics.record_written(record.len());
                Ok(())
            }
            Err(e) => {
                self.metrics.record_write_failure();
                Err(e)
            }
        }
    }

    /// Report a failure from a convenience method; never logs through self
    fn report(&self, result: Result<()>) {
        if let Err(e) = result {
            eprintln!("[LOGGER ERROR] {}", e);
        }
    }

    /// Start a fluent record at `level`
    pub fn builder_at(&self, level: LogLevel) -> RecordBuilder<'_> {
        RecordBuilder::new(self, level)
    }

    /// Replace the sink, returning the previous one
    pub fn set_sink(&self, sink: impl Sink + 'static) -> Box<dyn Sink> {
        self.gate.set_sink(Box::new(sink))
    }

    pub fn set_min_level(&self, level: LogLevel) {
        self.gate.set_min_level(level);
    }

    pub fn min_level(&self) -> LogLevel {
        self.gate.min_level()
    }

    /// Compile and install a new line layout
    pub fn set_layout(&self, template: &str) {
        self.gate.set_layout(Layout::compile(template));
    }

    pub fn layout(&self) -> Arc<Layout> {
        self.gate.layout()
    }

    /// Whether structured records carry a `"caller"` member
    pub fn set_include_caller(&self, include: bool) {
        self.gate.set_include_caller(include);
    }

    pub fn include_caller(&self) -> bool {
        self.gate.include_caller()
    }

    pub fn timestamp_format(&self) -> &TimestampFormat {
        &self.timestamp_format
    }

    /// Counters for written, filtered and failed records
    ///
    /// # Example
    ///
    /// ```
    /// use rust_structured_logger::{Logger, LogLevel, MemorySink};
    ///
    /// let logger = Logger::builder().sink(MemorySink::new()).build();
    /// logger.debug("filtered");
    /// logger.info("written");
    ///
    /// let metrics = logger.metrics();
    /// assert_eq!(metrics.records_filtered(), 1);
    /// assert_eq!(metrics.records_written(), 1);
    /// ```
    pub fn metrics(&self) -> &LoggerMetrics {
        &self.metrics
    }

    pub fn recycler(&self) -> &Arc<BufferRecycler> {
        &self.recycler
    }

    pub fn flush(&self) -> Result<()> {
        self.gate.flush()
    }
}

macro_rules! level_methods {
    ($($level:ident => $plain:ident, $formatted:ident, $structured:ident, $builder:ident;)*) => {
        impl Logger {
            $(
                #[doc = concat!("Log a message at `", stringify!($level), "`; failures go to stderr")]
                #[track_caller]
                pub fn $plain(&self, message: impl AsRef<str>) {
                    let caller = CallerInfo::here();
                    let result = self.emit_text(
                        LogLevel::$level,
                        Message::Text(message.as_ref()),
                        &[],
                        Some(&caller),
                    );
                    self.report(result);
                }

                #[doc = concat!("Log a formatted message at `", stringify!($level), "`")]
                #[track_caller]
                pub fn $formatted(&self, template: &str, args: &[Value]) {
                    let caller = CallerInfo::here();
                    let result = self.emit_text(
                        LogLevel::$level,
                        Message::Format(template, args),
                        &[],
                        Some(&caller),
                    );
                    self.report(result);
                }

                #[doc = concat!("Log a structured record at `", stringify!($level), "`")]
                #[track_caller]
                pub fn $structured(&self, fields: &[Field]) {
                    let caller = CallerInfo::here();
                    let result = self.emit_structured(LogLevel::$level, fields, Some(&caller));
                    self.report(result);
                }

                pub fn $builder(&self) -> RecordBuilder<'_> {
                    RecordBuilder::new(self, LogLevel::$level)
                }
            )*
        }
    };
}

level_methods! {
    Panic => panic, panicf, panic_s, panic_builder;
    Fatal => fatal, fatalf, fatal_s, fatal_builder;
    Error => error, errorf, error_s, error_builder;
    Warn => warn, warnf, warn_s, warn_builder;
    Print => print, printf, print_s, print_builder;
    Info => info, infof, info_s, info_builder;
    Trace => trace, tracef, trace_s, trace_builder;
    Debug => debug, debugf, debug_s, debug_builder;
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if let Err(e) = self.gate.flush() {
            eprintln!("[LOGGER ERROR] Failed to flush during shutdown: {}", e);
        }
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("gate", &self.gate)
            .field("timestamp_format", &self.timestamp_format)
            .field("metrics", &self.metrics)
            .finish_non_exhaustive()
    }
}

/// Append a newline unless the record already ends with one
fn ensure_newline(buf: &mut Vec<u8>) {
    if buf.last() != Some(&b'\n') {
        buf.push(b'\n');
    }
}

/// Builder for constructing Logger with a fluent API
///
/// # Example
/// ```
/// use rust_structured_logger::prelude::*;
///
/// let sink = MemorySink::new();
/// let logger = Logger::builder()
///     .min_level(LogLevel::Debug)
///     .layout("%L %l")
///     .sink(sink.clone())
///     .build();
///
/// logger.debugf("cache %s", &args!["warm"]);
/// assert_eq!(sink.contents(), "[DEBUG] cache warm\n");
/// ```
pub struct LoggerBuilder {
    min_level: LogLevel,
    sink: Option<Box<dyn Sink>>,
    layout: Layout,
    include_caller: bool,
    timestamp_format: TimestampFormat,
    recycler: Option<Arc<BufferRecycler>>,
    pool_depth: usize,
}

impl LoggerBuilder {
    pub fn new() -> Self {
        Self {
            min_level: LogLevel::Info,
            sink: None,
            layout: Layout::default(),
            include_caller: false,
            timestamp_format: TimestampFormat::default(),
            recycler: None,
            pool_depth: DEFAULT_TIER_DEPTH,
        }
    }

    #[must_use = "builder methods return a new value"]
    pub fn min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    /// Output destination; stdout when never called
    #[must_use = "builder methods return a new value"]
    pub fn sink<S: Sink + 'static>(mut self, sink: S) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn boxed_sink(mut self, sink: Box<dyn Sink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Line layout template for plain-text records
    #[must_use = "builder methods return a new value"]
    pub fn layout(mut self, template: &str) -> Self {
        self.layout = Layout::compile(template);
        self
    }

    /// Add a `"caller"` member to structured records
    #[must_use = "builder methods return a new value"]
    pub fn include_caller(mut self, include: bool) -> Self {
        self.include_caller = include;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    /// Share a buffer recycler between several loggers
    #[must_use = "builder methods return a new value"]
    pub fn recycler(mut self, recycler: Arc<BufferRecycler>) -> Self {
        self.recycler = Some(recycler);
        self
    }

    /// Idle buffers kept per tier; ignored when a recycler is supplied
    #[must_use = "builder methods return a new value"]
    pub fn pool_depth(mut self, depth: usize) -> Self {
        self.pool_depth = depth;
        self
    }

    pub fn build(self) -> Logger {
        let sink = self
            .sink
            .unwrap_or_else(|| Box::new(ConsoleSink::stdout()));
        let recycler = self
            .recycler
            .unwrap_or_else(|| Arc::new(BufferRecycler::with_depth(self.pool_depth)));

        Logger {
            gate: WriteGate::new(sink, self.min_level, self.layout, self.include_caller),
            recycler,
            metrics: Arc::new(LoggerMetrics::new()),
            timestamp_format: self.timestamp_format,
        }
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
