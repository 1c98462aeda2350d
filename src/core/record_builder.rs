//! Fluent record construction
//!
//! A builder collects an optional message and any number of fields, then
//! emits once. With a message the record is plain text with the fields
//! appended as ` key=value`; without one it is a structured JSON record.

use super::caller::CallerInfo;
use super::error::Result;
use super::field::{Field, Value};
use super::layout::Message;
use super::log_level::LogLevel;
use super::logger::Logger;
use std::borrow::Cow;

/// Builder for a single record
///
/// # Example
///
/// ```
/// use rust_structured_logger::{Logger, MemorySink};
///
/// let sink = MemorySink::new();
/// let logger = Logger::builder().layout("%L %l").sink(sink.clone()).build();
///
/// logger.info_builder()
///     .message("request processed")
///     .field("status", 200)
///     .field("path", "/health")
///     .emit()
///     .unwrap();
///
/// assert_eq!(sink.contents(), "[INFO] request processed status=200 path=/health\n");
/// ```
#[must_use = "a record builder does nothing until `emit` is called"]
pub struct RecordBuilder<'a> {
    logger: &'a Logger,
    level: LogLevel,
    message: Option<Cow<'a, str>>,
    fields: Vec<Field>,
    caller: Option<CallerInfo>,
}

impl<'a> RecordBuilder<'a> {
    pub(crate) fn new(logger: &'a Logger, level: LogLevel) -> Self {
        Self {
            logger,
            level,
            message: None,
            fields: Vec::new(),
            caller: None,
        }
    }

    pub fn message(mut self, message: impl Into<Cow<'a, str>>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn field(mut self, key: impl Into<Cow<'static, str>>, value: impl Into<Value>) -> Self {
        self.fields.push(Field::new(key, value));
        self
    }

    /// Append already constructed fields in order
    pub fn fields(mut self, fields: impl IntoIterator<Item = Field>) -> Self {
        self.fields.extend(fields);
        self
    }

    /// Override the call site recorded by `emit`
    pub fn caller(mut self, caller: CallerInfo) -> Self {
        self.caller = Some(caller);
        self
    }

    /// Write the record
    ///
    /// Nothing is rendered when the level is filtered out, and a builder
    /// with neither message nor fields writes nothing.
    #[track_caller]
    pub fn emit(self) -> Result<()> {
        let here = CallerInfo::here();
        let caller = self.caller.as_ref().unwrap_or(&here);
        match &self.message {
            Some(message) => self.logger.emit_text(
                self.level,
                Message::Text(message.as_ref()),
                &self.fields,
                Some(caller),
            ),
            None => self
                .logger
                .emit_structured(self.level, &self.fields, Some(caller)),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::core::{Field, LogLevel, Logger, TimestampFormat};
    use crate::sinks::MemorySink;

    fn capture() -> (Logger, MemorySink) {
        let sink = MemorySink::new();
        let logger = Logger::builder()
            .layout("%L %l (%f)")
            .timestamp_format(TimestampFormat::Unix)
            .sink(sink.clone())
            .build();
        (logger, sink)
    }

    #[test]
    fn test_message_routes_to_text() {
        let (logger, sink) = capture();
        logger
            .warn_builder()
            .message(format!("retry {}", 3))
            .field("backoff_ms", 250)
            .emit()
            .unwrap();
        assert_eq!(sink.contents(), "[WARN] retry 3 backoff_ms=250 (record_builder.rs)\n");
    }

    #[test]
    fn test_fields_only_routes_to_json() {
        let (logger, sink) = capture();
        logger
            .builder_at(LogLevel::Error)
            .field("code", 500)
            .fields([Field::bool("retryable", false)])
            .emit()
            .unwrap();
        let line = sink.contents();
        assert!(line.starts_with('{'), "{line}");
        assert!(line.ends_with("\"level\":\"ERROR\",\"code\":500,\"retryable\":false}\n"), "{line}");
    }

    #[test]
    fn test_empty_builder_writes_nothing() {
        let (logger, sink) = capture();
        logger.info_builder().emit().unwrap();
        assert!(sink.is_empty());
    }

    #[test]
    fn test_filtered_builder() {
        let (logger, sink) = capture();
        logger.debug_builder().message("hidden").emit().unwrap();
        assert!(sink.is_empty());
        assert_eq!(logger.metrics().records_filtered(), 1);
    }

    #[test]
    fn test_caller_override() {
        let (logger, sink) = capture();
        logger
            .info_builder()
            .message("relayed")
            .caller(crate::core::CallerInfo::new("vendor/lib/client.rs", 88))
            .emit()
            .unwrap();
        assert_eq!(sink.contents(), "[INFO] relayed (client.rs)\n");
    }
}
