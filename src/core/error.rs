//! Error types for the logger system
//!
//! Only two things can fail in this crate: writing a finished record to a
//! sink, and building a logger from configuration. Malformed templates and
//! unencodable field values never surface here; they degrade to literal
//! text inside the record instead.

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// IO error with context
    #[error("IO error while {operation}: {message}")]
    IoOperation {
        operation: String,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// A sink rejected a finished record
    #[error("Sink '{sink}' failed to write {bytes} bytes: {source}")]
    SinkWrite {
        sink: String,
        bytes: usize,
        #[source]
        source: std::io::Error,
    },

    /// A sink panicked while writing; the record is lost
    #[error("Sink '{sink}' panicked: {message}")]
    SinkPanicked { sink: String, message: String },

    /// JSON configuration could not be parsed
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },
}

impl LoggerError {
    /// Create an IO operation error with context
    pub fn io_operation(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        LoggerError::IoOperation {
            operation: operation.into(),
            message: message.into(),
            source,
        }
    }

    /// Create a sink write error
    pub fn sink_write(sink: impl Into<String>, bytes: usize, source: std::io::Error) -> Self {
        LoggerError::SinkWrite {
            sink: sink.into(),
            bytes,
            source,
        }
    }

    /// Create a sink panic error from a caught unwind payload
    pub fn sink_panicked(sink: impl Into<String>, payload: &(dyn std::any::Any + Send)) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };
        LoggerError::SinkPanicked {
            sink: sink.into(),
            message,
        }
    }

    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = LoggerError::config("LoggerConfig", "empty file path");
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));

        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let err = LoggerError::sink_write("console", 42, io_err);
        assert!(matches!(err, LoggerError::SinkWrite { bytes: 42, .. }));
    }

    #[test]
    fn test_error_display() {
        let err = LoggerError::config("LoggerConfig", "empty file path");
        assert_eq!(
            err.to_string(),
            "Invalid configuration for LoggerConfig: empty file path"
        );

        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let err = LoggerError::sink_write("file", 10, io_err);
        assert_eq!(
            err.to_string(),
            "Sink 'file' failed to write 10 bytes: pipe closed"
        );
    }

    #[test]
    fn test_io_operation_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = LoggerError::io_operation("opening log file", "cannot open for append", io_err);

        assert!(matches!(err, LoggerError::IoOperation { .. }));
        assert!(err.to_string().contains("opening log file"));
        assert!(err.to_string().contains("cannot open for append"));
    }

    #[test]
    fn test_sink_panicked_payloads() {
        let payload: Box<dyn std::any::Any + Send> = Box::new("boom");
        let err = LoggerError::sink_panicked("memory", payload.as_ref());
        assert_eq!(err.to_string(), "Sink 'memory' panicked: boom");

        let payload: Box<dyn std::any::Any + Send> = Box::new(String::from("owned"));
        let err = LoggerError::sink_panicked("memory", payload.as_ref());
        assert_eq!(err.to_string(), "Sink 'memory' panicked: owned");

        let payload: Box<dyn std::any::Any + Send> = Box::new(7u8);
        let err = LoggerError::sink_panicked("memory", payload.as_ref());
        assert!(err.to_string().ends_with("Unknown panic"));
    }

    #[test]
    fn test_json_error_conversion() {
        let parse: std::result::Result<serde_json::Value, _> = serde_json::from_str("{not json");
        let err: LoggerError = parse.unwrap_err().into();
        assert!(matches!(err, LoggerError::JsonError(_)));
    }
}
