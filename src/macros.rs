//! Logging macros over the printf-style renderer.
//!
//! Templates use the verbs of [`crate::core::format`] (`%s`, `%v`, `%d`,
//! `%f`, `%.Nf`, `%%`), not `format!` syntax. Arguments are converted with
//! `Value::from`, so anything with a `From` impl for [`crate::Value`] can be
//! passed directly. The call site is recorded as the caller.
//!
//! # Examples
//!
//! ```
//! use rust_structured_logger::prelude::*;
//! use rust_structured_logger::info;
//!
//! let sink = MemorySink::new();
//! let logger = Logger::builder().layout("%l").sink(sink.clone()).build();
//!
//! let port = 8080;
//! info!(logger, "listening on port %d", port);
//! info!(logger, "user %s performed %s", "ann", "login");
//!
//! assert_eq!(sink.lines(), vec!["listening on port 8080", "user ann performed login"]);
//! ```

/// Build a `[Value; N]` argument array for the format renderer.
///
/// ```
/// use rust_structured_logger::{args, Value};
///
/// let values = args!["id", 7, 0.5, true];
/// assert_eq!(values.len(), 4);
/// let none: [Value; 0] = args![];
/// assert!(none.is_empty());
/// ```
#[macro_export]
macro_rules! args {
    () => {{
        let empty: [$crate::Value; 0] = [];
        empty
    }};
    ($($arg:expr),+ $(,)?) => {
        [$($crate::Value::from($arg)),+]
    };
}

/// Log a formatted message at an explicit level, returning the write result.
///
/// This is also the way to emit `Panic` and `Print` records from a macro.
///
/// ```
/// # use rust_structured_logger::prelude::*;
/// # let logger = Logger::builder().sink(MemorySink::new()).build();
/// use rust_structured_logger::log;
/// log!(logger, LogLevel::Info, "simple message").unwrap();
/// log!(logger, LogLevel::Print, "error code: %d", 500).unwrap();
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $template:expr $(, $arg:expr)* $(,)?) => {
        $logger.logf($level, $template, &$crate::args![$($arg),*])
    };
}

/// Log a trace-level message.
///
/// ```
/// # use rust_structured_logger::prelude::*;
/// # let logger = Logger::builder().sink(MemorySink::new()).build();
/// # logger.set_min_level(LogLevel::Trace);
/// use rust_structured_logger::trace;
/// trace!(logger, "entering calculate()");
/// trace!(logger, "value: %v", 42);
/// ```
#[macro_export]
macro_rules! trace {
    ($logger:expr, $template:expr $(, $arg:expr)* $(,)?) => {
        $logger.tracef($template, &$crate::args![$($arg),*])
    };
}

/// Log a debug-level message.
#[macro_export]
macro_rules! debug {
    ($logger:expr, $template:expr $(, $arg:expr)* $(,)?) => {
        $logger.debugf($template, &$crate::args![$($arg),*])
    };
}

/// Log an info-level message.
#[macro_export]
macro_rules! info {
    ($logger:expr, $template:expr $(, $arg:expr)* $(,)?) => {
        $logger.infof($template, &$crate::args![$($arg),*])
    };
}

/// Log a warning.
///
/// ```
/// # use rust_structured_logger::prelude::*;
/// # let logger = Logger::builder().sink(MemorySink::new()).build();
/// use rust_structured_logger::warn;
/// warn!(logger, "retry %d of %d", 1, 3);
/// ```
#[macro_export]
macro_rules! warn {
    ($logger:expr, $template:expr $(, $arg:expr)* $(,)?) => {
        $logger.warnf($template, &$crate::args![$($arg),*])
    };
}

/// Log an error.
#[macro_export]
macro_rules! error {
    ($logger:expr, $template:expr $(, $arg:expr)* $(,)?) => {
        $logger.errorf($template, &$crate::args![$($arg),*])
    };
}

/// Log a fatal message. The process keeps running.
#[macro_export]
macro_rules! fatal {
    ($logger:expr, $template:expr $(, $arg:expr)* $(,)?) => {
        $logger.fatalf($template, &$crate::args![$($arg),*])
    };
}
