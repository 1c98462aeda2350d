//! Core logger types and traits

pub mod buffer_pool;
pub mod caller;
pub mod config;
pub mod error;
pub mod field;
pub mod format;
pub mod layout;
pub mod log_level;
pub mod logger;
pub mod metrics;
pub mod record_builder;
pub mod sink;
pub mod timestamp;
pub mod write_gate;

pub use buffer_pool::{BufferRecycler, PooledBuffer, Tier};
pub use caller::CallerInfo;
pub use config::{LoggerConfig, OutputTarget};
pub use error::{LoggerError, Result};
pub use field::{AnyValue, ErrorValue, Field, FieldKind, Value};
pub use format::sprintf;
pub use layout::{Layout, LayoutToken, DEFAULT_LAYOUT};
pub use log_level::LogLevel;
pub use logger::{Logger, LoggerBuilder};
pub use metrics::{LoggerMetrics, PoolMetrics};
pub use record_builder::RecordBuilder;
pub use sink::Sink;
pub use timestamp::TimestampFormat;
pub use write_gate::WriteGate;
