//! Timestamp rendering for the structured record header
//!
//! Text records render time through layout tokens; structured records
//! carry a single `"timestamp"` member whose shape is chosen here.

use super::field::{append_int, append_rfc3339_nanos};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::io::Write;

/// Structured header timestamp format
///
/// # Examples
///
/// ```
/// use rust_structured_logger::TimestampFormat;
/// use chrono::{TimeZone, Utc};
///
/// let ts = Utc.with_ymd_and_hms(2025, 1, 8, 10, 30, 45).unwrap();
/// assert_eq!(TimestampFormat::Iso8601.format(&ts), "2025-01-08T10:30:45.000Z");
/// assert_eq!(TimestampFormat::Unix.format(&ts), "1736332245");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimestampFormat {
    /// RFC 3339 with nanoseconds: `2025-01-08T10:30:45.123456789Z`
    ///
    /// Trailing zero digits of the fraction are omitted (`10:30:45.12Z`),
    /// and a whole second has no fraction at all (`10:30:45Z`).
    #[default]
    Rfc3339Nanos,

    /// ISO 8601 with milliseconds: `2025-01-08T10:30:45.123Z`
    Iso8601,

    /// ISO 8601 with microseconds: `2025-01-08T10:30:45.123456Z`
    Iso8601Micros,

    /// Unix timestamp in seconds: `1736332245`
    Unix,

    /// Unix timestamp in milliseconds: `1736332245123`
    UnixMillis,

    /// Unix timestamp in microseconds: `1736332245123456`
    UnixMicros,

    /// Custom strftime format
    ///
    /// A pattern chrono cannot render falls back to `Rfc3339Nanos`.
    Custom(String),
}

impl TimestampFormat {
    #[must_use]
    pub fn format(&self, datetime: &DateTime<Utc>) -> String {
        let mut buf = Vec::with_capacity(40);
        self.append(&mut buf, datetime);
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Append the bare timestamp to `buf`
    pub fn append(&self, buf: &mut Vec<u8>, datetime: &DateTime<Utc>) {
        match self {
            TimestampFormat::Rfc3339Nanos => append_rfc3339_nanos(buf, datetime),
            TimestampFormat::Iso8601 => {
                let _ = write!(buf, "{}", datetime.format("%Y-%m-%dT%H:%M:%S%.3fZ"));
            }
            TimestampFormat::Iso8601Micros => {
                let _ = write!(buf, "{}", datetime.format("%Y-%m-%dT%H:%M:%S%.6fZ"));
            }
            TimestampFormat::Unix => append_int(buf, datetime.timestamp()),
            TimestampFormat::UnixMillis => append_int(buf, datetime.timestamp_millis()),
            TimestampFormat::UnixMicros => append_int(buf, datetime.timestamp_micros()),
            TimestampFormat::Custom(pattern) => {
                // io::Write panics on a Display error; String surfaces it
                let mut rendered = String::with_capacity(pattern.len() + 16);
                if write!(rendered, "{}", datetime.format(pattern)).is_ok() {
                    buf.extend_from_slice(rendered.as_bytes());
                } else {
                    append_rfc3339_nanos(buf, datetime);
                }
            }
        }
    }

    /// Append the timestamp as a JSON value: numeric formats unquoted
    pub fn append_json(&self, buf: &mut Vec<u8>, datetime: &DateTime<Utc>) {
        if self.is_numeric() {
            self.append(buf, datetime);
        } else {
            buf.push(b'"');
            self.append(buf, datetime);
            buf.push(b'"');
        }
    }

    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            TimestampFormat::Unix | TimestampFormat::UnixMillis | TimestampFormat::UnixMicros
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_datetime() -> DateTime<Utc> {
        // 2025-01-08 10:30:45.123456789 UTC
        Utc.with_ymd_and_hms(2025, 1, 8, 10, 30, 45)
            .single()
            .expect("valid datetime")
            + chrono::Duration::nanoseconds(123_456_789)
    }

    #[test]
    fn test_rfc3339_nanos_format() {
        let result = TimestampFormat::Rfc3339Nanos.format(&fixed_datetime());
        assert_eq!(result, "2025-01-08T10:30:45.123456789Z");
    }

    #[test]
    fn test_iso8601_format() {
        let result = TimestampFormat::Iso8601.format(&fixed_datetime());
        assert_eq!(result, "2025-01-08T10:30:45.123Z");
    }

    #[test]
    fn test_iso8601_micros_format() {
        let result = TimestampFormat::Iso8601Micros.format(&fixed_datetime());
        assert_eq!(result, "2025-01-08T10:30:45.123456Z");
    }

    #[test]
    fn test_unix_formats() {
        let dt = fixed_datetime();
        assert_eq!(TimestampFormat::Unix.format(&dt), "1736332245");
        assert_eq!(TimestampFormat::UnixMillis.format(&dt), "1736332245123");
        assert_eq!(TimestampFormat::UnixMicros.format(&dt), "1736332245123456");
    }

    #[test]
    fn test_custom_format() {
        let format = TimestampFormat::Custom("%d/%b/%Y:%H:%M:%S".to_string());
        assert_eq!(format.format(&fixed_datetime()), "08/Jan/2025:10:30:45");
    }

    #[test]
    fn test_invalid_custom_falls_back() {
        let format = TimestampFormat::Custom("%Q broken".to_string());
        assert_eq!(
            format.format(&fixed_datetime()),
            "2025-01-08T10:30:45.123456789Z"
        );
    }

    #[test]
    fn test_invalid_custom_leaves_no_partial_output() {
        let format = TimestampFormat::Custom("%Y %Q".to_string());
        let mut buf = b"prefix ".to_vec();
        format.append_json(&mut buf, &fixed_datetime());
        assert_eq!(buf, b"prefix \"2025-01-08T10:30:45.123456789Z\"");
    }

    #[test]
    fn test_rfc3339_trims_fraction() {
        let whole = Utc.with_ymd_and_hms(2025, 1, 8, 10, 30, 45).single().expect("valid datetime");
        assert_eq!(TimestampFormat::Rfc3339Nanos.format(&whole), "2025-01-08T10:30:45Z");
        let tenth = whole + chrono::Duration::milliseconds(100);
        assert_eq!(TimestampFormat::Rfc3339Nanos.format(&tenth), "2025-01-08T10:30:45.1Z");
    }

    #[test]
    fn test_json_quoting() {
        let dt = fixed_datetime();
        let mut buf = Vec::new();
        TimestampFormat::UnixMillis.append_json(&mut buf, &dt);
        assert_eq!(buf, b"1736332245123");

        buf.clear();
        TimestampFormat::Iso8601.append_json(&mut buf, &dt);
        assert_eq!(buf, b"\"2025-01-08T10:30:45.123Z\"");
    }

    #[test]
    fn test_default_is_rfc3339_nanos() {
        assert_eq!(TimestampFormat::default(), TimestampFormat::Rfc3339Nanos);
        assert!(!TimestampFormat::default().is_numeric());
    }

    #[test]
    fn test_deserialization() {
        let format: TimestampFormat =
            serde_json::from_str("\"UnixMillis\"").expect("deserialize UnixMillis");
        assert_eq!(format, TimestampFormat::UnixMillis);

        let format: TimestampFormat =
            serde_json::from_str(r#"{"Custom":"%Y-%m-%d"}"#).expect("deserialize Custom");
        assert_eq!(format, TimestampFormat::Custom("%Y-%m-%d".to_string()));
    }
}
