//! Typed field model for structured records
//!
//! A [`Field`] is a key plus a [`Value`], a closed sum over the kinds the
//! encoders know how to write directly. Encoding is a match on the variant;
//! only [`Value::Any`] goes through `serde_json`, and a failure there
//! degrades to the `"<error>"` placeholder instead of failing the record.
//!
//! The JSON encoder writes keys and string payloads verbatim between
//! quotes. It does not escape embedded quotes, backslashes, or control
//! characters, so callers logging untrusted text into structured records
//! should sanitize it first.

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt;
use std::io::Write;
use std::sync::Arc;

/// Placeholder written when an untyped value cannot be serialized
pub const ENCODE_ERROR_TOKEN: &str = "\"<error>\"";

/// Text written for a missing error or untyped value in text mode
pub const NIL_TEXT: &str = "<nil>";

/// Kind tag of a [`Value`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    String,
    Int,
    Float,
    Bool,
    Error,
    Duration,
    Timestamp,
    Untyped,
}

/// An arbitrary serializable value carried by [`Value::Any`]
///
/// Implemented for every `Serialize + Send + Sync + 'static` type; encoding
/// runs only when a record is rendered.
pub trait AnyValue: Send + Sync {
    fn encode_json(&self, buf: &mut Vec<u8>) -> serde_json::Result<()>;

    fn to_json_value(&self) -> serde_json::Result<serde_json::Value>;
}

impl<T> AnyValue for T
where
    T: Serialize + Send + Sync + 'static,
{
    fn encode_json(&self, buf: &mut Vec<u8>) -> serde_json::Result<()> {
        serde_json::to_writer(buf, self)
    }

    fn to_json_value(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}

impl fmt::Debug for dyn AnyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_json_value() {
            Ok(value) => write!(f, "{}", value),
            Err(_) => f.write_str("<unencodable>"),
        }
    }
}

/// An error captured at the call site
///
/// The message is rendered once when the field is built; the original
/// error stays available for consumers that want to downcast it.
#[derive(Clone)]
pub struct ErrorValue {
    message: String,
    source: Arc<dyn StdError + Send + Sync + 'static>,
}

impl ErrorValue {
    pub fn new<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self {
            message: err.to_string(),
            source: Arc::new(err),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn source(&self) -> &(dyn StdError + Send + Sync + 'static) {
        self.source.as_ref()
    }
}

impl fmt::Debug for ErrorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ErrorValue").field(&self.message).finish()
    }
}

/// Payload of a field or a positional format argument
#[derive(Debug, Clone)]
pub enum Value {
    String(Cow<'static, str>),
    Int(i64),
    Float(f64),
    Bool(bool),
    /// `None` encodes as `null`
    Error(Option<ErrorValue>),
    /// Signed nanoseconds
    Duration(i64),
    Timestamp(DateTime<Utc>),
    /// `None` encodes as `null`
    Any(Option<Arc<dyn AnyValue>>),
}

impl Value {
    /// Wrap any serializable value as an untyped payload
    pub fn any<T>(value: T) -> Self
    where
        T: Serialize + Send + Sync + 'static,
    {
        let value: Arc<dyn AnyValue> = Arc::new(value);
        Value::Any(Some(value))
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            Value::String(_) => FieldKind::String,
            Value::Int(_) => FieldKind::Int,
            Value::Float(_) => FieldKind::Float,
            Value::Bool(_) => FieldKind::Bool,
            Value::Error(_) => FieldKind::Error,
            Value::Duration(_) => FieldKind::Duration,
            Value::Timestamp(_) => FieldKind::Timestamp,
            Value::Any(_) => FieldKind::Untyped,
        }
    }

    /// Append the human-oriented representation
    pub fn encode_text(&self, buf: &mut Vec<u8>) {
        match self {
            Value::String(s) => buf.extend_from_slice(s.as_bytes()),
            Value::Int(i) | Value::Duration(i) => append_int(buf, *i),
            Value::Float(f) => append_float(buf, *f),
            Value::Bool(b) => append_bool(buf, *b),
            Value::Error(Some(err)) => buf.extend_from_slice(err.message.as_bytes()),
            Value::Error(None) | Value::Any(None) => buf.extend_from_slice(NIL_TEXT.as_bytes()),
            Value::Timestamp(t) => append_rfc3339_nanos(buf, t),
            Value::Any(Some(any)) => match any.to_json_value() {
                Ok(serde_json::Value::String(s)) => buf.extend_from_slice(s.as_bytes()),
                Ok(other) => {
                    let _ = write!(buf, "{}", other);
                }
                Err(_) => buf.extend_from_slice(b"<error>"),
            },
        }
    }

    /// Append a JSON scalar
    pub fn encode_json(&self, buf: &mut Vec<u8>) {
        match self {
            Value::String(s) => append_quoted(buf, s),
            Value::Int(i) | Value::Duration(i) => append_int(buf, *i),
            Value::Float(f) if f.is_finite() => append_float(buf, *f),
            Value::Float(_) => buf.extend_from_slice(b"null"),
            Value::Bool(b) => append_bool(buf, *b),
            Value::Error(Some(err)) => append_quoted(buf, &err.message),
            Value::Error(None) | Value::Any(None) => buf.extend_from_slice(b"null"),
            Value::Timestamp(t) => {
                buf.push(b'"');
                append_rfc3339_nanos(buf, t);
                buf.push(b'"');
            }
            Value::Any(Some(any)) => {
                let start = buf.len();
                if any.encode_json(buf).is_err() {
                    buf.truncate(start);
                    buf.extend_from_slice(ENCODE_ERROR_TOKEN.as_bytes());
                }
            }
        }
    }
}

impl From<&'static str> for Value {
    fn from(s: &'static str) -> Self {
        Value::String(Cow::Borrowed(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(Cow::Owned(s))
    }
}

impl From<Cow<'static, str>> for Value {
    fn from(s: Cow<'static, str>) -> Self {
        Value::String(s)
    }
}

macro_rules! value_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(i: $ty) -> Self {
                    Value::Int(i64::from(i))
                }
            }
        )*
    };
}

value_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<isize> for Value {
    fn from(i: isize) -> Self {
        Value::Int(i as i64)
    }
}

/// Values beyond `i64::MAX` keep their full width as an untyped payload.
impl From<u64> for Value {
    fn from(u: u64) -> Self {
        i64::try_from(u)
            .map(Value::Int)
            .unwrap_or_else(|_| Value::any(u))
    }
}

impl From<usize> for Value {
    fn from(u: usize) -> Self {
        Value::from(u as u64)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<f32> for Value {
    fn from(f: f32) -> Self {
        Value::Float(f64::from(f))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<std::time::Duration> for Value {
    fn from(d: std::time::Duration) -> Self {
        Value::Duration(duration_nanos(d))
    }
}

impl From<chrono::TimeDelta> for Value {
    fn from(d: chrono::TimeDelta) -> Self {
        Value::Duration(d.num_nanoseconds().unwrap_or(if d < chrono::TimeDelta::zero() {
            i64::MIN
        } else {
            i64::MAX
        }))
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for Value {
    fn from(t: DateTime<Tz>) -> Self {
        Value::Timestamp(t.with_timezone(&Utc))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map(Into::into).unwrap_or(Value::Any(None))
    }
}

/// One named value of a structured record
///
/// # Example
///
/// ```
/// use rust_structured_logger::Field;
///
/// let mut buf = Vec::new();
/// Field::int("count", 42).encode_json(&mut buf);
/// assert_eq!(buf, br#","count":42"#);
/// ```
#[derive(Debug, Clone)]
pub struct Field {
    key: Cow<'static, str>,
    value: Value,
}

impl Field {
    pub fn new(key: impl Into<Cow<'static, str>>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn string(key: impl Into<Cow<'static, str>>, value: impl Into<Cow<'static, str>>) -> Self {
        Self::new(key, Value::String(value.into()))
    }

    pub fn int(key: impl Into<Cow<'static, str>>, value: i64) -> Self {
        Self::new(key, Value::Int(value))
    }

    pub fn float(key: impl Into<Cow<'static, str>>, value: f64) -> Self {
        Self::new(key, Value::Float(value))
    }

    pub fn bool(key: impl Into<Cow<'static, str>>, value: bool) -> Self {
        Self::new(key, Value::Bool(value))
    }

    pub fn error<E>(key: impl Into<Cow<'static, str>>, err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::new(key, Value::Error(Some(ErrorValue::new(err))))
    }

    /// An error field that encodes as `null` when `err` is `None`
    pub fn maybe_error<E>(key: impl Into<Cow<'static, str>>, err: Option<E>) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::new(key, Value::Error(err.map(ErrorValue::new)))
    }

    pub fn duration(key: impl Into<Cow<'static, str>>, value: std::time::Duration) -> Self {
        Self::new(key, value)
    }

    pub fn time<Tz: TimeZone>(key: impl Into<Cow<'static, str>>, value: DateTime<Tz>) -> Self {
        Self::new(key, value)
    }

    pub fn any<T>(key: impl Into<Cow<'static, str>>, value: T) -> Self
    where
        T: Serialize + Send + Sync + 'static,
    {
        Self::new(key, Value::any(value))
    }

    /// An untyped field that encodes as `null`
    pub fn nil(key: impl Into<Cow<'static, str>>) -> Self {
        Self::new(key, Value::Any(None))
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn kind(&self) -> FieldKind {
        self.value.kind()
    }

    /// The original error of an error field, for type-preserving consumers
    pub fn as_error(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        match &self.value {
            Value::Error(Some(err)) => Some(err.source()),
            _ => None,
        }
    }

    /// Append `,"key":value`
    pub fn encode_json(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(b",\"");
        buf.extend_from_slice(self.key.as_bytes());
        buf.extend_from_slice(b"\":");
        self.value.encode_json(buf);
    }

    /// Append ` key=value`
    pub fn encode_text(&self, buf: &mut Vec<u8>) {
        buf.push(b' ');
        buf.extend_from_slice(self.key.as_bytes());
        buf.push(b'=');
        self.value.encode_text(buf);
    }
}

pub(crate) fn duration_nanos(d: std::time::Duration) -> i64 {
    i64::try_from(d.as_nanos()).unwrap_or(i64::MAX)
}

pub(crate) fn append_int(buf: &mut Vec<u8>, i: i64) {
    let _ = write!(buf, "{}", i);
}

/// Shortest round-trip decimal, never exponent notation
pub(crate) fn append_float(buf: &mut Vec<u8>, f: f64) {
    let _ = write!(buf, "{}", f);
}

pub(crate) fn append_bool(buf: &mut Vec<u8>, b: bool) {
    buf.extend_from_slice(if b { b"true" } else { b"false" });
}

pub(crate) fn append_quoted(buf: &mut Vec<u8>, s: &str) {
    buf.push(b'"');
    buf.extend_from_slice(s.as_bytes());
    buf.push(b'"');
}

pub(crate) fn append_rfc3339_nanos(buf: &mut Vec<u8>, t: &DateTime<Utc>) {
    let _ = write!(buf, "{}", t.format("%Y-%m-%dT%H:%M:%S"));
    let nanos = t.timestamp_subsec_nanos() % 1_000_000_000;
    if nanos > 0 {
        buf.push(b'.');
        let _ = write!(buf, "{:09}", nanos);
        // nanos > 0, so a non-zero digit stops the trim
        while buf.last() == Some(&b'0') {
            buf.pop();
        }
    }
    buf.push(b'Z');
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::time::Duration;

    #[derive(Debug)]
    struct TestError;

    impl fmt::Display for TestError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("test error")
        }
    }

    impl StdError for TestError {}

    fn json(field: &Field) -> String {
        let mut buf = Vec::new();
        field.encode_json(&mut buf);
        String::from_utf8(buf).unwrap()
    }

    fn text(value: &Value) -> String {
        let mut buf = Vec::new();
        value.encode_text(&mut buf);
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_json_scalars() {
        let t = Utc.with_ymd_and_hms(2023, 1, 1, 12, 0, 0).single().unwrap();
        let cases = vec![
            (Field::string("string", "test"), r#","string":"test""#),
            (Field::int("int", 42), r#","int":42"#),
            (Field::int("neg", -42), r#","neg":-42"#),
            (Field::float("float64", 6.02214076), r#","float64":6.02214076"#),
            (Field::float("zero_f", 0.0), r#","zero_f":0"#),
            (Field::bool("bool_true", true), r#","bool_true":true"#),
            (Field::bool("bool_false", false), r#","bool_false":false"#),
            (Field::error("error", TestError), r#","error":"test error""#),
            (Field::maybe_error::<TestError>("nil_error", None), r#","nil_error":null"#),
            (Field::duration("duration", Duration::from_millis(500)), r#","duration":500000000"#),
            (Field::time("time", t), r#","time":"2023-01-01T12:00:00Z""#),
            (Field::any("any_string", "any value"), r#","any_string":"any value""#),
            (Field::any("uint64", 9_876_543_210u64), r#","uint64":9876543210"#),
            (Field::nil("any_nil"), r#","any_nil":null"#),
            (Field::string("empty", ""), r#","empty":"""#),
        ];

        for (field, expected) in cases {
            assert_eq!(json(&field), expected, "field {}", field.key());
        }
    }

    #[test]
    fn test_negative_duration() {
        let field = Field::new("neg_dur", chrono::TimeDelta::seconds(-1));
        assert_eq!(json(&field), r#","neg_dur":-1000000000"#);
    }

    #[test]
    fn test_timestamp_keeps_nanos() {
        let t = Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).single().unwrap()
            + chrono::TimeDelta::nanoseconds(123_456_789);
        assert_eq!(
            json(&Field::time("t", t)),
            r#","t":"2024-05-06T07:08:09.123456789Z""#
        );
    }

    #[test]
    fn test_timestamp_trims_trailing_zeros() {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().unwrap();
        let t = base + chrono::TimeDelta::milliseconds(120);
        assert_eq!(json(&Field::time("t", t)), r#","t":"2024-01-01T00:00:00.12Z""#);
        let t = base + chrono::TimeDelta::nanoseconds(1_000);
        assert_eq!(json(&Field::time("t", t)), r#","t":"2024-01-01T00:00:00.000001Z""#);
    }

    #[test]
    fn test_non_finite_float_is_null() {
        assert_eq!(json(&Field::float("nan", f64::NAN)), r#","nan":null"#);
        assert_eq!(text(&Value::Float(f64::INFINITY)), "inf");
    }

    #[test]
    fn test_unencodable_any_degrades() {
        let mut map = HashMap::new();
        map.insert((1, 2), "tuple keys are not JSON object keys");
        let field = Field::any("bad", map);

        let mut buf = b"{\"level\":\"INFO\"".to_vec();
        field.encode_json(&mut buf);
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            r#"{"level":"INFO","bad":"<error>""#
        );
    }

    #[test]
    fn test_any_structured() {
        #[derive(Serialize)]
        struct Point {
            x: i32,
            y: i32,
        }
        let field = Field::any("point", Point { x: 1, y: -2 });
        assert_eq!(json(&field), r#","point":{"x":1,"y":-2}"#);
        assert_eq!(text(field.value()), r#"{"x":1,"y":-2}"#);
    }

    #[test]
    fn test_text_encoding() {
        assert_eq!(text(&Value::from("raw")), "raw");
        assert_eq!(text(&Value::from(7)), "7");
        assert_eq!(text(&Value::from(1.5)), "1.5");
        assert_eq!(text(&Value::from(true)), "true");
        assert_eq!(text(&Value::Error(None)), "<nil>");
        assert_eq!(text(&Value::any("quoted in json only")), "quoted in json only");
        assert_eq!(text(&Value::from(Duration::from_secs(5))), "5000000000");
    }

    #[test]
    fn test_field_text() {
        let mut buf = Vec::new();
        Field::string("user", "john").encode_text(&mut buf);
        Field::int("count", 3).encode_text(&mut buf);
        assert_eq!(buf, b" user=john count=3");
    }

    #[test]
    fn test_error_preserves_source() {
        let field = Field::error("err", TestError);
        let source = field.as_error().expect("error field");
        assert!(source.downcast_ref::<TestError>().is_some());
        assert_eq!(field.kind(), FieldKind::Error);
    }

    #[test]
    fn test_kinds() {
        assert_eq!(Value::from(u64::MAX).kind(), FieldKind::Untyped);
        assert_eq!(Value::from(5u64).kind(), FieldKind::Int);
        assert_eq!(Value::from(None::<i32>).kind(), FieldKind::Untyped);
        assert_eq!(Value::from(Utc::now()).kind(), FieldKind::Timestamp);
    }
}
