//! Line layouts for plain-text records
//!
//! A layout template is compiled once into a list of [`LayoutToken`]s and
//! then rendered per record straight into the record buffer.
//!
//! | token | renders                     | example               |
//! |-------|-----------------------------|-----------------------|
//! | `%y`  | year                        | `2025`                |
//! | `%M`  | month                       | `01`                  |
//! | `%d`  | day                         | `08`                  |
//! | `%h`  | hour                        | `10`                  |
//! | `%m`  | minute                      | `30`                  |
//! | `%s`  | second                      | `45`                  |
//! | `%D`  | `%y/%M/%d`                  | `2025/01/08`          |
//! | `%T`  | `%h:%m:%s`                  | `10:30:45`            |
//! | `%l`  | message (and text fields)   | `server started`      |
//! | `%L`  | level tag in brackets       | `[INFO]`              |
//! | `%F`  | full caller file            | `src/net/server.rs`   |
//! | `%f`  | caller file name            | `server.rs`           |
//! | `%i`  | caller line                 | `42`                  |
//!
//! Any other `%x` pair is kept as literal text. A lone trailing `%` ends the
//! template. All timestamps are UTC.

use super::caller::{short_file, CallerInfo, UNKNOWN_FILE};
use super::field::{Field, Value};
use super::format::append_formatted;
use super::log_level::LogLevel;
use chrono::{DateTime, Datelike, Timelike, Utc};
use std::io::Write;

/// Layout used when none is configured
pub const DEFAULT_LAYOUT: &str = "%D %T %L (%f:%i) ▶ %l";

/// Message part of a record, rendered lazily by the `%l` token
#[derive(Debug, Clone, Copy)]
pub enum Message<'a> {
    Text(&'a str),
    Format(&'a str, &'a [Value]),
}

impl Message<'_> {
    pub fn render(&self, buf: &mut Vec<u8>) {
        match self {
            Message::Text(text) => buf.extend_from_slice(text.as_bytes()),
            Message::Format(template, args) => append_formatted(buf, template, args),
        }
    }

    /// Rough rendered size, used to size the record buffer
    pub fn size_hint(&self) -> usize {
        match self {
            Message::Text(text) => text.len(),
            Message::Format(template, args) => template.len() + args.len() * 16,
        }
    }
}

/// Everything a token may need to render one record
#[derive(Debug, Clone, Copy)]
pub struct RecordContext<'a> {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: Message<'a>,
    pub fields: &'a [Field],
    pub caller: Option<&'a CallerInfo>,
}

impl<'a> RecordContext<'a> {
    pub fn new(timestamp: DateTime<Utc>, level: LogLevel, message: Message<'a>) -> Self {
        Self {
            timestamp,
            level,
            message,
            fields: &[],
            caller: None,
        }
    }

    #[must_use]
    pub fn with_fields(mut self, fields: &'a [Field]) -> Self {
        self.fields = fields;
        self
    }

    #[must_use]
    pub fn with_caller(mut self, caller: Option<&'a CallerInfo>) -> Self {
        self.caller = caller;
        self
    }

    fn render_message(&self, buf: &mut Vec<u8>) {
        self.message.render(buf);
        for field in self.fields {
            field.encode_text(buf);
        }
    }
}

/// One compiled unit of a layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutToken {
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
    Date,
    Time,
    Message,
    Level,
    FullFile,
    ShortFile,
    Line,
    Literal(String),
}

impl LayoutToken {
    /// Look up the token for the character following a `%`
    pub fn from_verb(verb: char) -> Option<Self> {
        let token = match verb {
            'y' => LayoutToken::Year,
            'M' => LayoutToken::Month,
            'd' => LayoutToken::Day,
            'h' => LayoutToken::Hour,
            'm' => LayoutToken::Minute,
            's' => LayoutToken::Second,
            'l' => LayoutToken::Message,
            'L' => LayoutToken::Level,
            'F' => LayoutToken::FullFile,
            'f' => LayoutToken::ShortFile,
            'i' => LayoutToken::Line,
            'D' => LayoutToken::Date,
            'T' => LayoutToken::Time,
            _ => return None,
        };
        Some(token)
    }

    pub fn needs_caller(&self) -> bool {
        matches!(
            self,
            LayoutToken::FullFile | LayoutToken::ShortFile | LayoutToken::Line
        )
    }

    pub fn render(&self, ctx: &RecordContext<'_>, buf: &mut Vec<u8>) {
        let t = &ctx.timestamp;
        match self {
            LayoutToken::Year => padded(buf, t.year(), 4),
            LayoutToken::Month => padded(buf, t.month() as i32, 2),
            LayoutToken::Day => padded(buf, t.day() as i32, 2),
            LayoutToken::Hour => padded(buf, t.hour() as i32, 2),
            LayoutToken::Minute => padded(buf, t.minute() as i32, 2),
            LayoutToken::Second => padded(buf, t.second() as i32, 2),
            LayoutToken::Date => {
                padded(buf, t.year(), 4);
                buf.push(b'/');
                padded(buf, t.month() as i32, 2);
                buf.push(b'/');
                padded(buf, t.day() as i32, 2);
            }
            LayoutToken::Time => {
                padded(buf, t.hour() as i32, 2);
                buf.push(b':');
                padded(buf, t.minute() as i32, 2);
                buf.push(b':');
                padded(buf, t.second() as i32, 2);
            }
            LayoutToken::Message => ctx.render_message(buf),
            LayoutToken::Level => {
                buf.push(b'[');
                buf.extend_from_slice(ctx.level.to_str().as_bytes());
                buf.push(b']');
            }
            LayoutToken::FullFile => {
                let file = ctx.caller.map_or(UNKNOWN_FILE, CallerInfo::file);
                buf.extend_from_slice(file.as_bytes());
            }
            LayoutToken::ShortFile => {
                let file = ctx.caller.map_or(UNKNOWN_FILE, |c| short_file(c.file()));
                buf.extend_from_slice(file.as_bytes());
            }
            LayoutToken::Line => {
                let line = ctx.caller.map_or(0, CallerInfo::line);
                let _ = write!(buf, "{}", line);
            }
            LayoutToken::Literal(text) => buf.extend_from_slice(text.as_bytes()),
        }
    }
}

fn padded(buf: &mut Vec<u8>, value: i32, width: usize) {
    let _ = write!(buf, "{:0width$}", value, width = width);
}

/// A compiled line layout
///
/// # Example
///
/// ```
/// use rust_structured_logger::core::layout::{Layout, Message, RecordContext};
/// use rust_structured_logger::LogLevel;
/// use chrono::{TimeZone, Utc};
///
/// let layout = Layout::compile("%D %T %L %l");
/// let ts = Utc.with_ymd_and_hms(2025, 1, 8, 10, 30, 45).unwrap();
/// let ctx = RecordContext::new(ts, LogLevel::Warn, Message::Text("disk low"));
///
/// let mut buf = Vec::new();
/// layout.render(&ctx, &mut buf);
/// assert_eq!(buf, "2025/01/08 10:30:45 [WARN] disk low".as_bytes());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    template: String,
    tokens: Vec<LayoutToken>,
    needs_caller: bool,
}

impl Layout {
    pub fn compile(template: &str) -> Self {
        let mut tokens: Vec<LayoutToken> = Vec::new();
        let mut rest = template;

        while let Some(idx) = rest.find('%') {
            if idx > 0 {
                push_literal(&mut tokens, &rest[..idx]);
            }
            let Some(verb) = rest[idx + 1..].chars().next() else {
                // lone trailing '%'
                rest = "";
                break;
            };
            let spec_end = idx + 1 + verb.len_utf8();
            match LayoutToken::from_verb(verb) {
                Some(token) => tokens.push(token),
                None => push_literal(&mut tokens, &rest[idx..spec_end]),
            }
            rest = &rest[spec_end..];
        }
        if !rest.is_empty() {
            push_literal(&mut tokens, rest);
        }

        let needs_caller = tokens.iter().any(LayoutToken::needs_caller);
        Self {
            template: template.to_owned(),
            tokens,
            needs_caller,
        }
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn tokens(&self) -> &[LayoutToken] {
        &self.tokens
    }

    /// Whether rendering uses the caller's file or line
    pub fn needs_caller(&self) -> bool {
        self.needs_caller
    }

    /// Render every token in order; an empty layout renders the bare message
    pub fn render(&self, ctx: &RecordContext<'_>, buf: &mut Vec<u8>) {
        if self.tokens.is_empty() {
            ctx.render_message(buf);
            return;
        }
        for token in &self.tokens {
            token.render(ctx, buf);
        }
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self::compile(DEFAULT_LAYOUT)
    }
}

fn push_literal(tokens: &mut Vec<LayoutToken>, text: &str) {
    if let Some(LayoutToken::Literal(last)) = tokens.last_mut() {
        last.push_str(text);
    } else {
        tokens.push(LayoutToken::Literal(text.to_owned()));
    }
}
