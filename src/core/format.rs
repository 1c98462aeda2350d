//! Minimal printf-style renderer
//!
//! Supported specifiers:
//!
//! | spec    | argument                          | fallback            |
//! |---------|-----------------------------------|---------------------|
//! | `%s %v` | any value, text encoding          |                     |
//! | `%d`    | `Value::Int` as decimal           | text encoding       |
//! | `%f`    | `Value::Float`, shortest form     | text encoding       |
//! | `%.Nf`  | `Value::Float`, N decimals        | text encoding       |
//! | `%%`    | literal `%`, consumes nothing     |                     |
//!
//! Anything else is copied through verbatim without consuming an argument.
//! Every specifier, `%%` included, is only interpreted while arguments
//! remain: once they run out the rest of the template is copied as is, so
//! `"%d%%"` with one argument renders `"42%%"`. Unlike printf-family
//! renderers that treat `%%` as a verb slot, `%%` never uses up an argument.

use super::field::{append_float, append_int, Value};
use std::io::Write;

/// Largest precision honoured by `%.Nf`; larger values are clamped.
pub const MAX_FLOAT_PRECISION: usize = 64;

/// Render `template` with positional `args` into a new string
///
/// # Example
///
/// ```
/// use rust_structured_logger::{args, core::format::sprintf};
///
/// let s = sprintf("disk at %d%% after %.2fs on %s", &args![42, 1.5, "sda"]);
/// assert_eq!(s, "disk at 42% after 1.50s on sda");
///
/// // arguments exhausted: the tail is literal
/// assert_eq!(sprintf("%d%%", &args![42]), "42%%");
/// ```
pub fn sprintf(template: &str, args: &[Value]) -> String {
    if args.is_empty() {
        return template.to_owned();
    }
    let mut buf = Vec::with_capacity(template.len() + 64);
    append_formatted(&mut buf, template, args);
    // Only whole UTF-8 sequences and encoder output are ever appended
    String::from_utf8(buf).unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}

/// Render `template` with positional `args`, appending to `buf`
pub fn append_formatted(buf: &mut Vec<u8>, template: &str, args: &[Value]) {
    let bytes = template.as_bytes();
    if args.is_empty() {
        buf.extend_from_slice(bytes);
        return;
    }

    let mut next_arg = 0;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if b != b'%' || i + 1 >= bytes.len() || next_arg >= args.len() {
            buf.push(b);
            i += 1;
            continue;
        }

        match bytes[i + 1] {
            b's' | b'v' => {
                args[next_arg].encode_text(buf);
                next_arg += 1;
                i += 2;
            }
            b'd' => {
                match &args[next_arg] {
                    Value::Int(n) => append_int(buf, *n),
                    other => other.encode_text(buf),
                }
                next_arg += 1;
                i += 2;
            }
            b'f' => {
                append_fixed(buf, &args[next_arg], None);
                next_arg += 1;
                i += 2;
            }
            b'%' => {
                buf.push(b'%');
                i += 2;
            }
            b'.' => match parse_precision(bytes, i + 2) {
                Some((precision, end)) => {
                    append_fixed(buf, &args[next_arg], precision);
                    next_arg += 1;
                    i = end;
                }
                None => {
                    buf.push(b'%');
                    i += 1;
                }
            },
            _ => {
                // unknown verb: the '%' now, the verb on the next pass
                buf.push(b'%');
                i += 1;
            }
        }
    }
}

/// Parse `<digits>f` starting at `start`; returns the precision and the
/// index just past the `f`. No digits means shortest form.
fn parse_precision(bytes: &[u8], start: usize) -> Option<(Option<usize>, usize)> {
    let digits_end = bytes[start..]
        .iter()
        .position(|b| !b.is_ascii_digit())
        .map_or(bytes.len(), |offset| start + offset);

    if bytes.get(digits_end) != Some(&b'f') {
        return None;
    }

    let precision = if digits_end == start {
        None
    } else {
        let digits = std::str::from_utf8(&bytes[start..digits_end]).ok()?;
        Some(
            digits
                .parse::<usize>()
                .unwrap_or(MAX_FLOAT_PRECISION)
                .min(MAX_FLOAT_PRECISION),
        )
    };
    Some((precision, digits_end + 1))
}

fn append_fixed(buf: &mut Vec<u8>, arg: &Value, precision: Option<usize>) {
    match (arg, precision) {
        (Value::Float(f), Some(p)) => {
            let _ = write!(buf, "{:.*}", p, f);
        }
        (Value::Float(f), None) => append_float(buf, *f),
        (other, _) => other.encode_text(buf),
    }
}
