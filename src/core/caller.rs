//! Call-site information attached to records

use std::borrow::Cow;
use std::fmt;
use std::panic::Location;

/// File rendered when the caller could not be determined
pub const UNKNOWN_FILE: &str = "???";

/// Source file and line of the code that emitted a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerInfo {
    file: Cow<'static, str>,
    line: u32,
}

impl CallerInfo {
    pub fn new(file: impl Into<Cow<'static, str>>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }

    /// Placeholder for an unreachable frame: `???:0`
    pub const fn unknown() -> Self {
        Self {
            file: Cow::Borrowed(UNKNOWN_FILE),
            line: 0,
        }
    }

    /// Location of the nearest caller not marked `#[track_caller]`
    #[track_caller]
    pub fn here() -> Self {
        Self::from(Location::caller())
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    /// File name without its directories
    pub fn short_file(&self) -> &str {
        short_file(&self.file)
    }

    pub fn line(&self) -> u32 {
        self.line
    }
}

impl From<&'static Location<'static>> for CallerInfo {
    fn from(location: &'static Location<'static>) -> Self {
        Self {
            file: Cow::Borrowed(location.file()),
            line: location.line(),
        }
    }
}

impl Default for CallerInfo {
    fn default() -> Self {
        Self::unknown()
    }
}

impl fmt::Display for CallerInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

pub(crate) fn short_file(path: &str) -> &str {
    match path.rfind(['/', '\\']) {
        Some(idx) if idx > 0 => &path[idx + 1..],
        _ => path,
    }
}
