//! Structured log view of an error.
//!
//! [`ErrorLog`] borrows from the `StructuredError` that produced it and
//! cannot outlive it. Loggers either read the fields one by one or let
//! [`ErrorLog::write_to`] render a single line:
//!
//! ```text
//! [LIB10] name='LibError' message='Input validation failed' package='demo' caused_by=[LIB123, SE0]
//! ```
//!
//! Every rendered field is truncated to a bounded length so that a runaway
//! message or metadata value cannot flood the log sink.

use crate::{Metadata, StructuredError};
use serde_json::Value;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

/// Maximum length for any individual field in formatted output
const MAX_FIELD_OUTPUT_LEN: usize = 1024;

/// Truncation indicator appended to truncated strings
const TRUNCATION_INDICATOR: &str = "...[TRUNCATED]";

/// Borrowed, structured view of a `StructuredError` for loggers.
///
/// # Example
///
/// ```rust
/// use stack_errors::StructuredError;
///
/// let inner = StructuredError::new("DB1", "connection refused");
/// let err = StructuredError::wrap("API3", "request failed", inner);
///
/// let line = err.with_log(|log| {
///     let mut buffer = String::new();
///     log.write_to(&mut buffer).map(|_| buffer)
/// });
/// assert_eq!(
///     line.unwrap(),
///     "[API3] name='StructuredError' message='request failed' caused_by=[DB1]"
/// );
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ErrorLog<'a> {
    code: &'a str,
    name: &'a str,
    message: &'a str,
    metadata: &'a Metadata,
    causes: &'a [Arc<StructuredError>],
}

impl<'a> ErrorLog<'a> {
    #[inline]
    pub(crate) fn new(error: &'a StructuredError) -> Self {
        Self {
            code: error.code(),
            name: error.name(),
            message: error.message(),
            metadata: error.metadata(),
            causes: error.error_stack(),
        }
    }

    /// Write the one-line log form, truncating oversized fields.
    ///
    /// Metadata entries are written in key order. String values are written
    /// raw, every other value in its compact JSON form.
    pub fn write_to(&self, f: &mut impl fmt::Write) -> fmt::Result {
        write!(
            f,
            "[{}] name='{}' message='{}'",
            truncate_with_indicator(self.code),
            truncate_with_indicator(self.name),
            truncate_with_indicator(self.message)
        )?;

        self.metadata.with_map(|map| -> fmt::Result {
            for (key, value) in map {
                match value {
                    Value::String(text) => write!(
                        f,
                        " {}='{}'",
                        truncate_with_indicator(key),
                        truncate_with_indicator(text)
                    )?,
                    other => write!(
                        f,
                        " {}='{}'",
                        truncate_with_indicator(key),
                        truncate_with_indicator(&other.to_string())
                    )?,
                }
            }
            Ok(())
        })?;

        if !self.causes.is_empty() {
            f.write_str(" caused_by=[")?;
            for (index, cause) in self.causes.iter().enumerate() {
                if index > 0 {
                    f.write_str(", ")?;
                }
                f.write_str(&truncate_with_indicator(cause.code()))?;
            }
            f.write_str("]")?;
        }

        Ok(())
    }

    // Raw accessors; truncation is left to the logging framework.

    /// Error code.
    #[inline]
    pub const fn code(&self) -> &'a str {
        self.code
    }

    /// Name tag.
    #[inline]
    pub const fn name(&self) -> &'a str {
        self.name
    }

    /// Human-readable message.
    #[inline]
    pub const fn message(&self) -> &'a str {
        self.message
    }

    /// Metadata handle of the error.
    #[inline]
    pub const fn metadata(&self) -> &'a Metadata {
        self.metadata
    }

    /// Cause chain, head first.
    #[inline]
    pub const fn causes(&self) -> &'a [Arc<StructuredError>] {
        self.causes
    }

    /// Codes of the cause chain, head first.
    pub fn cause_codes(self) -> impl Iterator<Item = &'a str> {
        self.causes.iter().map(|cause| cause.code())
    }
}

impl fmt::Display for ErrorLog<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_to(f)
    }
}

impl StructuredError {
    /// Borrow a structured log view of this error.
    #[inline]
    pub fn log_record(&self) -> ErrorLog<'_> {
        ErrorLog::new(self)
    }

    /// Run `f` with a log view that is dropped when `f` returns.
    #[inline]
    pub fn with_log<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&ErrorLog<'_>) -> R,
    {
        let log = self.log_record();
        f(&log)
    }
}

/// Truncate a string for display.
///
/// Cuts on a UTF-8 boundary and appends [`TRUNCATION_INDICATOR`] so the
/// truncation stays visible. Borrows when nothing needs cutting.
fn truncate_with_indicator(s: &str) -> Cow<'_, str> {
    if s.len() <= MAX_FIELD_OUTPUT_LEN {
        return Cow::Borrowed(s);
    }

    let max_content_len = MAX_FIELD_OUTPUT_LEN.saturating_sub(TRUNCATION_INDICATOR.len());

    let mut idx = max_content_len;
    while idx > 0 && !s.is_char_boundary(idx) {
        idx -= 1;
    }

    if idx == 0 {
        return Cow::Borrowed(TRUNCATION_INDICATOR);
    }

    let mut result = String::with_capacity(idx + TRUNCATION_INDICATOR.len());
    result.push_str(&s[..idx]);
    result.push_str(TRUNCATION_INDICATOR);
    Cow::Owned(result)
}
