//! Assertion helpers that turn a false condition into an error.
//!
//! Rust has no throw, so "raising" is returning `Err`. Callers propagate with
//! `?`, or use the [`ensure!`](crate::ensure) / [`ensure_as!`](crate::ensure_as)
//! macros to return early from the enclosing function.
//!
//! ```rust
//! use stack_errors::{Result, ensure_as, namespace_error};
//!
//! namespace_error! {
//!     pub struct LibError("LIB");
//! }
//!
//! fn check(input: &str) -> Result<()> {
//!     ensure_as::<LibError>(input == "foo", 123, "Input must be foo")?;
//!     Ok(())
//! }
//!
//! let err = check("bar").unwrap_err();
//! assert_eq!(err.to_string(), "[LIB123] Input must be foo");
//! ```

use crate::{ErrorVariant, Raisable, StructuredError};
use std::borrow::Cow;
use std::fmt;

/// Message used when an assertion fails without one.
pub const DEFAULT_ASSERTION_MESSAGE: &str = "Assertion failed";

/// Generic failure raised by [`ensure`] and [`ensure_with`].
///
/// Carries no code. Cast it (or let `?` convert it) to bring it into a
/// `StructuredError` chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssertionFailed {
    message: Cow<'static, str>,
}

impl AssertionFailed {
    /// Create a failure with the given message.
    #[inline]
    pub fn new(message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Get the failure message.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Default for AssertionFailed {
    fn default() -> Self {
        Self::new(DEFAULT_ASSERTION_MESSAGE)
    }
}

impl fmt::Display for AssertionFailed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for AssertionFailed {}

impl From<AssertionFailed> for Raisable {
    fn from(error: AssertionFailed) -> Self {
        Raisable::foreign(error)
    }
}

impl From<AssertionFailed> for StructuredError {
    /// Cast with the default fallback code.
    fn from(error: AssertionFailed) -> Self {
        StructuredError::cast(error)
    }
}

/// Fail with [`DEFAULT_ASSERTION_MESSAGE`] when `condition` is false.
#[inline]
pub fn ensure(condition: bool) -> Result<(), AssertionFailed> {
    ensure_with(condition, DEFAULT_ASSERTION_MESSAGE)
}

/// Fail with `message` when `condition` is false.
#[inline]
pub fn ensure_with(
    condition: bool,
    message: impl Into<Cow<'static, str>>,
) -> Result<(), AssertionFailed> {
    if condition {
        Ok(())
    } else {
        Err(AssertionFailed::new(message))
    }
}

/// Fail with a `V` built from `code` and `message` when `condition` is false.
///
/// Arguments are passed to the variant's constructor unchecked.
#[inline]
pub fn ensure_as<V: ErrorVariant>(
    condition: bool,
    code: impl fmt::Display,
    message: impl Into<String>,
) -> Result<(), V> {
    if condition {
        Ok(())
    } else {
        Err(V::construct(code, message, None))
    }
}

/// Like [`ensure_as`], wrapping `cause` in the raised error.
#[inline]
pub fn ensure_as_wrapping<V: ErrorVariant>(
    condition: bool,
    code: impl fmt::Display,
    message: impl Into<String>,
    cause: impl Into<Raisable>,
) -> Result<(), V> {
    if condition {
        Ok(())
    } else {
        Err(V::construct(code, message, Some(cause.into())))
    }
}
