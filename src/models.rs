//! The structured error record and its cause chain.
//!
//! # Architecture
//!
//! - `StructuredError`: code, message, metadata, name tag, flattened cause chain
//! - `Raisable`: anything that can be wrapped, either already structured or foreign
//! - Casting: normalizes a `Raisable` into a `StructuredError` by case match
//!
//! # Chain Flattening
//!
//! Wrapping never builds a tree. When `A` wraps `B`, and `B` already wraps
//! `C`, the chain stored on `A` is the flat list `[B, C]`:
//!
//! ```rust
//! use stack_errors::StructuredError;
//!
//! let c = StructuredError::new("TEST1", "first");
//! let b = StructuredError::wrap("TEST2", "second", c);
//! let a = StructuredError::wrap("TEST3", "third", b);
//!
//! let codes: Vec<_> = a.to_error_stack().iter().map(|e| e.code()).collect();
//! assert_eq!(codes, ["TEST3", "TEST2", "TEST1"]);
//! ```
//!
//! Links are stored behind `Arc`, so flattening shares the already-built
//! tail instead of deep-copying it. Each link keeps its own chain: `B` above
//! still reports `[C]` as its cause chain.
//!
//! # Diagnostic Trace
//!
//! The trace is an opaque human-oriented string. It is filled at construction
//! when the `capture_trace` feature is enabled (a `std::backtrace::Backtrace`,
//! honouring `RUST_BACKTRACE`), or injected with `with_trace`. It takes no
//! part in equality or serialization.

use crate::Metadata;
use smallvec::SmallVec;
use std::borrow::Cow;
use std::error::Error;
use std::fmt;
use std::io;
use std::iter;
use std::sync::Arc;

/// Name tag carried by errors that were not given a more specific one.
pub const DEFAULT_NAME: &str = "StructuredError";

/// Code given to foreign errors cast without an explicit fallback.
pub const DEFAULT_CAST_CODE: &str = "SE0";

/// Flattened cause chain, head (most recent cause) first, root cause last.
///
/// SmallVec<[_; 4]>: most chains are shallow, deeper ones spill to the heap.
pub type ErrorStack = SmallVec<[Arc<StructuredError>; 4]>;

// ============================================================================
// Raisable (structured or foreign)
// ============================================================================

/// Any error that can become the cause of a `StructuredError`.
///
/// Casting performs a plain match on this type: structured errors pass
/// through untouched, foreign errors are wrapped into a minimal record.
#[derive(Debug)]
pub enum Raisable {
    /// Already a structured error.
    Structured(StructuredError),
    /// Any other error type.
    Foreign(Box<dyn Error + Send + Sync + 'static>),
}

impl Raisable {
    /// Wrap an arbitrary error as a foreign raisable.
    #[inline]
    pub fn foreign<E>(error: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        Self::Foreign(Box::new(error))
    }

    /// Check whether casting this value would be a no-op.
    #[inline]
    pub const fn is_structured(&self) -> bool {
        matches!(self, Self::Structured(_))
    }

    /// Human-readable message of the underlying error.
    pub fn message(&self) -> Cow<'_, str> {
        match self {
            Self::Structured(err) => Cow::Borrowed(err.message()),
            Self::Foreign(err) => Cow::Owned(err.to_string()),
        }
    }
}

impl From<StructuredError> for Raisable {
    fn from(error: StructuredError) -> Self {
        Self::Structured(error)
    }
}

impl From<Box<dyn Error + Send + Sync + 'static>> for Raisable {
    fn from(error: Box<dyn Error + Send + Sync + 'static>) -> Self {
        Self::Foreign(error)
    }
}

impl From<io::Error> for Raisable {
    fn from(error: io::Error) -> Self {
        Self::foreign(error)
    }
}

impl From<serde_json::Error> for Raisable {
    fn from(error: serde_json::Error) -> Self {
        Self::foreign(error)
    }
}

impl From<&str> for Raisable {
    fn from(message: &str) -> Self {
        Self::Foreign(message.into())
    }
}

impl From<String> for Raisable {
    fn from(message: String) -> Self {
        Self::Foreign(message.into())
    }
}

// ============================================================================
// Structured Error
// ============================================================================

/// Error with a namespaced code, a message, metadata and a flat cause chain.
///
/// `code`, `message` and the cause chain are fixed at construction.
/// `metadata` and `name` may be changed afterwards by whoever holds the error.
#[derive(Clone)]
#[must_use = "errors should be handled or propagated"]
pub struct StructuredError {
    code: String,
    message: String,
    metadata: Metadata,
    name: Cow<'static, str>,
    error_stack: ErrorStack,
    trace: Option<String>,
}

impl StructuredError {
    /// Create an error with no cause.
    #[inline]
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::with_cause(code, message, None)
    }

    /// Create an error wrapping `cause`.
    ///
    /// Foreign causes are cast with [`DEFAULT_CAST_CODE`] first.
    #[inline]
    pub fn wrap(
        code: impl Into<String>,
        message: impl Into<String>,
        cause: impl Into<Raisable>,
    ) -> Self {
        Self::with_cause(code, message, Some(cause.into()))
    }

    /// Create an error with an optional cause.
    ///
    /// The cause becomes the head of the new chain, followed by everything it
    /// already wrapped.
    pub fn with_cause(
        code: impl Into<String>,
        message: impl Into<String>,
        cause: Option<Raisable>,
    ) -> Self {
        let error_stack = match cause {
            Some(cause) => Self::cast(cause).into_links(),
            None => ErrorStack::new(),
        };

        Self {
            code: code.into(),
            message: message.into(),
            metadata: Metadata::new(),
            name: Cow::Borrowed(DEFAULT_NAME),
            error_stack,
            trace: capture_trace(),
        }
    }

    /// Cast any raisable error into a structured one.
    ///
    /// Structured errors are returned unchanged and `fallback_code` is
    /// ignored. Foreign errors become a fresh error carrying `fallback_code`,
    /// the foreign message, and the foreign debug rendering as trace.
    pub fn from_error(error: impl Into<Raisable>, fallback_code: impl Into<String>) -> Self {
        match error.into() {
            Raisable::Structured(error) => error,
            Raisable::Foreign(error) => {
                let mut cast = Self::new(fallback_code, error.to_string());
                cast.trace = Some(format!("{:?}", error));
                cast
            }
        }
    }

    /// Cast with [`DEFAULT_CAST_CODE`] as the fallback code.
    #[inline]
    pub fn cast(error: impl Into<Raisable>) -> Self {
        Self::from_error(error, DEFAULT_CAST_CODE)
    }

    /// Turn this error into the chain a wrapper stores: `[self, ...self.error_stack]`.
    fn into_links(self) -> ErrorStack {
        let mut links = ErrorStack::with_capacity(self.error_stack.len() + 1);
        let tail = self.error_stack.clone();
        links.push(Arc::new(self));
        links.extend(tail);
        links
    }

    /// Replace the name tag.
    #[inline]
    pub fn with_name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = name.into();
        self
    }

    /// Replace the metadata handle.
    ///
    /// The handle is stored as-is: a shared handle stays shared.
    #[inline]
    pub fn with_metadata(mut self, metadata: impl Into<Metadata>) -> Self {
        self.metadata = metadata.into();
        self
    }

    /// Attach a diagnostic trace supplied by the surrounding runtime.
    #[inline]
    pub fn with_trace(mut self, trace: impl Into<String>) -> Self {
        self.trace = Some(trace.into());
        self
    }

    /// Replace the name tag in place.
    #[inline]
    pub fn set_name(&mut self, name: impl Into<Cow<'static, str>>) {
        self.name = name.into();
    }

    /// Replace the metadata handle in place.
    #[inline]
    pub fn set_metadata(&mut self, metadata: impl Into<Metadata>) {
        self.metadata = metadata.into();
    }

    /// Get the error code.
    #[inline]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Get the human-readable message.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the metadata handle.
    ///
    /// Entries can be inserted through the shared reference; see
    /// [`Metadata`] for sharing rules.
    #[inline]
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Get the name tag.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the diagnostic trace, if one was captured or injected.
    #[inline]
    pub fn trace(&self) -> Option<&str> {
        self.trace.as_deref()
    }

    /// Get the cause chain, self excluded, root cause last.
    #[inline]
    pub fn error_stack(&self) -> &[Arc<StructuredError>] {
        &self.error_stack
    }

    /// Full chain including self: self first, root cause last.
    pub fn to_error_stack(&self) -> Vec<&StructuredError> {
        self.iter_stack().collect()
    }

    /// Iterate the full chain without collecting it.
    pub fn iter_stack(&self) -> impl Iterator<Item = &StructuredError> {
        iter::once(self).chain(self.error_stack.iter().map(|link| link.as_ref()))
    }

    /// The innermost cause, or self when nothing is wrapped.
    pub fn root_cause(&self) -> &StructuredError {
        self.error_stack.last().map_or(self, |link| link.as_ref())
    }

    /// Number of errors in the full chain, self included.
    #[inline]
    pub fn depth(&self) -> usize {
        self.error_stack.len() + 1
    }

    /// First error in the full chain carrying exactly `code`.
    pub fn find_code(&self, code: &str) -> Option<&StructuredError> {
        self.iter_stack().find(|err| err.code == code)
    }

    /// Rebuild from serialized parts. Chain assembly is done by the JSON layer.
    pub(crate) fn from_parts(
        code: String,
        message: String,
        metadata: Metadata,
        name: String,
        error_stack: ErrorStack,
    ) -> Self {
        let mut err = Self::new(code, message);
        err.metadata = metadata;
        err.name = Cow::Owned(name);
        err.error_stack = error_stack;
        err
    }
}

#[cfg(feature = "capture_trace")]
fn capture_trace() -> Option<String> {
    use std::backtrace::{Backtrace, BacktraceStatus};

    let backtrace = Backtrace::capture();
    match backtrace.status() {
        BacktraceStatus::Captured => Some(backtrace.to_string()),
        _ => None,
    }
}

#[cfg(not(feature = "capture_trace"))]
#[inline]
fn capture_trace() -> Option<String> {
    None
}

impl StructuredError {
    /// Compare own fields only, chain and trace excluded.
    fn same_fields(&self, other: &Self) -> bool {
        self.code == other.code
            && self.message == other.message
            && self.name == other.name
            && self.metadata == other.metadata
    }
}

impl PartialEq for StructuredError {
    /// Round-trip equivalence: every field except the diagnostic trace.
    ///
    /// Each link's own chain is the suffix of this chain after it, so links
    /// are compared field by field without descending into them.
    fn eq(&self, other: &Self) -> bool {
        self.same_fields(other)
            && self.error_stack.len() == other.error_stack.len()
            && self
                .error_stack
                .iter()
                .zip(other.error_stack.iter())
                .all(|(lhs, rhs)| Arc::ptr_eq(lhs, rhs) || lhs.same_fields(rhs))
    }
}

/// Debug form of a cause chain: one `[code] message` entry per link.
struct ChainLinks<'a>(&'a [Arc<StructuredError>]);

/// Debug form of a single link, without its own chain.
struct ChainLink<'a>(&'a StructuredError);

impl fmt::Debug for ChainLinks<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.0.iter().map(|link| ChainLink(link.as_ref())))
            .finish()
    }
}

impl fmt::Debug for ChainLink<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.0, f)
    }
}

impl fmt::Debug for StructuredError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StructuredError")
            .field("code", &self.code)
            .field("message", &self.message)
            .field("name", &self.name)
            .field("metadata", &self.metadata)
            .field("error_stack", &ChainLinks(&self.error_stack))
            .field("trace", &self.trace.as_ref().map(|_| "<PRESENT>"))
            .finish()
    }
}

impl fmt::Display for StructuredError {
    /// One-line form: `[code] message`. No chain, no metadata.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl Error for StructuredError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.error_stack
            .first()
            .map(|link| link.as_ref() as &(dyn Error + 'static))
    }
}
