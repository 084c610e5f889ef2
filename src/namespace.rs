//! Namespaced error variants.
//!
//! A namespace fixes two things for every error it mints: a code prefix and
//! a default metadata handle. `LIB` + `123` gives code `LIB123`.
//!
//! # Runtime Factory
//!
//! [`create_namespace_error`] returns a [`Namespace`], a plain value that
//! constructs `StructuredError`s:
//!
//! ```rust
//! use stack_errors::{Metadata, create_namespace_error};
//!
//! let lib = create_namespace_error("LIB", Metadata::from([("package", "demo")]));
//! let err = lib.error(123, "Input must be foo");
//!
//! assert_eq!(err.to_string(), "[LIB123] Input must be foo");
//! assert_eq!(err.metadata().get("package"), Some("demo".into()));
//! ```
//!
//! # Distinct Types
//!
//! When catch sites need to dispatch on the kind of error, declare a type
//! with [`namespace_error!`](crate::namespace_error). The generated newtype
//! derefs to `StructuredError`, converts into it, implements [`ErrorVariant`],
//! and can be extended with ordinary `impl` blocks.
//!
//! # Metadata Is Shared, Not Merged
//!
//! Every error minted by one namespace holds a clone of the *same*
//! [`Metadata`] handle. Inserting through one error is visible through all of
//! them and through the namespace. Call-site metadata is never merged in.
//! Callers who need isolation build one namespace per owner, or
//! [`Metadata::detach`] the handle of a constructed error and store it back.

use crate::{DEFAULT_NAME, Metadata, Raisable, StructuredError};
use std::borrow::Cow;
use std::fmt;

// ============================================================================
// Namespace (runtime variant constructor)
// ============================================================================

/// Constructor for errors sharing a code prefix and default metadata.
///
/// Cloning a namespace shares its metadata handle.
#[derive(Debug, Clone, PartialEq)]
pub struct Namespace {
    prefix: Cow<'static, str>,
    metadata: Metadata,
    name: Cow<'static, str>,
}

impl Namespace {
    /// Create a namespace with empty default metadata.
    #[inline]
    pub fn new(prefix: impl Into<Cow<'static, str>>) -> Self {
        Self {
            prefix: prefix.into(),
            metadata: Metadata::new(),
            name: Cow::Borrowed(DEFAULT_NAME),
        }
    }

    /// Set the default metadata handed to every minted error.
    #[inline]
    pub fn with_metadata(mut self, metadata: impl Into<Metadata>) -> Self {
        self.metadata = metadata.into();
        self
    }

    /// Set the name tag carried by every minted error.
    ///
    /// A distinct tag is what lets [`Namespace::owns`] tell this namespace
    /// apart from another one using an overlapping prefix.
    #[inline]
    pub fn with_name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = name.into();
        self
    }

    /// Get the code prefix.
    #[inline]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Get the default metadata handle.
    #[inline]
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Get the name tag.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Compose a full code: prefix followed by the display form of `code`.
    #[inline]
    pub fn code(&self, code: impl fmt::Display) -> String {
        format!("{}{}", self.prefix, code)
    }

    /// Mint an error, optionally wrapping a cause.
    ///
    /// Cause handling is exactly that of [`StructuredError::with_cause`]; the
    /// cause keeps its own code.
    pub fn construct(
        &self,
        code: impl fmt::Display,
        message: impl Into<String>,
        cause: Option<Raisable>,
    ) -> StructuredError {
        StructuredError::with_cause(self.code(code), message, cause)
            .with_metadata(self.metadata.clone())
            .with_name(self.name.clone())
    }

    /// Mint an error with no cause.
    #[inline]
    pub fn error(&self, code: impl fmt::Display, message: impl Into<String>) -> StructuredError {
        self.construct(code, message, None)
    }

    /// Mint an error wrapping `cause`.
    #[inline]
    pub fn wrap(
        &self,
        code: impl fmt::Display,
        message: impl Into<String>,
        cause: impl Into<Raisable>,
    ) -> StructuredError {
        self.construct(code, message, Some(cause.into()))
    }

    /// Check whether `error` looks like one minted here.
    ///
    /// Matches on the name tag and the code prefix, both of which survive a
    /// JSON round trip.
    pub fn owns(&self, error: &StructuredError) -> bool {
        error.name() == self.name && error.code().starts_with(self.prefix.as_ref())
    }
}

/// Create a namespace with the given prefix and default metadata.
///
/// Pass `Metadata::new()` for no default metadata.
#[inline]
pub fn create_namespace_error(
    prefix: impl Into<Cow<'static, str>>,
    metadata: impl Into<Metadata>,
) -> Namespace {
    Namespace::new(prefix).with_metadata(metadata)
}

// ============================================================================
// ErrorVariant (catch-by-kind)
// ============================================================================

/// A constructible kind of structured error.
///
/// Implemented by `StructuredError` itself (no prefix, matches everything)
/// and by every type declared with [`namespace_error!`](crate::namespace_error).
/// Assertion helpers construct through this trait.
pub trait ErrorVariant: Sized + Into<StructuredError> {
    /// Build an instance from a code, a message and an optional cause.
    fn construct(
        code: impl fmt::Display,
        message: impl Into<String>,
        cause: Option<Raisable>,
    ) -> Self;

    /// Check whether `error` is of this kind.
    fn matches(error: &StructuredError) -> bool;

    /// Recover this kind from a plain `StructuredError`, or hand it back.
    fn downcast(error: StructuredError) -> Result<Self, StructuredError>;
}

impl ErrorVariant for StructuredError {
    fn construct(
        code: impl fmt::Display,
        message: impl Into<String>,
        cause: Option<Raisable>,
    ) -> Self {
        StructuredError::with_cause(code.to_string(), message, cause)
    }

    #[inline]
    fn matches(_error: &StructuredError) -> bool {
        true
    }

    #[inline]
    fn downcast(error: StructuredError) -> Result<Self, StructuredError> {
        Ok(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn composes_prefix_and_code() {
        let lib = create_namespace_error("LIB", Metadata::new());
        let err = lib.error(123, "Input must be foo");

        assert_eq!(err.code(), "LIB123");
        assert_eq!(err.to_string(), "[LIB123] Input must be foo");

        let textual = lib.error("X1", "text code");
        assert_eq!(textual.code(), "LIBX1");
    }

    #[test]
    fn injects_the_default_metadata_handle() {
        let lib = create_namespace_error("LIB", Metadata::from([("foo", "bar")]));
        let first = lib.error(1, "first");
        let second = lib.error(2, "second");

        assert_eq!(first.metadata(), &Metadata::from([("foo", "bar")]));
        assert!(first.metadata().shares_with(lib.metadata()));
        assert!(first.metadata().shares_with(second.metadata()));
    }

    #[test]
    fn metadata_mutation_is_shared_across_instances() {
        let lib = create_namespace_error("LIB", Metadata::from([("foo", "bar")]));
        let first = lib.error(1, "first");
        let second = lib.error(2, "second");

        first.metadata().insert("seen_by", "first");
        assert_eq!(second.metadata().get("seen_by"), Some(json!("first")));
        assert_eq!(lib.metadata().get("seen_by"), Some(json!("first")));
    }

    #[test]
    fn detaching_isolates_one_instance() {
        let lib = create_namespace_error("LIB", Metadata::from([("foo", "bar")]));
        let mut first = lib.error(1, "first");
        let second = lib.error(2, "second");

        let private = first.metadata().detach();
        first.set_metadata(private);
        first.metadata().insert("only", "first");

        assert!(!second.metadata().contains_key("only"));
    }

    #[test]
    fn wraps_like_the_base_error() {
        let lib = create_namespace_error("LIB", Metadata::new());
        let inner = lib.error(1, "inner");
        let outer = lib.wrap(2, "outer", inner.clone());

        assert_eq!(outer.error_stack().len(), 1);
        assert_eq!(outer.error_stack()[0].as_ref(), &inner);
    }

    #[test]
    fn cross_namespace_wrapping_keeps_original_code() {
        let lib = create_namespace_error("LIB", Metadata::new());
        let net = create_namespace_error("NET", Metadata::new());

        let cause = net.error(7, "connection reset");
        let err = lib.wrap(10, "fetch failed", cause);

        assert_eq!(err.code(), "LIB10");
        assert_eq!(err.error_stack()[0].code(), "NET7");
    }

    #[test]
    fn owns_checks_name_and_prefix() {
        let lib = Namespace::new("LIB").with_name("LibError");
        let other = Namespace::new("LIB").with_name("OtherError");

        let err = lib.error(1, "mine");
        assert!(lib.owns(&err));
        assert!(!other.owns(&err));
        assert!(!lib.owns(&StructuredError::new("LIB1", "untagged")));
    }

    #[test]
    fn base_error_is_a_variant() {
        let err = <StructuredError as ErrorVariant>::construct(5, "five", None);
        assert_eq!(err.code(), "5");
        assert!(<StructuredError as ErrorVariant>::matches(&err));
        assert!(StructuredError::downcast(err).is_ok());
    }
}
