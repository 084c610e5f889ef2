//! # Stack Errors
//!
//! Structured errors with namespaced codes, metadata and a flat cause chain.
//!
//! ## Design Philosophy
//!
//! 1. **Every error has a code** that a program can branch on
//! 2. **Wrapping never nests**: the cause chain is one flat list, root last
//! 3. **Foreign errors are cast**, not rejected, so any error can be a cause
//! 4. **Errors cross process boundaries** as JSON and come back equivalent
//! 5. **Namespaces** give each library its own code prefix and default metadata
//!
//! ## Quick Start
//!
//! ```rust
//! use stack_errors::{Result, StructuredError, ensure_as, namespace_error};
//!
//! namespace_error! {
//!     /// Errors raised by this library.
//!     pub struct LibError("LIB") with [("package", "demo")];
//! }
//!
//! fn foo(input: &str) -> Result<()> {
//!     ensure_as!(input == "foo", LibError, 123, "Input must be foo");
//!     Ok(())
//! }
//!
//! fn validate(input: &str) -> Result<()> {
//!     foo(input).map_err(|e| LibError::wrap(10, "Input validation failed", e).into())
//! }
//!
//! let err = validate("bar").unwrap_err();
//! assert_eq!(err.to_string(), "[LIB10] Input validation failed");
//!
//! let codes: Vec<_> = err.to_error_stack().iter().map(|e| e.code()).collect();
//! assert_eq!(codes, ["LIB10", "LIB123"]);
//!
//! // Across a process boundary and back.
//! let wire = err.to_json_string()?;
//! let back = StructuredError::from_json_str(&wire)?;
//! assert_eq!(back, err);
//! # Ok::<(), stack_errors::JsonError>(())
//! ```
//!
//! ## Casting Foreign Errors
//!
//! ```rust
//! use stack_errors::{DEFAULT_CAST_CODE, StructuredError};
//!
//! let io = std::io::Error::other("disk full");
//! let err = StructuredError::cast(io);
//! assert_eq!(err.code(), DEFAULT_CAST_CODE);
//! assert_eq!(err.message(), "disk full");
//! ```
//!
//! ## Features
//!
//! - `capture_trace`: capture a `std::backtrace::Backtrace` into every newly
//!   constructed error (subject to `RUST_BACKTRACE`)

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod assertions;
pub mod convenience;
pub mod json;
pub mod logging;
pub mod metadata;
pub mod models;
pub mod namespace;

pub use assertions::*;
pub use json::*;
pub use logging::*;
pub use metadata::*;
pub use models::*;
pub use namespace::*;

/// Type alias for Results using our error type.
pub type Result<T> = std::result::Result<T, StructuredError>;

/// Library metadata, usable as default namespace metadata.
///
/// ```rust
/// use stack_errors::{Namespace, library_metadata};
///
/// let ns = Namespace::new("APP").with_metadata(library_metadata());
/// assert_eq!(ns.metadata().get("package"), Some("stack_errors".into()));
/// ```
pub fn library_metadata() -> Metadata {
    Metadata::from([
        ("package", env!("CARGO_PKG_NAME")),
        ("version", env!("CARGO_PKG_VERSION")),
    ])
}
