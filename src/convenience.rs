//! Convenience macros: namespace types and early-return assertions.
//!
//! # Declaring a Namespace Type
//!
//! ```rust
//! use stack_errors::{ErrorVariant, StructuredError, namespace_error};
//!
//! namespace_error! {
//!     /// Errors raised by the protocol layer.
//!     pub struct ProtocolError("PTL") with [("layer", "protocol")];
//! }
//!
//! // Extension by composition: ordinary inherent methods.
//! impl ProtocolError {
//!     pub fn status(&self) -> u16 {
//!         400
//!     }
//! }
//!
//! let err = ProtocolError::new(1, "Invalid protocol version");
//! assert_eq!(err.code(), "PTL1");
//! assert_eq!(err.status(), 400);
//!
//! // Catch-by-kind after the error was erased to the base type.
//! let erased: StructuredError = err.into();
//! assert!(ProtocolError::matches(&erased));
//! ```
//!
//! # Early-Return Assertions
//!
//! ```rust
//! use stack_errors::{Result, ensure, ensure_as, namespace_error};
//!
//! namespace_error! {
//!     pub struct LibError("LIB");
//! }
//!
//! fn validate(input: &str) -> Result<()> {
//!     ensure!(!input.is_empty(), "input must not be empty");
//!     ensure_as!(input == "foo", LibError, 123, "Input must be foo");
//!     Ok(())
//! }
//!
//! assert_eq!(validate("bar").unwrap_err().code(), "LIB123");
//! assert_eq!(validate("").unwrap_err().message(), "input must not be empty");
//! ```

/// Declare a distinct error type bound to a namespace prefix.
///
/// The generated newtype wraps a `StructuredError` and provides:
///
/// - `new(code, message)` / `wrap(code, message, cause)` constructors
/// - `namespace()`: the lazily-built static [`Namespace`](crate::Namespace);
///   its metadata handle is shared by every instance
/// - [`ErrorVariant`](crate::ErrorVariant), `Deref`/`DerefMut` to
///   `StructuredError`, `From` into `StructuredError` and `Raisable`,
///   `Display`, `Error`
///
/// The name tag of every instance is the type name, so `matches` and
/// `downcast` keep working on errors rebuilt from JSON.
///
/// # Example
///
/// ```rust
/// use stack_errors::namespace_error;
///
/// namespace_error! {
///     pub struct LibError("LIB") with [("package", "demo"), ("version", "0.1.0")];
/// }
///
/// let err = LibError::new(123, "Input must be foo");
/// assert_eq!(err.to_string(), "[LIB123] Input must be foo");
/// assert_eq!(err.name(), "LibError");
/// assert_eq!(err.metadata().get("package"), Some("demo".into()));
/// ```
#[macro_export]
macro_rules! namespace_error {
    (
        $(#[$attr:meta])*
        $vis:vis struct $name:ident($prefix:expr) $(with $metadata:expr)? ;
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq)]
        $vis struct $name($crate::StructuredError);

        impl $name {
            /// Namespace shared by every instance of this type.
            $vis fn namespace() -> &'static $crate::Namespace {
                static NAMESPACE: ::std::sync::OnceLock<$crate::Namespace> =
                    ::std::sync::OnceLock::new();
                NAMESPACE.get_or_init(|| {
                    $crate::Namespace::new($prefix)
                        .with_name(::std::stringify!($name))
                        $(.with_metadata($metadata))?
                })
            }

            /// Create an error with no cause.
            #[allow(dead_code)]
            $vis fn new(
                code: impl ::std::fmt::Display,
                message: impl ::std::convert::Into<::std::string::String>,
            ) -> Self {
                <Self as $crate::ErrorVariant>::construct(
                    code,
                    message,
                    ::std::option::Option::None,
                )
            }

            /// Create an error wrapping `cause`.
            #[allow(dead_code)]
            $vis fn wrap(
                code: impl ::std::fmt::Display,
                message: impl ::std::convert::Into<::std::string::String>,
                cause: impl ::std::convert::Into<$crate::Raisable>,
            ) -> Self {
                <Self as $crate::ErrorVariant>::construct(
                    code,
                    message,
                    ::std::option::Option::Some(cause.into()),
                )
            }

            /// Unwrap the underlying `StructuredError`.
            #[allow(dead_code)]
            $vis fn into_inner(self) -> $crate::StructuredError {
                self.0
            }
        }

        impl $crate::ErrorVariant for $name {
            fn construct(
                code: impl ::std::fmt::Display,
                message: impl ::std::convert::Into<::std::string::String>,
                cause: ::std::option::Option<$crate::Raisable>,
            ) -> Self {
                Self(Self::namespace().construct(code, message, cause))
            }

            fn matches(error: &$crate::StructuredError) -> bool {
                Self::namespace().owns(error)
            }

            fn downcast(
                error: $crate::StructuredError,
            ) -> ::std::result::Result<Self, $crate::StructuredError> {
                if Self::namespace().owns(&error) {
                    ::std::result::Result::Ok(Self(error))
                } else {
                    ::std::result::Result::Err(error)
                }
            }
        }

        impl ::std::ops::Deref for $name {
            type Target = $crate::StructuredError;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl ::std::ops::DerefMut for $name {
            fn deref_mut(&mut self) -> &mut Self::Target {
                &mut self.0
            }
        }

        impl ::std::convert::From<$name> for $crate::StructuredError {
            fn from(error: $name) -> Self {
                error.0
            }
        }

        impl ::std::convert::From<$name> for $crate::Raisable {
            fn from(error: $name) -> Self {
                $crate::Raisable::Structured(error.0)
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                ::std::fmt::Display::fmt(&self.0, f)
            }
        }

        impl ::std::error::Error for $name {
            fn source(&self) -> ::std::option::Option<&(dyn ::std::error::Error + 'static)> {
                ::std::error::Error::source(&self.0)
            }
        }
    };
}

/// Return early with an `AssertionFailed` when the condition is false.
///
/// The failure is converted with `.into()`, so the enclosing function may
/// return `Result<_, AssertionFailed>` or `Result<_, StructuredError>`.
///
/// # Example
///
/// ```rust
/// use stack_errors::{AssertionFailed, ensure};
///
/// fn positive(n: i32) -> Result<i32, AssertionFailed> {
///     ensure!(n > 0);
///     Ok(n)
/// }
///
/// assert_eq!(positive(-1).unwrap_err().message(), "Assertion failed");
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr $(,)?) => {
        if !($cond) {
            return ::std::result::Result::Err(
                ::std::convert::Into::into($crate::AssertionFailed::default()),
            );
        }
    };
    ($cond:expr, $msg:expr $(,)?) => {
        if !($cond) {
            return ::std::result::Result::Err(
                ::std::convert::Into::into($crate::AssertionFailed::new($msg)),
            );
        }
    };
}

/// Return early with a namespaced error when the condition is false.
///
/// `ensure_as!(cond, Variant, code, message)` or
/// `ensure_as!(cond, Variant, code, message, cause)`.
#[macro_export]
macro_rules! ensure_as {
    ($cond:expr, $variant:ty, $code:expr, $msg:expr $(,)?) => {
        if !($cond) {
            return ::std::result::Result::Err(::std::convert::Into::into(
                <$variant as $crate::ErrorVariant>::construct(
                    $code,
                    $msg,
                    ::std::option::Option::None,
                ),
            ));
        }
    };
    ($cond:expr, $variant:ty, $code:expr, $msg:expr, $cause:expr $(,)?) => {
        if !($cond) {
            return ::std::result::Result::Err(::std::convert::Into::into(
                <$variant as $crate::ErrorVariant>::construct(
                    $code,
                    $msg,
                    ::std::option::Option::Some($crate::Raisable::from($cause)),
                ),
            ));
        }
    };
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use crate::{AssertionFailed, ErrorVariant, Metadata, StructuredError};
    use serde_json::json;

    namespace_error! {
        /// Test namespace with metadata.
        pub struct LibError("LIB") with [("foo", "bar")];
    }

    namespace_error! {
        struct NetError("NET");
    }

    #[test]
    fn generated_type_composes_codes() {
        let err = LibError::new(123, "Input must be foo");
        assert_eq!(err.code(), "LIB123");
        assert_eq!(err.message(), "Input must be foo");
        assert_eq!(err.to_string(), "[LIB123] Input must be foo");
        assert_eq!(err.name(), "LibError");
    }

    #[test]
    fn generated_type_injects_metadata() {
        let a = LibError::new(1, "a");
        let b = LibError::new(2, "b");

        assert_eq!(a.metadata(), &Metadata::from([("foo", "bar")]));
        assert!(a.metadata().shares_with(b.metadata()));
        assert!(a.metadata().shares_with(LibError::namespace().metadata()));
        assert!(NetError::new(1, "x").metadata().is_empty());
    }

    #[test]
    fn catch_by_kind() {
        let erased: StructuredError = LibError::new(1, "lib").into();
        assert!(LibError::matches(&erased));
        assert!(!NetError::matches(&erased));

        let plain = StructuredError::new("LIB1", "not minted by LibError");
        assert!(!LibError::matches(&plain));

        let recovered = LibError::downcast(erased).unwrap();
        assert_eq!(recovered.code(), "LIB1");

        let rejected = NetError::downcast(plain.clone()).unwrap_err();
        assert_eq!(rejected, plain);
    }

    #[test]
    fn kind_survives_json_round_trip() {
        let original: StructuredError = LibError::new(5, "five").into();
        let text = original.to_json_string().unwrap();
        let rebuilt = StructuredError::from_json_str(&text).unwrap();

        assert!(LibError::matches(&rebuilt));
        assert_eq!(rebuilt, original);
    }

    #[test]
    fn cross_variant_wrapping_keeps_inner_code() {
        let inner = NetError::new(7, "connection reset");
        let outer = LibError::wrap(10, "fetch failed", inner);

        assert_eq!(outer.code(), "LIB10");
        assert_eq!(outer.error_stack()[0].code(), "NET7");
        assert!(NetError::matches(&outer.error_stack()[0]));
        assert_eq!(outer.error_stack()[0].metadata().len(), 0);
    }

    #[test]
    fn deref_mut_allows_mutation() {
        let mut err = LibError::new(1, "x");
        err.set_name("Renamed");
        assert_eq!(err.name(), "Renamed");
        assert!(!LibError::matches(&err));
    }

    #[test]
    fn ensure_macro_returns_early() {
        fn check(flag: bool) -> Result<&'static str, AssertionFailed> {
            ensure!(flag);
            Ok("passed")
        }

        fn check_msg(flag: bool) -> crate::Result<&'static str> {
            ensure!(flag, "flag must be set",);
            Ok("passed")
        }

        assert_eq!(check(true), Ok("passed"));
        assert_eq!(check(false).unwrap_err().message(), "Assertion failed");
        assert_eq!(check_msg(false).unwrap_err().message(), "flag must be set");
        assert_eq!(check_msg(true).unwrap(), "passed");
    }

    #[test]
    fn ensure_as_macro_raises_variant() {
        fn check(input: &str) -> Result<(), LibError> {
            ensure_as!(input == "foo", LibError, 123, "Input must be foo");
            Ok(())
        }

        let err = check("bar").unwrap_err();
        assert_eq!(err.code(), "LIB123");
        assert_eq!(err.message(), "Input must be foo");
        assert!(check("foo").is_ok());
    }

    #[test]
    fn ensure_as_macro_wraps_cause_and_converts() {
        fn check(cause: StructuredError) -> crate::Result<()> {
            ensure_as!(false, LibError, 10, "Input validation failed", cause);
            Ok(())
        }

        let err = check(NetError::new(1, "inner").into()).unwrap_err();
        assert_eq!(err.code(), "LIB10");
        assert_eq!(err.error_stack()[0].code(), "NET1");
        assert_eq!(err.metadata().get("foo"), Some(json!("bar")));
    }
}
