//! JSON form of a structured error.
//!
//! # Wire Shape
//!
//! ```json
//! {
//!   "code": "LIB10",
//!   "message": "Input validation failed",
//!   "metadata": { "package": "demo" },
//!   "name": "StructuredError",
//!   "stack": [
//!     {
//!       "code": "LIB123",
//!       "message": "Input must be foo",
//!       "metadata": {},
//!       "name": "StructuredError",
//!       "stack": []
//!     }
//!   ]
//! }
//! ```
//!
//! The cause chain is already flat in memory, so it is written as one flat
//! list at the top level. Every entry's own `stack` is emitted empty.
//!
//! Readers are lenient: a record missing `metadata`, `name` or `stack` reads
//! as `{}`, [`DEFAULT_NAME`] and `[]`.
//!
//! # Reconstruction Order
//!
//! `stack` is folded right to left: the last entry is rebuilt first with an
//! empty chain, and each earlier entry receives the already-rebuilt entries
//! after it as its chain. Entry 0 ends up as the head, so a multi-level chain
//! keeps its order across a round trip. Nested `stack` fields inside entries
//! are ignored in favour of that reconstructed tail.

use crate::{DEFAULT_NAME, ErrorStack, Metadata, MetadataMap, Raisable, StructuredError};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Serialized record of a `StructuredError`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredErrorJson {
    /// Opaque error code.
    pub code: String,
    /// Human-readable message.
    pub message: String,
    /// Arbitrary key/value metadata.
    #[serde(default)]
    pub metadata: MetadataMap,
    /// Name tag.
    #[serde(default = "default_name")]
    pub name: String,
    /// Flattened cause chain, head first.
    #[serde(default)]
    pub stack: Vec<StructuredErrorJson>,
}

fn default_name() -> String {
    DEFAULT_NAME.to_string()
}

/// Failure while converting a structured error to or from JSON text.
#[derive(Debug)]
pub enum JsonError {
    /// The error could not be written.
    Encode(serde_json::Error),
    /// The input is not a valid error record.
    Decode(serde_json::Error),
}

impl JsonError {
    /// Underlying serde_json error.
    #[inline]
    pub fn inner(&self) -> &serde_json::Error {
        match self {
            Self::Encode(err) | Self::Decode(err) => err,
        }
    }
}

impl fmt::Display for JsonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Encode(err) => write!(f, "failed to encode structured error: {}", err),
            Self::Decode(err) => write!(f, "failed to decode structured error: {}", err),
        }
    }
}

impl std::error::Error for JsonError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.inner())
    }
}

impl From<JsonError> for Raisable {
    fn from(error: JsonError) -> Self {
        Raisable::foreign(error)
    }
}

impl StructuredError {
    /// Serialize with the full cause chain.
    #[inline]
    pub fn to_json(&self) -> StructuredErrorJson {
        self.to_json_with(true)
    }

    /// Serialize, including the cause chain only when `include_chain` is set.
    ///
    /// Chain entries are always serialized without their own chain.
    pub fn to_json_with(&self, include_chain: bool) -> StructuredErrorJson {
        let stack = if include_chain {
            self.error_stack()
                .iter()
                .map(|link| link.to_json_with(false))
                .collect()
        } else {
            Vec::new()
        };

        StructuredErrorJson {
            code: self.code().to_string(),
            message: self.message().to_string(),
            metadata: self.metadata().snapshot(),
            name: self.name().to_string(),
            stack,
        }
    }

    /// Rebuild an error from its serialized record.
    ///
    /// The diagnostic trace is not part of the record and is not restored.
    pub fn from_json(json: StructuredErrorJson) -> Self {
        let StructuredErrorJson {
            code,
            message,
            metadata,
            name,
            stack,
        } = json;

        // Built right to left: `rebuilt` holds the tail in reverse order.
        let mut rebuilt: Vec<Arc<StructuredError>> = Vec::with_capacity(stack.len());
        for entry in stack.into_iter().rev() {
            let tail: ErrorStack = rebuilt.iter().rev().cloned().collect();
            rebuilt.push(Arc::new(Self::from_parts(
                entry.code,
                entry.message,
                Metadata::from(entry.metadata),
                entry.name,
                tail,
            )));
        }
        let error_stack: ErrorStack = rebuilt.into_iter().rev().collect();

        Self::from_parts(code, message, Metadata::from(metadata), name, error_stack)
    }

    /// Serialize to a JSON string.
    pub fn to_json_string(&self) -> Result<String, JsonError> {
        serde_json::to_string(&self.to_json()).map_err(JsonError::Encode)
    }

    /// Serialize to a pretty-printed JSON string.
    pub fn to_json_string_pretty(&self) -> Result<String, JsonError> {
        serde_json::to_string_pretty(&self.to_json()).map_err(JsonError::Encode)
    }

    /// Serialize to a `serde_json::Value`.
    pub fn to_json_value(&self) -> Result<Value, JsonError> {
        serde_json::to_value(self.to_json()).map_err(JsonError::Encode)
    }

    /// Parse an error from JSON text.
    pub fn from_json_str(input: &str) -> Result<Self, JsonError> {
        serde_json::from_str::<StructuredErrorJson>(input)
            .map(Self::from_json)
            .map_err(JsonError::Decode)
    }

    /// Parse an error from JSON bytes.
    pub fn from_json_slice(input: &[u8]) -> Result<Self, JsonError> {
        serde_json::from_slice::<StructuredErrorJson>(input)
            .map(Self::from_json)
            .map_err(JsonError::Decode)
    }

    /// Rebuild an error from a `serde_json::Value`.
    pub fn from_json_value(value: Value) -> Result<Self, JsonError> {
        serde_json::from_value::<StructuredErrorJson>(value)
            .map(Self::from_json)
            .map_err(JsonError::Decode)
    }
}

impl From<&StructuredError> for StructuredErrorJson {
    fn from(error: &StructuredError) -> Self {
        error.to_json()
    }
}

impl From<StructuredErrorJson> for StructuredError {
    fn from(json: StructuredErrorJson) -> Self {
        Self::from_json(json)
    }
}

impl Serialize for StructuredError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for StructuredError {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        StructuredErrorJson::deserialize(deserializer).map(Self::from_json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn chain_of_three() -> StructuredError {
        let first = StructuredError::new("TEST1", "first");
        let second = StructuredError::wrap("TEST2", "second", first);
        StructuredError::wrap("TEST3", "third", second)
    }

    #[test]
    fn emits_exact_wire_shape() {
        let third = chain_of_three();
        third.metadata().insert("request", "r-1");

        let value = third.to_json_value().unwrap();
        assert_eq!(
            value,
            json!({
                "code": "TEST3",
                "message": "third",
                "metadata": { "request": "r-1" },
                "name": "StructuredError",
                "stack": [
                    {
                        "code": "TEST2",
                        "message": "second",
                        "metadata": {},
                        "name": "StructuredError",
                        "stack": []
                    },
                    {
                        "code": "TEST1",
                        "message": "first",
                        "metadata": {},
                        "name": "StructuredError",
                        "stack": []
                    }
                ]
            })
        );
    }

    #[test]
    fn float_metadata_round_trips_exactly() {
        let err = StructuredError::new("F1", "floats");
        let values = [1.0715660391465826e-75, -1.603964615428183e143, 0.1, 5e-324, f64::MAX];
        for (index, value) in values.iter().enumerate() {
            err.metadata().insert(format!("v{}", index), *value);
        }

        let back = StructuredError::from_json_str(&err.to_json_string().unwrap()).unwrap();
        for (index, value) in values.iter().enumerate() {
            let read = back.metadata().get(&format!("v{}", index)).and_then(|v| v.as_f64());
            assert_eq!(read, Some(*value));
        }
        assert_eq!(back, err);
    }

    #[test]
    fn without_chain_stack_is_empty() {
        let json = chain_of_three().to_json_with(false);
        assert!(json.stack.is_empty());
        assert_eq!(json.code, "TEST3");
    }

    #[test]
    fn round_trip_is_equivalent() {
        let third = chain_of_three();
        third.metadata().insert("answer", 42);

        let clone = StructuredError::from_json(third.to_json());
        assert_eq!(clone, third);
    }

    #[test]
    fn round_trip_preserves_order_of_deep_chains() {
        let mut err = StructuredError::new("L0", "level 0");
        for level in 1..6 {
            err = StructuredError::wrap(format!("L{}", level), format!("level {}", level), err);
        }

        let clone = StructuredError::from_json_str(&err.to_json_string().unwrap()).unwrap();

        let codes: Vec<_> = clone.iter_stack().map(|e| e.code().to_string()).collect();
        assert_eq!(codes, ["L5", "L4", "L3", "L2", "L1", "L0"]);

        // Every reconstructed link carries its own tail.
        assert_eq!(clone.error_stack()[0].depth(), 5);
        assert_eq!(clone.error_stack()[3].error_stack()[0].code(), "L1");
        assert_eq!(clone, err);
    }

    #[test]
    fn missing_optional_fields_default() {
        let err = StructuredError::from_json_str(r#"{"code":"MIN1","message":"minimal"}"#).unwrap();

        assert_eq!(err.code(), "MIN1");
        assert_eq!(err.message(), "minimal");
        assert!(err.metadata().is_empty());
        assert_eq!(err.name(), DEFAULT_NAME);
        assert!(err.error_stack().is_empty());
    }

    #[test]
    fn nested_entry_stacks_are_replaced_by_the_tail() {
        let value = json!({
            "code": "A",
            "message": "a",
            "stack": [
                { "code": "B", "message": "b", "stack": [ { "code": "X", "message": "ignored" } ] },
                { "code": "C", "message": "c" }
            ]
        });

        let err = StructuredError::from_json_value(value).unwrap();
        let b = &err.error_stack()[0];
        assert_eq!(b.error_stack().len(), 1);
        assert_eq!(b.error_stack()[0].code(), "C");
    }

    #[test]
    fn trace_is_not_serialized() {
        let err = StructuredError::new("T1", "traced").with_trace("frame 0");
        let text = err.to_json_string().unwrap();
        assert!(!text.contains("frame 0"));

        let back = StructuredError::from_json_str(&text).unwrap();
        assert_eq!(back, err);
        assert!(back.trace().is_none() || cfg!(feature = "capture_trace"));
    }

    #[test]
    fn invalid_input_is_a_decode_error() {
        let result = StructuredError::from_json_str(r#"{"message":"no code"}"#);
        match result {
            Err(JsonError::Decode(_)) => {}
            other => panic!("expected decode error, got {:?}", other),
        }

        let err = StructuredError::from_json_str("not json").unwrap_err();
        assert!(err.to_string().starts_with("failed to decode structured error"));
    }

    #[test]
    fn serde_impls_embed_in_larger_bodies() {
        let body = json!({ "ok": false, "error": chain_of_three() });
        assert_eq!(body["error"]["code"], "TEST3");
        assert_eq!(body["error"]["stack"][1]["code"], "TEST1");

        let back: StructuredError = serde_json::from_value(body["error"].clone()).unwrap();
        assert_eq!(back, chain_of_three());
    }

    #[test]
    fn decode_error_can_be_wrapped() {
        let decode = StructuredError::from_json_str("{").unwrap_err();
        let err = StructuredError::wrap("API1", "bad error body", decode);
        assert_eq!(err.error_stack()[0].code(), crate::DEFAULT_CAST_CODE);
    }
}
