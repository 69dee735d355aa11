// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! JSON encoder and decoder.
//!
//! Both operate on a single JSON object whose members are the encoded
//! fields. The `reversible` flag is fixed at construction:
//!
//! - **reversible**: lossless machine format, enumerations are bare numbers
//! - **non-reversible**: readable format, enumerations are symbolic strings

use serde_json::{Map, Value};

use crate::error::CodecError;

// =============================================================================
// JsonEncoder
// =============================================================================

/// Writes fields as members of a JSON object.
#[derive(Debug, Clone, Default)]
pub struct JsonEncoder {
    object: Map<String, Value>,
    reversible: bool,
}

impl JsonEncoder {
    /// Creates an encoder in the given mode.
    pub fn new(reversible: bool) -> Self {
        Self {
            object: Map::new(),
            reversible,
        }
    }

    /// Creates a reversible encoder.
    pub fn reversible() -> Self {
        Self::new(true)
    }

    /// Creates a non-reversible encoder.
    pub fn non_reversible() -> Self {
        Self::new(false)
    }

    /// Returns `true` if this encoder writes the reversible form.
    #[inline]
    pub fn is_reversible(&self) -> bool {
        self.reversible
    }

    /// Writes a signed 32-bit integer as a JSON number.
    pub fn write_i32(&mut self, field: &str, value: i32) {
        self.object.insert(field.to_string(), Value::from(value));
    }

    /// Writes a JSON string, or `null` for `None`.
    pub fn write_string_token(&mut self, field: &str, value: Option<&str>) {
        let token = match value {
            Some(text) => Value::String(text.to_string()),
            None => Value::Null,
        };
        self.object.insert(field.to_string(), token);
    }

    /// Returns the token written for `field`.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.object.get(field)
    }

    /// Consumes the encoder and returns the JSON object.
    pub fn into_object(self) -> Map<String, Value> {
        self.object
    }

    /// Consumes the encoder and returns the object as JSON text.
    pub fn into_string(self) -> String {
        Value::Object(self.object).to_string()
    }
}

// =============================================================================
// JsonDecoder
// =============================================================================

/// Reads fields from the members of a JSON object.
#[derive(Debug, Clone, Default)]
pub struct JsonDecoder {
    object: Map<String, Value>,
    reversible: bool,
}

impl JsonDecoder {
    /// Creates a decoder over an already parsed object.
    pub fn new(object: Map<String, Value>, reversible: bool) -> Self {
        Self { object, reversible }
    }

    /// Parses JSON text; the top level must be an object.
    pub fn from_text(text: &str, reversible: bool) -> Result<Self, CodecError> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| CodecError::invalid_json(e.to_string()))?;
        Self::from_value(value, reversible)
    }

    /// Wraps a JSON value; it must be an object.
    pub fn from_value(value: Value, reversible: bool) -> Result<Self, CodecError> {
        match value {
            Value::Object(object) => Ok(Self::new(object, reversible)),
            other => Err(CodecError::NotAnObject {
                actual: json_type_name(&other),
            }),
        }
    }

    /// Returns `true` if the input is expected in reversible form.
    #[inline]
    pub fn is_reversible(&self) -> bool {
        self.reversible
    }

    /// Returns the raw token of `field`, if present.
    #[inline]
    pub fn token(&self, field: &str) -> Option<&Value> {
        self.object.get(field)
    }

    /// Reads `field` as a signed 32-bit integer.
    ///
    /// Returns `None` if the token is absent, not an integer, or out of range.
    pub fn read_i32(&self, field: &str) -> Option<i32> {
        self.token(field)
            .and_then(Value::as_i64)
            .and_then(|v| i32::try_from(v).ok())
    }

    /// Reads `field` as a string.
    pub fn read_string_token(&self, field: &str) -> Option<&str> {
        self.token(field).and_then(Value::as_str)
    }
}

/// Returns the JSON type name of `value` for diagnostics.
pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
