// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Value codec for enumerated types.
//!
//! Values move on and off the wire through one of two capabilities:
//!
//! | Kind | Encoder | Decoder |
//! |------|---------|---------|
//! | Binary | [`BinaryEncoder`] | [`BinaryDecoder`] |
//! | JSON (reversible or not) | [`JsonEncoder`] | [`JsonDecoder`] |
//!
//! [`Encoder`] and [`Decoder`] close over exactly these kinds, and
//! [`encode_enum`] / [`decode_enum`] switch on them to apply the
//! enumeration rules.
//!
//! # Examples
//!
//! ```
//! use ualink_opcua::codec::{decode_enum, encode_enum, Decoder, Encoder};
//! use ualink_opcua::types::{EnumField, EnumValue, NodeId, TypeDescription};
//!
//! let description = TypeDescription::new(
//!     NodeId::numeric(2, 100),
//!     vec![EnumField::new("Idle", 0), EnumField::new("Running", 1)],
//! );
//!
//! let mut encoder = Encoder::json(false);
//! encode_enum(&mut encoder, &description, "State", None);
//! let text = encoder.finish().to_json_string().unwrap();
//! assert_eq!(text, r#"{"State":"Idle"}"#);
//!
//! let mut decoder = Decoder::json_text(&text, false).unwrap();
//! let value = decode_enum(&mut decoder, &description, "State").unwrap();
//! assert_eq!(value, Some(EnumValue::new(Some("Idle".into()), 0)));
//! ```

mod binary;
mod enumeration;
mod json;

pub use binary::{BinaryDecoder, BinaryEncoder};
pub use enumeration::{decode_enum, encode_enum};
pub use json::{JsonDecoder, JsonEncoder};

use bytes::Bytes;
use serde_json::{Map, Value};

use crate::error::CodecError;

// =============================================================================
// Encoder
// =============================================================================

/// Encoder capability handed to the codec.
#[derive(Debug, Clone)]
pub enum Encoder {
    /// Compact binary encoding.
    Binary(BinaryEncoder),
    /// JSON encoding.
    Json(JsonEncoder),
}

impl Encoder {
    /// Creates a binary encoder.
    pub fn binary() -> Self {
        Self::Binary(BinaryEncoder::new())
    }

    /// Creates a JSON encoder in the given mode.
    pub fn json(reversible: bool) -> Self {
        Self::Json(JsonEncoder::new(reversible))
    }

    /// Returns the encoding kind name.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Binary(_) => "binary",
            Self::Json(e) if e.is_reversible() => "json",
            Self::Json(_) => "json-nr",
        }
    }

    /// Writes a signed 32-bit integer.
    pub fn write_i32(&mut self, field: &str, value: i32) {
        match self {
            Self::Binary(e) => e.write_i32(field, value),
            Self::Json(e) => e.write_i32(field, value),
        }
    }

    /// Writes a string token, or the null token for `None`.
    pub fn write_string_token(&mut self, field: &str, value: Option<&str>) {
        match self {
            Self::Binary(e) => e.write_string_token(field, value),
            Self::Json(e) => e.write_string_token(field, value),
        }
    }

    /// Consumes the encoder and returns what it wrote.
    pub fn finish(self) -> Encoded {
        match self {
            Self::Binary(e) => Encoded::Binary(e.into_bytes()),
            Self::Json(e) => Encoded::Json(e.into_object()),
        }
    }
}

/// Output of a finished [`Encoder`].
#[derive(Debug, Clone, PartialEq)]
pub enum Encoded {
    /// Binary bytes.
    Binary(Bytes),
    /// JSON object.
    Json(Map<String, Value>),
}

impl Encoded {
    /// Returns the JSON text, or `None` for binary output.
    pub fn to_json_string(&self) -> Option<String> {
        match self {
            Self::Json(object) => Some(Value::Object(object.clone()).to_string()),
            Self::Binary(_) => None,
        }
    }

    /// Returns the bytes, or `None` for JSON output.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Binary(bytes) => Some(bytes),
            Self::Json(_) => None,
        }
    }
}

// =============================================================================
// Decoder
// =============================================================================

/// Decoder capability handed to the codec.
#[derive(Debug, Clone)]
pub enum Decoder<'a> {
    /// Compact binary encoding.
    Binary(BinaryDecoder<'a>),
    /// JSON encoding.
    Json(JsonDecoder),
}

impl<'a> Decoder<'a> {
    /// Creates a binary decoder over `buf`.
    pub fn binary(buf: &'a [u8]) -> Self {
        Self::Binary(BinaryDecoder::new(buf))
    }

    /// Creates a JSON decoder from text.
    pub fn json_text(text: &str, reversible: bool) -> Result<Self, CodecError> {
        JsonDecoder::from_text(text, reversible).map(Self::Json)
    }

    /// Creates a JSON decoder from a parsed value.
    pub fn json_value(value: Value, reversible: bool) -> Result<Self, CodecError> {
        JsonDecoder::from_value(value, reversible).map(Self::Json)
    }

    /// Returns the encoding kind name.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Binary(_) => "binary",
            Self::Json(d) if d.is_reversible() => "json",
            Self::Json(_) => "json-nr",
        }
    }

    /// Reads a signed 32-bit integer.
    ///
    /// JSON yields `Ok(None)` when the member is absent or not an integer.
    pub fn read_i32(&mut self, field: &str) -> Result<Option<i32>, CodecError> {
        match self {
            Self::Binary(d) => d.read_i32(field).map(Some),
            Self::Json(d) => Ok(d.read_i32(field)),
        }
    }

    /// Reads a string token.
    pub fn read_string_token(&mut self, field: &str) -> Result<Option<String>, CodecError> {
        match self {
            Self::Binary(d) => d.read_string_token(field),
            Self::Json(d) => Ok(d.read_string_token(field).map(str::to_string)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names() {
        assert_eq!(Encoder::binary().kind(), "binary");
        assert_eq!(Encoder::json(true).kind(), "json");
        assert_eq!(Encoder::json(false).kind(), "json-nr");
        assert_eq!(Decoder::binary(&[]).kind(), "binary");
        assert_eq!(Decoder::json_text("{}", false).unwrap().kind(), "json-nr");
    }

    #[test]
    fn test_dispatch_binary() {
        let mut encoder = Encoder::binary();
        encoder.write_i32("a", -1);
        encoder.write_string_token("b", None);
        let encoded = encoder.finish();
        assert!(encoded.to_json_string().is_none());
        let bytes = encoded.as_bytes().unwrap();

        let mut decoder = Decoder::binary(bytes);
        assert_eq!(decoder.read_i32("a").unwrap(), Some(-1));
        assert_eq!(decoder.read_string_token("b").unwrap(), None);
        assert!(decoder.read_i32("c").is_err());
    }

    #[test]
    fn test_dispatch_json() {
        let mut encoder = Encoder::json(true);
        encoder.write_i32("a", 3);
        encoder.write_string_token("b", Some("x"));
        let text = encoder.finish().to_json_string().unwrap();

        let mut decoder = Decoder::json_text(&text, true).unwrap();
        assert_eq!(decoder.read_i32("a").unwrap(), Some(3));
        assert_eq!(decoder.read_string_token("b").unwrap().as_deref(), Some("x"));
        assert_eq!(decoder.read_i32("missing").unwrap(), None);
    }
}
