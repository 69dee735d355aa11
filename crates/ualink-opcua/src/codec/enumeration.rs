// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Enumeration encode/decode rules.
//!
//! Decoding is total: apart from truncated binary input, every token maps to
//! a value. JSON input that cannot be resolved falls back to the first
//! declared field, and JSON against an empty field list yields `None`.
//!
//! Encoding never fails. Reversible JSON and binary always carry the numeric
//! code; non-reversible JSON carries the symbolic name when one exists.

use serde_json::Value;

use crate::codec::{Decoder, Encoder};
use crate::error::CodecError;
use crate::types::{EnumField, EnumValue, TypeDescription};

/// Decodes the enumerated value stored under `field`.
///
/// # Errors
///
/// Returns [`CodecError::Binary`] if a binary decoder runs out of input.
/// JSON decoding never fails.
pub fn decode_enum(
    decoder: &mut Decoder<'_>,
    description: &TypeDescription,
    field: &str,
) -> Result<Option<EnumValue>, CodecError> {
    match decoder {
        Decoder::Binary(d) => {
            let code = d.read_i32(field)?;
            Ok(Some(EnumValue::resolve(description, code)))
        }
        Decoder::Json(d) => {
            if description.is_empty() {
                tracing::trace!(
                    type_id = %description.type_id(),
                    field,
                    "No fields known, enumeration not decoded"
                );
                return Ok(None);
            }
            Ok(resolve_token(description, d.token(field)).map(EnumValue::from_field))
        }
    }
}

/// Encodes `value` under `field`; `None` writes the type's default.
pub fn encode_enum(
    encoder: &mut Encoder,
    description: &TypeDescription,
    field: &str,
    value: Option<&EnumValue>,
) {
    let code = value.map_or_else(|| default_code(description), |v| v.code);

    match encoder {
        Encoder::Binary(e) => e.write_i32(field, code),
        Encoder::Json(e) if e.is_reversible() => e.write_i32(field, code),
        Encoder::Json(e) => {
            let text = symbolic_text(description, value, code);
            e.write_string_token(field, Some(&text));
        }
    }
}

/// Code written when no value is supplied.
fn default_code(description: &TypeDescription) -> i32 {
    description.first_field().map_or(0, EnumField::code)
}

/// Text written in non-reversible mode.
fn symbolic_text(description: &TypeDescription, value: Option<&EnumValue>, code: i32) -> String {
    match (value, description.first_field()) {
        (Some(EnumValue { symbol: Some(symbol), .. }), Some(_)) => symbol.clone(),
        (None, Some(first)) => first.name().to_string(),
        _ => code.to_string(),
    }
}

/// Resolves a JSON token to a field, defaulting to the first field.
fn resolve_token<'d>(
    description: &'d TypeDescription,
    token: Option<&Value>,
) -> Option<&'d EnumField> {
    let resolved = match token {
        Some(Value::Number(number)) => number
            .as_i64()
            .and_then(|v| i32::try_from(v).ok())
            .and_then(|code| description.find_by_code(code)),
        Some(Value::String(text)) => resolve_text(description, text),
        _ => None,
    };

    if resolved.is_none() {
        tracing::trace!(
            type_id = %description.type_id(),
            token = ?token,
            "Unresolvable enumeration token, using first field"
        );
    }
    resolved.or_else(|| description.first_field())
}

/// Resolves `"<Text>_<digits>"` by its code, otherwise by field name.
fn resolve_text<'d>(description: &'d TypeDescription, text: &str) -> Option<&'d EnumField> {
    suffix_code(text)
        .and_then(|code| description.find_by_code(code))
        .or_else(|| description.find_by_name(text))
}

/// Parses the digits after the last `_`.
fn suffix_code(text: &str) -> Option<i32> {
    let (_, digits) = text.rsplit_once('_')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Encoded;
    use crate::types::NodeId;
    use serde_json::json;

    fn test_fields() -> TypeDescription {
        TypeDescription::new(
            NodeId::numeric(2, 100),
            vec![
                EnumField::new("TestField1", 1),
                EnumField::new("TestField2", 2),
                EnumField::new("TestField4", 4),
            ],
        )
    }

    fn empty() -> TypeDescription {
        TypeDescription::empty(NodeId::numeric(2, 101))
    }

    fn named(symbol: &str, code: i32) -> EnumValue {
        EnumValue::new(Some(symbol.to_string()), code)
    }

    fn decode_json(description: &TypeDescription, token: Value) -> Option<EnumValue> {
        let mut decoder = Decoder::json_value(json!({ "Value": token }), true).unwrap();
        decode_enum(&mut decoder, description, "Value").unwrap()
    }

    fn encode_json(
        description: &TypeDescription,
        reversible: bool,
        value: Option<&EnumValue>,
    ) -> Value {
        let mut encoder = Encoder::json(reversible);
        encode_enum(&mut encoder, description, "Value", value);
        match encoder.finish() {
            Encoded::Json(mut object) => object.remove("Value").unwrap(),
            other => panic!("unexpected output {other:?}"),
        }
    }

    // -------------------------------------------------------------------------
    // Decode
    // -------------------------------------------------------------------------

    #[test]
    fn test_decode_empty_metadata_is_none() {
        for token in [json!(1), json!("TestField_4"), json!([1]), json!({"a": 1}), json!(null)] {
            assert_eq!(decode_json(&empty(), token), None);
        }
        let mut decoder = Decoder::json_text("{}", false).unwrap();
        assert_eq!(decode_enum(&mut decoder, &empty(), "Value").unwrap(), None);
    }

    #[test]
    fn test_decode_default_first_field() {
        let description = test_fields();
        let first = named("TestField1", 1);
        assert_eq!(decode_json(&description, json!([2, 4])), Some(first.clone()));
        assert_eq!(decode_json(&description, json!({"x": 4})), Some(first.clone()));
        assert_eq!(decode_json(&description, json!("Unknown")), Some(first.clone()));
        assert_eq!(decode_json(&description, json!(true)), Some(first.clone()));
        assert_eq!(decode_json(&description, json!(2.5)), Some(first.clone()));

        let mut decoder = Decoder::json_text("{}", true).unwrap();
        assert_eq!(
            decode_enum(&mut decoder, &description, "Value").unwrap(),
            Some(first)
        );
    }

    #[test]
    fn test_decode_integer_code() {
        let description = test_fields();
        assert_eq!(decode_json(&description, json!(4)), Some(named("TestField4", 4)));
        assert_eq!(decode_json(&description, json!(2)), Some(named("TestField2", 2)));
        // No matching code, or outside i32.
        assert_eq!(decode_json(&description, json!(3)), Some(named("TestField1", 1)));
        assert_eq!(
            decode_json(&description, json!(4294967300i64)),
            Some(named("TestField1", 1))
        );
    }

    #[test]
    fn test_decode_suffix_coded_string() {
        let description = test_fields();
        assert_eq!(
            decode_json(&description, json!("TestField_4")),
            Some(named("TestField4", 4))
        );
        assert_eq!(
            decode_json(&description, json!("Anything_2")),
            Some(named("TestField2", 2))
        );
        assert_eq!(
            decode_json(&description, json!("TestField_9")),
            Some(named("TestField1", 1))
        );
        assert_eq!(
            decode_json(&description, json!("TestField_x")),
            Some(named("TestField1", 1))
        );
    }

    #[test]
    fn test_decode_field_name() {
        let description = test_fields();
        assert_eq!(
            decode_json(&description, json!("TestField2")),
            Some(named("TestField2", 2))
        );
        assert_eq!(
            decode_json(&description, json!("testfield4")),
            Some(named("TestField4", 4))
        );
    }

    #[test]
    fn test_decode_binary_resolution() {
        let description = test_fields();
        let mut decoder = Decoder::binary(&[4, 0, 0, 0, 3, 0, 0, 0]);
        assert_eq!(
            decode_enum(&mut decoder, &description, "Value").unwrap(),
            Some(named("TestField4", 4))
        );
        assert_eq!(
            decode_enum(&mut decoder, &description, "Value").unwrap(),
            Some(EnumValue::from_code(3))
        );

        let mut decoder = Decoder::binary(&[7, 0, 0, 0]);
        assert_eq!(
            decode_enum(&mut decoder, &empty(), "Value").unwrap(),
            Some(EnumValue::from_code(7))
        );
    }

    #[test]
    fn test_decode_binary_truncated() {
        let mut decoder = Decoder::binary(&[1, 0, 0]);
        let error = decode_enum(&mut decoder, &test_fields(), "Value").unwrap_err();
        assert!(matches!(error, CodecError::Binary { ref field, .. } if field == "Value"));
    }

    // -------------------------------------------------------------------------
    // Encode
    // -------------------------------------------------------------------------

    #[test]
    fn test_encode_binary() {
        let mut encoder = Encoder::binary();
        encode_enum(&mut encoder, &test_fields(), "Value", Some(&named("TestField4", 4)));
        encode_enum(&mut encoder, &test_fields(), "Value", None);
        encode_enum(&mut encoder, &empty(), "Value", None);
        let encoded = encoder.finish();
        assert_eq!(
            encoded.as_bytes().unwrap(),
            &[4, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0]
        );
    }

    #[test]
    fn test_encode_reversible_is_numeric() {
        let description = test_fields();
        assert_eq!(encode_json(&description, true, Some(&named("TestField2", 2))), json!(2));
        assert_eq!(encode_json(&description, true, None), json!(1));
        assert_eq!(encode_json(&empty(), true, None), json!(0));
        assert_eq!(encode_json(&empty(), true, Some(&EnumValue::from_code(9))), json!(9));
    }

    #[test]
    fn test_encode_non_reversible_default_with_fields() {
        let description = TypeDescription::new(
            NodeId::numeric(2, 100),
            vec![EnumField::new("TestField1", 1), EnumField::new("TestField2", 2)],
        );
        assert_eq!(encode_json(&description, false, None), json!("TestField1"));
    }

    #[test]
    fn test_encode_non_reversible_no_fields() {
        assert_eq!(encode_json(&empty(), false, None), json!("0"));
        assert_eq!(encode_json(&empty(), false, Some(&EnumValue::from_code(4))), json!("4"));
        assert_eq!(
            encode_json(&empty(), false, Some(&named("Stale", 4))),
            json!("4")
        );
    }

    #[test]
    fn test_encode_non_reversible_symbol() {
        let description = test_fields();
        assert_eq!(
            encode_json(&description, false, Some(&named("TestField4", 4))),
            json!("TestField4")
        );
        assert_eq!(
            encode_json(&description, false, Some(&EnumValue::from_code(3))),
            json!("3")
        );
    }

    // -------------------------------------------------------------------------
    // Round trips
    // -------------------------------------------------------------------------

    #[test]
    fn test_reversible_round_trip() {
        let description = test_fields();
        for field in description.fields() {
            let value = EnumValue::from_field(field);
            let token = encode_json(&description, true, Some(&value));
            let decoded = decode_json(&description, token).unwrap();
            assert_eq!(decoded.code, value.code);
        }
    }

    #[test]
    fn test_non_reversible_round_trip() {
        let description = test_fields();
        for field in description.fields() {
            let value = EnumValue::from_field(field);
            let token = encode_json(&description, false, Some(&value));
            assert_eq!(decode_json(&description, token), Some(value));
        }
    }

    #[test]
    fn test_binary_round_trip() {
        let description = test_fields();
        let value = named("TestField1", 1);
        let mut encoder = Encoder::binary();
        encode_enum(&mut encoder, &description, "Value", Some(&value));
        let encoded = encoder.finish();

        let mut decoder = Decoder::binary(encoded.as_bytes().unwrap());
        assert_eq!(
            decode_enum(&mut decoder, &description, "Value").unwrap(),
            Some(value)
        );
    }

    #[test]
    fn test_suffix_code() {
        assert_eq!(suffix_code("A_12"), Some(12));
        assert_eq!(suffix_code("A_B_3"), Some(3));
        assert_eq!(suffix_code("A_"), None);
        assert_eq!(suffix_code("A_-1"), None);
        assert_eq!(suffix_code("A12"), None);
        assert_eq!(suffix_code("A_99999999999"), None);
    }
}
