// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `encode` and `decode` commands.

use std::sync::Arc;

use serde_json::{Map, Value};
use ualink_config::UalinkConfig;
use ualink_opcua::{
    decode_enum, encode_enum, Decoder, Encoded, Encoder, EnumValue, NodeId, TypeDescription,
    TypeRegistry,
};

use crate::cli::{DecodeArgs, EncodeArgs, Encoding, OutputFormat};
use crate::error::{BinError, BinResult};

/// Executes the `encode` command.
pub fn encode(config: &UalinkConfig, args: EncodeArgs) -> BinResult<()> {
    let registry = config.codec.registry()?;
    let description = find_type(&registry, &args.type_key)?;
    let encoding = args
        .encoding
        .unwrap_or_else(|| Encoding::json(config.codec.reversible));

    println!(
        "{}",
        encode_value(&description, &args.field, args.value.as_deref(), encoding)?
    );
    Ok(())
}

/// Executes the `decode` command.
pub fn decode(config: &UalinkConfig, args: DecodeArgs) -> BinResult<()> {
    let registry = config.codec.registry()?;
    let description = find_type(&registry, &args.type_key)?;
    let encoding = args
        .encoding
        .unwrap_or_else(|| Encoding::json(config.codec.reversible));

    let value = decode_value(&description, &args.field, &args.input, encoding)?;
    match args.format {
        OutputFormat::Text => match value {
            Some(value) => println!("{value}"),
            None => println!("null"),
        },
        OutputFormat::Json => {
            let output = serde_json::json!({
                "type": description.display_name(),
                "value": value,
            });
            println!("{output:#}");
        }
    }
    Ok(())
}

/// Encodes `value` and returns hex for binary or JSON text otherwise.
///
/// `value` is a field name or an integer code; `None` encodes the type's
/// default.
pub fn encode_value(
    description: &TypeDescription,
    field: &str,
    value: Option<&str>,
    encoding: Encoding,
) -> BinResult<String> {
    let value = value.map(|v| parse_value(description, v)).transpose()?;

    let mut encoder = match encoding {
        Encoding::Binary => Encoder::binary(),
        Encoding::Json => Encoder::json(true),
        Encoding::JsonNr => Encoder::json(false),
    };
    encode_enum(&mut encoder, description, field, value.as_ref());

    Ok(match encoder.finish() {
        Encoded::Binary(bytes) => hex::encode(bytes),
        Encoded::Json(object) => Value::Object(object).to_string(),
    })
}

/// Decodes `input` as hex bytes or JSON.
///
/// JSON input that is not an object is taken as the token of `field`; text
/// that is not JSON at all is taken as a string token.
pub fn decode_value(
    description: &TypeDescription,
    field: &str,
    input: &str,
    encoding: Encoding,
) -> BinResult<Option<EnumValue>> {
    match encoding {
        Encoding::Binary => {
            let digits: String = input.chars().filter(|c| !c.is_whitespace()).collect();
            let bytes = hex::decode(&digits)
                .map_err(|e| BinError::config(format!("Bad hex input: {e}")))?;
            let mut decoder = Decoder::binary(&bytes);
            Ok(decode_enum(&mut decoder, description, field)?)
        }
        Encoding::Json | Encoding::JsonNr => {
            let token = match serde_json::from_str::<Value>(input.trim()) {
                Ok(Value::Object(object)) => Value::Object(object),
                Ok(token) => wrap(field, token),
                Err(_) => wrap(field, Value::String(input.trim().to_string())),
            };
            let mut decoder = Decoder::json_value(token, encoding == Encoding::Json)?;
            Ok(decode_enum(&mut decoder, description, field)?)
        }
    }
}

fn wrap(field: &str, token: Value) -> Value {
    let mut object = Map::new();
    object.insert(field.to_string(), token);
    Value::Object(object)
}

/// Looks a type up by id or alias.
///
/// A well-formed id that is not registered resolves to an empty description.
fn find_type(registry: &TypeRegistry, key: &str) -> BinResult<Arc<TypeDescription>> {
    if let Some(description) = registry.lookup(key) {
        return Ok(description);
    }
    match key.parse::<NodeId>() {
        Ok(type_id) => {
            tracing::warn!(type_id = %type_id, "Type not configured, no fields known");
            Ok(registry.get_or_empty(&type_id))
        }
        Err(_) => Err(BinError::config(format!("Unknown type '{key}'"))),
    }
}

fn parse_value(description: &TypeDescription, text: &str) -> BinResult<EnumValue> {
    let text = text.trim();
    if let Ok(code) = text.parse::<i32>() {
        return Ok(EnumValue::resolve(description, code));
    }
    description
        .find_by_name(text)
        .map(EnumValue::from_field)
        .ok_or_else(|| {
            BinError::config(format!(
                "'{text}' is not a field of {}",
                description.display_name()
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ualink_opcua::EnumField;

    fn machine_state() -> TypeDescription {
        TypeDescription::new(
            NodeId::numeric(2, 3063),
            vec![
                EnumField::new("Idle", 0),
                EnumField::new("Running", 1),
                EnumField::new("Fault", 5),
            ],
        )
        .with_alias("MachineState")
    }

    #[test]
    fn test_encode_value() {
        let ty = machine_state();
        assert_eq!(
            encode_value(&ty, "Value", Some("Running"), Encoding::Binary).unwrap(),
            "01000000"
        );
        assert_eq!(
            encode_value(&ty, "Value", Some("5"), Encoding::Json).unwrap(),
            r#"{"Value":5}"#
        );
        assert_eq!(
            encode_value(&ty, "Value", Some("running"), Encoding::JsonNr).unwrap(),
            r#"{"Value":"Running"}"#
        );
        assert_eq!(
            encode_value(&ty, "State", None, Encoding::JsonNr).unwrap(),
            r#"{"State":"Idle"}"#
        );
        assert!(encode_value(&ty, "Value", Some("Stopped"), Encoding::Json).is_err());
    }

    #[test]
    fn test_decode_value() {
        let ty = machine_state();
        let running = Some(EnumValue::new(Some("Running".to_string()), 1));

        assert_eq!(decode_value(&ty, "Value", "01 00 00 00", Encoding::Binary).unwrap(), running);
        assert_eq!(decode_value(&ty, "Value", r#"{"Value": 1}"#, Encoding::Json).unwrap(), running);
        assert_eq!(decode_value(&ty, "Value", "1", Encoding::Json).unwrap(), running);
        assert_eq!(decode_value(&ty, "Value", "Running_1", Encoding::JsonNr).unwrap(), running);
        assert_eq!(
            decode_value(&ty, "Value", "07000000", Encoding::Binary).unwrap(),
            Some(EnumValue::from_code(7))
        );
    }

    #[test]
    fn test_decode_errors() {
        let ty = machine_state();
        assert!(matches!(
            decode_value(&ty, "Value", "0100", Encoding::Binary),
            Err(BinError::Protocol(_))
        ));
        assert!(matches!(
            decode_value(&ty, "Value", "zz", Encoding::Binary),
            Err(BinError::Configuration(_))
        ));
    }

    #[test]
    fn test_find_type() {
        let registry = TypeRegistry::from_descriptions([machine_state()]);
        assert_eq!(find_type(&registry, "MachineState").unwrap().fields().len(), 3);
        assert!(find_type(&registry, "ns=2;i=9999").unwrap().is_empty());
        assert!(find_type(&registry, "Unknown").is_err());
    }
}
