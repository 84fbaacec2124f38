//! Store wire encoding
//!
//! Each value is a single-entry JSON object whose key is the type tag:
//!
//! ```text
//! {"S": "product#1"}   {"N": "12.5"}   {"BOOL": true}   {"NULL": true}
//! {"B": "aGk="}        {"L": [..]}     {"M": {..}}
//! {"SS": [..]}         {"NS": [..]}    {"BS": [..]}
//! ```
//!
//! Numbers travel as strings and are kept as validated [`Number`] text, so
//! values beyond any fixed-size decimal still decode.

use crate::error::DecodeError;
use crate::number::Number;
use crate::value::{AttributeValue, Attributes};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::{Map, Value};

/// Decode a full row snapshot (attribute name → tagged value)
///
/// `path` prefixes every attribute path reported in errors.
///
/// # Errors
/// Returns [`DecodeError`] for the first attribute that fails to decode.
pub fn decode_item(item: &Map<String, Value>, path: &str) -> Result<Attributes, DecodeError> {
    item.iter()
        .map(|(name, value)| {
            let child = format!("{path}.{name}");
            decode(value, &child).map(|decoded| (name.clone(), decoded))
        })
        .collect()
}

/// Decode one tagged value
///
/// # Errors
/// - [`DecodeError::UnknownTypeTag`] for a tag outside the closed set
/// - [`DecodeError::MalformedValue`] for a non-object, multi-key object, or wrong payload type
/// - [`DecodeError::InvalidNumber`] / [`DecodeError::InvalidBinary`] for bad scalar payloads
pub fn decode(value: &Value, path: &str) -> Result<AttributeValue, DecodeError> {
    let Value::Object(tagged) = value else {
        return Err(DecodeError::malformed(path, "expected a tagged object"));
    };

    let mut entries = tagged.iter();
    let (tag, payload) = match (entries.next(), entries.next()) {
        (Some(entry), None) => entry,
        (None, _) => return Err(DecodeError::malformed(path, "empty tagged object")),
        (Some(_), Some(_)) => {
            return Err(DecodeError::malformed(
                path,
                format!("expected exactly one type tag, found {}", tagged.len()),
            ))
        }
    };

    match tag.as_str() {
        "S" => Ok(AttributeValue::String(expect_str(payload, path)?.to_string())),
        "N" => decode_number(expect_str(payload, path)?, path).map(AttributeValue::Number),
        "B" => decode_binary(expect_str(payload, path)?, path).map(AttributeValue::Binary),
        "BOOL" => match payload {
            Value::Bool(b) => Ok(AttributeValue::Bool(*b)),
            other => Err(wrong_payload(path, "boolean", other)),
        },
        "NULL" => match payload {
            Value::Bool(_) => Ok(AttributeValue::Null),
            other => Err(wrong_payload(path, "boolean", other)),
        },
        "L" => expect_array(payload, path)?
            .iter()
            .enumerate()
            .map(|(i, item)| decode(item, &format!("{path}[{i}]")))
            .collect::<Result<Vec<_>, _>>()
            .map(AttributeValue::List),
        "M" => match payload {
            Value::Object(map) => decode_item(map, path).map(AttributeValue::Map),
            other => Err(wrong_payload(path, "object", other)),
        },
        "SS" => expect_array(payload, path)?
            .iter()
            .enumerate()
            .map(|(i, item)| expect_str(item, &format!("{path}[{i}]")).map(str::to_string))
            .collect::<Result<Vec<_>, _>>()
            .map(AttributeValue::StringSet),
        "NS" => expect_array(payload, path)?
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let child = format!("{path}[{i}]");
                decode_number(expect_str(item, &child)?, &child)
            })
            .collect::<Result<Vec<_>, _>>()
            .map(AttributeValue::NumberSet),
        "BS" => expect_array(payload, path)?
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let child = format!("{path}[{i}]");
                decode_binary(expect_str(item, &child)?, &child)
            })
            .collect::<Result<Vec<_>, _>>()
            .map(AttributeValue::BinarySet),
        other => Err(DecodeError::UnknownTypeTag {
            path: path.to_string(),
            tag: other.to_string(),
        }),
    }
}

/// Encode a row snapshot back to wire form
#[must_use]
pub fn encode_item(item: &Attributes) -> Map<String, Value> {
    item.iter()
        .map(|(name, value)| (name.clone(), encode(value)))
        .collect()
}

/// Encode one value to wire form
#[must_use]
pub fn encode(value: &AttributeValue) -> Value {
    let (tag, payload) = match value {
        AttributeValue::Null => ("NULL", Value::Bool(true)),
        AttributeValue::Bool(b) => ("BOOL", Value::Bool(*b)),
        AttributeValue::String(s) => ("S", Value::String(s.clone())),
        AttributeValue::Number(n) => ("N", Value::String(n.to_string())),
        AttributeValue::Binary(bytes) => ("B", Value::String(STANDARD.encode(bytes))),
        AttributeValue::List(items) => ("L", Value::Array(items.iter().map(encode).collect())),
        AttributeValue::Map(map) => ("M", Value::Object(encode_item(map))),
        AttributeValue::StringSet(items) => (
            "SS",
            Value::Array(items.iter().cloned().map(Value::String).collect()),
        ),
        AttributeValue::NumberSet(items) => (
            "NS",
            Value::Array(items.iter().map(|n| Value::String(n.to_string())).collect()),
        ),
        AttributeValue::BinarySet(items) => (
            "BS",
            Value::Array(
                items
                    .iter()
                    .map(|bytes| Value::String(STANDARD.encode(bytes)))
                    .collect(),
            ),
        ),
    };

    let mut tagged = Map::with_capacity(1);
    tagged.insert(tag.to_string(), payload);
    Value::Object(tagged)
}

fn decode_number(raw: &str, path: &str) -> Result<Number, DecodeError> {
    Number::parse(raw).ok_or_else(|| DecodeError::InvalidNumber {
        path: path.to_string(),
        raw: raw.to_string(),
    })
}

fn decode_binary(raw: &str, path: &str) -> Result<Vec<u8>, DecodeError> {
    STANDARD.decode(raw).map_err(|e| DecodeError::InvalidBinary {
        path: path.to_string(),
        reason: e.to_string(),
    })
}

fn expect_str<'a>(payload: &'a Value, path: &str) -> Result<&'a str, DecodeError> {
    payload
        .as_str()
        .ok_or_else(|| wrong_payload(path, "string", payload))
}

fn expect_array<'a>(payload: &'a Value, path: &str) -> Result<&'a Vec<Value>, DecodeError> {
    payload
        .as_array()
        .ok_or_else(|| wrong_payload(path, "array", payload))
}

fn wrong_payload(path: &str, expected: &str, found: &Value) -> DecodeError {
    let found = match found {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    };
    DecodeError::malformed(path, format!("expected {expected} payload, found {found}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use serde_json::json;

    fn decode_at(value: Value) -> Result<AttributeValue, DecodeError> {
        decode(&value, "NewImage.attr")
    }

    #[test]
    fn decodes_scalars() {
        assert_eq!(
            decode_at(json!({ "S": "product#1" })).unwrap(),
            AttributeValue::from("product#1")
        );
        assert_eq!(decode_at(json!({ "N": "42" })).unwrap(), AttributeValue::from(42));
        assert_eq!(decode_at(json!({ "BOOL": false })).unwrap(), AttributeValue::Bool(false));
        assert_eq!(decode_at(json!({ "NULL": true })).unwrap(), AttributeValue::Null);
        assert_eq!(
            decode_at(json!({ "B": "aGk=" })).unwrap(),
            AttributeValue::Binary(b"hi".to_vec())
        );
    }

    #[test]
    fn numbers_keep_precision() {
        let big = "12345678901234567890.123456";
        let decoded = decode_at(json!({ "N": big })).unwrap();
        assert_eq!(decoded.as_number().unwrap().as_str(), big);
    }

    #[test]
    fn numbers_accept_scientific_notation() {
        let decoded = decode_at(json!({ "N": "1.5E2" })).unwrap();
        assert_eq!(
            decoded.as_number().and_then(Number::to_decimal),
            Some(Decimal::from(150))
        );
    }

    #[test]
    fn negative_and_fractional_numbers() {
        let decoded = decode_at(json!({ "N": "-0.25" })).unwrap();
        assert_eq!(
            decoded.as_number().and_then(Number::to_decimal),
            Some(Decimal::new(-25, 2))
        );
    }

    #[test]
    fn numbers_at_store_extremes_decode() {
        for raw in ["1E+30", "1E-130", "99999999999999999999999999999999999999"] {
            let decoded = decode_at(json!({ "N": raw })).unwrap();
            assert_eq!(decoded.as_number().unwrap().as_str(), raw);
        }
    }

    #[test]
    fn extreme_numbers_round_trip() {
        let wire = json!({ "views": { "N": "1E+30" }, "ratio": { "NS": ["1E-130", "2"] } });
        let item = decode_item(wire.as_object().unwrap(), "NewImage.productDetail").unwrap();
        assert_eq!(Value::Object(encode_item(&item)), wire);
    }

    #[test]
    fn rejects_invalid_number() {
        let err = decode_at(json!({ "N": "twelve" })).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidNumber { .. }));
    }

    #[test]
    fn rejects_unknown_tag() {
        let err = decode_at(json!({ "X": "?" })).unwrap_err();
        match err {
            DecodeError::UnknownTypeTag { path, tag } => {
                assert_eq!(path, "NewImage.attr");
                assert_eq!(tag, "X");
            }
            other => panic!("expected UnknownTypeTag, got {other:?}"),
        }
    }

    #[test]
    fn rejects_untagged_and_multi_tag_values() {
        assert!(matches!(
            decode_at(json!("bare")).unwrap_err(),
            DecodeError::MalformedValue { .. }
        ));
        assert!(matches!(
            decode_at(json!({})).unwrap_err(),
            DecodeError::MalformedValue { .. }
        ));
        assert!(matches!(
            decode_at(json!({ "S": "a", "N": "1" })).unwrap_err(),
            DecodeError::MalformedValue { .. }
        ));
    }

    #[test]
    fn rejects_wrong_payload_type() {
        let err = decode_at(json!({ "N": 5 })).unwrap_err();
        assert!(err.to_string().contains("expected string payload, found number"));
    }

    #[test]
    fn decodes_nested_collections() {
        let decoded = decode_at(json!({
            "M": {
                "tags": { "SS": ["a", "b"] },
                "sizes": { "NS": ["1", "2.5"] },
                "history": { "L": [{ "N": "1" }, { "NULL": true }] }
            }
        }))
        .unwrap();

        let AttributeValue::Map(map) = decoded else {
            panic!("expected map");
        };
        assert_eq!(
            map["tags"],
            AttributeValue::StringSet(vec!["a".to_string(), "b".to_string()])
        );
        assert_eq!(
            map["sizes"],
            AttributeValue::NumberSet(vec![Number::from(1), Number::from(Decimal::new(25, 1))])
        );
        assert_eq!(
            map["history"],
            AttributeValue::List(vec![AttributeValue::from(1), AttributeValue::Null])
        );
    }

    #[test]
    fn nested_error_reports_full_path() {
        let err = decode_at(json!({
            "M": { "lines": { "L": [{ "N": "1" }, { "Q": "?" }] } }
        }))
        .unwrap_err();
        match err {
            DecodeError::UnknownTypeTag { path, .. } => {
                assert_eq!(path, "NewImage.attr.lines[1]");
            }
            other => panic!("expected UnknownTypeTag, got {other:?}"),
        }
    }

    #[test]
    fn encode_matches_input_form() {
        let wire = json!({
            "pk": { "S": "cart#1" },
            "quantity": { "N": "3" },
            "detail": { "M": { "gift": { "BOOL": true } } }
        });
        let item = decode_item(wire.as_object().unwrap(), "NewImage").unwrap();
        assert_eq!(Value::Object(encode_item(&item)), wire);
    }
}
