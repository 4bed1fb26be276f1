//! Schema-driven conversion between [`WireValue`] documents and records.
//!
//! Decoding is strict about kinds and mandatory fields and lenient about
//! everything else: unknown keys are ignored, and `Null` is the same as an
//! absent key. Numbers form one family; every numeric wire tag is accepted
//! wherever its value is representable in the field's kind.
//!
//! Unsigned 64-bit fields encode as [`WireValue::Double`], so values above
//! 2^53 lose precision on the way out. Decoding a double truncates toward
//! zero.

use crate::DecodeError;
use crate::record::{Record, Value, WireObject};
use crate::schema::{FieldKind, ObjectSchema};
use crate::validate::first_missing_field;
use crate::wire::{WireMap, WireValue};

/// 2^64 as a double; the first value that no longer fits a `u64`.
const U64_LIMIT: f64 = 18_446_744_073_709_551_616.0;
/// 2^63 as a double.
const I64_LIMIT: f64 = 9_223_372_036_854_775_808.0;

/// Decodes `wire` against `schema`.
///
/// # Errors
///
/// - [`DecodeError::UnexpectedType`] when `wire` is not a map, or a field
///   holds a value of the wrong kind.
/// - [`DecodeError::MissingMandatoryField`] naming the first mandatory field
///   that is absent or null.
/// - [`DecodeError::UnexpectedValue`] for numbers outside a field's range.
/// - [`DecodeError::UnknownEnumVariant`] for strings missing from an enum
///   table.
pub fn decode(wire: &WireValue, schema: &'static ObjectSchema) -> Result<Record, DecodeError> {
    match wire {
        WireValue::Map(map) => decode_map(map, schema),
        other => Err(unexpected(other)),
    }
}

/// Encodes `record` as a wire map. Omitted optional fields become `Null`.
#[must_use]
pub fn encode(record: &Record) -> WireValue {
    WireValue::Map(encode_map(record))
}

/// Decodes `wire` straight into a typed object.
///
/// # Errors
///
/// See [`decode`].
pub fn decode_object<T: WireObject>(wire: &WireValue) -> Result<T, DecodeError> {
    decode(wire, T::SCHEMA).and_then(T::from_record)
}

/// Encodes a typed object.
#[must_use]
pub fn encode_object<T: WireObject>(object: &T) -> WireValue {
    encode(&object.to_record())
}

/// Decodes a wire list of objects; the first failing element aborts.
///
/// # Errors
///
/// [`DecodeError::UnexpectedType`] when `wire` is not a list, or any
/// element's decode error.
pub fn decode_list<T: WireObject>(wire: &WireValue) -> Result<Vec<T>, DecodeError> {
    match wire {
        WireValue::List(items) => items.iter().map(decode_object).collect(),
        other => Err(unexpected(other)),
    }
}

/// Encodes a slice of typed objects as a wire list.
#[must_use]
pub fn encode_list<T: WireObject>(objects: &[T]) -> WireValue {
    WireValue::List(objects.iter().map(encode_object).collect())
}

fn decode_map(map: &WireMap, schema: &'static ObjectSchema) -> Result<Record, DecodeError> {
    if let Some(field) = first_missing_field(map, schema.mandatory_names()) {
        return Err(DecodeError::MissingMandatoryField {
            field,
            object: schema.name,
        });
    }

    let mut record = Record::new(schema);
    for (index, spec) in schema.fields.iter().enumerate() {
        match map.get(spec.name) {
            None | Some(WireValue::Null) => {}
            Some(raw) => record.put(index, decode_value(raw, spec.kind, spec.name)?),
        }
    }
    Ok(record)
}

fn decode_value(raw: &WireValue, kind: FieldKind, field: &'static str) -> Result<Value, DecodeError> {
    match kind {
        FieldKind::Bool => match raw {
            WireValue::Bool(b) => Ok(Value::Bool(*b)),
            other => Err(unexpected(other)),
        },
        FieldKind::Int => signed(raw, field).map(Value::Int),
        FieldKind::UInt32 => {
            let n = signed(raw, field)?;
            u32::try_from(n)
                .map(Value::UInt32)
                .map_err(|_| DecodeError::UnexpectedValue(field))
        }
        FieldKind::UInt64 => unsigned(raw, field).map(Value::UInt64),
        FieldKind::Double => match raw {
            WireValue::Double(d) => Ok(Value::Double(*d)),
            WireValue::Int(i) => Ok(Value::Double(*i as f64)),
            WireValue::UInt64(u) => Ok(Value::Double(*u as f64)),
            other => Err(unexpected(other)),
        },
        FieldKind::String => match raw {
            WireValue::String(s) => Ok(Value::String(s.clone())),
            other => Err(unexpected(other)),
        },
        FieldKind::Bytes => bytes(raw).map(Value::Bytes),
        FieldKind::Enum(table) => match raw {
            WireValue::String(s) => table
                .lookup(s)
                .map(Value::Enum)
                .ok_or_else(|| DecodeError::UnknownEnumVariant(s.clone())),
            other => Err(unexpected(other)),
        },
        FieldKind::Object(schema) => match raw {
            WireValue::Map(map) => decode_map(map, schema).map(Value::Object),
            other => Err(unexpected(other)),
        },
        FieldKind::List(element) => match raw {
            WireValue::List(items) => items
                .iter()
                .map(|item| decode_value(item, *element, field))
                .collect::<Result<_, _>>()
                .map(Value::List),
            other => Err(unexpected(other)),
        },
    }
}

#[allow(clippy::cast_possible_truncation)] // range checked before casting
fn signed(raw: &WireValue, field: &'static str) -> Result<i64, DecodeError> {
    match raw {
        WireValue::Int(i) => Ok(*i),
        WireValue::UInt64(u) => i64::try_from(*u).map_err(|_| DecodeError::UnexpectedValue(field)),
        WireValue::Double(d) => {
            if d.is_finite() && d.fract() == 0.0 && *d >= -I64_LIMIT && *d < I64_LIMIT {
                Ok(*d as i64)
            } else {
                Err(DecodeError::UnexpectedValue(field))
            }
        }
        other => Err(unexpected(other)),
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // range checked before casting
fn unsigned(raw: &WireValue, field: &'static str) -> Result<u64, DecodeError> {
    match raw {
        WireValue::UInt64(u) => Ok(*u),
        WireValue::Int(i) => u64::try_from(*i).map_err(|_| DecodeError::UnexpectedValue(field)),
        WireValue::Double(d) => {
            let truncated = d.trunc();
            if truncated.is_finite() && truncated >= 0.0 && truncated < U64_LIMIT {
                Ok(truncated as u64)
            } else {
                Err(DecodeError::UnexpectedValue(field))
            }
        }
        other => Err(unexpected(other)),
    }
}

fn bytes(raw: &WireValue) -> Result<Vec<u8>, DecodeError> {
    match raw {
        WireValue::ByteList(bytes) => Ok(bytes.clone()),
        WireValue::List(items) => items.iter().map(byte).collect(),
        other => Err(unexpected(other)),
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn byte(item: &WireValue) -> Result<u8, DecodeError> {
    let parsed = match item {
        WireValue::Int(i) => u8::try_from(*i).ok(),
        WireValue::UInt64(u) => u8::try_from(*u).ok(),
        WireValue::Double(d) if d.fract() == 0.0 && (0.0..=255.0).contains(d) => Some(*d as u8),
        _ => None,
    };
    parsed.ok_or_else(|| unexpected(item))
}

fn unexpected(observed: &WireValue) -> DecodeError {
    DecodeError::UnexpectedType(observed.type_name().to_owned())
}

fn encode_map(record: &Record) -> WireMap {
    record
        .fields()
        .map(|(spec, value)| {
            let wire = value.map_or(WireValue::Null, encode_value);
            (spec.name.to_owned(), wire)
        })
        .collect()
}

fn encode_value(value: &Value) -> WireValue {
    match value {
        Value::Bool(b) => WireValue::Bool(*b),
        Value::Int(i) => WireValue::Int(*i),
        Value::UInt32(u) => WireValue::Int(i64::from(*u)),
        Value::UInt64(u) => WireValue::Double(*u as f64),
        Value::Double(d) => WireValue::Double(*d),
        Value::String(s) => WireValue::String(s.clone()),
        Value::Bytes(bytes) => WireValue::ByteList(bytes.clone()),
        Value::Enum(variant) => WireValue::String(variant.wire.to_owned()),
        Value::Object(record) => encode(record),
        Value::List(items) => WireValue::List(items.iter().map(encode_value).collect()),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::schema::{EnumSchema, EnumVariant, FieldSpec};

    static SHADE: EnumSchema = EnumSchema {
        name: "Shade",
        variants: &[
            EnumVariant {
                symbol: "LIGHT",
                wire: "light",
            },
            EnumVariant {
                symbol: "DARK",
                wire: "dark",
            },
        ],
    };

    static TILE: ObjectSchema = ObjectSchema {
        name: "Tile",
        fields: &[
            FieldSpec {
                name: "id",
                mandatory: true,
                kind: FieldKind::UInt64,
            },
            FieldSpec {
                name: "shade",
                mandatory: true,
                kind: FieldKind::Enum(&SHADE),
            },
            FieldSpec {
                name: "seed",
                mandatory: false,
                kind: FieldKind::Bytes,
            },
        ],
    };

    static BOARD: ObjectSchema = ObjectSchema {
        name: "Board",
        fields: &[
            FieldSpec {
                name: "title",
                mandatory: true,
                kind: FieldKind::String,
            },
            FieldSpec {
                name: "tiles",
                mandatory: true,
                kind: FieldKind::List(&FieldKind::Object(&TILE)),
            },
            FieldSpec {
                name: "width",
                mandatory: false,
                kind: FieldKind::UInt32,
            },
        ],
    };

    fn wire(value: serde_json::Value) -> WireValue {
        WireValue::from(value)
    }

    #[test]
    fn decodes_nested_lists() {
        let record = decode(
            &wire(json!({
                "title": "b",
                "tiles": [{"id": 1.0, "shade": "dark"}, {"id": 2, "shade": "LIGHT", "seed": [1, 2]}],
                "extra": "ignored",
            })),
            &BOARD,
        )
        .unwrap();
        let Some(Value::List(tiles)) = record.get("tiles") else {
            panic!("tiles missing");
        };
        assert_eq!(tiles.len(), 2);
        let Value::Object(second) = &tiles[1] else {
            panic!("not an object");
        };
        assert_eq!(second.get("seed"), Some(&Value::Bytes(vec![1, 2])));
        assert_eq!(record.get("width"), None);
    }

    #[test]
    fn non_map_input_is_unexpected_type() {
        let err = decode(&WireValue::List(vec![]), &BOARD).unwrap_err();
        assert_eq!(err, DecodeError::UnexpectedType("List".into()));
    }

    #[test]
    fn nested_missing_field_names_nested_type() {
        let err = decode(
            &wire(json!({"title": "b", "tiles": [{"id": 1.0}]})),
            &BOARD,
        )
        .unwrap_err();
        assert_eq!(
            err,
            DecodeError::MissingMandatoryField {
                field: "shade",
                object: "Tile"
            }
        );
    }

    #[test]
    fn first_element_failure_aborts_the_list() {
        let err = decode(
            &wire(json!({"title": "b", "tiles": [{"id": 1, "shade": "mauve"}, {"id": "x"}]})),
            &BOARD,
        )
        .unwrap_err();
        assert_eq!(err, DecodeError::UnknownEnumVariant("mauve".into()));
    }

    #[test]
    fn unsigned_doubles_truncate_toward_zero() {
        let record = decode(&wire(json!({"id": 41.9, "shade": "dark"})), &TILE).unwrap();
        assert_eq!(record.get("id"), Some(&Value::UInt64(41)));
    }

    #[test]
    fn negative_or_nan_unsigned_is_rejected() {
        for bad in [WireValue::Double(-3.0), WireValue::Double(f64::NAN), WireValue::Int(-1)] {
            let input = WireValue::map([("id", bad), ("shade", WireValue::from("dark"))]);
            assert_eq!(
                decode(&input, &TILE).unwrap_err(),
                DecodeError::UnexpectedValue("id")
            );
        }
    }

    #[test]
    fn unsigned_from_string_is_unexpected_type() {
        let err = decode(&wire(json!({"id": "1", "shade": "dark"})), &TILE).unwrap_err();
        assert_eq!(err, DecodeError::UnexpectedType("String".into()));
    }

    #[test]
    fn out_of_range_bytes_are_unexpected_type() {
        let err = decode(
            &wire(json!({"id": 1, "shade": "dark", "seed": [1, 256]})),
            &TILE,
        )
        .unwrap_err();
        assert_eq!(err, DecodeError::UnexpectedType("Int".into()));
    }

    #[test]
    fn u32_overflow_is_unexpected_value() {
        let err = decode(
            &wire(json!({"title": "b", "tiles": [], "width": 5_000_000_000_u64})),
            &BOARD,
        )
        .unwrap_err();
        assert_eq!(err, DecodeError::UnexpectedValue("width"));
    }

    #[test]
    fn encode_writes_null_for_omitted_optionals() {
        let record = Record::new(&TILE)
            .with("id", 7_u64)
            .with("shade", SHADE.lookup("light").unwrap());
        let encoded = encode(&record);
        assert_eq!(
            encoded,
            WireValue::map([
                ("id", WireValue::Double(7.0)),
                ("shade", WireValue::from("light")),
                ("seed", WireValue::Null),
            ])
        );
        assert_eq!(decode(&encoded, &TILE).unwrap(), record);
    }

    #[test]
    fn bytes_round_trip() {
        let record = Record::new(&TILE)
            .with("id", 1_u64)
            .with("shade", SHADE.lookup("dark").unwrap())
            .with("seed", Value::Bytes(vec![0, 128, 255]));
        assert_eq!(decode(&encode(&record), &TILE).unwrap(), record);
    }

    #[test]
    fn large_unsigned_values_lose_precision() {
        let big = (1_u64 << 53) + 1;
        let record = Record::new(&TILE)
            .with("id", big)
            .with("shade", SHADE.lookup("dark").unwrap());
        let back = decode(&encode(&record), &TILE).unwrap();
        assert_eq!(back.get("id"), Some(&Value::UInt64(1 << 53)));
    }
}
