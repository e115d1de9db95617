//! The bridge between the wire payloads and [`CalcValue`]s.
//!
//! Per-value byte handling is delegated to the `rmpv` MessagePack
//! implementation; this module only enforces the registered type
//! descriptors on top of it. Records travel in map form, field name to
//! value.

use crate::codec::{
    timestamp::TIMESTAMP_EXT_TYPE, CalcValue, Timestamp, TypeDesc,
};
use rmpv::Value;

/// An error of the value codec.
///
/// The `kind` is a stable name that becomes the `code` of the Failure frame
/// when argument decoding fails.
#[derive(Debug)]
pub(crate) struct CodecError {
    kind: &'static str,
    message: String,
}

impl CodecError {
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    fn type_mismatch(message: String) -> Self {
        Self {
            kind: "TypeMismatch",
            message,
        }
    }

    fn malformed(message: String) -> Self {
        Self {
            kind: "Malformed",
            message,
        }
    }

    fn missing_field(message: String) -> Self {
        Self {
            kind: "MissingField",
            message,
        }
    }

    pub(crate) fn timestamp(message: String) -> Self {
        Self {
            kind: "Timestamp",
            message,
        }
    }
}

impl std::fmt::Display for CodecError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for CodecError {}

// Encode one value for the wire, checking it against the declared type.
// A mismatch here means the registered computation returned something
// other than its declared return type.
pub(crate) fn encode_value(value: &CalcValue, expected: &TypeDesc) -> Result<Vec<u8>, CodecError> {
    let msgpack_value = to_typed_msgpack(value, expected)?;
    let mut buf = Vec::new();
    rmpv::encode::write_value(&mut buf, &msgpack_value)
        .map_err(|e| CodecError::malformed(format!("value encoding failed: {e}")))?;
    Ok(buf)
}

// Decode one wire payload into the declared type.
pub(crate) fn decode_value(bytes: &[u8], expected: &TypeDesc) -> Result<CalcValue, CodecError> {
    let mut rdr = bytes;
    let msgpack_value = rmpv::decode::read_value(&mut rdr)
        .map_err(|e| CodecError::malformed(format!("not a MessagePack value: {e}")))?;
    from_typed_msgpack(msgpack_value, expected)
}

fn to_typed_msgpack(value: &CalcValue, expected: &TypeDesc) -> Result<Value, CodecError> {
    match (expected, value) {
        (TypeDesc::Boolean, CalcValue::Boolean(b)) => Ok(Value::Boolean(*b)),
        (TypeDesc::Integer, CalcValue::Integer(i)) => Ok(Value::from(*i)),
        (TypeDesc::Float, CalcValue::Float(d)) => Ok(Value::F64(*d)),
        (TypeDesc::Text, CalcValue::Text(s)) => Ok(Value::from(s.as_str())),
        (TypeDesc::Blob, CalcValue::Blob(b)) => Ok(Value::Binary(b.clone())),
        (TypeDesc::Timestamp, CalcValue::Timestamp(ts)) => {
            Ok(Value::Ext(TIMESTAMP_EXT_TYPE, ts.to_ext_bytes()))
        }
        (TypeDesc::Array(element_type), CalcValue::Array(items)) => Ok(Value::Array(
            items
                .iter()
                .map(|item| to_typed_msgpack(item, element_type))
                .collect::<Result<_, _>>()?,
        )),
        (TypeDesc::Record(field_types), CalcValue::Record(fields)) => {
            let mut entries = Vec::with_capacity(field_types.len());
            for (name, field_type) in field_types {
                let field_value = fields
                    .iter()
                    .find(|(field_name, _)| field_name == name)
                    .map(|(_, v)| v)
                    .ok_or_else(|| {
                        CodecError::missing_field(format!("record field \"{name}\" is missing"))
                    })?;
                entries.push((
                    Value::from(name.as_str()),
                    to_typed_msgpack(field_value, field_type)?,
                ));
            }
            Ok(Value::Map(entries))
        }
        (expected, got) => Err(CodecError::type_mismatch(format!(
            "expected a value of type {expected}, got a {} value",
            got.kind_name()
        ))),
    }
}

fn from_typed_msgpack(value: Value, expected: &TypeDesc) -> Result<CalcValue, CodecError> {
    match (expected, value) {
        (TypeDesc::Boolean, Value::Boolean(b)) => Ok(CalcValue::Boolean(b)),
        (TypeDesc::Integer, Value::Integer(i)) => i.as_i64().map(CalcValue::Integer).ok_or_else(
            || CodecError::type_mismatch(format!("integer {i} does not fit into 64 signed bits")),
        ),
        (TypeDesc::Float, Value::F64(d)) => Ok(CalcValue::Float(d)),
        (TypeDesc::Float, Value::F32(d)) => Ok(CalcValue::Float(f64::from(d))),
        // integer-encoded floats are common, take them as-is
        #[allow(clippy::cast_precision_loss)]
        (TypeDesc::Float, Value::Integer(i)) => i
            .as_i64()
            .map(|v| CalcValue::Float(v as f64))
            .ok_or_else(|| {
                CodecError::type_mismatch(format!("integer {i} does not fit into a float"))
            }),
        (TypeDesc::Text, Value::String(s)) => match s.into_str() {
            Some(s) => Ok(CalcValue::Text(s)),
            None => Err(CodecError::malformed(
                "text payload is not valid UTF-8".to_string(),
            )),
        },
        (TypeDesc::Blob, Value::Binary(b)) => Ok(CalcValue::Blob(b)),
        (TypeDesc::Timestamp, Value::Ext(ext_type, data)) => {
            if ext_type == TIMESTAMP_EXT_TYPE {
                Ok(CalcValue::Timestamp(Timestamp::from_ext_bytes(&data)?))
            } else {
                Err(CodecError::type_mismatch(format!(
                    "expected extended type {TIMESTAMP_EXT_TYPE} for a timestamp, got {ext_type}"
                )))
            }
        }
        (TypeDesc::Array(element_type), Value::Array(items)) => Ok(CalcValue::Array(
            items
                .into_iter()
                .map(|item| from_typed_msgpack(item, element_type))
                .collect::<Result<_, _>>()?,
        )),
        (TypeDesc::Record(field_types), Value::Map(entries)) => {
            let mut fields = Vec::with_capacity(field_types.len());
            for (name, field_type) in field_types {
                let entry = entries
                    .iter()
                    .find(|(key, _)| key.as_str() == Some(name.as_str()))
                    .map(|(_, v)| v.clone())
                    .ok_or_else(|| {
                        CodecError::missing_field(format!("record field \"{name}\" is missing"))
                    })?;
                fields.push((name.clone(), from_typed_msgpack(entry, field_type)?));
            }
            Ok(CalcValue::Record(fields))
        }
        (expected, got) => Err(CodecError::type_mismatch(format!(
            "expected a value of type {expected}, got {}",
            msgpack_kind(&got)
        ))),
    }
}

// Untyped conversion for the serde bridge; CalcValue is self-describing.
pub(crate) fn to_untyped_msgpack(value: &CalcValue) -> Value {
    match value {
        CalcValue::Boolean(b) => Value::Boolean(*b),
        CalcValue::Integer(i) => Value::from(*i),
        CalcValue::Float(d) => Value::F64(*d),
        CalcValue::Text(s) => Value::from(s.as_str()),
        CalcValue::Blob(b) => Value::Binary(b.clone()),
        CalcValue::Timestamp(ts) => Value::Ext(TIMESTAMP_EXT_TYPE, ts.to_ext_bytes()),
        CalcValue::Array(items) => Value::Array(items.iter().map(to_untyped_msgpack).collect()),
        CalcValue::Record(fields) => Value::Map(
            fields
                .iter()
                .map(|(name, v)| (Value::from(name.as_str()), to_untyped_msgpack(v)))
                .collect(),
        ),
    }
}

pub(crate) fn from_untyped_msgpack(value: Value) -> Result<CalcValue, CodecError> {
    match value {
        Value::Boolean(b) => Ok(CalcValue::Boolean(b)),
        Value::Integer(i) => i.as_i64().map(CalcValue::Integer).ok_or_else(|| {
            CodecError::type_mismatch(format!("integer {i} does not fit into 64 signed bits"))
        }),
        Value::F32(d) => Ok(CalcValue::Float(f64::from(d))),
        Value::F64(d) => Ok(CalcValue::Float(d)),
        Value::String(s) => match s.into_str() {
            Some(s) => Ok(CalcValue::Text(s)),
            None => Err(CodecError::malformed(
                "text payload is not valid UTF-8".to_string(),
            )),
        },
        Value::Binary(b) => Ok(CalcValue::Blob(b)),
        Value::Ext(ext_type, data) if ext_type == TIMESTAMP_EXT_TYPE => {
            Ok(CalcValue::Timestamp(Timestamp::from_ext_bytes(&data)?))
        }
        Value::Array(items) => Ok(CalcValue::Array(
            items
                .into_iter()
                .map(from_untyped_msgpack)
                .collect::<Result<_, _>>()?,
        )),
        Value::Map(entries) => Ok(CalcValue::Record(
            entries
                .into_iter()
                .map(|(key, v)| match key {
                    Value::String(s) => match s.into_str() {
                        Some(name) => Ok((name, from_untyped_msgpack(v)?)),
                        None => Err(CodecError::malformed(
                            "record field name is not valid UTF-8".to_string(),
                        )),
                    },
                    other => Err(CodecError::type_mismatch(format!(
                        "record field names must be strings, got {}",
                        msgpack_kind(&other)
                    ))),
                })
                .collect::<Result<_, _>>()?,
        )),
        other => Err(CodecError::type_mismatch(format!(
            "{} has no calculation value representation",
            msgpack_kind(&other)
        ))),
    }
}

fn msgpack_kind(value: &Value) -> &'static str {
    match value {
        Value::Nil => "a nil value",
        Value::Boolean(_) => "a boolean value",
        Value::Integer(_) => "an integer value",
        Value::F32(_) | Value::F64(_) => "a float value",
        Value::String(_) => "a string value",
        Value::Binary(_) => "a binary value",
        Value::Array(_) => "an array value",
        Value::Map(_) => "a map value",
        Value::Ext(_, _) => "an extended-type value",
    }
}
