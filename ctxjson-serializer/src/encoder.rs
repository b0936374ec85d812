//! Hand-off to the JSON encoder.
//!
//! The engine only ever produces maps with string keys, arrays and scalars;
//! this module turns scalars into JSON leaves and the finished tree into bytes.

use serde_json::{Number, Value as JsonValue};

use crate::error::{MarshalError, Result};
use crate::value::Primitive;

/// Convert a scalar into a JSON leaf. Non-finite floats have no JSON form.
pub fn primitive(value: Primitive<'_>) -> Result<JsonValue> {
    Ok(match value {
        Primitive::Bool(b) => JsonValue::Bool(b),
        Primitive::Int(i) => JsonValue::Number(i.into()),
        Primitive::UInt(u) => JsonValue::Number(u.into()),
        Primitive::Float(f) => JsonValue::Number(Number::from_f64(f).ok_or_else(|| {
            MarshalError::UnsupportedValue(format!("json: unsupported float value {f}"))
        })?),
        Primitive::Float32(f) => JsonValue::Number(float32(f)?),
        Primitive::Str(s) => JsonValue::String(s.into_owned()),
    })
}

/// Number for an `f32` written at 32-bit precision: the `f64` sharing its
/// shortest decimal form, so `0.1f32` encodes as `0.1`.
fn float32(f: f32) -> Result<Number> {
    let unsupported =
        || MarshalError::UnsupportedValue(format!("json: unsupported float value {f}"));
    if !f.is_finite() {
        return Err(unsupported());
    }
    f.to_string()
        .parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .ok_or_else(unsupported)
}

/// Encode a primitive tree. Object keys come out in lexicographic order.
pub fn encode(tree: &JsonValue) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(tree)?)
}

/// Same bytes as [`encode`], as a `String`.
pub fn encode_string(tree: &JsonValue) -> Result<String> {
    Ok(serde_json::to_string(tree)?)
}

/// Indented with two spaces per level.
pub fn encode_string_pretty(tree: &JsonValue) -> Result<String> {
    Ok(serde_json::to_string_pretty(tree)?)
}
