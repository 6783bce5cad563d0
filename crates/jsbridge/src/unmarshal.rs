//! JavaScript → host value conversion
//!
//! Every function here takes the foreign value by value. Handles are released
//! on drop, so each call frees exactly the handle it was given on every exit
//! path, and a failed enumeration still releases the children it produced.

use indexmap::IndexMap;
use num_bigint::BigInt;
use rquickjs::convert::Coerced;
use rquickjs::{Filter, Object, Type, Value as JsValue};

use jsbridge_types::Value;

use crate::error::{JsError, JsResult};

/// Nesting bound used by [`to_host`]
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Convert a foreign value into a host value, consuming it
pub fn to_host(value: JsValue<'_>) -> JsResult<Value> {
    to_host_bounded(value, DEFAULT_MAX_DEPTH)
}

/// Like [`to_host`], failing with [`JsError::DepthExceeded`] past `max_depth`
/// levels of arrays and objects (cyclic graphs included)
pub fn to_host_bounded(value: JsValue<'_>, max_depth: usize) -> JsResult<Value> {
    convert(value, 0, max_depth)
}

fn convert(value: JsValue<'_>, depth: usize, max_depth: usize) -> JsResult<Value> {
    if value.is_function() {
        return Ok(Value::Null);
    }

    match value.type_of() {
        Type::Int | Type::Float => Ok(number_to_host(value.get::<f64>()?)),
        Type::BigInt => big_int_to_host(&value),
        Type::Bool => Ok(Value::Bool(value.get::<bool>()?)),
        _ if value.is_null() || value.is_undefined() => Ok(Value::Null),
        Type::String => Ok(Value::String(value.get::<String>()?)),
        Type::Array => {
            let Some(array) = value.into_object() else {
                return Ok(Value::Null);
            };
            let depth = descend(depth, max_depth)?;

            let mut items = Vec::new();
            for prop in array.own_props::<String, JsValue>(own_string_keys()) {
                let (name, child) = prop?;
                if name != "length" {
                    items.push(convert(child, depth, max_depth)?);
                }
            }
            Ok(Value::Array(items))
        }
        // Errors, promises, dates and other object-tagged values are read as
        // plain objects through their own properties.
        _ if value.is_object() => {
            let Some(object) = value.into_object() else {
                return Ok(Value::Null);
            };
            let depth = descend(depth, max_depth)?;
            Ok(Value::Object(object_fields(&object, depth, max_depth)?))
        }
        _ => Ok(Value::Null),
    }
}

/// Step one level deeper, failing once `max_depth` levels are in use
pub(crate) fn descend(depth: usize, max_depth: usize) -> JsResult<usize> {
    if depth >= max_depth {
        return Err(JsError::DepthExceeded(max_depth));
    }
    Ok(depth + 1)
}

fn object_fields(
    object: &Object<'_>,
    depth: usize,
    max_depth: usize,
) -> JsResult<IndexMap<String, Value>> {
    let mut fields = IndexMap::new();
    for prop in object.own_props::<String, JsValue>(own_string_keys()) {
        let (name, child) = prop?;
        let child = convert(child, depth, max_depth)?;
        fields.insert(name, child);
    }
    Ok(fields)
}

/// Own string-keyed properties, enumerable or not
fn own_string_keys() -> Filter {
    Filter::new().string()
}

/// Integral numbers become `Int`; anything with a fraction, out of range, or
/// non-finite stays `Float`.
fn number_to_host(n: f64) -> Value {
    const LIMIT: f64 = 9_223_372_036_854_775_808.0; // 2^63

    if n.fract() == 0.0 && n >= -LIMIT && n < LIMIT {
        Value::Int(n as i64)
    } else {
        Value::Float(n)
    }
}

fn big_int_to_host(value: &JsValue<'_>) -> JsResult<Value> {
    let Coerced(digits) = value.get::<Coerced<String>>()?;

    if let Ok(u) = digits.parse::<u64>() {
        return Ok(Value::UInt(u));
    }
    if let Ok(i) = digits.parse::<i64>() {
        return Ok(Value::Int(i));
    }
    match digits.parse::<BigInt>() {
        Ok(big) => Ok(Value::BigInt(big)),
        Err(_) => Ok(Value::Null),
    }
}
