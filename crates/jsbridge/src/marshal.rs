//! Host → JavaScript value conversion

use rquickjs::{Array, BigInt as JsBigInt, Ctx, Function, IntoJs, Value as JsValue};

use jsbridge_types::Value;

use crate::error::JsResult;
use crate::unmarshal::{DEFAULT_MAX_DEPTH, descend};

/// Convert a host value into a value owned by `ctx`
///
/// Shapes the VM has no counterpart for become `null`. This includes host
/// mappings: unlike the reverse direction, objects are not carried into the
/// VM, and scripts may rely on receiving `null` for them.
pub fn to_foreign<'js>(ctx: &Ctx<'js>, value: &Value) -> JsResult<JsValue<'js>> {
    to_foreign_bounded(ctx, value, DEFAULT_MAX_DEPTH)
}

/// Like [`to_foreign`], failing with [`JsError::DepthExceeded`] past
/// `max_depth` levels of nested sequences
///
/// [`JsError::DepthExceeded`]: crate::error::JsError::DepthExceeded
pub fn to_foreign_bounded<'js>(
    ctx: &Ctx<'js>,
    value: &Value,
    max_depth: usize,
) -> JsResult<JsValue<'js>> {
    convert(ctx, value, 0, max_depth)
}

fn convert<'js>(
    ctx: &Ctx<'js>,
    value: &Value,
    depth: usize,
    max_depth: usize,
) -> JsResult<JsValue<'js>> {
    let foreign = match value {
        Value::Bool(b) => JsValue::new_bool(ctx.clone(), *b),
        Value::Int(i) => (*i).into_js(ctx)?,
        Value::UInt(u) => JsBigInt::from_u64(ctx.clone(), *u)?.into_value(),
        Value::BigInt(big) => {
            let constructor: Function = ctx.globals().get("BigInt")?;
            constructor.call::<_, JsValue>((big.to_string(),))?
        }
        Value::Float(f) => JsValue::new_float(ctx.clone(), *f),
        Value::String(s) => s.as_str().into_js(ctx)?,
        Value::Array(items) => {
            let depth = descend(depth, max_depth)?;
            let array = Array::new(ctx.clone())?;
            for (index, item) in items.iter().enumerate() {
                array.set(index, convert(ctx, item, depth, max_depth)?)?;
            }
            array.into_value()
        }
        // TODO: marshal mappings into plain objects once callers stop relying
        // on receiving null for them.
        Value::Null | Value::Object(_) => JsValue::new_null(ctx.clone()),
    };
    Ok(foreign)
}
