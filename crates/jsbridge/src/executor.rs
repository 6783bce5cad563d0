//! Script Executor
//!
//! Evaluates source text and reads/writes globals of a cached VM, crossing
//! the value boundary through the marshaler and unmarshaler.

use rquickjs::context::EvalOptions;
use rquickjs::convert::Coerced;
use rquickjs::{Ctx, Value as JsValue};

use jsbridge_types::Value;

use crate::error::{JsError, JsResult};
use crate::marshal::to_foreign_bounded;
use crate::unmarshal::to_host_bounded;
use crate::vm::JsVm;

/// Evaluate `source` in the VM's global environment
///
/// Scripts run as sloppy-mode global code, so undeclared assignments create
/// globals and legacy syntax such as octal literals is accepted.
pub fn evaluate(vm: &JsVm, source: &str) -> JsResult<Value> {
    in_context(vm, |ctx| {
        let mut options = EvalOptions::default();
        options.global = true;
        options.strict = false;

        let result: JsValue = ctx.eval_with_options(source, options)?;
        to_host_bounded(result, vm.max_depth())
    })
}

/// Bind a host value to the global `name`
pub fn set_global(vm: &JsVm, name: &str, value: &Value) -> JsResult<()> {
    in_context(vm, |ctx| {
        let foreign = to_foreign_bounded(ctx, value, vm.max_depth())?;
        ctx.globals().set(name, foreign)?;
        Ok(())
    })
}

/// Read the global `name`; absent globals read as null
pub fn get_global(vm: &JsVm, name: &str) -> JsResult<Value> {
    in_context(vm, |ctx| {
        let value: JsValue = ctx.globals().get(name)?;
        to_host_bounded(value, vm.max_depth())
    })
}

/// Run `f` inside the VM's context. A pending exception left by any step
/// (evaluation, a throwing getter or setter, conversion) is taken off the
/// context and returned as [`JsError::Eval`].
fn in_context<T>(vm: &JsVm, f: impl for<'js> FnOnce(&Ctx<'js>) -> JsResult<T>) -> JsResult<T> {
    vm.context().with(|ctx| match f(&ctx) {
        Err(JsError::Engine(rquickjs::Error::Exception)) => Err(caught(&ctx)),
        other => other,
    })
}

/// Take the pending exception and describe it by its text and, for `Error`
/// objects, its stack.
fn caught(ctx: &Ctx<'_>) -> JsError {
    let thrown = ctx.catch();
    let cause = thrown
        .get::<Coerced<String>>()
        .map(|Coerced(text)| text)
        .unwrap_or_else(|_| "uncaught exception".to_string());
    let stack = thrown
        .as_object()
        .and_then(|obj| obj.get::<_, Option<String>>("stack").ok().flatten())
        .filter(|stack| !stack.is_empty());

    JsError::Eval { cause, stack }
}
