//! JavaScript Global Objects
//!
//! Registers the host-callable bindings every fresh VM starts with.

use rquickjs::convert::Coerced;
use rquickjs::function::Opt;
use rquickjs::{Ctx, Function, Object, Result as QjsResult, Value as JsValue};

use crate::scope::ScopeLog;

/// Pins the closure to a signature that is generic over the context lifetime.
fn host_fn<F>(f: F) -> F
where
    F: for<'js> Fn(Ctx<'js>, Opt<Coerced<String>>) -> JsValue<'js> + Send + 'static,
{
    f
}

/// Register `console.log`, forwarding its first argument to the scope log
pub fn register_console(ctx: &Ctx<'_>, log: ScopeLog) -> QjsResult<()> {
    let console = Object::new(ctx.clone())?;

    let log_fn = host_fn(move |ctx, message| {
        let text = message
            .0
            .map(|m| m.0)
            .unwrap_or_else(|| "undefined".to_string());
        log.log(format!("JSVM: {}", text));
        JsValue::new_null(ctx)
    });
    console.set("log", Function::new(ctx.clone(), log_fn)?)?;

    ctx.globals().set("console", console)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VmConfig;
    use crate::scope::Scope;
    use rquickjs::{Context, Runtime};

    #[test]
    fn test_console_log_forwards_first_argument() {
        let (scope, mut rx) = Scope::with_log_channel(VmConfig::default());
        let runtime = Runtime::new().unwrap();
        let context = Context::full(&runtime).unwrap();

        context.with(|ctx| {
            register_console(&ctx, scope.log_channel().clone()).unwrap();

            let result: JsValue = ctx.eval("console.log('hello', 'ignored')").unwrap();
            assert!(result.is_null());

            let _: JsValue = ctx.eval("console.log(40 + 2)").unwrap();
            let _: JsValue = ctx.eval("console.log()").unwrap();
        });

        assert_eq!(rx.try_recv().unwrap(), "JSVM: hello");
        assert_eq!(rx.try_recv().unwrap(), "JSVM: 42");
        assert_eq!(rx.try_recv().unwrap(), "JSVM: undefined");
    }

    #[test]
    fn test_console_is_object_with_log() {
        let scope = Scope::default();
        let runtime = Runtime::new().unwrap();
        let context = Context::full(&runtime).unwrap();

        context.with(|ctx| {
            register_console(&ctx, scope.log_channel().clone()).unwrap();

            let console: Object = ctx.globals().get("console").unwrap();
            let _log: Function = console.get("log").unwrap();
        });
    }
}
