//! Guarded regions
//!
//! Every host function runs its VM work inside [`guarded`]. Failures end the
//! current call with null after being written to the scope log; the VM and
//! the cache stay intact for later calls.

use std::any::Any;
use std::backtrace::Backtrace;
use std::panic::{self, AssertUnwindSafe};

use jsbridge_types::Value;

use crate::error::{JsError, JsResult};
use crate::scope::Scope;

/// Run `f`, reporting any failure under `name` and returning null instead
pub fn guarded<F>(scope: &Scope, name: &str, f: F) -> Value
where
    F: FnOnce() -> JsResult<Value>,
{
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(value)) => value,
        Ok(Err(JsError::Halt)) => Value::Null,
        Ok(Err(err)) => {
            scope.log(format!("{}: {}", name, err));
            if let Some(trace) = err.trace() {
                scope.log(format!("{}: {}", name, trace));
            }
            Value::Null
        }
        Err(payload) => {
            scope.log(format!(
                "PANIC {}: {}",
                panic_message(payload.as_ref()),
                Backtrace::force_capture()
            ));
            Value::Null
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VmConfig;

    fn drain(rx: &mut tokio::sync::mpsc::UnboundedReceiver<String>) -> Vec<String> {
        std::iter::from_fn(|| rx.try_recv().ok()).collect()
    }

    #[test]
    fn test_success_passes_value_through() {
        let (scope, mut rx) = Scope::with_log_channel(VmConfig::default());

        let value = guarded(&scope, "op", || Ok(Value::Int(3)));
        assert_eq!(value, Value::Int(3));
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn test_halt_is_silent() {
        let (scope, mut rx) = Scope::with_log_channel(VmConfig::default());

        let value = guarded(&scope, "op", || Err(JsError::Halt));
        assert_eq!(value, Value::Null);
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn test_error_is_logged_with_trace() {
        let (scope, mut rx) = Scope::with_log_channel(VmConfig::default());

        let value = guarded(&scope, "js", || {
            Err(JsError::Eval {
                cause: "Error: boom".into(),
                stack: Some("    at <eval>:1".into()),
            })
        });

        assert_eq!(value, Value::Null);
        assert_eq!(
            drain(&mut rx),
            vec![
                "js: evaluation failed: Error: boom".to_string(),
                "js:     at <eval>:1".to_string(),
            ]
        );
    }

    #[test]
    fn test_panic_is_caught_and_logged() {
        let (scope, mut rx) = Scope::with_log_channel(VmConfig::default());

        let value = guarded(&scope, "op", || panic!("invariant broken"));
        assert_eq!(value, Value::Null);

        let logs = drain(&mut rx);
        assert_eq!(logs.len(), 1);
        assert!(logs[0].starts_with("PANIC invariant broken: "));
    }
}
