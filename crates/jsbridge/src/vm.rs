//! QuickJS VM
//!
//! One runtime and its single context, bundled so they are created and
//! released together.

use std::fmt;

use rquickjs::{Context, Runtime};
use tracing::debug;

use crate::config::VmConfig;
use crate::error::{JsError, JsResult};
use crate::globals::register_console;
use crate::scope::ScopeLog;

/// A cached JavaScript evaluation environment
///
/// The engine is not reentrant; callers drive a VM from one logical caller
/// at a time.
pub struct JsVm {
    key: String,
    max_depth: usize,
    // Fields drop in declaration order: the context is released before the
    // runtime that owns it.
    context: Context,
    runtime: Runtime,
}

impl JsVm {
    /// Construct a runtime and context and install the host bindings
    pub fn new(key: impl Into<String>, config: &VmConfig, log: ScopeLog) -> JsResult<Self> {
        let key = key.into();

        let runtime = Runtime::new().map_err(|e| JsError::RuntimeCreation(e.to_string()))?;
        if let Some(limit) = config.memory_limit {
            runtime.set_memory_limit(limit);
        }
        if let Some(limit) = config.max_stack_size {
            runtime.set_max_stack_size(limit);
        }
        if let Some(threshold) = config.gc_threshold {
            runtime.set_gc_threshold(threshold);
        }

        let context =
            Context::full(&runtime).map_err(|e| JsError::RuntimeCreation(e.to_string()))?;
        context.with(|ctx| register_console(&ctx, log))?;

        debug!(key = %key, "created JS VM");

        Ok(Self {
            key,
            max_depth: config.max_depth,
            context,
            runtime,
        })
    }

    /// Cache key this VM is registered under
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Deepest nesting converted back to the host
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// The evaluation context
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Run garbage collection
    pub fn gc(&self) {
        self.runtime.run_gc();
    }
}

impl fmt::Debug for JsVm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsVm")
            .field("key", &self.key)
            .field("max_depth", &self.max_depth)
            .finish_non_exhaustive()
    }
}

impl Drop for JsVm {
    fn drop(&mut self) {
        debug!(key = %self.key, "releasing JS VM");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::Scope;
    use rquickjs::Value as JsValue;

    #[test]
    fn test_create_vm() {
        let scope = Scope::default();
        let vm = JsVm::new("k", scope.config(), scope.log_channel().clone()).unwrap();

        assert_eq!(vm.key(), "k");
        assert_eq!(vm.max_depth(), 64);
        vm.context().with(|ctx| {
            let two: i32 = ctx.eval("1 + 1").unwrap();
            assert_eq!(two, 2);
        });
        vm.gc();
    }

    #[test]
    fn test_debug_shows_key() {
        let scope = Scope::default();
        let vm = JsVm::new("cached", scope.config(), scope.log_channel().clone()).unwrap();

        let text = format!("{:?}", vm);
        assert!(text.starts_with("JsVm"));
        assert!(text.contains("\"cached\""));
        assert!(text.contains("max_depth: 64"));
    }

    #[test]
    fn test_console_installed() {
        let (scope, mut rx) = Scope::with_log_channel(VmConfig::default());
        let vm = JsVm::new("k", scope.config(), scope.log_channel().clone()).unwrap();

        vm.context().with(|ctx| {
            let _: JsValue = ctx.eval("console.log('up')").unwrap();
        });
        assert_eq!(rx.try_recv().unwrap(), "JSVM: up");
    }

    #[test]
    fn test_memory_limit_applies() {
        let config = VmConfig {
            memory_limit: Some(4 * 1024 * 1024),
            ..VmConfig::default()
        };
        let scope = Scope::new(config.clone());
        let vm = JsVm::new("k", &config, scope.log_channel().clone()).unwrap();

        vm.context().with(|ctx| {
            let result: rquickjs::Result<JsValue> =
                ctx.eval("let a = []; while (true) { a.push(new Array(100000).fill(1)); }");
            assert!(result.is_err());
        });
    }
}
