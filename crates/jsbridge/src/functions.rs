//! Host Functions
//!
//! The three functions the host query engine can call: `js` evaluates
//! script, `js_set` binds a global, `js_get` reads one. Each takes an
//! optional `key` selecting which of the scope's cached VMs to use.
//!
//! Bad arguments are a soft failure: they are logged and the call returns
//! null. Failures while running against the VM go through [`guarded`].

use std::collections::HashMap;
use std::sync::Arc;

use jsbridge_types::Value;

use crate::args::{ArgInfo, ArgReader, CallArgs};
use crate::executor;
use crate::guard::guarded;
use crate::registry::get_or_create;
use crate::scope::Scope;

// ─────────────────────────────────────────────────────────────────────────────
// Function Trait
// ─────────────────────────────────────────────────────────────────────────────

/// Self-description of a host function
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FunctionInfo {
    pub name: &'static str,
    pub doc: &'static str,
    pub args: &'static [ArgInfo],
}

/// A function callable by the host against a scope
pub trait ScopeFunction: Send + Sync {
    fn info(&self) -> FunctionInfo;

    fn call(&self, scope: &Scope, args: &CallArgs) -> Value;
}

const KEY_ARG: ArgInfo = ArgInfo::optional("key", "If set use this key to cache the JS VM.");

// ─────────────────────────────────────────────────────────────────────────────
// js
// ─────────────────────────────────────────────────────────────────────────────

/// Compile and run JavaScript code
pub struct JsCompile;

impl JsCompile {
    const ARGS: &'static [ArgInfo] = &[
        ArgInfo::required("js", "The body of the javascript code."),
        KEY_ARG,
    ];
}

impl ScopeFunction for JsCompile {
    fn info(&self) -> FunctionInfo {
        FunctionInfo {
            name: "js",
            doc: "Compile and run javascript code.",
            args: Self::ARGS,
        }
    }

    fn call(&self, scope: &Scope, args: &CallArgs) -> Value {
        let extracted = ArgReader::new(args, Self::ARGS)
            .and_then(|a| Ok((a.string("js")?, a.optional_string("key")?)));
        let (source, key) = match extracted {
            Ok(extracted) => extracted,
            Err(err) => {
                scope.log(format!("js: {}", err));
                return Value::Null;
            }
        };

        guarded(scope, "js", || {
            let vm = get_or_create(scope, key)?;
            executor::evaluate(&vm, source)
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// js_set
// ─────────────────────────────────────────────────────────────────────────────

/// Set a variable's value in the JS VM
pub struct JsSet;

impl JsSet {
    const ARGS: &'static [ArgInfo] = &[
        ArgInfo::required("var", "The variable to set inside the JS VM."),
        ArgInfo::required("value", "The value to set inside the VM."),
        KEY_ARG,
    ];
}

impl ScopeFunction for JsSet {
    fn info(&self) -> FunctionInfo {
        FunctionInfo {
            name: "js_set",
            doc: "Set a variables value in the JS VM.",
            args: Self::ARGS,
        }
    }

    fn call(&self, scope: &Scope, args: &CallArgs) -> Value {
        let extracted = ArgReader::new(args, Self::ARGS)
            .and_then(|a| Ok((a.string("var")?, a.value("value")?, a.optional_string("key")?)));
        let (name, value, key) = match extracted {
            Ok(extracted) => extracted,
            Err(err) => {
                scope.log(format!("js_set: {}", err));
                return Value::Null;
            }
        };

        guarded(scope, "js_set", || {
            let vm = get_or_create(scope, key)?;
            executor::set_global(&vm, name, value)?;
            Ok(Value::Null)
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// js_get
// ─────────────────────────────────────────────────────────────────────────────

/// Get a variable's value from the JS VM
pub struct JsGet;

impl JsGet {
    const ARGS: &'static [ArgInfo] = &[
        ArgInfo::required("var", "The variable to get from the JS VM."),
        KEY_ARG,
    ];
}

impl ScopeFunction for JsGet {
    fn info(&self) -> FunctionInfo {
        FunctionInfo {
            name: "js_get",
            doc: "Get a variable's value from the JS VM.",
            args: Self::ARGS,
        }
    }

    fn call(&self, scope: &Scope, args: &CallArgs) -> Value {
        let extracted = ArgReader::new(args, Self::ARGS)
            .and_then(|a| Ok((a.string("var")?, a.optional_string("key")?)));
        let (name, key) = match extracted {
            Ok(extracted) => extracted,
            Err(err) => {
                scope.log(format!("js_get: {}", err));
                return Value::Null;
            }
        };

        guarded(scope, "js_get", || {
            let vm = get_or_create(scope, key)?;
            executor::get_global(&vm, name)
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Function Registry
// ─────────────────────────────────────────────────────────────────────────────

/// Registry of host functions by name
pub struct FunctionRegistry {
    functions: HashMap<&'static str, Arc<dyn ScopeFunction>>,
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FunctionRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            functions: HashMap::new(),
        }
    }

    /// Create a registry holding `js`, `js_set` and `js_get`
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(JsCompile));
        registry.register(Arc::new(JsSet));
        registry.register(Arc::new(JsGet));
        registry
    }

    /// Register a function under the name it reports
    pub fn register(&mut self, function: Arc<dyn ScopeFunction>) {
        self.functions.insert(function.info().name, function);
    }

    /// Get a function by name
    pub fn get(&self, name: &str) -> Option<&Arc<dyn ScopeFunction>> {
        self.functions.get(name)
    }

    /// Call a function by name; `None` if no such function is registered
    pub fn call(&self, scope: &Scope, name: &str, args: &CallArgs) -> Option<Value> {
        self.get(name).map(|function| function.call(scope, args))
    }

    /// Descriptions of all registered functions, sorted by name
    pub fn list(&self) -> Vec<FunctionInfo> {
        let mut infos: Vec<FunctionInfo> = self.functions.values().map(|f| f.info()).collect();
        infos.sort_by_key(|info| info.name);
        infos
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
