//! JS Bridge
//!
//! Embeds QuickJS behind three host functions so a query engine can run
//! JavaScript against its own dynamic values:
//!
//! - `js(js, key?)` - evaluate script, returning the final expression's value
//! - `js_set(var, value, key?)` - bind a global in the VM
//! - `js_get(var, key?)` - read a global from the VM
//!
//! Each [`Scope`] caches one VM per key and releases them all when the scope
//! is cancelled. Every VM starts with a `console.log` that writes to the
//! scope's log channel.
//!
//! # Example
//!
//! ```rust,ignore
//! let scope = Scope::default();
//! let functions = FunctionRegistry::with_builtins();
//!
//! let args: CallArgs = [("js".to_string(), Value::from("[1, 2, 3]"))].into_iter().collect();
//! let result = functions.call(&scope, "js", &args);
//!
//! scope.close().await;
//! ```

pub mod args;
pub mod config;
pub mod error;
pub mod executor;
pub mod functions;
pub mod globals;
pub mod guard;
pub mod marshal;
pub mod registry;
pub mod scope;
pub mod unmarshal;
pub mod vm;

pub use args::{ArgInfo, CallArgs};
pub use config::{BridgeConfig, LogConfig, VmConfig};
pub use error::{ArgError, ConfigError, JsError, JsResult};
pub use functions::{FunctionInfo, FunctionRegistry, JsCompile, JsGet, JsSet, ScopeFunction};
pub use jsbridge_types::Value;
pub use registry::{DEFAULT_KEY, get_or_create};
pub use scope::{Scope, ScopeLog};
pub use vm::JsVm;
