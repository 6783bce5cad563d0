//! VM Registry
//!
//! Hands out the scope's VM for a cache key, creating it on first use, and
//! binds its release to the scope's cancellation.

use std::sync::{Arc, Weak};

use dashmap::mapref::entry::Entry;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::{JsError, JsResult};
use crate::scope::{Scope, VmCache};
use crate::vm::JsVm;

/// Cache key of the scope's implicit VM
pub const DEFAULT_KEY: &str = "__jscontext";

/// Return the scope's VM for `key`, constructing and registering it if needed
///
/// A missing or empty key selects [`DEFAULT_KEY`]. Calls on a scope that has
/// already been cancelled halt silently.
pub fn get_or_create(scope: &Scope, key: Option<&str>) -> JsResult<Arc<JsVm>> {
    if scope.is_cancelled() {
        return Err(JsError::Halt);
    }

    let key = match key {
        Some(key) if !key.is_empty() => key,
        _ => DEFAULT_KEY,
    };

    let vm = match scope.vms().entry(key.to_string()) {
        Entry::Occupied(entry) => return Ok(entry.get().clone()),
        Entry::Vacant(entry) => {
            let handle =
                tokio::runtime::Handle::try_current().map_err(|_| JsError::NoAsyncRuntime)?;
            let vm = Arc::new(JsVm::new(key, scope.config(), scope.log_channel().clone())?);
            entry.insert(vm.clone());

            scope.tasks().spawn_on(
                release_on_cancel(
                    scope.cancellation_token(),
                    Arc::downgrade(scope.vms()),
                    Arc::downgrade(&vm),
                ),
                &handle,
            );
            vm
        }
    };

    debug!(scope = %scope.id(), key = %key, "registered JS VM");
    Ok(vm)
}

/// Wait for cancellation, then drop the cache's reference to the VM
///
/// Only weak references are held so a dropped scope never keeps its VMs
/// alive through this task.
async fn release_on_cancel(token: CancellationToken, cache: Weak<VmCache>, vm: Weak<JsVm>) {
    token.cancelled().await;

    let Some(cache) = cache.upgrade() else {
        return;
    };
    let Some(target) = vm.upgrade() else {
        return;
    };

    let removed = cache.remove_if(target.key(), |_, cached| Arc::ptr_eq(cached, &target));
    drop(target);
    drop(removed);
}
