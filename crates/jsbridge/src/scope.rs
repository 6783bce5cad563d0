//! Execution Scope
//!
//! A scope is the host's unit of work. It owns the cancellation signal, the
//! log channel, and the cache of JavaScript VMs created on its behalf. VMs
//! never outlive the scope's cancellation.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use uuid::Uuid;

use crate::config::VmConfig;
use crate::vm::JsVm;

/// Scope-local VM cache, keyed by cache key
pub type VmCache = DashMap<String, Arc<JsVm>>;

// ─────────────────────────────────────────────────────────────────────────────
// Scope Log Channel
// ─────────────────────────────────────────────────────────────────────────────

/// Log channel of a scope
///
/// Messages are always emitted through `tracing`; when a sink is attached
/// they are forwarded to it as well.
#[derive(Debug, Clone)]
pub struct ScopeLog {
    scope_id: Uuid,
    sink: Option<mpsc::UnboundedSender<String>>,
}

impl ScopeLog {
    /// Write a message to the scope's log channel
    pub fn log(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::info!(target: "jsbridge::scope", scope = %self.scope_id, "{}", message);

        if let Some(sink) = &self.sink {
            // The receiver going away only means nobody is listening anymore.
            let _ = sink.send(message);
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Scope
// ─────────────────────────────────────────────────────────────────────────────

/// A logical unit of work carrying a cancellation signal, a log channel and
/// the VMs created for it.
///
/// Dropping the scope fires its cancellation.
pub struct Scope {
    id: Uuid,
    token: CancellationToken,
    tasks: TaskTracker,
    log: ScopeLog,
    config: VmConfig,
    vms: Arc<VmCache>,
}

impl Default for Scope {
    fn default() -> Self {
        Self::new(VmConfig::default())
    }
}

impl Scope {
    /// Create a scope whose log only goes to `tracing`
    pub fn new(config: VmConfig) -> Self {
        Self::build(config, None)
    }

    /// Create a scope and a receiver for everything written to its log
    pub fn with_log_channel(config: VmConfig) -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::build(config, Some(tx)), rx)
    }

    fn build(config: VmConfig, sink: Option<mpsc::UnboundedSender<String>>) -> Self {
        let id = Uuid::new_v4();
        Self {
            id,
            token: CancellationToken::new(),
            tasks: TaskTracker::new(),
            log: ScopeLog { scope_id: id, sink },
            config,
            vms: Arc::new(DashMap::new()),
        }
    }

    /// Unique identifier of this scope
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Write a message to the scope's log channel
    pub fn log(&self, message: impl Into<String>) {
        self.log.log(message);
    }

    /// Handle to the log channel, for code that outlives a borrow of the scope
    pub fn log_channel(&self) -> &ScopeLog {
        &self.log
    }

    /// Configuration applied to VMs created in this scope
    pub fn config(&self) -> &VmConfig {
        &self.config
    }

    /// Fire the scope's cancellation signal
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Whether cancellation has fired
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Token that fires when the scope is cancelled
    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Cancel the scope and wait until its VMs have been removed from the cache
    pub async fn close(&self) {
        self.cancel();
        self.tasks.close();
        self.tasks.wait().await;
    }

    /// Look up a cached VM without creating one
    pub fn vm(&self, key: &str) -> Option<Arc<JsVm>> {
        self.vms.get(key).map(|entry| entry.value().clone())
    }

    /// Number of live VMs in this scope
    pub fn vm_count(&self) -> usize {
        self.vms.len()
    }

    pub(crate) fn vms(&self) -> &Arc<VmCache> {
        &self.vms
    }

    /// Tracker owning the scope's background tasks; [`Scope::close`] waits on it
    pub(crate) fn tasks(&self) -> &TaskTracker {
        &self.tasks
    }
}

impl Drop for Scope {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_channel_receives_messages() {
        let (scope, mut rx) = Scope::with_log_channel(VmConfig::default());

        scope.log("first");
        scope.log_channel().log(String::from("second"));

        assert_eq!(rx.try_recv().unwrap(), "first");
        assert_eq!(rx.try_recv().unwrap(), "second");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_log_without_listener() {
        let (scope, rx) = Scope::with_log_channel(VmConfig::default());
        drop(rx);
        scope.log("nobody hears this");
    }

    #[test]
    fn test_cancel() {
        let scope = Scope::default();
        let token = scope.cancellation_token();

        assert!(!scope.is_cancelled());
        scope.cancel();
        assert!(scope.is_cancelled());
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_drop_cancels() {
        let scope = Scope::default();
        let token = scope.cancellation_token();

        drop(scope);
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn test_close_without_vms() {
        let scope = Scope::default();

        tokio::time::timeout(std::time::Duration::from_secs(1), scope.close())
            .await
            .unwrap();
        assert!(scope.is_cancelled());
        assert!(scope.tasks().is_closed());
    }

    #[test]
    fn test_scopes_are_distinct() {
        let a = Scope::default();
        let b = Scope::default();
        assert_ne!(a.id(), b.id());
        assert_eq!(a.vm_count(), 0);
        assert!(a.vm("__jscontext").is_none());
    }
}
