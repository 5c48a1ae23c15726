//! Process-wide render environment and the scoped guard that installs it.
//!
//! The raster backend does not take its font database, image bundle or output scale as
//! arguments; it reads them from named global slots. A [`RenderSandbox`] is the only way a
//! renderer may fill those slots: it serializes renderers on a process-wide lock, snapshots
//! each slot before the first write, and on drop puts back exactly what was there before
//! (removing slots that did not exist). Drop runs on success, on error returns and during panic
//! unwinding alike.
//!
//! The render lock is not reentrant: entering a sandbox while this thread already holds one
//! deadlocks.

use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, LazyLock, Mutex, MutexGuard, PoisonError};

/// Value stored in a global slot.
pub type GlobalValue = Arc<dyn Any + Send + Sync>;

static GLOBALS: LazyLock<Mutex<HashMap<String, GlobalValue>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

static RENDER_LOCK: Mutex<()> = Mutex::new(());

fn globals() -> MutexGuard<'static, HashMap<String, GlobalValue>> {
    // Every write is a single insert or remove, so a poisoned map is still consistent.
    GLOBALS.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Current value of slot `key`, if set.
pub fn global_value(key: &str) -> Option<GlobalValue> {
    globals().get(key).cloned()
}

/// Current value of slot `key` downcast to `T`.
pub fn global<T: Any + Send + Sync>(key: &str) -> Option<Arc<T>> {
    global_value(key).and_then(|v| v.downcast::<T>().ok())
}

/// Set slot `key` outside any sandbox, returning the previous value.
///
/// Host code uses this for long-lived process configuration; renderers go through
/// [`RenderSandbox::install`].
pub fn set_global(key: &str, value: GlobalValue) -> Option<GlobalValue> {
    globals().insert(key.to_string(), value)
}

/// Clear slot `key`, returning the previous value.
pub fn remove_global(key: &str) -> Option<GlobalValue> {
    globals().remove(key)
}

/// Scoped ownership of the render environment.
pub struct RenderSandbox {
    saved: Vec<(String, Option<GlobalValue>)>,
    _lock: MutexGuard<'static, ()>,
}

impl RenderSandbox {
    /// Wait for exclusive use of the render environment.
    pub fn enter() -> Self {
        let lock = RENDER_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
        tracing::trace!("render sandbox entered");
        Self {
            saved: Vec::new(),
            _lock: lock,
        }
    }

    /// Set slot `key` for the lifetime of this sandbox.
    pub fn install<T: Any + Send + Sync>(&mut self, key: &str, value: Arc<T>) {
        let value: GlobalValue = value;
        let previous = set_global(key, value);
        if !self.saved.iter().any(|(k, _)| k == key) {
            self.saved.push((key.to_string(), previous));
        }
    }

    /// Slots this sandbox has touched, in first-install order.
    pub fn touched(&self) -> impl Iterator<Item = &str> {
        self.saved.iter().map(|(k, _)| k.as_str())
    }
}

impl Drop for RenderSandbox {
    fn drop(&mut self) {
        let mut map = globals();
        for (key, previous) in self.saved.drain(..).rev() {
            match previous {
                Some(v) => {
                    map.insert(key, v);
                }
                None => {
                    map.remove(&key);
                }
            }
        }
        tracing::trace!("render sandbox restored");
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/sandbox.rs"]
mod tests;
