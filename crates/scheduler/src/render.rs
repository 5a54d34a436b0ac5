//! RenderContext - system-wide rendering exclusion lock
//!
//! The rendering context (3D scene state read by camera-like sensors) is
//! non-re-entrant: at most one rendering sensor may update against it at a
//! time. The lock is scoped per sensor update, so rendering sensors
//! interleave but never overlap, and general sensors are unaffected.

use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};

/// Cloneable handle to the system-wide rendering-context lock.
///
/// Clones share the same underlying lock; handing a clone to the rendering
/// container and another to (say) a GUI keeps both honest about exclusive
/// scene access.
#[derive(Debug, Clone, Default)]
pub struct RenderContext {
    lock: Arc<Mutex<()>>,
}

/// Guard proving exclusive possession of the rendering context.
///
/// Releases the context when dropped.
pub struct RenderGuard<'a> {
    _guard: MutexGuard<'a, ()>,
}

impl RenderContext {
    /// Create a fresh rendering-context lock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire exclusive possession, waiting if another holder is active.
    pub async fn acquire_exclusive(&self) -> RenderGuard<'_> {
        RenderGuard {
            _guard: self.lock.lock().await,
        }
    }

    /// Try to acquire without waiting. `None` when the context is held.
    pub fn try_acquire_exclusive(&self) -> Option<RenderGuard<'_>> {
        self.lock.try_lock().ok().map(|guard| RenderGuard { _guard: guard })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_exclusive_while_held() {
        let ctx = RenderContext::new();
        let guard = ctx.acquire_exclusive().await;

        let other = ctx.clone();
        assert!(other.try_acquire_exclusive().is_none());

        drop(guard);
        assert!(other.try_acquire_exclusive().is_some());
    }
}
