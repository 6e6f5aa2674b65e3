use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

/// One-shot vblank wakeup shared between the render thread and a ticker.
///
/// A notification that arrives before the waiter blocks is kept, so the next
/// [`wait`](Self::wait) returns immediately. Several notifications collapse
/// into one.
#[derive(Debug, Clone, Default)]
pub struct VsyncSignal {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl VsyncSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a vblank and wakes the waiter, if any.
    pub fn notify(&self) {
        let (lock, cvar) = &*self.inner;
        let mut pending = lock.lock().unwrap_or_else(|e| e.into_inner());
        *pending = true;
        cvar.notify_one();
    }

    /// Blocks until the next vblank, consuming it.
    pub fn wait(&self) {
        let (lock, cvar) = &*self.inner;
        let mut pending = lock.lock().unwrap_or_else(|e| e.into_inner());
        while !*pending {
            pending = cvar.wait(pending).unwrap_or_else(|e| e.into_inner());
        }
        *pending = false;
    }

    /// Like [`wait`](Self::wait) but gives up after `timeout`.
    /// Returns `true` if a vblank was consumed.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let (lock, cvar) = &*self.inner;
        let guard = lock.lock().unwrap_or_else(|e| e.into_inner());
        let (mut pending, _) = cvar
            .wait_timeout_while(guard, timeout, |p| !*p)
            .unwrap_or_else(|e| e.into_inner());
        std::mem::replace(&mut *pending, false)
    }

    /// `true` if a vblank is waiting to be consumed.
    pub fn is_pending(&self) -> bool {
        let (lock, _) = &*self.inner;
        *lock.lock().unwrap_or_else(|e| e.into_inner())
    }
}
