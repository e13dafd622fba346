#![forbid(unsafe_code)]

//! Cancellable handles for host-owned resources.
//!
//! Every listener, observer, and timer the controller registers with the host
//! is represented by a [`HostHandle`]. The handle carries two things:
//!
//! - a **detach** action that tells the host to stop delivering (remove the
//!   event listener, disconnect the observer, clear the timeout);
//! - optional **keep-alive** storage for the callback the host is calling
//!   into (for example a `wasm_bindgen::closure::Closure`).
//!
//! [`HostHandle::cancel`] runs the detach action at most once but keeps the
//! keep-alive storage until the handle itself is dropped. A callback can
//! therefore cancel its own subscription while it is executing without
//! freeing the code that is currently running.
//!
//! Dropping a handle cancels it.

use core::fmt;
use std::any::Any;

/// Handle to a host listener or observer.
pub type SubscriptionHandle = HostHandle;

/// Handle to a pending host timer.
pub type TimerHandle = HostHandle;

/// A detachable host resource. See the module docs.
pub struct HostHandle {
    label: &'static str,
    detach: Option<Box<dyn FnOnce()>>,
    keepalive: Option<Box<dyn Any>>,
}

impl HostHandle {
    /// Create a handle that runs `detach` on cancel or drop.
    pub fn new(label: &'static str, detach: impl FnOnce() + 'static) -> Self {
        Self {
            label,
            detach: Some(Box::new(detach)),
            keepalive: None,
        }
    }

    /// Attach storage that must outlive every host callback invocation.
    #[must_use]
    pub fn with_keepalive(mut self, keepalive: impl Any) -> Self {
        self.keepalive = Some(Box::new(keepalive));
        self
    }

    /// Short description used in diagnostics.
    #[must_use]
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// `true` until [`cancel`](Self::cancel) has run.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.detach.is_some()
    }

    /// Detach the host resource. Subsequent calls do nothing.
    pub fn cancel(&mut self) {
        if let Some(detach) = self.detach.take() {
            tracing::trace!(handle = self.label, "detaching host handle");
            detach();
        }
    }
}

impl Drop for HostHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl fmt::Debug for HostHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostHandle")
            .field("label", &self.label)
            .field("active", &self.is_active())
            .field("keepalive", &self.keepalive.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn counting_handle(count: &Rc<Cell<u32>>) -> HostHandle {
        let count = Rc::clone(count);
        HostHandle::new("test", move || count.set(count.get() + 1))
    }

    #[test]
    fn cancel_runs_detach_once() {
        let count = Rc::new(Cell::new(0));
        let mut handle = counting_handle(&count);
        assert!(handle.is_active());
        handle.cancel();
        handle.cancel();
        assert!(!handle.is_active());
        drop(handle);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn drop_cancels() {
        let count = Rc::new(Cell::new(0));
        drop(counting_handle(&count));
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn keepalive_outlives_cancel() {
        let alive = Rc::new(());
        let mut handle = HostHandle::new("test", || {}).with_keepalive(Rc::clone(&alive));
        handle.cancel();
        assert_eq!(Rc::strong_count(&alive), 2);
        drop(handle);
        assert_eq!(Rc::strong_count(&alive), 1);
    }
}
