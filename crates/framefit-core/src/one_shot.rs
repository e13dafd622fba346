#![forbid(unsafe_code)]

//! Auto-cancelling wrapper for visibility subscriptions.
//!
//! [`OneShot`] runs its action on the first delivery reporting the target as
//! visible and then cancels the underlying subscription. Deliveries reporting
//! the target out of view are ignored and do not consume the shot.
//!
//! Hosts may deliver synchronously from inside the subscribe call, before a
//! handle exists. In that case the handle is cancelled as soon as it is
//! returned.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::error::HostError;
use crate::handle::SubscriptionHandle;
use crate::host::{Callback, VisibilityCallback};

#[derive(Default)]
struct OneShotState {
    handle: RefCell<Option<SubscriptionHandle>>,
    fired: Cell<bool>,
}

impl OneShotState {
    fn detach(&self) {
        if let Some(handle) = self.handle.borrow_mut().as_mut() {
            handle.cancel();
        }
    }
}

/// A visibility subscription that fires at most once.
pub struct OneShot {
    state: Rc<OneShotState>,
}

impl OneShot {
    /// Register through `subscribe` and run `action` on the first visible
    /// delivery.
    pub fn attach<F>(subscribe: F, action: Callback) -> Result<Self, HostError>
    where
        F: FnOnce(VisibilityCallback) -> Result<SubscriptionHandle, HostError>,
    {
        let state = Rc::new(OneShotState::default());
        let weak = Rc::downgrade(&state);
        let callback: VisibilityCallback = Rc::new(move |visible| {
            if !visible {
                return;
            }
            let Some(state) = weak.upgrade() else {
                return;
            };
            if state.fired.replace(true) {
                return;
            }
            action();
            state.detach();
        });

        let mut handle = subscribe(callback)?;
        if state.fired.get() {
            handle.cancel();
        }
        *state.handle.borrow_mut() = Some(handle);
        Ok(Self { state })
    }

    /// Whether the action has run.
    #[must_use]
    pub fn has_fired(&self) -> bool {
        self.state.fired.get()
    }

    /// Whether the underlying subscription is still delivering.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.state
            .handle
            .borrow()
            .as_ref()
            .is_some_and(SubscriptionHandle::is_active)
    }

    /// Detach without firing.
    pub fn cancel(&self) {
        self.state.detach();
    }
}

impl core::fmt::Debug for OneShot {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("OneShot")
            .field("fired", &self.has_fired())
            .field("attached", &self.is_attached())
            .finish()
    }
}
