#![forbid(unsafe_code)]

//! Single-slot debounce.
//!
//! [`Debouncer`] wraps a zero-argument action. Each [`trigger`](Debouncer::trigger)
//! cancels the pending invocation (if any) and schedules a new one after the
//! configured delay, so only the last call of a burst runs.
//!
//! # Invariants
//!
//! 1. At most one invocation is pending at any time.
//! 2. A superseded invocation never runs, even if the host fails to clear
//!    its timer: each scheduled task carries a generation number and bails
//!    out unless it is still the newest.
//! 3. [`cancel`](Debouncer::cancel) leaves nothing pending.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use web_time::Duration;

use crate::error::HostError;
use crate::handle::TimerHandle;
use crate::host::{Callback, TimerHost};

struct Slot {
    handle: RefCell<Option<TimerHandle>>,
    generation: Cell<u64>,
    pending: Cell<bool>,
}

/// Debounced wrapper around an action. See the module docs.
pub struct Debouncer<T: TimerHost + ?Sized> {
    timers: Rc<T>,
    delay: Duration,
    action: Callback,
    slot: Rc<Slot>,
}

impl<T: TimerHost + ?Sized> Debouncer<T> {
    #[must_use]
    pub fn new(timers: Rc<T>, delay: Duration, action: Callback) -> Self {
        Self {
            timers,
            delay,
            action,
            slot: Rc::new(Slot {
                handle: RefCell::new(None),
                generation: Cell::new(0),
                pending: Cell::new(false),
            }),
        }
    }

    /// Whether an invocation is scheduled and has not yet run.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.slot.pending.get()
    }

    /// Schedule the action, replacing any pending invocation.
    pub fn trigger(&self) -> Result<(), HostError> {
        let generation = self.slot.generation.get().wrapping_add(1);
        self.slot.generation.set(generation);
        let previous = self.slot.handle.borrow_mut().take();
        if let Some(mut previous) = previous {
            previous.cancel();
        }
        self.slot.pending.set(true);

        let slot: Weak<Slot> = Rc::downgrade(&self.slot);
        let action = Rc::clone(&self.action);
        let task = Box::new(move || {
            let Some(slot) = slot.upgrade() else {
                return;
            };
            if slot.generation.get() != generation || !slot.pending.get() {
                return;
            }
            slot.pending.set(false);
            action();
        });

        match self.timers.set_timeout(self.delay, task) {
            Ok(handle) => {
                *self.slot.handle.borrow_mut() = Some(handle);
                Ok(())
            }
            Err(err) => {
                self.slot.pending.set(false);
                Err(err)
            }
        }
    }

    /// Drop the pending invocation, if any.
    ///
    /// The timer is cleared but its handle is retained until the next
    /// trigger or until the debouncer is dropped.
    pub fn cancel(&self) {
        self.slot.pending.set(false);
        if let Some(handle) = self.slot.handle.borrow_mut().as_mut() {
            handle.cancel();
        }
    }
}

impl<T: TimerHost + ?Sized> core::fmt::Debug for Debouncer<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Debouncer")
            .field("delay", &self.delay)
            .field("pending", &self.is_pending())
            .finish_non_exhaustive()
    }
}
