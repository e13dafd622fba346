#![forbid(unsafe_code)]

//! Deterministic fake host.
//!
//! [`FakeHost`] implements every capability the controller needs without a
//! browser:
//!
//! - the viewport is a settable value (or a forced failure);
//! - listeners and observers are kept in a registry and fire only when the
//!   test calls [`fire_load`](FakeHost::fire_load),
//!   [`resize_viewport`](FakeHost::resize_viewport),
//!   [`enter_view`](FakeHost::enter_view), or
//!   [`resize_box`](FakeHost::resize_box);
//! - timers run only when the test advances the manual clock with
//!   [`advance`](FakeHost::advance).
//!
//! Callbacks are invoked with no registry borrow held, so they may register
//! or cancel handles re-entrantly. A listener removed during a dispatch is
//! not invoked later in that same dispatch.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeSet, HashMap};
use std::rc::{Rc, Weak};

use framefit_core::{
    Callback, Duration, ElementLookup, EventHost, HostError, SubscriptionHandle, TimerHandle,
    TimerHost, TimerTask, Viewport, ViewportProvider, VisibilityCallback,
};

use crate::element::FakeElement;

/// Listener categories, also used to make attaches fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ListenerKind {
    Load,
    ViewportResize,
    Visibility,
    BoxSize,
}

impl ListenerKind {
    const fn operation(self) -> &'static str {
        match self {
            Self::Load => "listen_load",
            Self::ViewportResize => "listen_viewport_resize",
            Self::Visibility => "observe_visibility",
            Self::BoxSize => "observe_box_size",
        }
    }
}

#[derive(Clone)]
enum ListenerCallback {
    Plain(Callback),
    Visibility(VisibilityCallback),
}

struct Listener {
    id: u64,
    kind: ListenerKind,
    element: Option<FakeElement>,
    callback: ListenerCallback,
}

struct Timer {
    id: u64,
    due: Duration,
    task: TimerTask,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: Vec<Listener>,
    timers: Vec<Timer>,
}

impl Registry {
    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// In-memory host with a manual clock. See the module docs.
pub struct FakeHost {
    viewport: Cell<Viewport>,
    viewport_failure: RefCell<Option<String>>,
    now: Cell<Duration>,
    elements: RefCell<HashMap<String, FakeElement>>,
    refused: RefCell<BTreeSet<ListenerKind>>,
    timers_refused: Cell<bool>,
    registry: Rc<RefCell<Registry>>,
}

impl FakeHost {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            viewport: Cell::new(Viewport::new(width, height)),
            viewport_failure: RefCell::new(None),
            now: Cell::new(Duration::ZERO),
            elements: RefCell::new(HashMap::new()),
            refused: RefCell::new(BTreeSet::new()),
            timers_refused: Cell::new(false),
            registry: Rc::new(RefCell::new(Registry::default())),
        }
    }

    /// Convenience for `Rc::new(FakeHost::new(width, height))`.
    #[must_use]
    pub fn shared(width: f64, height: f64) -> Rc<Self> {
        Rc::new(Self::new(width, height))
    }

    /// Make `element` discoverable by its id.
    pub fn insert(&self, element: &FakeElement) {
        if let Some(id) = element.id() {
            self.elements
                .borrow_mut()
                .insert(id.to_owned(), element.clone());
        }
    }

    // ------------------------------------------------------------------
    // Viewport
    // ------------------------------------------------------------------

    /// Change the viewport without notifying listeners.
    pub fn set_viewport(&self, width: f64, height: f64) {
        self.viewport.set(Viewport::new(width, height));
    }

    /// Change the viewport and fire every viewport-resize listener.
    /// Returns the number of callbacks invoked.
    pub fn resize_viewport(&self, width: f64, height: f64) -> usize {
        self.set_viewport(width, height);
        self.dispatch(ListenerKind::ViewportResize, None, true)
    }

    /// Make viewport reads fail with `message` until
    /// [`restore_viewport`](Self::restore_viewport).
    pub fn fail_viewport(&self, message: &str) {
        *self.viewport_failure.borrow_mut() = Some(message.to_owned());
    }

    pub fn restore_viewport(&self) {
        self.viewport_failure.borrow_mut().take();
    }

    // ------------------------------------------------------------------
    // Event delivery
    // ------------------------------------------------------------------

    /// Fire load listeners registered on `element`.
    pub fn fire_load(&self, element: &FakeElement) -> usize {
        self.dispatch(ListenerKind::Load, Some(element), true)
    }

    /// Deliver an "intersecting" visibility entry for `element`.
    pub fn enter_view(&self, element: &FakeElement) -> usize {
        self.dispatch(ListenerKind::Visibility, Some(element), true)
    }

    /// Deliver a "not intersecting" visibility entry for `element`.
    pub fn leave_view(&self, element: &FakeElement) -> usize {
        self.dispatch(ListenerKind::Visibility, Some(element), false)
    }

    /// Fire box-size observers registered on `element`.
    pub fn resize_box(&self, element: &FakeElement) -> usize {
        self.dispatch(ListenerKind::BoxSize, Some(element), true)
    }

    fn dispatch(&self, kind: ListenerKind, element: Option<&FakeElement>, visible: bool) -> usize {
        let matching: Vec<(u64, ListenerCallback)> = self
            .registry
            .borrow()
            .listeners
            .iter()
            .filter(|listener| listener.kind == kind)
            .filter(|listener| match (element, &listener.element) {
                (Some(wanted), Some(registered)) => wanted.same_as(registered),
                (None, _) => true,
                (Some(_), None) => false,
            })
            .map(|listener| (listener.id, listener.callback.clone()))
            .collect();

        let mut invoked = 0;
        for (id, callback) in matching {
            let still_registered = self
                .registry
                .borrow()
                .listeners
                .iter()
                .any(|listener| listener.id == id);
            if !still_registered {
                continue;
            }
            invoked += 1;
            match callback {
                ListenerCallback::Plain(callback) => callback(),
                ListenerCallback::Visibility(callback) => callback(visible),
            }
        }
        invoked
    }

    // ------------------------------------------------------------------
    // Failure injection
    // ------------------------------------------------------------------

    /// Make attaches of `kind` fail.
    pub fn refuse(&self, kind: ListenerKind) {
        self.refused.borrow_mut().insert(kind);
    }

    /// Make `set_timeout` fail.
    pub fn refuse_timers(&self) {
        self.timers_refused.set(true);
    }

    // ------------------------------------------------------------------
    // Clock
    // ------------------------------------------------------------------

    #[must_use]
    pub fn now(&self) -> Duration {
        self.now.get()
    }

    /// Advance the clock by `dt`, running due timers in deadline order.
    /// Returns the number of timers that ran.
    pub fn advance(&self, dt: Duration) -> usize {
        let deadline = self.now.get().saturating_add(dt);
        let mut ran = 0;
        loop {
            let next = {
                let mut registry = self.registry.borrow_mut();
                let earliest = registry
                    .timers
                    .iter()
                    .enumerate()
                    .filter(|(_, timer)| timer.due <= deadline)
                    .min_by_key(|(_, timer)| (timer.due, timer.id))
                    .map(|(index, _)| index);
                earliest.map(|index| registry.timers.remove(index))
            };
            let Some(timer) = next else {
                break;
            };
            self.now.set(timer.due);
            (timer.task)();
            ran += 1;
        }
        self.now.set(deadline);
        ran
    }

    // ------------------------------------------------------------------
    // Introspection
    // ------------------------------------------------------------------

    /// Number of registered listeners and observers of every kind.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.registry.borrow().listeners.len()
    }

    /// Number of registered listeners of `kind`.
    #[must_use]
    pub fn listener_count_of(&self, kind: ListenerKind) -> usize {
        self.registry
            .borrow()
            .listeners
            .iter()
            .filter(|listener| listener.kind == kind)
            .count()
    }

    /// Number of timers waiting to run.
    #[must_use]
    pub fn pending_timers(&self) -> usize {
        self.registry.borrow().timers.len()
    }

    fn register(
        &self,
        kind: ListenerKind,
        element: Option<&FakeElement>,
        callback: ListenerCallback,
    ) -> Result<SubscriptionHandle, HostError> {
        if self.refused.borrow().contains(&kind) {
            return Err(HostError::new(kind.operation(), "refused by fake host"));
        }
        let id = {
            let mut registry = self.registry.borrow_mut();
            let id = registry.allocate_id();
            registry.listeners.push(Listener {
                id,
                kind,
                element: element.cloned(),
                callback,
            });
            id
        };
        let registry = Rc::downgrade(&self.registry);
        Ok(SubscriptionHandle::new(kind.operation(), move || {
            remove_where(&registry, |r| r.listeners.retain(|listener| listener.id != id));
        }))
    }
}

fn remove_where(registry: &Weak<RefCell<Registry>>, f: impl FnOnce(&mut Registry)) {
    if let Some(registry) = registry.upgrade() {
        f(&mut registry.borrow_mut());
    }
}

impl ViewportProvider for FakeHost {
    fn viewport(&self) -> Result<Viewport, HostError> {
        match self.viewport_failure.borrow().as_deref() {
            Some(message) => Err(HostError::new("viewport", message)),
            None => Ok(self.viewport.get()),
        }
    }
}

impl ElementLookup for FakeHost {
    type Element = FakeElement;

    fn element_by_id(&self, id: &str) -> Option<FakeElement> {
        self.elements.borrow().get(id).cloned()
    }
}

impl EventHost for FakeHost {
    fn listen_load(
        &self,
        target: &FakeElement,
        callback: Callback,
    ) -> Result<SubscriptionHandle, HostError> {
        self.register(
            ListenerKind::Load,
            Some(target),
            ListenerCallback::Plain(callback),
        )
    }

    fn listen_viewport_resize(&self, callback: Callback) -> Result<SubscriptionHandle, HostError> {
        self.register(
            ListenerKind::ViewportResize,
            None,
            ListenerCallback::Plain(callback),
        )
    }

    fn observe_visibility(
        &self,
        target: &FakeElement,
        callback: VisibilityCallback,
    ) -> Result<SubscriptionHandle, HostError> {
        self.register(
            ListenerKind::Visibility,
            Some(target),
            ListenerCallback::Visibility(callback),
        )
    }

    fn observe_box_size(
        &self,
        target: &FakeElement,
        callback: Callback,
    ) -> Result<SubscriptionHandle, HostError> {
        self.register(
            ListenerKind::BoxSize,
            Some(target),
            ListenerCallback::Plain(callback),
        )
    }
}

impl TimerHost for FakeHost {
    fn set_timeout(&self, delay: Duration, task: TimerTask) -> Result<TimerHandle, HostError> {
        if self.timers_refused.get() {
            return Err(HostError::new("set_timeout", "refused by fake host"));
        }
        let id = {
            let mut registry = self.registry.borrow_mut();
            let id = registry.allocate_id();
            let due = self.now.get().saturating_add(delay);
            registry.timers.push(Timer { id, due, task });
            id
        };
        let registry = Rc::downgrade(&self.registry);
        Ok(TimerHandle::new("set_timeout", move || {
            remove_where(&registry, |r| r.timers.retain(|timer| timer.id != id));
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counter() -> (Rc<Cell<u32>>, Callback) {
        let count = Rc::new(Cell::new(0));
        let hits = Rc::clone(&count);
        (count, Rc::new(move || hits.set(hits.get() + 1)))
    }

    #[test]
    fn load_fires_only_for_registered_element() {
        let host = FakeHost::new(800.0, 600.0);
        let a = FakeElement::new("iframe");
        let b = FakeElement::new("iframe");
        let (count, cb) = counter();
        let _handle = host.listen_load(&a, cb).unwrap();

        assert_eq!(host.fire_load(&b), 0);
        assert_eq!(host.fire_load(&a), 1);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn cancelled_listener_stops_firing() {
        let host = FakeHost::new(800.0, 600.0);
        let (count, cb) = counter();
        let mut handle = host.listen_viewport_resize(cb).unwrap();
        host.resize_viewport(640.0, 480.0);
        handle.cancel();
        assert_eq!(host.resize_viewport(320.0, 240.0), 0);
        assert_eq!(count.get(), 1);
        assert_eq!(host.listener_count(), 0);
    }

    #[test]
    fn timers_run_in_deadline_order() {
        let host = FakeHost::new(800.0, 600.0);
        let order = Rc::new(RefCell::new(Vec::new()));
        let mut handles = Vec::new();
        for (label, ms) in [("late", 30_u64), ("early", 10), ("mid", 20)] {
            let order = Rc::clone(&order);
            handles.push(
                host.set_timeout(
                    Duration::from_millis(ms),
                    Box::new(move || order.borrow_mut().push(label)),
                )
                .unwrap(),
            );
        }
        assert_eq!(host.advance(Duration::from_millis(25)), 2);
        assert_eq!(*order.borrow(), vec!["early", "mid"]);
        assert_eq!(host.now(), Duration::from_millis(25));
        assert_eq!(host.pending_timers(), 1);
    }

    #[test]
    fn cancelled_timer_never_runs() {
        let host = FakeHost::new(800.0, 600.0);
        let (count, cb) = counter();
        let mut handle = host
            .set_timeout(Duration::from_millis(5), Box::new(move || cb()))
            .unwrap();
        handle.cancel();
        host.advance(Duration::from_millis(10));
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn refused_kind_fails_attach() {
        let host = FakeHost::new(800.0, 600.0);
        host.refuse(ListenerKind::Load);
        let (_, cb) = counter();
        let err = host
            .listen_load(&FakeElement::new("iframe"), cb)
            .unwrap_err();
        assert_eq!(err.operation(), "listen_load");
    }

    #[test]
    fn viewport_failure_is_reported() {
        let host = FakeHost::new(800.0, 600.0);
        host.fail_viewport("gone");
        assert!(host.viewport().is_err());
        host.restore_viewport();
        assert_eq!(host.viewport().unwrap(), Viewport::new(800.0, 600.0));
    }
}
