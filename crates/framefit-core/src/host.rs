#![forbid(unsafe_code)]

//! Host capability traits.
//!
//! The controller never touches a window, document, or timer API directly.
//! Everything it needs from the embedding environment is expressed here and
//! injected at setup:
//!
//! | Capability | Trait |
//! |------------|-------|
//! | Viewport dimensions | [`ViewportProvider`] |
//! | Element lookup by id | [`ElementLookup`] |
//! | Style writes, parent, liveness | [`PanelElement`] |
//! | Load / resize / visibility / box-size delivery | [`EventHost`] |
//! | Delayed tasks | [`TimerHost`] |
//!
//! All callbacks run on the host's single event loop, so the traits use
//! `Rc` rather than `Arc` and nothing is required to be `Send`.

use std::rc::Rc;

use web_time::Duration;

use crate::error::HostError;
use crate::handle::{SubscriptionHandle, TimerHandle};
use crate::policy::Viewport;
use crate::presentation::StyleProperty;

/// Zero-argument notification callback.
pub type Callback = Rc<dyn Fn()>;

/// Visibility callback. Receives `true` when the target intersects the
/// viewport, `false` when a delivery reports it out of view.
pub type VisibilityCallback = Rc<dyn Fn(bool)>;

/// Task run once by a timer.
pub type TimerTask = Box<dyn FnOnce()>;

/// A panel element the controller can style.
pub trait PanelElement: Clone + 'static {
    /// Write one style property. The controller never reads styles back.
    fn set_style(&self, property: StyleProperty, value: &str) -> Result<(), HostError>;

    /// The element's parent container, if it has one.
    fn parent(&self) -> Option<Self>;

    /// Whether the element is attached to the live document.
    fn is_connected(&self) -> bool;

    /// Short description for diagnostics (tag and id, typically).
    fn describe(&self) -> String;
}

/// Supplies current viewport dimensions.
pub trait ViewportProvider {
    fn viewport(&self) -> Result<Viewport, HostError>;
}

/// Resolves element identifiers.
pub trait ElementLookup {
    type Element: PanelElement;

    fn element_by_id(&self, id: &str) -> Option<Self::Element>;
}

/// Delivers the four change sources the controller observes.
///
/// Each method registers `callback` and returns a handle that stops delivery
/// when cancelled. After cancellation the host must not invoke the callback
/// again.
pub trait EventHost: ElementLookup {
    /// Fires when `target` finishes loading its content.
    fn listen_load(
        &self,
        target: &Self::Element,
        callback: Callback,
    ) -> Result<SubscriptionHandle, HostError>;

    /// Fires when the host window changes size.
    fn listen_viewport_resize(&self, callback: Callback) -> Result<SubscriptionHandle, HostError>;

    /// Fires for each visibility delivery about `target`.
    fn observe_visibility(
        &self,
        target: &Self::Element,
        callback: VisibilityCallback,
    ) -> Result<SubscriptionHandle, HostError>;

    /// Fires when the box dimensions of `target` change.
    fn observe_box_size(
        &self,
        target: &Self::Element,
        callback: Callback,
    ) -> Result<SubscriptionHandle, HostError>;
}

/// Schedules delayed tasks on the host event loop.
pub trait TimerHost {
    /// Run `task` once after `delay`. Cancelling the returned handle before
    /// the deadline prevents the task from running.
    fn set_timeout(&self, delay: Duration, task: TimerTask) -> Result<TimerHandle, HostError>;
}

/// Everything the resize controller needs from its environment.
pub trait Host: ViewportProvider + EventHost + TimerHost + 'static {}

impl<T> Host for T where T: ViewportProvider + EventHost + TimerHost + 'static {}
