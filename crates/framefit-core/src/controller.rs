#![forbid(unsafe_code)]

//! The resize controller.
//!
//! [`setup`] resolves the panel, hides it, sizes it once synchronously, and
//! then wires four change sources to the apply-resize operation:
//!
//! | Trigger | Path |
//! |---------|------|
//! | Content load | immediate |
//! | Viewport resize | debounced (shared slot) |
//! | Visibility entry | immediate, one-shot |
//! | Container resize | debounced (shared slot), only if the panel has a parent |
//!
//! The returned [`Teardown`] owns the controller. Host callbacks hold only
//! weak references, so tearing down (or dropping the `Teardown`) releases
//! every listener, observer, and pending timer.
//!
//! # Failure Modes
//!
//! - **Unresolved target**: logged at error level; a no-op [`Teardown`] is
//!   returned so callers never need to branch.
//! - **Viewport or style failure during a resize**: logged at error level and
//!   the trigger is skipped. The next trigger tries again.
//! - **Host refuses a listener/observer/timer**: logged; only that trigger is
//!   lost.

use core::fmt;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use tracing::{debug, error, trace, warn};

use crate::debounce::Debouncer;
use crate::error::{HostError, ResizeError};
use crate::handle::SubscriptionHandle;
use crate::host::{Callback, Host, PanelElement};
use crate::one_shot::OneShot;
use crate::options::{ResizeOptions, ResizedHook};
use crate::policy::{SizingMode, compute_height};
use crate::presentation;

/// What caused a resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
    /// The synchronous pass performed by [`setup`].
    Immediate,
    ContentLoad,
    ViewportResize,
    Visibility,
    ContainerResize,
    /// A debounced viewport or container resize coming due.
    Debounced,
    /// An explicit [`Teardown::resize_now`] call.
    Manual,
}

impl Trigger {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Immediate => "immediate",
            Self::ContentLoad => "content_load",
            Self::ViewportResize => "viewport_resize",
            Self::Visibility => "visibility",
            Self::ContainerResize => "container_resize",
            Self::Debounced => "debounced",
            Self::Manual => "manual",
        }
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Create a resize controller for the panel named by `options`.
///
/// Always returns a [`Teardown`]; when the panel cannot be resolved it is a
/// no-op.
pub fn setup<H: Host>(host: Rc<H>, options: ResizeOptions<H::Element>) -> Teardown {
    let ResizeOptions {
        id,
        element,
        debounce,
        mode,
        on_resized,
    } = options;
    debug!(
        id = ?id,
        has_element = element.is_some(),
        debounce_ms = debounce.as_millis() as u64,
        mode = %mode,
        "resize controller input"
    );

    let Some(target) = resolve_target(&*host, id.as_deref(), element) else {
        error!(id = ?id, "{}", ResizeError::TargetNotFound);
        return Teardown::noop();
    };
    debug!(panel = %target.describe(), "found panel element");

    if let Err(err) = presentation::conceal(&target) {
        warn!(error = %err, "failed to hide panel before first resize");
    }

    let controller = Rc::new_cyclic(|weak: &Weak<Controller<H>>| {
        let weak = weak.clone();
        let debouncer = Debouncer::new(
            Rc::clone(&host),
            debounce,
            Rc::new(move || {
                if let Some(controller) = weak.upgrade() {
                    controller.handle(Trigger::Debounced);
                }
            }),
        );
        Controller {
            host,
            target,
            mode,
            on_resized,
            debouncer,
            subscriptions: RefCell::new(Vec::new()),
            visibility: RefCell::new(None),
            torn_down: Cell::new(false),
        }
    });

    controller.handle(Trigger::Immediate);
    Controller::attach_triggers(&controller);

    let controller: Rc<dyn Lifecycle> = controller;
    Teardown {
        controller: Some(controller),
    }
}

/// Resolve the panel: the identifier first, then the direct handle. Only
/// elements attached to the document qualify.
///
/// An identifier that does not resolve falls through to the direct handle
/// rather than failing, so `{ id, element }` with a stale `id` still
/// controls `element`. Setup is a no-op only when neither resolves.
fn resolve_target<H: Host>(
    host: &H,
    id: Option<&str>,
    element: Option<H::Element>,
) -> Option<H::Element> {
    if let Some(id) = id.filter(|id| !id.is_empty()) {
        match host.element_by_id(id) {
            Some(found) if found.is_connected() => return Some(found),
            Some(_) => warn!(id, "element with id is detached from the document"),
            None if element.is_some() => {
                warn!(id, "no element with id; falling back to direct handle");
            }
            None => {}
        }
    }
    element.filter(PanelElement::is_connected)
}

struct Controller<H: Host> {
    host: Rc<H>,
    target: H::Element,
    mode: SizingMode,
    on_resized: Option<ResizedHook>,
    debouncer: Debouncer<H>,
    subscriptions: RefCell<Vec<SubscriptionHandle>>,
    visibility: RefCell<Option<OneShot>>,
    torn_down: Cell<bool>,
}

impl<H: Host> Controller<H> {
    /// Compute and apply the panel height. The only path that reveals the
    /// panel.
    fn apply_resize(&self, trigger: Trigger) -> Result<f64, ResizeError> {
        if self.torn_down.get() {
            return Err(ResizeError::TornDown);
        }
        debug!(trigger = %trigger, "resizing panel");
        let viewport = self.host.viewport()?;
        let height = compute_height(self.mode, viewport);
        presentation::reveal(&self.target, height)?;
        debug!(trigger = %trigger, height, "applied panel height");
        if let Some(hook) = &self.on_resized {
            hook(height);
        }
        Ok(height)
    }

    /// Resize now, logging instead of propagating failures.
    fn handle(&self, trigger: Trigger) {
        if self.torn_down.get() {
            trace!(trigger = %trigger, "ignoring trigger after teardown");
            return;
        }
        if let Err(err) = self.apply_resize(trigger) {
            error!(trigger = %trigger, error = %err, "failed to resize panel");
        }
    }

    /// Route a high-frequency trigger through the shared debounce slot.
    fn schedule(&self, trigger: Trigger) {
        if self.torn_down.get() {
            trace!(trigger = %trigger, "ignoring trigger after teardown");
            return;
        }
        trace!(trigger = %trigger, "scheduling debounced resize");
        if let Err(err) = self.debouncer.trigger() {
            error!(trigger = %trigger, error = %err, "failed to schedule debounced resize");
        }
    }

    fn immediate(weak: &Weak<Self>, trigger: Trigger) -> Callback {
        let weak = weak.clone();
        Rc::new(move || {
            if let Some(controller) = weak.upgrade() {
                controller.handle(trigger);
            }
        })
    }

    fn debounced(weak: &Weak<Self>, trigger: Trigger) -> Callback {
        let weak = weak.clone();
        Rc::new(move || {
            if let Some(controller) = weak.upgrade() {
                controller.schedule(trigger);
            }
        })
    }

    /// Keep `handle` unless teardown already happened, in which case it is
    /// cancelled on the spot.
    fn register(&self, trigger: Trigger, result: Result<SubscriptionHandle, HostError>) {
        match result {
            Ok(mut handle) => {
                if self.torn_down.get() {
                    handle.cancel();
                    return;
                }
                debug!(trigger = %trigger, handle = handle.label(), "attached trigger");
                self.subscriptions.borrow_mut().push(handle);
            }
            Err(err) => {
                error!(trigger = %trigger, error = %err, "failed to attach trigger");
            }
        }
    }

    fn attach_triggers(this: &Rc<Self>) {
        let weak = Rc::downgrade(this);

        if !this.torn_down.get() {
            let shot = OneShot::attach(
                |callback| this.host.observe_visibility(&this.target, callback),
                Self::immediate(&weak, Trigger::Visibility),
            );
            match shot {
                Ok(shot) => {
                    if this.torn_down.get() {
                        shot.cancel();
                    }
                    debug!(trigger = %Trigger::Visibility, "attached trigger");
                    *this.visibility.borrow_mut() = Some(shot);
                }
                Err(err) => {
                    error!(
                        trigger = %Trigger::Visibility,
                        error = %err,
                        "failed to attach trigger"
                    );
                }
            }
        }

        match this.target.parent() {
            Some(parent) if !this.torn_down.get() => {
                let result = this
                    .host
                    .observe_box_size(&parent, Self::debounced(&weak, Trigger::ContainerResize));
                this.register(Trigger::ContainerResize, result);
            }
            Some(_) => {}
            None => debug!("panel has no parent; container observer skipped"),
        }

        if !this.torn_down.get() {
            let result = this
                .host
                .listen_load(&this.target, Self::immediate(&weak, Trigger::ContentLoad));
            this.register(Trigger::ContentLoad, result);
        }

        if !this.torn_down.get() {
            let result = this
                .host
                .listen_viewport_resize(Self::debounced(&weak, Trigger::ViewportResize));
            this.register(Trigger::ViewportResize, result);
        }
    }
}

/// Lifecycle operations, erased over the host type.
trait Lifecycle {
    fn teardown(&self);
    fn resize_now(&self) -> Result<f64, ResizeError>;
    fn is_torn_down(&self) -> bool;
    fn describe(&self) -> String;
}

impl<H: Host> Lifecycle for Controller<H> {
    fn teardown(&self) {
        if self.torn_down.replace(true) {
            trace!("resize controller already torn down");
            return;
        }
        debug!(panel = %self.target.describe(), "cleaning up resize controller");
        if let Some(shot) = self.visibility.borrow().as_ref() {
            shot.cancel();
        }
        // Cancel in place: a handle's keep-alive storage may belong to the
        // callback that is running this teardown.
        for handle in self.subscriptions.borrow_mut().iter_mut() {
            handle.cancel();
        }
        self.debouncer.cancel();
    }

    fn resize_now(&self) -> Result<f64, ResizeError> {
        self.apply_resize(Trigger::Manual)
    }

    fn is_torn_down(&self) -> bool {
        self.torn_down.get()
    }

    fn describe(&self) -> String {
        self.target.describe()
    }
}

/// Owner of a resize controller, returned by [`setup`].
///
/// [`teardown`](Self::teardown) may be called any number of times. When
/// setup could not resolve a panel this is a no-op value whose methods do
/// nothing. Dropping a `Teardown` releases the controller as well.
#[must_use = "dropping the Teardown releases every listener it owns"]
pub struct Teardown {
    controller: Option<Rc<dyn Lifecycle>>,
}

impl Teardown {
    /// A teardown with no controller behind it.
    pub fn noop() -> Self {
        Self { controller: None }
    }

    /// `true` when setup failed to resolve a panel.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.controller.is_none()
    }

    /// `true` while the controller is live and listening.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.controller
            .as_ref()
            .is_some_and(|controller| !controller.is_torn_down())
    }

    /// Detach every listener and observer and cancel any pending debounced
    /// resize.
    pub fn teardown(&self) {
        if let Some(controller) = &self.controller {
            controller.teardown();
        }
    }

    /// Run the apply-resize operation immediately and return the applied
    /// height.
    pub fn resize_now(&self) -> Result<f64, ResizeError> {
        match &self.controller {
            Some(controller) => controller.resize_now(),
            None => Err(ResizeError::TargetNotFound),
        }
    }
}

impl Default for Teardown {
    fn default() -> Self {
        Self::noop()
    }
}

impl fmt::Debug for Teardown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.controller {
            None => f.write_str("Teardown(noop)"),
            Some(controller) => f
                .debug_struct("Teardown")
                .field("target", &controller.describe())
                .field("active", &!controller.is_torn_down())
                .finish(),
        }
    }
}
