#![forbid(unsafe_code)]

//! Browser DOM implementation of the framefit host traits.
//!
//! - viewport: `window.innerWidth` / `window.innerHeight`
//! - load and window-resize: `addEventListener` via `gloo-events`
//! - visibility: `IntersectionObserver`
//! - container size: `ResizeObserver`
//! - timers: `setTimeout` / `clearTimeout`
//!
//! Observer and timer callbacks are `wasm_bindgen` closures stored as
//! handle keep-alive, so cancelling from inside a callback never frees the
//! running closure.

use gloo_events::EventListener;
use js_sys::{Array, Function};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    Document, Element, HtmlElement, IntersectionObserver, IntersectionObserverEntry,
    ResizeObserver, Window,
};

use framefit_core::{
    Callback, Duration, ElementLookup, EventHost, HostError, PanelElement, StyleProperty,
    SubscriptionHandle, TimerHandle, TimerHost, TimerTask, Viewport, ViewportProvider,
    VisibilityCallback,
};

/// Render a thrown JS value for a [`HostError`].
pub(crate) fn js_error(operation: &'static str, value: &JsValue) -> HostError {
    let message = value
        .as_string()
        .or_else(|| {
            value
                .dyn_ref::<js_sys::Error>()
                .map(|err| String::from(err.message()))
        })
        .unwrap_or_else(|| format!("{value:?}"));
    HostError::new(operation, message)
}

/// A DOM element acting as the panel (or its container).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomElement {
    element: Element,
}

impl DomElement {
    #[must_use]
    pub fn new(element: Element) -> Self {
        Self { element }
    }

    #[must_use]
    pub fn as_element(&self) -> &Element {
        &self.element
    }
}

impl PanelElement for DomElement {
    fn set_style(&self, property: StyleProperty, value: &str) -> Result<(), HostError> {
        let Some(html) = self.element.dyn_ref::<HtmlElement>() else {
            return Err(HostError::new(
                "set_style",
                format!("{} has no inline style", self.describe()),
            ));
        };
        html.style()
            .set_property(property.css_name(), value)
            .map_err(|err| js_error("set_style", &err))
    }

    fn parent(&self) -> Option<Self> {
        self.element.parent_element().map(Self::new)
    }

    fn is_connected(&self) -> bool {
        self.element.is_connected()
    }

    fn describe(&self) -> String {
        let tag = self.element.tag_name().to_ascii_lowercase();
        let id = self.element.id();
        if id.is_empty() {
            format!("<{tag}>")
        } else {
            format!("<{tag}#{id}>")
        }
    }
}

/// The browser window and document.
pub struct DomHost {
    window: Window,
    document: Document,
}

impl DomHost {
    /// Bind to the global `window`. Fails outside a browsing context (for
    /// example in a worker).
    pub fn new() -> Result<Self, HostError> {
        let window =
            web_sys::window().ok_or_else(|| HostError::new("window", "no global window"))?;
        let document = window
            .document()
            .ok_or_else(|| HostError::new("document", "window has no document"))?;
        Ok(Self { window, document })
    }
}

fn dimension(value: Result<JsValue, JsValue>, name: &str) -> Result<f64, HostError> {
    let value = value.map_err(|err| js_error("viewport", &err))?;
    value
        .as_f64()
        .filter(|v| v.is_finite())
        .ok_or_else(|| HostError::new("viewport", format!("{name} is not a number")))
}

impl ViewportProvider for DomHost {
    fn viewport(&self) -> Result<Viewport, HostError> {
        let width = dimension(self.window.inner_width(), "innerWidth")?;
        let height = dimension(self.window.inner_height(), "innerHeight")?;
        Ok(Viewport::new(width, height))
    }
}

impl ElementLookup for DomHost {
    type Element = DomElement;

    fn element_by_id(&self, id: &str) -> Option<DomElement> {
        self.document.get_element_by_id(id).map(DomElement::new)
    }
}

impl EventHost for DomHost {
    fn listen_load(
        &self,
        target: &DomElement,
        callback: Callback,
    ) -> Result<SubscriptionHandle, HostError> {
        let listener = EventListener::new(target.as_element(), "load", move |_| callback());
        Ok(SubscriptionHandle::new("listen_load", move || drop(listener)))
    }

    fn listen_viewport_resize(&self, callback: Callback) -> Result<SubscriptionHandle, HostError> {
        let listener = EventListener::new(&self.window, "resize", move |_| callback());
        Ok(SubscriptionHandle::new("listen_viewport_resize", move || {
            drop(listener)
        }))
    }

    fn observe_visibility(
        &self,
        target: &DomElement,
        callback: VisibilityCallback,
    ) -> Result<SubscriptionHandle, HostError> {
        let closure = Closure::<dyn FnMut(Array)>::new(move |entries: Array| {
            let intersecting = entries
                .iter()
                .filter_map(|entry| entry.dyn_into::<IntersectionObserverEntry>().ok())
                .any(|entry| entry.is_intersecting());
            callback(intersecting);
        });
        let observer = IntersectionObserver::new(closure.as_ref().unchecked_ref::<Function>())
            .map_err(|err| js_error("observe_visibility", &err))?;
        observer.observe(target.as_element());
        Ok(
            SubscriptionHandle::new("observe_visibility", move || observer.disconnect())
                .with_keepalive(closure),
        )
    }

    fn observe_box_size(
        &self,
        target: &DomElement,
        callback: Callback,
    ) -> Result<SubscriptionHandle, HostError> {
        let closure = Closure::<dyn FnMut(Array)>::new(move |_entries: Array| callback());
        let observer = ResizeObserver::new(closure.as_ref().unchecked_ref::<Function>())
            .map_err(|err| js_error("observe_box_size", &err))?;
        observer.observe(target.as_element());
        Ok(
            SubscriptionHandle::new("observe_box_size", move || observer.disconnect())
                .with_keepalive(closure),
        )
    }
}

impl TimerHost for DomHost {
    fn set_timeout(&self, delay: Duration, task: TimerTask) -> Result<TimerHandle, HostError> {
        let millis = i32::try_from(delay.as_millis()).unwrap_or(i32::MAX);
        let closure = Closure::<dyn FnMut()>::once(move || task());
        let id = self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                closure.as_ref().unchecked_ref::<Function>(),
                millis,
            )
            .map_err(|err| js_error("set_timeout", &err))?;
        let window = self.window.clone();
        Ok(
            TimerHandle::new("set_timeout", move || window.clear_timeout_with_handle(id))
                .with_keepalive(closure),
        )
    }
}
