#![forbid(unsafe_code)]

//! `wasm-bindgen` exports.
//!
//! ```js
//! import { initLogging, resizeIframe } from "framefit-web";
//!
//! initLogging("debug");
//! const cleanup = resizeIframe({ id: "player", mode: "landscape" });
//! // later
//! cleanup();
//! ```
//!
//! Only compiled on `wasm32` targets.

use std::rc::Rc;

use js_sys::{Function, JSON, Reflect};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::Element;

use framefit_core::{ResizeOptions, Teardown, setup};

use crate::bridge::config_from_json;
use crate::console::{MakeConsoleWriter, parse_level};
use crate::dom::{DomElement, DomHost};

fn console_error(msg: &str) {
    web_sys::console::error_1(&JsValue::from_str(msg));
}

fn install_panic_hook() {
    use std::sync::Once;

    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        std::panic::set_hook(Box::new(|info| {
            let msg = if let Some(loc) = info.location() {
                format!(
                    "panic at {}:{}:{}: {info}",
                    loc.file(),
                    loc.line(),
                    loc.column()
                )
            } else {
                format!("panic: {info}")
            };
            console_error(&msg);
        }));
    });
}

/// Install the console `tracing` subscriber and the panic hook.
///
/// `level` is `"trace"`, `"debug"`, `"info"` (default), `"warn"`, `"error"`
/// or `"off"`. Calling this more than once keeps the first subscriber.
#[wasm_bindgen(js_name = initLogging)]
pub fn init_logging(level: Option<String>) {
    install_panic_hook();

    let (filter, rejected) = match parse_level(level.as_deref()) {
        Ok(filter) => (filter, None),
        Err(rejected) => (crate::console::DEFAULT_LEVEL, Some(rejected)),
    };
    let installed = tracing_subscriber::fmt()
        .with_writer(MakeConsoleWriter::browser())
        .with_ansi(false)
        .without_time()
        .with_target(false)
        .with_max_level(filter)
        .try_init();

    match installed {
        Ok(()) => tracing::debug!(level = %filter, "console logging installed"),
        Err(_) => tracing::debug!("console logging already installed"),
    }
    if let Some(rejected) = rejected {
        tracing::warn!(level = %rejected, "unknown log level; using info");
    }
}

/// Attach `value` to the teardown function as property `name`.
fn attach_method(target: &Function, name: &str, value: JsValue) {
    if let Err(err) = Reflect::set(target, &JsValue::from_str(name), &value) {
        tracing::warn!(method = name, error = ?err, "could not attach teardown method");
    }
}

/// Wrap a [`Teardown`] as a zero-argument JS function.
///
/// Calling it tears the controller down; repeated calls do nothing. The
/// function also carries `resizeNow()`, `isActive()` and `isNoop()`.
fn teardown_function(teardown: Teardown) -> Function {
    let teardown = Rc::new(teardown);

    let owner = Rc::clone(&teardown);
    let cleanup: Function = Closure::<dyn FnMut()>::new(move || owner.teardown())
        .into_js_value()
        .unchecked_into();

    let owner = Rc::clone(&teardown);
    let resize_now = Closure::<dyn FnMut() -> Result<f64, JsValue>>::new(move || {
        owner
            .resize_now()
            .map_err(|err| JsValue::from_str(&err.to_string()))
    });
    attach_method(&cleanup, "resizeNow", resize_now.into_js_value());

    let owner = Rc::clone(&teardown);
    let is_active = Closure::<dyn FnMut() -> bool>::new(move || owner.is_active());
    attach_method(&cleanup, "isActive", is_active.into_js_value());

    let is_noop = Closure::<dyn FnMut() -> bool>::new(move || teardown.is_noop());
    attach_method(&cleanup, "isNoop", is_noop.into_js_value());

    cleanup
}

fn get_field(options: &JsValue, key: &str) -> Option<JsValue> {
    if !options.is_object() {
        return None;
    }
    Reflect::get(options, &JsValue::from_str(key))
        .ok()
        .filter(|value| !value.is_null() && !value.is_undefined())
}

fn stringify_options(options: &JsValue) -> Option<String> {
    if !options.is_object() {
        return None;
    }
    match JSON::stringify(options) {
        Ok(json) => json.as_string(),
        Err(err) => {
            tracing::warn!(error = ?err, "resize options are not serializable; using defaults");
            None
        }
    }
}

fn build_options(options: &JsValue) -> ResizeOptions<DomElement> {
    let config = config_from_json(stringify_options(options).as_deref());
    let mut resize_options = config.into_options();

    if let Some(element) = get_field(options, "element") {
        match element.dyn_into::<Element>() {
            Ok(element) => {
                resize_options = resize_options.with_element(DomElement::new(element));
            }
            Err(_) => tracing::warn!("options.element is not a DOM element; ignored"),
        }
    }

    if let Some(hook) = get_field(options, "onResized") {
        match hook.dyn_into::<Function>() {
            Ok(hook) => {
                resize_options = resize_options.with_on_resized(move |height| {
                    if let Err(err) = hook.call1(&JsValue::NULL, &JsValue::from_f64(height)) {
                        tracing::warn!(error = ?err, "onResized callback threw");
                    }
                });
            }
            Err(_) => tracing::warn!("options.onResized is not a function; ignored"),
        }
    }

    resize_options
}

/// Keep the panel described by `options` sized to the viewport.
///
/// `options` fields: `id`, `element`, `debounceMs`, `mode`
/// (`"fullscreen"` or `"landscape"`), `onResized`. Always returns the
/// teardown function; when the panel cannot be found it does nothing.
#[wasm_bindgen(js_name = resizeIframe)]
pub fn resize_iframe(options: JsValue) -> Function {
    let resize_options = build_options(&options);
    let teardown = match DomHost::new() {
        Ok(host) => setup(Rc::new(host), resize_options),
        Err(err) => {
            tracing::error!(error = %err, "no browser host available");
            Teardown::noop()
        }
    };
    teardown_function(teardown)
}
