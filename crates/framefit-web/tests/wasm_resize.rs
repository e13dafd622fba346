#![cfg(target_arch = "wasm32")]

//! Browser tests for the DOM host and the JS exports.

use std::rc::Rc;

use framefit_core::{PanelElement, ResizeOptions, SizingMode, setup};
use framefit_web::{DomElement, DomHost, resize_iframe};
use js_sys::{Function, Object, Reflect};
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;
use web_sys::{Document, Element, HtmlElement};

wasm_bindgen_test_configure!(run_in_browser);

fn document() -> Document {
    web_sys::window().unwrap().document().unwrap()
}

/// `<div><iframe id=…></iframe></div>` appended to the body.
fn mount_panel(id: &str) -> (Element, Element) {
    let document = document();
    let container = document.create_element("div").unwrap();
    let frame = document.create_element("iframe").unwrap();
    frame.set_id(id);
    container.append_child(&frame).unwrap();
    document.body().unwrap().append_child(&container).unwrap();
    (frame, container)
}

fn style_of(element: &Element, property: &str) -> String {
    element
        .dyn_ref::<HtmlElement>()
        .unwrap()
        .style()
        .get_property_value(property)
        .unwrap()
}

fn inner_height() -> f64 {
    web_sys::window()
        .unwrap()
        .inner_height()
        .unwrap()
        .as_f64()
        .unwrap()
}

/// Call a zero-argument method attached to the teardown function.
fn call_method(cleanup: &Function, name: &str) -> Result<JsValue, JsValue> {
    Reflect::get(cleanup, &name.into())
        .unwrap()
        .dyn_into::<Function>()
        .unwrap()
        .call0(&JsValue::NULL)
}

fn flag(cleanup: &Function, name: &str) -> bool {
    call_method(cleanup, name).unwrap().as_bool().unwrap()
}

#[wasm_bindgen_test]
fn resize_iframe_sizes_and_reveals_panel() {
    let (frame, container) = mount_panel("framefit-fullscreen");
    let options = Object::new();
    Reflect::set(&options, &"id".into(), &"framefit-fullscreen".into()).unwrap();

    let cleanup = resize_iframe(options.into());

    assert!(flag(&cleanup, "isActive"));
    assert!(!flag(&cleanup, "isNoop"));
    assert_eq!(style_of(&frame, "visibility"), "visible");
    assert_eq!(style_of(&frame, "opacity"), "1");
    assert_eq!(style_of(&frame, "height"), format!("{}px", inner_height()));

    cleanup.call0(&JsValue::NULL).unwrap();
    cleanup.call0(&JsValue::NULL).unwrap();
    assert!(!flag(&cleanup, "isActive"));
    assert!(call_method(&cleanup, "resizeNow").is_err());
    container.remove();
}

#[wasm_bindgen_test]
fn resize_iframe_keeps_id_when_debounce_is_mistyped() {
    let (frame, container) = mount_panel("framefit-mistyped");
    let options = Object::new();
    Reflect::set(&options, &"id".into(), &"framefit-mistyped".into()).unwrap();
    Reflect::set(&options, &"debounceMs".into(), &"200".into()).unwrap();
    Reflect::set(&options, &"mode".into(), &"landscape".into()).unwrap();

    let cleanup = resize_iframe(options.into());

    assert!(flag(&cleanup, "isActive"));
    assert_eq!(style_of(&frame, "visibility"), "visible");
    let height = call_method(&cleanup, "resizeNow").unwrap().as_f64().unwrap();
    let written: f64 = style_of(&frame, "height")
        .trim_end_matches("px")
        .parse()
        .unwrap();
    assert!((written - height).abs() < 0.01);

    cleanup.call0(&JsValue::NULL).unwrap();
    container.remove();
}

#[wasm_bindgen_test]
fn resize_iframe_without_panel_is_noop() {
    let options = Object::new();
    Reflect::set(&options, &"id".into(), &"framefit-missing".into()).unwrap();

    let cleanup = resize_iframe(options.into());

    assert!(flag(&cleanup, "isNoop"));
    cleanup.call0(&JsValue::NULL).unwrap();
    assert!(call_method(&cleanup, "resizeNow").is_err());
}

#[wasm_bindgen_test]
fn resize_iframe_accepts_undefined_options() {
    let cleanup = resize_iframe(JsValue::UNDEFINED);
    assert!(flag(&cleanup, "isNoop"));
    cleanup.call0(&JsValue::NULL).unwrap();
}

#[wasm_bindgen_test]
fn direct_element_and_hook() {
    let (frame, container) = mount_panel("framefit-direct");
    let host = Rc::new(DomHost::new().unwrap());
    let seen = Rc::new(std::cell::Cell::new(0.0));
    let sink = Rc::clone(&seen);

    let teardown = setup(
        host,
        ResizeOptions::new()
            .with_element(DomElement::new(frame.clone()))
            .with_mode(SizingMode::FixedAspect)
            .with_on_resized(move |height| sink.set(height)),
    );

    assert!(teardown.is_active());
    assert!(seen.get() > 0.0);
    let written: f64 = style_of(&frame, "height")
        .trim_end_matches("px")
        .parse()
        .unwrap();
    assert!((written - seen.get()).abs() < 0.01);
    assert_eq!(
        DomElement::new(frame).describe(),
        "<iframe#framefit-direct>"
    );
    teardown.teardown();
    container.remove();
}
