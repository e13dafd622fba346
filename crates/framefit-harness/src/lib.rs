#![forbid(unsafe_code)]

//! Test harness for framefit.
//!
//! - [`FakeHost`] - deterministic host with a manual clock and scripted events
//! - [`FakeElement`] - panel element that records style writes
//! - [`diagnostics`] - capture `tracing` output for assertions

pub mod diagnostics;
pub mod element;
pub mod host;

pub use element::FakeElement;
pub use host::{FakeHost, ListenerKind};

/// An `<iframe id=…>` inside a `<div>` container, registered with `host`.
pub fn mounted_panel(host: &FakeHost, id: &str) -> (FakeElement, FakeElement) {
    let container = FakeElement::new("div");
    let panel = FakeElement::with_id("iframe", id);
    panel.set_parent(&container);
    host.insert(&panel);
    (panel, container)
}
