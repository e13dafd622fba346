#![forbid(unsafe_code)]

//! Browser bindings for framefit.
//!
//! - `DomHost` / `DomElement` implement the `framefit-core` host traits on
//!   the DOM (wasm32 only).
//! - `resizeIframe` (returning a teardown function) and `initLogging` are
//!   the JavaScript exports (wasm32 only).
//! - [`console`] routes `tracing` output to the browser console; it is
//!   platform independent so it can be tested natively.

pub mod bridge;
pub mod console;

#[cfg(target_arch = "wasm32")]
mod dom;
#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use dom::{DomElement, DomHost};
#[cfg(target_arch = "wasm32")]
pub use wasm::{init_logging, resize_iframe};
