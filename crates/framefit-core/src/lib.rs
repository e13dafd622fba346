#![forbid(unsafe_code)]

//! framefit core
//!
//! A reactive sizing controller for an embedded panel (an iframe or similar
//! sub-view) hosted inside a parent document. The controller keeps the
//! panel's height in sync with the viewport, either filling it
//! ([`SizingMode::Fullscreen`]) or fitting a 16:9 box into it
//! ([`SizingMode::FixedAspect`]), and hides the panel until the first size is
//! applied so an unsized frame never flashes on screen.
//!
//! # Key Components
//!
//! - [`setup`] / [`Teardown`] - create a controller and tear it down
//! - [`SizingMode`] - the height policy
//! - [`Host`] - capability traits the embedding environment implements
//! - [`Debouncer`] - single-slot debounce shared by the resize triggers
//! - [`OneShot`] - self-cancelling visibility subscription
//! - [`HostHandle`] - cancellable listener/observer/timer handle
//!
//! # Role in framefit
//! This crate contains no platform code. `framefit-web` implements [`Host`]
//! on top of the browser DOM; `framefit-harness` implements it with a
//! deterministic fake for tests.

pub mod controller;
pub mod debounce;
pub mod error;
pub mod handle;
pub mod host;
pub mod one_shot;
pub mod options;
pub mod policy;
pub mod presentation;

pub use controller::{Teardown, Trigger, setup};
pub use debounce::Debouncer;
pub use error::{ConfigError, HostError, ResizeError};
pub use handle::{HostHandle, SubscriptionHandle, TimerHandle};
pub use host::{
    Callback, ElementLookup, EventHost, Host, PanelElement, TimerHost, TimerTask,
    ViewportProvider, VisibilityCallback,
};
pub use one_shot::OneShot;
pub use options::{DEFAULT_DEBOUNCE, DEFAULT_MODE, ResizeConfig, ResizeOptions, ResizedHook};
pub use policy::{SizingMode, Viewport, compute_height};
pub use presentation::{PANEL_TRANSITION, StyleProperty, Visibility};

pub use web_time::Duration;
