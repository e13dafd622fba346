#![forbid(unsafe_code)]

//! Controller options.
//!
//! [`ResizeOptions`] is the full, typed option set handed to
//! [`setup`](crate::controller::setup). [`ResizeConfig`] is the
//! serializable subset (identifier, debounce window, mode name) that hosts
//! can load from JSON when the `serde` feature is enabled:
//!
//! ```json
//! { "id": "player", "debounceMs": 150, "mode": "landscape" }
//! ```

use core::fmt;
use std::rc::Rc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use web_time::Duration;

#[cfg(feature = "serde")]
use crate::error::ConfigError;
use crate::policy::SizingMode;

/// Default debounce window shared by viewport and container resizes.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(100);

/// Default sizing mode.
pub const DEFAULT_MODE: SizingMode = SizingMode::Fullscreen;

/// Hook invoked with the applied height after each successful resize.
pub type ResizedHook = Rc<dyn Fn(f64)>;

/// Options for one resize controller.
pub struct ResizeOptions<E> {
    /// Identifier looked up through the host. Tried first.
    pub id: Option<String>,
    /// Direct element handle. Tried when `id` is absent or unresolved.
    pub element: Option<E>,
    /// Debounce window for viewport and container resizes.
    pub debounce: Duration,
    pub mode: SizingMode,
    pub on_resized: Option<ResizedHook>,
}

impl<E> Default for ResizeOptions<E> {
    fn default() -> Self {
        Self {
            id: None,
            element: None,
            debounce: DEFAULT_DEBOUNCE,
            mode: DEFAULT_MODE,
            on_resized: None,
        }
    }
}

impl<E> ResizeOptions<E> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn with_element(mut self, element: E) -> Self {
        self.element = Some(element);
        self
    }

    #[must_use]
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    #[must_use]
    pub fn with_mode(mut self, mode: SizingMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn with_on_resized(mut self, hook: impl Fn(f64) + 'static) -> Self {
        self.on_resized = Some(Rc::new(hook));
        self
    }
}

impl<E: fmt::Debug> fmt::Debug for ResizeOptions<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResizeOptions")
            .field("id", &self.id)
            .field("element", &self.element)
            .field("debounce", &self.debounce)
            .field("mode", &self.mode)
            .field("on_resized", &self.on_resized.is_some())
            .finish()
    }
}

/// Serializable option subset.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct ResizeConfig {
    pub id: Option<String>,
    /// Debounce window in milliseconds.
    pub debounce_ms: Option<f64>,
    /// Mode name (`"fullscreen"`, `"landscape"`).
    pub mode: Option<String>,
}

impl ResizeConfig {
    /// Parse a JSON object.
    #[cfg(feature = "serde")]
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Debounce window, with negative or non-finite values clamped to zero.
    #[must_use]
    pub fn debounce(&self) -> Duration {
        match self.debounce_ms {
            None => DEFAULT_DEBOUNCE,
            Some(ms) if ms.is_finite() && ms > 0.0 => {
                Duration::from_micros((ms * 1000.0).round() as u64)
            }
            Some(_) => Duration::ZERO,
        }
    }

    /// Sizing mode; unknown names downgrade to fullscreen with a warning.
    #[must_use]
    pub fn mode(&self) -> SizingMode {
        self.mode
            .as_deref()
            .map_or(DEFAULT_MODE, SizingMode::from_name_lossy)
    }

    /// Convert into typed options. The element handle and hook are supplied
    /// separately by the host.
    #[must_use]
    pub fn into_options<E>(self) -> ResizeOptions<E> {
        let debounce = self.debounce();
        let mode = self.mode();
        ResizeOptions {
            id: self.id.filter(|id| !id.is_empty()),
            element: None,
            debounce,
            mode,
            on_resized: None,
        }
    }
}
