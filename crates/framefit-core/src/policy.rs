#![forbid(unsafe_code)]

//! Sizing policy: maps viewport dimensions to a panel height.
//!
//! | Mode | Height |
//! |------|--------|
//! | [`SizingMode::Fullscreen`] | `viewport.height` |
//! | [`SizingMode::FixedAspect`] | `min(viewport.width * 9 / 16, viewport.height)` |
//!
//! The computation is pure and never cached: the controller re-reads the
//! viewport on every trigger.

use core::fmt;

/// Horizontal component of the fixed aspect ratio.
pub const ASPECT_WIDTH: f64 = 16.0;
/// Vertical component of the fixed aspect ratio.
pub const ASPECT_HEIGHT: f64 = 9.0;

/// Viewport dimensions in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Panel sizing mode. Fixed for the lifetime of one controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SizingMode {
    /// Height follows the viewport height.
    #[default]
    Fullscreen,
    /// Height follows a 16:9 box fitted to the viewport width, never taller
    /// than the viewport.
    FixedAspect,
}

impl SizingMode {
    /// Canonical option name, as accepted by [`SizingMode::from_name`].
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Fullscreen => "fullscreen",
            Self::FixedAspect => "landscape",
        }
    }

    /// Parse an option name. Returns `None` for names this controller does
    /// not know.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "fullscreen" => Some(Self::Fullscreen),
            "landscape" | "fixed-aspect" => Some(Self::FixedAspect),
            _ => None,
        }
    }

    /// Parse an option name, downgrading unknown names to
    /// [`SizingMode::Fullscreen`] with a warning.
    #[must_use]
    pub fn from_name_lossy(name: &str) -> Self {
        Self::from_name(name).unwrap_or_else(|| {
            tracing::warn!(mode = name, "unknown sizing mode; defaulting to fullscreen");
            Self::Fullscreen
        })
    }

    /// Compute the panel height for `viewport`.
    #[must_use]
    pub fn height_for(self, viewport: Viewport) -> f64 {
        match self {
            Self::Fullscreen => viewport.height,
            Self::FixedAspect => {
                let aspect_height = viewport.width * ASPECT_HEIGHT / ASPECT_WIDTH;
                aspect_height.min(viewport.height)
            }
        }
    }
}

impl fmt::Display for SizingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Compute the panel height and log the inputs at debug level.
pub fn compute_height(mode: SizingMode, viewport: Viewport) -> f64 {
    let height = mode.height_for(viewport);
    tracing::debug!(
        mode = %mode,
        viewport_width = viewport.width,
        viewport_height = viewport.height,
        height,
        "computed panel height"
    );
    height
}
