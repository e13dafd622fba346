#![forbid(unsafe_code)]

//! Presentation writes on the panel element.
//!
//! The controller only ever *writes* presentation state; it never reads
//! styling back from the host. Two transitions exist:
//!
//! 1. [`conceal`]: applied once at setup, before any height is known, so an
//!    unsized panel never reaches the viewer.
//! 2. [`reveal`]: writes the height, then flips opacity and visibility. This
//!    is the only path that makes the panel visible.

use crate::error::HostError;
use crate::host::PanelElement;

/// Transition applied at setup. Height and opacity animate independently.
pub const PANEL_TRANSITION: &str =
    "height 0.4s cubic-bezier(0.4, 0.0, 0.2, 1), opacity 0.3s cubic-bezier(0.4, 0.0, 0.2, 1)";

/// Style properties the controller writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StyleProperty {
    Transition,
    Opacity,
    Visibility,
    Height,
}

impl StyleProperty {
    /// CSS property name.
    #[must_use]
    pub const fn css_name(self) -> &'static str {
        match self {
            Self::Transition => "transition",
            Self::Opacity => "opacity",
            Self::Visibility => "visibility",
            Self::Height => "height",
        }
    }
}

/// CSS `visibility` values used by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Hidden,
    Visible,
}

impl Visibility {
    #[must_use]
    pub const fn css_value(self) -> &'static str {
        match self {
            Self::Hidden => "hidden",
            Self::Visible => "visible",
        }
    }
}

/// Render a height as a CSS pixel length (`720px`, `607.5px`).
#[must_use]
pub fn format_px(height: f64) -> String {
    format!("{height}px")
}

/// Apply the transition and hide the panel.
///
/// Every write is attempted even if an earlier one fails; the first failure
/// is returned.
pub fn conceal<E: PanelElement>(element: &E) -> Result<(), HostError> {
    let writes = [
        (StyleProperty::Transition, PANEL_TRANSITION),
        (StyleProperty::Opacity, "0"),
        (StyleProperty::Visibility, Visibility::Hidden.css_value()),
    ];
    let mut first_err = None;
    for (property, value) in writes {
        if let Err(err) = element.set_style(property, value) {
            first_err.get_or_insert(err);
        }
    }
    first_err.map_or(Ok(()), Err)
}

/// Write `height` and make the panel visible.
///
/// Stops at the first rejected write, so a panel whose height could not be
/// applied is not revealed unsized.
pub fn reveal<E: PanelElement>(element: &E, height: f64) -> Result<(), HostError> {
    element.set_style(StyleProperty::Height, &format_px(height))?;
    element.set_style(StyleProperty::Opacity, "1")?;
    element.set_style(StyleProperty::Visibility, Visibility::Visible.css_value())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct RecordingElement {
        writes: Rc<RefCell<Vec<(StyleProperty, String)>>>,
        reject: Option<StyleProperty>,
    }

    impl PanelElement for RecordingElement {
        fn set_style(&self, property: StyleProperty, value: &str) -> Result<(), HostError> {
            if self.reject == Some(property) {
                return Err(HostError::new("set_style", "rejected"));
            }
            self.writes.borrow_mut().push((property, value.to_owned()));
            Ok(())
        }

        fn parent(&self) -> Option<Self> {
            None
        }

        fn is_connected(&self) -> bool {
            true
        }

        fn describe(&self) -> String {
            "recording".into()
        }
    }

    #[test]
    fn format_px_uses_shortest_decimal() {
        assert_eq!(format_px(720.0), "720px");
        assert_eq!(format_px(607.5), "607.5px");
        assert_eq!(format_px(0.0), "0px");
    }

    #[test]
    fn conceal_writes_transition_then_hides() {
        let el = RecordingElement::default();
        conceal(&el).unwrap();
        let writes = el.writes.borrow();
        assert_eq!(
            *writes,
            vec![
                (StyleProperty::Transition, PANEL_TRANSITION.to_owned()),
                (StyleProperty::Opacity, "0".to_owned()),
                (StyleProperty::Visibility, "hidden".to_owned()),
            ]
        );
    }

    #[test]
    fn conceal_attempts_every_write_after_a_failure() {
        let el = RecordingElement {
            reject: Some(StyleProperty::Transition),
            ..RecordingElement::default()
        };
        assert!(conceal(&el).is_err());
        assert_eq!(el.writes.borrow().len(), 2);
    }

    #[test]
    fn reveal_sets_height_before_visibility() {
        let el = RecordingElement::default();
        reveal(&el, 600.0).unwrap();
        let props: Vec<_> = el.writes.borrow().iter().map(|(p, _)| *p).collect();
        assert_eq!(
            props,
            vec![
                StyleProperty::Height,
                StyleProperty::Opacity,
                StyleProperty::Visibility
            ]
        );
    }

    #[test]
    fn reveal_stops_when_height_is_rejected() {
        let el = RecordingElement {
            reject: Some(StyleProperty::Height),
            ..RecordingElement::default()
        };
        assert!(reveal(&el, 600.0).is_err());
        assert!(el.writes.borrow().is_empty());
    }
}
