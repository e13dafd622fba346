#![forbid(unsafe_code)]

//! Fake panel element.
//!
//! Records every style write in order and keeps the latest value per
//! property, so tests can assert both the final presentation state and the
//! sequence that produced it.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::rc::Rc;

use framefit_core::{HostError, PanelElement, StyleProperty};

struct ElementState {
    tag: &'static str,
    id: Option<String>,
    styles: RefCell<BTreeMap<StyleProperty, String>>,
    writes: RefCell<Vec<(StyleProperty, String)>>,
    rejected: RefCell<BTreeSet<StyleProperty>>,
    parent: RefCell<Option<FakeElement>>,
    connected: Cell<bool>,
}

/// Shared handle to a fake element. Clones refer to the same element.
#[derive(Clone)]
pub struct FakeElement {
    state: Rc<ElementState>,
}

impl FakeElement {
    /// A connected element with no id and no parent.
    #[must_use]
    pub fn new(tag: &'static str) -> Self {
        Self::build(tag, None)
    }

    /// A connected element with an id.
    #[must_use]
    pub fn with_id(tag: &'static str, id: &str) -> Self {
        Self::build(tag, Some(id.to_owned()))
    }

    fn build(tag: &'static str, id: Option<String>) -> Self {
        Self {
            state: Rc::new(ElementState {
                tag,
                id,
                styles: RefCell::new(BTreeMap::new()),
                writes: RefCell::new(Vec::new()),
                rejected: RefCell::new(BTreeSet::new()),
                parent: RefCell::new(None),
                connected: Cell::new(true),
            }),
        }
    }

    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.state.id.as_deref()
    }

    /// Make `parent` this element's container.
    pub fn set_parent(&self, parent: &FakeElement) {
        *self.state.parent.borrow_mut() = Some(parent.clone());
    }

    /// Detach from the document.
    pub fn disconnect(&self) {
        self.state.connected.set(false);
    }

    /// Make subsequent writes of `property` fail.
    pub fn reject_style(&self, property: StyleProperty) {
        self.state.rejected.borrow_mut().insert(property);
    }

    /// Undo [`reject_style`](Self::reject_style).
    pub fn accept_style(&self, property: StyleProperty) {
        self.state.rejected.borrow_mut().remove(&property);
    }

    /// Latest value written for `property`.
    #[must_use]
    pub fn style(&self, property: StyleProperty) -> Option<String> {
        self.state.styles.borrow().get(&property).cloned()
    }

    /// Latest height value (`"720px"`).
    #[must_use]
    pub fn height(&self) -> Option<String> {
        self.style(StyleProperty::Height)
    }

    /// Visible with full opacity.
    #[must_use]
    pub fn is_revealed(&self) -> bool {
        self.style(StyleProperty::Visibility).as_deref() == Some("visible")
            && self.style(StyleProperty::Opacity).as_deref() == Some("1")
    }

    /// Hidden with zero opacity.
    #[must_use]
    pub fn is_concealed(&self) -> bool {
        self.style(StyleProperty::Visibility).as_deref() == Some("hidden")
            && self.style(StyleProperty::Opacity).as_deref() == Some("0")
    }

    /// Every accepted write, in order.
    #[must_use]
    pub fn writes(&self) -> Vec<(StyleProperty, String)> {
        self.state.writes.borrow().clone()
    }

    /// Number of accepted writes of `property`.
    #[must_use]
    pub fn write_count(&self, property: StyleProperty) -> usize {
        self.state
            .writes
            .borrow()
            .iter()
            .filter(|(p, _)| *p == property)
            .count()
    }

    /// Identity comparison.
    #[must_use]
    pub fn same_as(&self, other: &FakeElement) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }
}

impl PartialEq for FakeElement {
    fn eq(&self, other: &Self) -> bool {
        self.same_as(other)
    }
}

impl PanelElement for FakeElement {
    fn set_style(&self, property: StyleProperty, value: &str) -> Result<(), HostError> {
        if self.state.rejected.borrow().contains(&property) {
            return Err(HostError::new(
                "set_style",
                format!("{} rejected by fake element", property.css_name()),
            ));
        }
        self.state
            .styles
            .borrow_mut()
            .insert(property, value.to_owned());
        self.state
            .writes
            .borrow_mut()
            .push((property, value.to_owned()));
        Ok(())
    }

    fn parent(&self) -> Option<Self> {
        self.state.parent.borrow().clone()
    }

    fn is_connected(&self) -> bool {
        self.state.connected.get()
    }

    fn describe(&self) -> String {
        match &self.state.id {
            Some(id) => format!("<{}#{}>", self.state.tag, id),
            None => format!("<{}>", self.state.tag),
        }
    }
}

impl fmt::Debug for FakeElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}
