//! Field registry: layout metadata and focus tracking per field name.
//!
//! One registry lives in each mounted scroll scope. Layout measurements
//! flow in from the probe, focus transitions from the field widgets, and
//! the calculator observes the derived current-focus value — which only
//! changes when the focused record actually changes, not on every
//! registry write.

use indexmap::IndexMap;
use std::cell::RefCell;
use std::rc::Rc;

use formscroll_core::{MutableState, State};

/// Layout metadata of one registered field.
///
/// `position` is the vertical offset within the scroll content, measured
/// relative to the wrapper; it stays 0 until the first relative
/// measurement lands.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldRecord {
    pub name: String,
    pub position: f32,
    pub height: f32,
    pub is_focus: bool,
}

impl FieldRecord {
    fn unmeasured(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            position: 0.0,
            height: 0.0,
            is_focus: false,
        }
    }
}

/// Opaque handle to a focusable control, supplied per field by the host
/// widget. `request_focus` asks the real control to take focus; the
/// resulting platform focus event flows back through `on_focus`.
pub trait FocusTarget {
    fn request_focus(&self);
}

type Elements = IndexMap<String, FieldRecord>;

/// Per-scope field registry plus the input reference table used for
/// submit chaining.
pub struct FieldRegistry {
    elements: MutableState<Elements>,
    current_focus: MutableState<Option<FieldRecord>>,
    inputs: RefCell<IndexMap<String, Rc<dyn FocusTarget>>>,
}

impl FieldRegistry {
    pub fn new() -> Self {
        Self {
            elements: MutableState::new(IndexMap::new()),
            current_focus: MutableState::new(None),
            inputs: RefCell::new(IndexMap::new()),
        }
    }

    /// Record a completed relative measurement. A first measurement
    /// inserts the record unfocused; a repeated one refreshes the height
    /// in place, preserving position and focus.
    pub fn register_measured(&self, name: &str, position: f32, height: f32) {
        self.elements.update(|elements| {
            match elements.get_mut(name) {
                Some(record) => record.height = height,
                None => {
                    elements.insert(
                        name.to_owned(),
                        FieldRecord {
                            name: name.to_owned(),
                            position,
                            height,
                            is_focus: false,
                        },
                    );
                }
            }
        });
        self.refresh_current_focus();
    }

    /// Cheap-path height refresh from a synchronous layout event. Unknown
    /// names are ignored; they go through the measurement path first.
    pub fn refresh_height(&self, name: &str, height: f32) {
        let touched = self.elements.update(|elements| {
            if let Some(record) = elements.get_mut(name) {
                record.height = height;
                true
            } else {
                false
            }
        });
        if touched {
            self.refresh_current_focus();
        }
    }

    /// Mark the named field focused, unfocusing whichever field held
    /// focus before. Creates a zero-valued record when the field has not
    /// been measured yet.
    pub fn set_focus(&self, name: &str) {
        self.elements.update(|elements| {
            for (other, record) in elements.iter_mut() {
                if record.is_focus && other != name {
                    log::debug!("focus moved away from '{other}' without a blur event");
                    record.is_focus = false;
                }
            }
            elements
                .entry(name.to_owned())
                .or_insert_with(|| FieldRecord::unmeasured(name))
                .is_focus = true;
        });
        self.refresh_current_focus();
    }

    /// Clear the named field's focus flag, creating the defensive zero
    /// record when absent.
    pub fn clear_focus(&self, name: &str) {
        self.elements.update(|elements| {
            elements
                .entry(name.to_owned())
                .or_insert_with(|| FieldRecord::unmeasured(name))
                .is_focus = false;
        });
        self.refresh_current_focus();
    }

    /// Clear focus wherever it currently is.
    pub fn clear_all_focus(&self) {
        self.elements.update(|elements| {
            for record in elements.values_mut() {
                record.is_focus = false;
            }
        });
        self.refresh_current_focus();
    }

    /// Derived current-focus value; changes only on real transitions.
    pub fn current_focus(&self) -> State<Option<FieldRecord>> {
        self.current_focus.as_state()
    }

    pub fn current_focus_name(&self) -> Option<String> {
        self.current_focus.with(|focus| focus.as_ref().map(|f| f.name.clone()))
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.elements.with(|elements| elements.contains_key(name))
    }

    pub fn record(&self, name: &str) -> Option<FieldRecord> {
        self.elements.with(|elements| elements.get(name).cloned())
    }

    /// Idempotent focus-handle registration; an existing handle is never
    /// overwritten.
    pub fn register_input(&self, name: &str, target: Rc<dyn FocusTarget>) {
        let mut inputs = self.inputs.borrow_mut();
        if !inputs.contains_key(name) {
            inputs.insert(name.to_owned(), target);
        }
    }

    pub fn remove_input(&self, name: &str) {
        self.inputs.borrow_mut().shift_remove(name);
    }

    /// Programmatic focus transfer. Unknown names are a silent no-op.
    pub fn chain(&self, name: &str) {
        let target = self.inputs.borrow().get(name).cloned();
        match target {
            Some(target) => target.request_focus(),
            None => log::debug!("chain to unregistered field '{name}' ignored"),
        }
    }

    fn refresh_current_focus(&self) {
        let focused = self
            .elements
            .with(|elements| elements.values().find(|record| record.is_focus).cloned());
        self.current_focus.set_if_changed(focused);
    }
}

impl Default for FieldRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "tests/registry_tests.rs"]
mod tests;
