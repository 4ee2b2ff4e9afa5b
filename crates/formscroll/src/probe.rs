//! Layout probe: turns field layout events into registry entries.
//!
//! Two paths, so a re-render never re-triggers the expensive relative
//! measurement: an unregistered field asks the host for an asynchronous
//! position measurement relative to the wrapper, a registered field only
//! refreshes its height from the synchronous layout event.
//!
//! The asynchronous measurement races unmount. Every request carries a
//! generation token; deregistration bumps the generation, and a
//! completion with a stale token is discarded instead of written.

use rustc_hash::FxHashMap;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::registry::FieldRegistry;

/// Ticket for one in-flight relative measurement.
///
/// The host resolves it by calling `complete` with the measured position
/// and height, on whatever later event-loop turn the measurement lands.
#[derive(Debug)]
pub struct MeasureToken {
    name: String,
    generation: u64,
}

impl MeasureToken {
    pub fn field_name(&self) -> &str {
        &self.name
    }
}

pub struct LayoutProbe {
    registry: Rc<FieldRegistry>,
    wrapper_mounted: Cell<bool>,
    next_generation: Cell<u64>,
    pending: RefCell<FxHashMap<String, u64>>,
}

impl LayoutProbe {
    pub fn new(registry: Rc<FieldRegistry>) -> Self {
        Self {
            registry,
            wrapper_mounted: Cell::new(false),
            next_generation: Cell::new(1),
            pending: RefCell::new(FxHashMap::default()),
        }
    }

    /// The wrapper's reference becomes available on its first layout;
    /// until then measurements have nothing to be relative to.
    pub fn set_wrapper_mounted(&self, mounted: bool) {
        self.wrapper_mounted.set(mounted);
    }

    /// Handle a field layout event.
    ///
    /// Registered fields take the cheap path and return `None`. For an
    /// unregistered field with a mounted wrapper, the caller receives a
    /// `MeasureToken` it must resolve through `complete`. Without a
    /// mounted wrapper this is a benign no-op, retried on the next
    /// layout pass.
    pub fn on_field_layout(&self, name: &str, height: f32) -> Option<MeasureToken> {
        if self.registry.is_registered(name) {
            self.registry.refresh_height(name, height);
            return None;
        }
        if !self.wrapper_mounted.get() {
            return None;
        }

        let generation = self.next_generation.get();
        self.next_generation.set(generation + 1);
        // Latest request wins; a completion for an earlier one is stale.
        self.pending
            .borrow_mut()
            .insert(name.to_owned(), generation);
        Some(MeasureToken {
            name: name.to_owned(),
            generation,
        })
    }

    /// Resolve a measurement. Stale tokens (superseded or invalidated by
    /// deregistration) are discarded.
    pub fn complete(&self, token: MeasureToken, position: f32, height: f32) {
        let current = self.pending.borrow().get(&token.name).copied();
        if current != Some(token.generation) {
            log::debug!(
                "discarding stale measurement for field '{}'",
                token.name
            );
            return;
        }
        self.pending.borrow_mut().remove(&token.name);
        self.registry.register_measured(&token.name, position, height);
    }

    /// Forget any in-flight measurement for the field, so a completion
    /// arriving after unmount cannot insert a stale record.
    pub fn invalidate(&self, name: &str) {
        self.pending.borrow_mut().remove(name);
    }

    pub fn has_pending(&self, name: &str) -> bool {
        self.pending.borrow().contains_key(name)
    }
}

#[cfg(test)]
#[path = "tests/probe_tests.rs"]
mod tests;
