//! Container offset: vertical space eaten by chrome outside the
//! scrollable area, e.g. a partially presented bottom sheet.

use formscroll_core::{MutableState, State};

/// Tracks `max(0, window_height − container_height)`.
///
/// Recomputed on every wrapper layout pass; shrink and growth both
/// propagate, so a sheet that expands later corrects the offset instead
/// of freezing the first measurement.
pub struct ContainerOffsetTracker {
    window_height: MutableState<f32>,
    offset: MutableState<f32>,
}

impl ContainerOffsetTracker {
    pub fn new(window_height: f32) -> Self {
        Self {
            window_height: MutableState::new(window_height),
            offset: MutableState::new(0.0),
        }
    }

    /// Update the viewport height, e.g. after an orientation change.
    pub fn set_window_height(&self, height: f32) {
        self.window_height.set(height);
    }

    /// Wrapper layout event: measure the container against the viewport.
    pub fn on_container_layout(&self, container_height: f32) {
        let window = self.window_height.value();
        let offset = (window - container_height).max(0.0);
        self.offset.set_if_changed(offset);
    }

    pub fn offset(&self) -> f32 {
        self.offset.value()
    }

    pub fn offset_state(&self) -> State<f32> {
        self.offset.as_state()
    }
}
