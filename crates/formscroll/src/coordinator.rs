//! Scroll tracking and translation presentation.
//!
//! The coordinator owns the scroll offset mirror and the animated
//! translation. Scroll events are stored unfiltered, last write wins;
//! programmatic scrolls are mirrored into the attached host. The
//! translation target comes from the calculator and is presented through
//! an `Animatable` with the caller-configured transition.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use formscroll_animation::{Animatable, AnimationType, FrameClock};
use formscroll_core::{MutableState, State};

use crate::calculator::Platform;

/// The scrollable container the engine drives. The host glue implements
/// this against the real scroll view.
pub trait ScrollHost {
    /// Programmatically set the vertical content offset.
    fn set_offset(&self, y: f32);
}

pub struct ScrollCoordinator {
    platform: Platform,
    transition: AnimationType,
    clock: FrameClock,
    scroll_y: MutableState<f32>,
    translation: Animatable<f32>,
    host: RefCell<Option<Rc<dyn ScrollHost>>>,
    // First-focus latch: the very first transition after mount waits a
    // platform-specific lead-in and the latch flips on the next frame,
    // so the initial appearance is not a visible flick.
    ready: Rc<Cell<bool>>,
    ready_scheduled: Cell<bool>,
}

impl ScrollCoordinator {
    pub fn new(platform: Platform, transition: AnimationType, clock: FrameClock) -> Self {
        Self {
            platform,
            transition,
            clock: clock.clone(),
            scroll_y: MutableState::new(0.0),
            translation: Animatable::new(0.0, clock),
            host: RefCell::new(None),
            ready: Rc::new(Cell::new(false)),
            ready_scheduled: Cell::new(false),
        }
    }

    pub fn attach_host(&self, host: Rc<dyn ScrollHost>) {
        self.host.borrow_mut().replace(host);
    }

    /// Scroll event from the host; stores the last reported offset.
    pub fn on_scroll(&self, y: f32) {
        self.scroll_y.set(y);
    }

    /// Programmatic scroll, mirrored into the attached host.
    pub fn scroll_to(&self, y: f32) {
        self.scroll_y.set(y);
        let host = self.host.borrow().clone();
        match host {
            Some(host) => host.set_offset(y),
            None => log::debug!("no scroll host attached; offset {y} not mirrored"),
        }
    }

    pub fn scroll_offset(&self) -> f32 {
        self.scroll_y.value()
    }

    pub fn scroll_state(&self) -> State<f32> {
        self.scroll_y.as_state()
    }

    /// Currently presented translation value.
    pub fn translation(&self) -> f32 {
        self.translation.value()
    }

    pub fn translation_state(&self) -> State<f32> {
        self.translation.state()
    }

    /// Drive the translation toward a new calculator result. Same target
    /// and same transition is a no-op, so recomputation storms do not
    /// restart the animation.
    pub fn apply_translation(&self, target: f32, focused: bool) {
        let transition = if focused && !self.ready.get() {
            if !self.ready_scheduled.get() {
                self.ready_scheduled.set(true);
                let ready = Rc::clone(&self.ready);
                let _ = self.clock.with_frame_nanos(move |_| ready.set(true));
            }
            self.transition
                .delayed_by(self.platform.first_transition_delay_millis())
        } else {
            self.transition
        };

        let retarget = (target - self.translation.target()).abs() > f32::EPSILON;
        if retarget || self.translation.animation() != transition {
            self.translation.animate_to(target, transition);
        }
    }

    /// Animate the translation home; used when the keyboard starts
    /// hiding.
    pub fn home(&self) {
        if self.translation.target().abs() > f32::EPSILON {
            self.translation.animate_to(0.0, self.transition);
        }
    }

    /// Orientation changed: scroll back to the top and drop the
    /// translation without animating.
    pub fn reset(&self) {
        self.scroll_to(0.0);
        self.translation.snap_to(0.0);
    }

    pub fn is_ready(&self) -> bool {
        self.ready.get()
    }
}

#[cfg(test)]
#[path = "tests/coordinator_tests.rs"]
mod tests;
