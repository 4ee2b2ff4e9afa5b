//! Keyboard lifecycle events and the metrics observer.
//!
//! The host platform pushes the four keyboard lifecycle signals into a
//! `KeyboardEventBus`; `KeyboardState` subscribes to all four and exposes
//! the current geometry as observable state. Geometry is trusted on the
//! will- transitions too, since platforms report it before the software
//! keyboard finishes animating.

use indexmap::IndexMap;
use smallvec::SmallVec;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

use formscroll_core::{MutableState, State};

use crate::geometry::{KeyboardCoordinates, ScreenRect};

/// The four keyboard lifecycle signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyboardTransition {
    WillShow,
    DidShow,
    WillHide,
    DidHide,
}

impl KeyboardTransition {
    fn index(self) -> usize {
        match self {
            KeyboardTransition::WillShow => 0,
            KeyboardTransition::DidShow => 1,
            KeyboardTransition::WillHide => 2,
            KeyboardTransition::DidHide => 3,
        }
    }
}

/// Geometry payload of a keyboard event. Hide-complete events may arrive
/// without one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyboardEvent {
    pub start: ScreenRect,
    pub end: ScreenRect,
}

type Listener = Rc<dyn Fn(Option<&KeyboardEvent>)>;

// Insertion-ordered so delivery order is the subscription order: the
// metrics observer subscribes before anything reacting to its state.
struct BusInner {
    next_id: std::cell::Cell<u64>,
    listeners: [RefCell<IndexMap<u64, Listener>>; 4],
}

/// In-process stand-in for the platform keyboard module: one bus per app,
/// the host glue emits into it, the engine listens.
#[derive(Clone)]
pub struct KeyboardEventBus {
    inner: Rc<BusInner>,
}

impl KeyboardEventBus {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(BusInner {
                next_id: std::cell::Cell::new(1),
                listeners: Default::default(),
            }),
        }
    }

    /// Register a listener for one transition. Dropping the returned
    /// subscription releases it.
    pub fn add_listener(
        &self,
        transition: KeyboardTransition,
        listener: impl Fn(Option<&KeyboardEvent>) + 'static,
    ) -> KeyboardSubscription {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        self.inner.listeners[transition.index()]
            .borrow_mut()
            .insert(id, Rc::new(listener));
        KeyboardSubscription {
            id,
            transition,
            bus: Rc::downgrade(&self.inner),
        }
    }

    /// Deliver a transition to every listener registered for it.
    pub fn emit(&self, transition: KeyboardTransition, event: Option<&KeyboardEvent>) {
        // Snapshot first: a listener may subscribe or unsubscribe while
        // the event is being delivered.
        let snapshot: SmallVec<[Listener; 4]> = self.inner.listeners[transition.index()]
            .borrow()
            .values()
            .cloned()
            .collect();
        for listener in snapshot {
            listener(event);
        }
    }
}

impl Default for KeyboardEventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Releases its listener when dropped.
pub struct KeyboardSubscription {
    id: u64,
    transition: KeyboardTransition,
    bus: Weak<BusInner>,
}

impl Drop for KeyboardSubscription {
    fn drop(&mut self) {
        if let Some(bus) = self.bus.upgrade() {
            bus.listeners[self.transition.index()]
                .borrow_mut()
                .shift_remove(&self.id);
        }
    }
}

/// Observable keyboard metrics: visibility, geometry, derived height.
///
/// Holds its four bus subscriptions for its own lifetime, so dropping the
/// state (with its owning scroll scope) releases every listener.
pub struct KeyboardState {
    shown: MutableState<bool>,
    coordinates: MutableState<KeyboardCoordinates>,
    keyboard_height: MutableState<f32>,
    _subscriptions: Vec<KeyboardSubscription>,
}

impl KeyboardState {
    pub fn observe(bus: &KeyboardEventBus) -> Self {
        let shown = MutableState::new(false);
        let coordinates = MutableState::new(KeyboardCoordinates::EMPTY);
        let keyboard_height = MutableState::new(0.0f32);

        let mut subscriptions = Vec::with_capacity(4);

        let coords = coordinates.clone();
        subscriptions.push(bus.add_listener(KeyboardTransition::WillShow, move |event| {
            if let Some(event) = event {
                coords.set(KeyboardCoordinates {
                    start: event.start,
                    end: event.end,
                });
            }
        }));

        let coords = coordinates.clone();
        let visible = shown.clone();
        let height = keyboard_height.clone();
        subscriptions.push(bus.add_listener(KeyboardTransition::DidShow, move |event| {
            visible.set(true);
            if let Some(event) = event {
                coords.set(KeyboardCoordinates {
                    start: event.start,
                    end: event.end,
                });
                height.set(event.end.height);
            }
        }));

        let coords = coordinates.clone();
        subscriptions.push(bus.add_listener(KeyboardTransition::WillHide, move |event| {
            if let Some(event) = event {
                coords.set(KeyboardCoordinates {
                    start: event.start,
                    end: event.end,
                });
            }
        }));

        let coords = coordinates.clone();
        let visible = shown.clone();
        let height = keyboard_height.clone();
        subscriptions.push(bus.add_listener(KeyboardTransition::DidHide, move |event| {
            visible.set(false);
            match event {
                Some(event) => {
                    coords.set(KeyboardCoordinates {
                        start: event.start,
                        end: event.end,
                    });
                }
                None => {
                    coords.set(KeyboardCoordinates::EMPTY);
                    height.set(0.0);
                }
            }
        }));

        Self {
            shown,
            coordinates,
            keyboard_height,
            _subscriptions: subscriptions,
        }
    }

    pub fn shown(&self) -> bool {
        self.shown.value()
    }

    pub fn coordinates(&self) -> KeyboardCoordinates {
        self.coordinates.value()
    }

    /// Bottom edge geometry the calculator keys off.
    pub fn end_y(&self) -> f32 {
        self.coordinates.with(|c| c.end.screen_y)
    }

    pub fn keyboard_height(&self) -> f32 {
        self.keyboard_height.value()
    }

    pub fn shown_state(&self) -> State<bool> {
        self.shown.as_state()
    }

    pub fn coordinates_state(&self) -> State<KeyboardCoordinates> {
        self.coordinates.as_state()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(end_y: f32, height: f32) -> KeyboardEvent {
        KeyboardEvent {
            start: ScreenRect {
                screen_x: 0.0,
                screen_y: end_y + height,
                width: 390.0,
                height,
            },
            end: ScreenRect {
                screen_x: 0.0,
                screen_y: end_y,
                width: 390.0,
                height,
            },
        }
    }

    #[test]
    fn did_show_sets_visibility_and_height() {
        let bus = KeyboardEventBus::new();
        let keyboard = KeyboardState::observe(&bus);

        bus.emit(KeyboardTransition::DidShow, Some(&event(500.0, 300.0)));
        assert!(keyboard.shown());
        assert_eq!(keyboard.keyboard_height(), 300.0);
        assert_eq!(keyboard.end_y(), 500.0);
    }

    #[test]
    fn will_show_updates_geometry_only() {
        let bus = KeyboardEventBus::new();
        let keyboard = KeyboardState::observe(&bus);

        bus.emit(KeyboardTransition::WillShow, Some(&event(500.0, 300.0)));
        assert!(!keyboard.shown());
        assert_eq!(keyboard.keyboard_height(), 0.0);
        assert_eq!(keyboard.end_y(), 500.0);
    }

    #[test]
    fn did_hide_without_metadata_resets_to_the_sentinel() {
        let bus = KeyboardEventBus::new();
        let keyboard = KeyboardState::observe(&bus);

        bus.emit(KeyboardTransition::DidShow, Some(&event(500.0, 300.0)));
        bus.emit(KeyboardTransition::DidHide, None);

        assert!(!keyboard.shown());
        assert_eq!(keyboard.coordinates(), KeyboardCoordinates::EMPTY);
        assert_eq!(keyboard.keyboard_height(), 0.0);
    }

    #[test]
    fn did_hide_with_metadata_keeps_the_reported_geometry() {
        let bus = KeyboardEventBus::new();
        let keyboard = KeyboardState::observe(&bus);

        bus.emit(KeyboardTransition::DidShow, Some(&event(500.0, 300.0)));
        bus.emit(KeyboardTransition::DidHide, Some(&event(844.0, 300.0)));

        assert!(!keyboard.shown());
        assert_eq!(keyboard.end_y(), 844.0);
    }

    #[test]
    fn dropping_the_observer_releases_every_listener() {
        let bus = KeyboardEventBus::new();
        let keyboard = KeyboardState::observe(&bus);
        let shown = keyboard.shown_state();
        drop(keyboard);

        // No listener left: emitting must not touch the detached state.
        bus.emit(KeyboardTransition::DidShow, Some(&event(500.0, 300.0)));
        assert!(!shown.value());
    }
}
