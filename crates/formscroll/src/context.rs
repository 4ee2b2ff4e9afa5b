//! The shared scroll context: one controller per mounted scroll scope.
//!
//! The controller owns every engine component, wires the event edges
//! together, and exposes the public surface the host glue consumes.
//! Consumers that outlive the scope hold a `SmartScrollHandle` and get
//! `MissingProviderError` once the scope is gone — the integration
//! mistake surfaces immediately instead of silently scrolling nothing.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use formscroll_animation::{AnimationType, FrameClock};
use formscroll_core::{State, WatchHandle};

use crate::calculator::{translation_for, Platform, TranslationInputs};
use crate::container::ContainerOffsetTracker;
use crate::coordinator::{ScrollCoordinator, ScrollHost};
use crate::error::MissingProviderError;
use crate::geometry::{Orientation, SafeAreaInsets};
use crate::keyboard::{KeyboardEventBus, KeyboardState, KeyboardSubscription, KeyboardTransition};
use crate::probe::{LayoutProbe, MeasureToken};
use crate::registry::{FieldRecord, FieldRegistry, FocusTarget};

/// Per-scope configuration, fixed at mount.
#[derive(Debug, Clone, Copy)]
pub struct ScrollConfig {
    pub platform: Platform,
    /// Extra padding between the focused field and the keyboard.
    pub padding: f32,
    pub insets: SafeAreaInsets,
    pub window_height: f32,
    /// Transition applied to translation changes.
    pub transition: AnimationType,
}

impl ScrollConfig {
    pub fn new(platform: Platform, window_height: f32) -> Self {
        Self {
            platform,
            padding: 0.0,
            insets: SafeAreaInsets::default(),
            window_height,
            transition: AnimationType::default(),
        }
    }

    pub fn with_padding(mut self, padding: f32) -> Self {
        self.padding = padding;
        self
    }

    pub fn with_insets(mut self, insets: SafeAreaInsets) -> Self {
        self.insets = insets;
        self
    }

    pub fn with_transition(mut self, transition: AnimationType) -> Self {
        self.transition = transition;
        self
    }
}

/// Taps-while-keyboard-open behavior the host should configure on its
/// scroll view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyboardPersistTaps {
    Never,
    Always,
    Handled,
}

/// Base props to merge onto the scrollable container.
pub struct ScrollViewProps {
    pub keyboard_should_persist_taps: KeyboardPersistTaps,
    pub on_scroll: Rc<dyn Fn(f32)>,
}

/// Caller-supplied focus callbacks composed after the engine's own.
#[derive(Default)]
pub struct FieldCallbacks {
    pub on_focus: Option<Rc<dyn Fn()>>,
    pub on_blur: Option<Rc<dyn Fn()>>,
}

/// Base props to merge onto a field widget.
pub struct FieldProps {
    pub on_focus: Rc<dyn Fn()>,
    pub on_blur: Rc<dyn Fn()>,
    /// Submit handler; chains focus to the configured successor.
    pub on_submit: Rc<dyn Fn()>,
    /// Fields keep focus on submit so chaining can move it.
    pub blur_on_submit: bool,
}

/// The engine. Created when a scroll scope mounts, dropped when it
/// unmounts; multiple scopes coexist without sharing state (keyboard
/// events are shared only through the bus they all listen to).
pub struct SmartScrollController {
    config: ScrollConfig,
    registry: Rc<FieldRegistry>,
    probe: LayoutProbe,
    keyboard: KeyboardState,
    container: ContainerOffsetTracker,
    coordinator: ScrollCoordinator,
    orientation: Cell<Orientation>,
    _watches: RefCell<Vec<WatchHandle>>,
    _subscriptions: RefCell<Vec<KeyboardSubscription>>,
}

impl SmartScrollController {
    /// Mount a scroll scope: build every component and wire the event
    /// edges that drive recomputation.
    pub fn mount(config: ScrollConfig, bus: &KeyboardEventBus, clock: FrameClock) -> Rc<Self> {
        let registry = Rc::new(FieldRegistry::new());
        let controller = Rc::new(Self {
            probe: LayoutProbe::new(Rc::clone(&registry)),
            registry,
            keyboard: KeyboardState::observe(bus),
            container: ContainerOffsetTracker::new(config.window_height),
            coordinator: ScrollCoordinator::new(config.platform, config.transition, clock),
            orientation: Cell::new(Orientation::default()),
            config,
            _watches: RefCell::new(Vec::new()),
            _subscriptions: RefCell::new(Vec::new()),
        });
        controller.wire(bus);
        controller
    }

    fn wire(self: &Rc<Self>, bus: &KeyboardEventBus) {
        let recompute = |controller: &Rc<Self>| {
            let weak = Rc::downgrade(controller);
            move || {
                if let Some(controller) = weak.upgrade() {
                    controller.recompute();
                }
            }
        };

        let mut watches = self._watches.borrow_mut();
        watches.push(self.registry.current_focus().watch(recompute(self)));
        watches.push(self.coordinator.scroll_state().watch(recompute(self)));
        watches.push(self.container.offset_state().watch(recompute(self)));
        // Keyboard geometry flows observer → calculator: watching the
        // observer's state (instead of the raw bus) guarantees recompute
        // sees the already-updated coordinates.
        watches.push(self.keyboard.coordinates_state().watch(recompute(self)));

        // The keyboard starting to hide sends the translation home,
        // whatever the calculator would currently say. Bus listeners run
        // in subscription order, so this fires after the observer's own
        // geometry update and any recompute it triggered.
        let weak = Rc::downgrade(self);
        self._subscriptions
            .borrow_mut()
            .push(bus.add_listener(KeyboardTransition::WillHide, move |_| {
                if let Some(controller) = weak.upgrade() {
                    controller.coordinator.home();
                }
            }));
    }

    /// Recompute the translation from the latest known inputs.
    fn recompute(&self) {
        let keyboard_end_y = self.keyboard.end_y();
        // Zeroed geometry is the no-keyboard sentinel; with nothing to
        // avoid, the triggers must not fire on a still-focused field.
        if keyboard_end_y == 0.0 {
            self.coordinator.apply_translation(0.0, false);
            return;
        }

        let focus = self.registry.current_focus().value();
        let inputs = TranslationInputs {
            container_offset: self.container.offset(),
            scroll_offset: self.coordinator.scroll_offset(),
            keyboard_end_y,
            padding: self.config.padding,
            insets: self.config.insets,
        };
        let target = translation_for(self.config.platform, focus.as_ref(), &inputs);
        self.coordinator.apply_translation(target, focus.is_some());
    }

    /// Weak handle for consumers that may outlive the scope.
    pub fn handle(self: &Rc<Self>) -> SmartScrollHandle {
        SmartScrollHandle {
            controller: Rc::downgrade(self),
        }
    }

    // ---- field lifecycle -------------------------------------------------

    /// Register a field's focusable control. Idempotent: a handle
    /// already registered under the name stays.
    pub fn register_field(&self, name: &str, target: Rc<dyn FocusTarget>) {
        self.registry.register_input(name, target);
    }

    /// Forget a field's control and invalidate any in-flight
    /// measurement, so a late completion cannot write a stale record.
    pub fn deregister_field(&self, name: &str) {
        self.registry.remove_input(name);
        self.probe.invalidate(name);
    }

    /// Layout event from a field wrapper. Returns a measurement ticket
    /// when the host must resolve a relative position measurement.
    pub fn on_field_layout(&self, name: &str, height: f32) -> Option<MeasureToken> {
        self.probe.on_field_layout(name, height)
    }

    /// Resolve an asynchronous relative measurement.
    pub fn complete_measurement(&self, token: MeasureToken, position: f32, height: f32) {
        self.probe.complete(token, position, height);
    }

    // ---- focus -----------------------------------------------------------

    pub fn on_focus(&self, name: &str) {
        self.registry.set_focus(name);
    }

    pub fn on_blur(&self, name: &str) {
        self.registry.clear_focus(name);
    }

    /// Move focus to the named field, typically on submit. Unknown
    /// names are a silent no-op.
    pub fn chain(&self, name: &str) {
        self.registry.chain(name);
    }

    pub fn current_focus_name(&self) -> Option<String> {
        self.registry.current_focus_name()
    }

    pub fn current_focus(&self) -> State<Option<FieldRecord>> {
        self.registry.current_focus()
    }

    // ---- container & scroll ----------------------------------------------

    /// Layout event from the wrapping container. The first one marks the
    /// wrapper mounted, unblocking relative measurements.
    pub fn on_wrapper_layout(&self, container_height: f32) {
        self.probe.set_wrapper_mounted(true);
        self.container.on_container_layout(container_height);
    }

    pub fn set_window_height(&self, height: f32) {
        self.container.set_window_height(height);
    }

    pub fn attach_scroll_host(&self, host: Rc<dyn ScrollHost>) {
        self.coordinator.attach_host(host);
    }

    pub fn on_scroll(&self, y: f32) {
        self.coordinator.on_scroll(y);
    }

    pub fn scroll_to(&self, y: f32) {
        self.coordinator.scroll_to(y);
    }

    pub fn scroll_offset(&self) -> f32 {
        self.coordinator.scroll_offset()
    }

    /// Orientation flips reset scroll, translation and focus; same
    /// orientation re-reported is ignored.
    pub fn on_orientation_change(&self, orientation: Orientation) {
        if self.orientation.replace(orientation) == orientation {
            return;
        }
        self.coordinator.reset();
        self.registry.clear_all_focus();
    }

    // ---- outputs ---------------------------------------------------------

    /// Currently presented translation.
    pub fn translation(&self) -> f32 {
        self.coordinator.translation()
    }

    pub fn translation_state(&self) -> State<f32> {
        self.coordinator.translation_state()
    }

    pub fn keyboard(&self) -> &KeyboardState {
        &self.keyboard
    }

    pub fn is_ready(&self) -> bool {
        self.coordinator.is_ready()
    }

    // ---- base props ------------------------------------------------------

    /// Base props to merge onto the scrollable container.
    pub fn base_scroll_props(self: &Rc<Self>) -> ScrollViewProps {
        let weak = Rc::downgrade(self);
        ScrollViewProps {
            keyboard_should_persist_taps: KeyboardPersistTaps::Handled,
            on_scroll: Rc::new(move |y| {
                if let Some(controller) = weak.upgrade() {
                    controller.on_scroll(y);
                }
            }),
        }
    }

    /// Base props to merge onto a field, wiring focus and blur into the
    /// registry before the caller's own callbacks run.
    pub fn base_field_props(
        self: &Rc<Self>,
        name: &str,
        callbacks: FieldCallbacks,
        chain_to: Option<&str>,
    ) -> FieldProps {
        let field = name.to_owned();
        let weak = Rc::downgrade(self);
        let user_focus = callbacks.on_focus;
        let on_focus = Rc::new(move || {
            if let Some(controller) = weak.upgrade() {
                controller.on_focus(&field);
            }
            if let Some(user) = &user_focus {
                user();
            }
        });

        let field = name.to_owned();
        let weak = Rc::downgrade(self);
        let user_blur = callbacks.on_blur;
        let on_blur = Rc::new(move || {
            if let Some(controller) = weak.upgrade() {
                controller.on_blur(&field);
            }
            if let Some(user) = &user_blur {
                user();
            }
        });

        let successor = chain_to.map(str::to_owned);
        let weak = Rc::downgrade(self);
        let on_submit = Rc::new(move || {
            if let (Some(controller), Some(successor)) = (weak.upgrade(), successor.as_deref()) {
                controller.chain(successor);
            }
        });

        FieldProps {
            on_focus,
            on_blur,
            on_submit,
            blur_on_submit: false,
        }
    }
}

/// Weak reference to a mounted scope.
#[derive(Clone)]
pub struct SmartScrollHandle {
    controller: Weak<SmartScrollController>,
}

impl SmartScrollHandle {
    /// The live controller, or `MissingProviderError` once the scope has
    /// unmounted (or never existed).
    pub fn controller(&self) -> Result<Rc<SmartScrollController>, MissingProviderError> {
        self.controller.upgrade().ok_or(MissingProviderError)
    }
}

#[cfg(test)]
#[path = "tests/engine_tests.rs"]
mod tests;
