//! Form-scrolling engine: keeps the focused field visible above the
//! on-screen keyboard.
//!
//! The engine is a headless reactive layer. The host glue feeds it
//! layout events, keyboard lifecycle events, scroll events and an
//! orientation signal; the engine derives a vertical translation for the
//! scroll content and presents it through an animated value the host
//! applies as a transform.
//!
//! Everything hangs off a [`SmartScrollController`], one per mounted
//! scroll scope. See the crate-level modules for the individual pieces:
//! keyboard metrics, field registry, layout probe, offset calculator,
//! scroll coordinator and container tracker.

mod calculator;
mod container;
mod context;
mod coordinator;
mod error;
mod geometry;
mod keyboard;
mod probe;
mod registry;

pub use calculator::{
    android_translation, ios_translation, translation_for, Platform, TranslationInputs,
};
pub use container::ContainerOffsetTracker;
pub use context::{
    FieldCallbacks, FieldProps, KeyboardPersistTaps, ScrollConfig, ScrollViewProps,
    SmartScrollController, SmartScrollHandle,
};
pub use coordinator::{ScrollCoordinator, ScrollHost};
pub use error::MissingProviderError;
pub use geometry::{KeyboardCoordinates, Orientation, SafeAreaInsets, ScreenRect};
pub use keyboard::{
    KeyboardEvent, KeyboardEventBus, KeyboardState, KeyboardSubscription, KeyboardTransition,
};
pub use probe::{LayoutProbe, MeasureToken};
pub use registry::{FieldRecord, FieldRegistry, FocusTarget};

// The animation surface callers configure transitions with.
pub use formscroll_animation::{AnimationSpec, AnimationType, Easing, FrameClock, SpringSpec};
