//! Animated value holder driving tween and spring transitions.

use std::cell::RefCell;
use std::rc::Rc;

use formscroll_core::{MutableState, State};

use crate::clock::{FrameCallbackRegistration, FrameClock};
use crate::spec::{AnimationSpec, AnimationType, SpringSpec};

/// Types that can be linearly interpolated.
pub trait Lerp {
    fn lerp(&self, target: &Self, fraction: f32) -> Self;
}

impl Lerp for f32 {
    fn lerp(&self, target: &Self, fraction: f32) -> Self {
        self + (target - self) * fraction
    }
}

impl Lerp for f64 {
    fn lerp(&self, target: &Self, fraction: f32) -> Self {
        self + (target - self) * fraction as f64
    }
}

/// Interpolatable values the spring integrator can project onto a single
/// axis.
pub trait Scalar: Lerp + Clone {
    fn as_f32(&self) -> f32;

    /// Progress of `current` along the start→target segment.
    fn progress(from: &Self, target: &Self, current: &Self) -> f32 {
        let from = from.as_f32();
        let target = target.as_f32();
        let current = current.as_f32();
        if (target - from).abs() < f32::EPSILON {
            1.0
        } else {
            (current - from) / (target - from)
        }
    }

    fn near(current: &Self, target: &Self, threshold: f32) -> bool {
        (current.as_f32() - target.as_f32()).abs() < threshold
    }
}

impl Scalar for f32 {
    fn as_f32(&self) -> f32 {
        *self
    }
}

impl Scalar for f64 {
    fn as_f32(&self) -> f32 {
        *self as f32
    }
}

struct AnimatableInner<T: Scalar + 'static> {
    state: MutableState<T>,
    clock: FrameClock,
    current: T,
    from: T,
    target: T,
    velocity: f32,
    animation: AnimationType,
    start_time_nanos: Option<u64>,
    last_frame_nanos: Option<u64>,
    registration: Option<FrameCallbackRegistration>,
}

/// A value that moves toward its target over frames instead of jumping.
///
/// Writes go through `animate_to` or `snap_to`; reads observe the presented
/// value through `state()`. Retargeting mid-flight restarts from the
/// current presented value, never from the original start.
pub struct Animatable<T: Scalar + 'static> {
    inner: Rc<RefCell<AnimatableInner<T>>>,
}

impl<T: Scalar + 'static> Animatable<T> {
    pub fn new(initial: T, clock: FrameClock) -> Self {
        Self {
            inner: Rc::new(RefCell::new(AnimatableInner {
                state: MutableState::new(initial.clone()),
                clock,
                current: initial.clone(),
                from: initial.clone(),
                target: initial,
                velocity: 0.0,
                animation: AnimationType::default(),
                start_time_nanos: None,
                last_frame_nanos: None,
                registration: None,
            })),
        }
    }

    /// Begin a transition toward `target`, cancelling any in-flight one.
    pub fn animate_to(&self, target: T, animation: AnimationType) {
        {
            let mut inner = self.inner.borrow_mut();
            if let Some(registration) = inner.registration.take() {
                registration.cancel();
            }
            inner.from = inner.current.clone();
            inner.target = target;
            inner.animation = animation;
            inner.start_time_nanos = None;
            inner.last_frame_nanos = None;
        }
        Self::schedule_frame(&self.inner);
    }

    /// Jump to `target` immediately with no transition.
    pub fn snap_to(&self, target: T) {
        let mut inner = self.inner.borrow_mut();
        if let Some(registration) = inner.registration.take() {
            registration.cancel();
        }
        inner.current = target.clone();
        inner.from = target.clone();
        inner.target = target.clone();
        inner.velocity = 0.0;
        inner.start_time_nanos = None;
        inner.last_frame_nanos = None;
        inner.state.set(target);
    }

    /// The value the animation is heading to.
    pub fn target(&self) -> T {
        self.inner.borrow().target.clone()
    }

    pub fn animation(&self) -> AnimationType {
        self.inner.borrow().animation
    }

    /// Observable presented value.
    pub fn state(&self) -> State<T> {
        self.inner.borrow().state.as_state()
    }

    pub fn value(&self) -> T {
        self.inner.borrow().current.clone()
    }

    fn schedule_frame(this: &Rc<RefCell<AnimatableInner<T>>>) {
        let clock = {
            let inner = this.borrow();
            if inner.registration.is_some() {
                return;
            }
            inner.clock.clone()
        };
        let weak = Rc::downgrade(this);
        let registration = clock.with_frame_nanos(move |frame_time| {
            if let Some(strong) = weak.upgrade() {
                Self::on_frame(&strong, frame_time);
            }
        });
        this.borrow_mut().registration = Some(registration);
    }

    fn on_frame(this: &Rc<RefCell<AnimatableInner<T>>>, frame_time_nanos: u64) {
        let keep_running = {
            let mut inner = this.borrow_mut();
            inner.registration = None;
            match inner.animation {
                AnimationType::Tween(spec) => Self::step_tween(&mut inner, spec, frame_time_nanos),
                AnimationType::Spring(spec) => {
                    Self::step_spring(&mut inner, spec, frame_time_nanos)
                }
            }
        };
        if keep_running {
            Self::schedule_frame(this);
        }
    }

    fn step_tween(
        inner: &mut AnimatableInner<T>,
        spec: AnimationSpec,
        frame_time_nanos: u64,
    ) -> bool {
        let start = *inner.start_time_nanos.get_or_insert(frame_time_nanos);
        let elapsed = frame_time_nanos.saturating_sub(start);
        let delay = spec.delay_millis * 1_000_000;
        if elapsed < delay {
            return true;
        }

        let duration = (spec.duration_millis * 1_000_000).max(1);
        let linear = ((elapsed - delay) as f32 / duration as f32).clamp(0.0, 1.0);
        let progress = spec.easing.transform(linear);

        let value = inner.from.lerp(&inner.target, progress);
        inner.current = value.clone();
        inner.state.set(value);

        if linear >= 1.0 {
            inner.current = inner.target.clone();
            inner.from = inner.target.clone();
            inner.start_time_nanos = None;
            inner.state.set(inner.target.clone());
            false
        } else {
            true
        }
    }

    fn step_spring(
        inner: &mut AnimatableInner<T>,
        spec: SpringSpec,
        frame_time_nanos: u64,
    ) -> bool {
        let last = inner.last_frame_nanos.replace(frame_time_nanos);
        let dt = match last {
            Some(last) => frame_time_nanos.saturating_sub(last) as f32 / 1_000_000_000.0,
            None => return true,
        };
        if dt <= 0.0 {
            return true;
        }

        let damping = 2.0 * spec.damping_ratio * spec.stiffness.sqrt();
        let mut progress = <T as Scalar>::progress(&inner.from, &inner.target, &inner.current);

        // Semi-implicit Euler with capped substeps keeps the integration
        // stable across slow frames.
        let mut simulated = 0.0f32;
        while simulated < dt {
            let step = 0.016f32.min(dt - simulated);
            let displacement = progress - 1.0;
            let acceleration = -spec.stiffness * displacement - damping * inner.velocity;
            inner.velocity += acceleration * step;
            progress += inner.velocity * step;
            simulated += step;
        }

        inner.current = inner.from.lerp(&inner.target, progress.clamp(0.0, 2.0));
        inner.state.set(inner.current.clone());

        let at_rest = inner.velocity.abs() < spec.velocity_threshold;
        let near_target = <T as Scalar>::near(&inner.current, &inner.target, spec.position_threshold);
        if at_rest && near_target {
            inner.current = inner.target.clone();
            inner.from = inner.target.clone();
            inner.velocity = 0.0;
            inner.start_time_nanos = None;
            inner.last_frame_nanos = None;
            inner.state.set(inner.target.clone());
            false
        } else {
            true
        }
    }
}

impl<T: Scalar + 'static> Clone for Animatable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

#[cfg(test)]
#[path = "tests/animatable_tests.rs"]
mod tests;
