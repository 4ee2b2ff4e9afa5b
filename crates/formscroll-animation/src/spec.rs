//! Animation configuration types.

use crate::easing::Easing;

/// Duration, curve and lead-in delay of a tween.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationSpec {
    /// Duration in milliseconds.
    pub duration_millis: u64,
    /// Curve applied to linear progress.
    pub easing: Easing,
    /// Delay before the first interpolated frame, in milliseconds.
    pub delay_millis: u64,
}

impl AnimationSpec {
    pub fn tween(duration_millis: u64, easing: Easing) -> Self {
        Self {
            duration_millis,
            easing,
            delay_millis: 0,
        }
    }

    pub fn linear(duration_millis: u64) -> Self {
        Self::tween(duration_millis, Easing::Linear)
    }

    pub fn with_delay(mut self, delay_millis: u64) -> Self {
        self.delay_millis = delay_millis;
        self
    }
}

impl Default for AnimationSpec {
    fn default() -> Self {
        Self::tween(300, Easing::EaseInOut)
    }
}

/// Spring physics configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringSpec {
    /// 1.0 is critically damped; below bounces, above crawls.
    pub damping_ratio: f32,
    /// Higher stiffness settles faster.
    pub stiffness: f32,
    /// Velocity below which the spring counts as at rest.
    pub velocity_threshold: f32,
    /// Distance to target below which the spring counts as settled.
    pub position_threshold: f32,
}

impl SpringSpec {
    pub fn no_bounce() -> Self {
        Self {
            damping_ratio: 1.0,
            stiffness: 1500.0,
            velocity_threshold: 0.01,
            position_threshold: 0.001,
        }
    }

    pub fn bouncy() -> Self {
        Self {
            damping_ratio: 0.5,
            ..Self::no_bounce()
        }
    }
}

impl Default for SpringSpec {
    fn default() -> Self {
        Self::no_bounce()
    }
}

/// The transition applied to an animated value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnimationType {
    Tween(AnimationSpec),
    Spring(SpringSpec),
}

impl AnimationType {
    /// Push the start of the transition back by `delay_millis`.
    ///
    /// Springs have no notion of a lead-in, so the delay only applies to
    /// tweens; a delayed spring stays a plain spring.
    pub fn delayed_by(self, delay_millis: u64) -> Self {
        match self {
            AnimationType::Tween(spec) => AnimationType::Tween(spec.with_delay(delay_millis)),
            spring @ AnimationType::Spring(_) => spring,
        }
    }
}

impl Default for AnimationType {
    fn default() -> Self {
        AnimationType::Tween(AnimationSpec::default())
    }
}
