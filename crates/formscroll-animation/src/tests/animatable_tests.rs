use super::*;

use crate::{AnimationSpec, AnimationType, Easing, FrameClock, SpringSpec};
use std::cell::Cell;
use std::rc::Rc;

const MS: u64 = 1_000_000;

fn tween(duration_millis: u64) -> AnimationType {
    AnimationType::Tween(AnimationSpec::linear(duration_millis))
}

#[test]
fn easing_linear_is_identity() {
    assert_eq!(Easing::Linear.transform(0.0), 0.0);
    assert_eq!(Easing::Linear.transform(0.5), 0.5);
    assert_eq!(Easing::Linear.transform(1.0), 1.0);
}

#[test]
fn easing_curves_hit_both_endpoints() {
    let curves = [
        Easing::Linear,
        Easing::EaseIn,
        Easing::EaseOut,
        Easing::EaseInOut,
        Easing::FastOutSlowIn,
    ];
    for easing in curves {
        assert!(easing.transform(0.0).abs() < 0.01, "{easing:?} start");
        assert!((easing.transform(1.0) - 1.0).abs() < 0.01, "{easing:?} end");
    }
}

#[test]
fn tween_interpolates_and_finishes() {
    let clock = FrameClock::new();
    let value = Animatable::new(0.0f32, clock.clone());
    value.animate_to(10.0, tween(100));

    clock.drive(0);
    assert_eq!(value.value(), 0.0);

    clock.drive(50 * MS);
    assert!((value.value() - 5.0).abs() < 1e-3);

    clock.drive(100 * MS);
    assert_eq!(value.value(), 10.0);
    assert!(!clock.has_pending());
}

#[test]
fn tween_delay_holds_the_previous_value() {
    let clock = FrameClock::new();
    let value = Animatable::new(0.0f32, clock.clone());
    value.animate_to(
        10.0,
        AnimationType::Tween(AnimationSpec::linear(100).with_delay(50)),
    );

    clock.drive(0);
    clock.drive(25 * MS);
    assert_eq!(value.value(), 0.0);
    assert!(clock.has_pending());

    clock.drive(75 * MS);
    assert!((value.value() - 2.5).abs() < 1e-3);

    clock.drive(150 * MS);
    assert_eq!(value.value(), 10.0);
}

#[test]
fn snap_cancels_the_inflight_transition() {
    let clock = FrameClock::new();
    let value = Animatable::new(0.0f32, clock.clone());
    value.animate_to(10.0, tween(100));
    clock.drive(0);

    value.snap_to(3.0);
    assert_eq!(value.value(), 3.0);
    assert!(!clock.has_pending());

    clock.drive(200 * MS);
    assert_eq!(value.value(), 3.0);
}

#[test]
fn retarget_restarts_from_the_presented_value() {
    let clock = FrameClock::new();
    let value = Animatable::new(0.0f32, clock.clone());
    value.animate_to(10.0, tween(100));
    clock.drive(0);
    clock.drive(50 * MS);
    assert!((value.value() - 5.0).abs() < 1e-3);

    value.animate_to(0.0, tween(100));
    clock.drive(60 * MS);
    assert!((value.value() - 5.0).abs() < 1e-3);

    clock.drive(110 * MS);
    assert!((value.value() - 2.5).abs() < 1e-3);

    clock.drive(160 * MS);
    assert_eq!(value.value(), 0.0);
    assert!(!clock.has_pending());
}

#[test]
fn spring_settles_at_the_target() {
    let clock = FrameClock::new();
    let value = Animatable::new(0.0f32, clock.clone());
    value.animate_to(1.0, AnimationType::Spring(SpringSpec::no_bounce()));

    let mut frame_time = 0u64;
    for _ in 0..2000 {
        if !clock.has_pending() {
            break;
        }
        frame_time += 16 * MS;
        clock.drive(frame_time);
    }

    assert!(!clock.has_pending(), "spring should come to rest");
    assert_eq!(value.value(), 1.0);
}

#[test]
fn state_view_tracks_the_animation() {
    let clock = FrameClock::new();
    let value = Animatable::new(0.0f32, clock.clone());
    let presented = value.state();
    let writes = Rc::new(Cell::new(0u32));
    let observed = Rc::clone(&writes);
    let _watch = presented.watch(move || observed.set(observed.get() + 1));

    value.animate_to(10.0, tween(100));
    clock.drive(0);
    clock.drive(50 * MS);
    clock.drive(100 * MS);

    assert_eq!(presented.value(), 10.0);
    assert!(writes.get() >= 3);
}

#[test]
fn cancelled_registration_never_fires() {
    let clock = FrameClock::new();
    let fired = Rc::new(Cell::new(false));
    let observed = Rc::clone(&fired);
    let registration = clock.with_frame_nanos(move |_| observed.set(true));

    registration.cancel();
    assert!(!clock.has_pending());
    clock.drive(0);
    assert!(!fired.get());
}
