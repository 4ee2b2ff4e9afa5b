use super::*;

use formscroll_animation::AnimationSpec;
use std::cell::RefCell;

const MS: u64 = 1_000_000;

fn linear(duration_millis: u64) -> AnimationType {
    AnimationType::Tween(AnimationSpec::linear(duration_millis))
}

struct RecordingHost {
    offsets: RefCell<Vec<f32>>,
}

impl RecordingHost {
    fn new() -> Rc<Self> {
        Rc::new(Self {
            offsets: RefCell::new(Vec::new()),
        })
    }
}

impl ScrollHost for RecordingHost {
    fn set_offset(&self, y: f32) {
        self.offsets.borrow_mut().push(y);
    }
}

#[test]
fn scroll_events_keep_the_last_reported_offset() {
    let coordinator = ScrollCoordinator::new(Platform::Ios, linear(100), FrameClock::new());
    coordinator.on_scroll(10.0);
    coordinator.on_scroll(4.5);
    assert_eq!(coordinator.scroll_offset(), 4.5);
}

#[test]
fn programmatic_scrolls_mirror_into_the_host() {
    let coordinator = ScrollCoordinator::new(Platform::Ios, linear(100), FrameClock::new());
    let host = RecordingHost::new();
    coordinator.attach_host(host.clone());

    coordinator.scroll_to(40.0);
    assert_eq!(coordinator.scroll_offset(), 40.0);
    assert_eq!(*host.offsets.borrow(), vec![40.0]);

    // Host-reported scrolls are not echoed back.
    coordinator.on_scroll(80.0);
    assert_eq!(*host.offsets.borrow(), vec![40.0]);
}

#[test]
fn first_transition_waits_for_the_platform_lead_in() {
    let clock = FrameClock::new();
    let coordinator = ScrollCoordinator::new(Platform::Android, linear(100), clock.clone());
    assert!(!coordinator.is_ready());

    coordinator.apply_translation(-50.0, true);
    clock.drive(0);
    assert!(coordinator.is_ready());

    // Still inside the 150ms Android lead-in.
    clock.drive(100 * MS);
    assert_eq!(coordinator.translation(), 0.0);

    clock.drive(250 * MS);
    assert_eq!(coordinator.translation(), -50.0);
}

#[test]
fn later_transitions_run_without_the_lead_in() {
    let clock = FrameClock::new();
    let coordinator = ScrollCoordinator::new(Platform::Ios, linear(100), clock.clone());

    coordinator.apply_translation(-50.0, true);
    clock.drive(0);
    clock.drive(116 * MS);
    assert_eq!(coordinator.translation(), -50.0);

    coordinator.apply_translation(-20.0, true);
    clock.drive(200 * MS);
    clock.drive(250 * MS);
    assert!((coordinator.translation() - (-35.0)).abs() < 1e-3);
    clock.drive(300 * MS);
    assert_eq!(coordinator.translation(), -20.0);
}

#[test]
fn unchanged_target_and_transition_do_not_restart_the_animation() {
    let clock = FrameClock::new();
    let coordinator =
        ScrollCoordinator::new(Platform::Ios, AnimationType::default(), clock.clone());

    // Target and transition both match the resting state.
    coordinator.apply_translation(0.0, false);
    assert!(!clock.has_pending());
}

#[test]
fn home_returns_the_translation_to_zero() {
    let clock = FrameClock::new();
    let coordinator = ScrollCoordinator::new(Platform::Ios, linear(100), clock.clone());

    coordinator.apply_translation(-50.0, true);
    clock.drive(0);
    clock.drive(116 * MS);
    assert_eq!(coordinator.translation(), -50.0);

    coordinator.home();
    clock.drive(200 * MS);
    clock.drive(300 * MS);
    assert_eq!(coordinator.translation(), 0.0);
}

#[test]
fn home_from_rest_schedules_nothing() {
    let clock = FrameClock::new();
    let coordinator = ScrollCoordinator::new(Platform::Ios, linear(100), clock.clone());
    coordinator.home();
    assert!(!clock.has_pending());
}

#[test]
fn reset_snaps_scroll_and_translation_immediately() {
    let clock = FrameClock::new();
    let coordinator = ScrollCoordinator::new(Platform::Ios, linear(100), clock.clone());
    let host = RecordingHost::new();
    coordinator.attach_host(host.clone());

    coordinator.apply_translation(-50.0, true);
    clock.drive(0);
    clock.drive(116 * MS);
    coordinator.on_scroll(120.0);

    coordinator.reset();
    assert_eq!(coordinator.scroll_offset(), 0.0);
    assert_eq!(coordinator.translation(), 0.0);
    assert_eq!(host.offsets.borrow().last(), Some(&0.0));
}
