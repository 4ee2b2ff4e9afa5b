//! Host-pumped frame clock.
//!
//! The engine never spawns threads or timers. Whatever owns the render loop
//! calls `drive` (or `drive_now`) once per frame; every callback scheduled
//! before that call fires with the frame timestamp, and callbacks scheduled
//! while draining land in the next frame.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use web_time::Instant;

type FrameCallback = Box<dyn FnOnce(u64)>;

struct ClockInner {
    next_id: Cell<u64>,
    scheduled: RefCell<Vec<(u64, FrameCallback)>>,
    epoch: Instant,
}

/// Shared frame-callback scheduler. Cloning shares the queue.
#[derive(Clone)]
pub struct FrameClock {
    inner: Rc<ClockInner>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(ClockInner {
                next_id: Cell::new(1),
                scheduled: RefCell::new(Vec::new()),
                epoch: Instant::now(),
            }),
        }
    }

    /// Schedule a callback for the next frame. The returned registration
    /// cancels the callback if it has not fired yet.
    pub fn with_frame_nanos(&self, callback: impl FnOnce(u64) + 'static) -> FrameCallbackRegistration {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        self.inner
            .scheduled
            .borrow_mut()
            .push((id, Box::new(callback)));
        FrameCallbackRegistration {
            id,
            clock: Rc::downgrade(&self.inner),
        }
    }

    /// Whether any callback is waiting for the next frame. Hosts use this
    /// to decide if the pump needs another turn.
    pub fn has_pending(&self) -> bool {
        !self.inner.scheduled.borrow().is_empty()
    }

    /// Fire every callback scheduled so far with the given timestamp.
    pub fn drive(&self, frame_time_nanos: u64) {
        let drained = std::mem::take(&mut *self.inner.scheduled.borrow_mut());
        for (_, callback) in drained {
            callback(frame_time_nanos);
        }
    }

    /// `drive` with a wall-clock timestamp measured from clock creation.
    pub fn drive_now(&self) {
        self.drive(self.inner.epoch.elapsed().as_nanos() as u64);
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Cancels a scheduled frame callback.
pub struct FrameCallbackRegistration {
    id: u64,
    clock: Weak<ClockInner>,
}

impl FrameCallbackRegistration {
    pub fn cancel(self) {
        if let Some(clock) = self.clock.upgrade() {
            clock
                .scheduled
                .borrow_mut()
                .retain(|(id, _)| *id != self.id);
        }
    }
}
