//! Observable state store for the formscroll engine.
//!
//! A single reactive primitive backs every piece of shared state in the
//! engine: `MutableState<T>` holds a value behind a shared handle and
//! notifies registered watchers whenever the value is written. `State<T>`
//! is the read-only view handed to consumers that must not write.
//!
//! The store is single-threaded by design. All writes happen on the same
//! event-processing thread, so interior mutability is `RefCell`, not locks.

use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_WATCH_ID: AtomicU64 = AtomicU64::new(1);

/// Internal hook that lets a `WatchHandle` detach itself without knowing
/// the concrete value type.
trait WatcherTable {
    fn remove_watcher(&self, id: u64);
}

struct StateInner<T> {
    value: RefCell<T>,
    watchers: RefCell<FxHashMap<u64, Rc<dyn Fn()>>>,
}

impl<T> StateInner<T> {
    fn notify(&self) {
        // Snapshot before invoking: a watcher may register or drop other
        // watchers on this same state while it runs.
        let snapshot: Vec<Rc<dyn Fn()>> = self.watchers.borrow().values().cloned().collect();
        for watcher in snapshot {
            watcher();
        }
    }
}

impl<T> WatcherTable for StateInner<T> {
    fn remove_watcher(&self, id: u64) {
        self.watchers.borrow_mut().remove(&id);
    }
}

/// Writable observable value.
///
/// Cloning the handle shares the underlying cell; the value itself is only
/// cloned out on `value()`.
pub struct MutableState<T> {
    inner: Rc<StateInner<T>>,
}

impl<T> Clone for MutableState<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: 'static> MutableState<T> {
    pub fn new(initial: T) -> Self {
        Self {
            inner: Rc::new(StateInner {
                value: RefCell::new(initial),
                watchers: RefCell::new(FxHashMap::default()),
            }),
        }
    }

    /// Read the value through a borrow without cloning it out.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.value.borrow())
    }

    /// Replace the value and notify watchers unconditionally.
    pub fn set(&self, value: T) {
        *self.inner.value.borrow_mut() = value;
        self.inner.notify();
    }

    /// Mutate the value in place, then notify watchers.
    pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let result = f(&mut self.inner.value.borrow_mut());
        self.inner.notify();
        result
    }

    /// Register a watcher fired after every write. The watcher stays
    /// registered for as long as the returned handle is alive.
    pub fn watch(&self, watcher: impl Fn() + 'static) -> WatchHandle {
        let id = NEXT_WATCH_ID.fetch_add(1, Ordering::Relaxed);
        self.inner.watchers.borrow_mut().insert(id, Rc::new(watcher));
        let strong: Rc<dyn WatcherTable> = self.inner.clone();
        let table: Weak<dyn WatcherTable> = Rc::downgrade(&strong);
        WatchHandle { id, table }
    }

    /// Read-only view of this state.
    pub fn as_state(&self) -> State<T> {
        State {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: Clone + 'static> MutableState<T> {
    /// Clone the current value out.
    pub fn value(&self) -> T {
        self.inner.value.borrow().clone()
    }
}

impl<T: Clone + PartialEq + 'static> MutableState<T> {
    /// Write only when the value actually changed; watchers are not fired
    /// for same-value writes. Returns whether a write happened.
    ///
    /// Derived values (like the registry's current focus) go through this
    /// so downstream recomputation only triggers on real transitions.
    pub fn set_if_changed(&self, value: T) -> bool {
        {
            let current = self.inner.value.borrow();
            if *current == value {
                return false;
            }
        }
        self.set(value);
        true
    }
}

impl<T: fmt::Debug> fmt::Debug for MutableState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MutableState")
            .field("value", &*self.inner.value.borrow())
            .finish()
    }
}

/// Read-only view of a `MutableState`.
pub struct State<T> {
    inner: Rc<StateInner<T>>,
}

impl<T> Clone for State<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: 'static> State<T> {
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.value.borrow())
    }

    pub fn watch(&self, watcher: impl Fn() + 'static) -> WatchHandle {
        let id = NEXT_WATCH_ID.fetch_add(1, Ordering::Relaxed);
        self.inner.watchers.borrow_mut().insert(id, Rc::new(watcher));
        let strong: Rc<dyn WatcherTable> = self.inner.clone();
        let table: Weak<dyn WatcherTable> = Rc::downgrade(&strong);
        WatchHandle { id, table }
    }
}

impl<T: Clone + 'static> State<T> {
    pub fn value(&self) -> T {
        self.inner.value.borrow().clone()
    }
}

impl<T: fmt::Debug> fmt::Debug for State<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("State")
            .field("value", &*self.inner.value.borrow())
            .finish()
    }
}

/// Keeps a watcher registered while alive; dropping it unsubscribes.
///
/// The handle holds only a weak reference to the state, so it never keeps
/// a dropped scope's state alive on its own.
pub struct WatchHandle {
    id: u64,
    table: Weak<dyn WatcherTable>,
}

impl Drop for WatchHandle {
    fn drop(&mut self) {
        if let Some(table) = self.table.upgrade() {
            table.remove_watcher(self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn set_and_read() {
        let state = MutableState::new(3.0f32);
        assert_eq!(state.value(), 3.0);
        state.set(5.5);
        assert_eq!(state.value(), 5.5);
        state.with(|v| assert_eq!(*v, 5.5));
    }

    #[test]
    fn watcher_fires_on_every_set() {
        let state = MutableState::new(0u32);
        let fired = Rc::new(Cell::new(0u32));
        let observed = Rc::clone(&fired);
        let _handle = state.watch(move || observed.set(observed.get() + 1));

        state.set(1);
        state.set(1);
        state.update(|v| *v += 1);
        assert_eq!(fired.get(), 3);
    }

    #[test]
    fn set_if_changed_gates_notifications() {
        let state = MutableState::new(Some(7));
        let fired = Rc::new(Cell::new(0u32));
        let observed = Rc::clone(&fired);
        let _handle = state.watch(move || observed.set(observed.get() + 1));

        assert!(!state.set_if_changed(Some(7)));
        assert_eq!(fired.get(), 0);
        assert!(state.set_if_changed(None));
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn dropping_handle_unsubscribes() {
        let state = MutableState::new(0u32);
        let fired = Rc::new(Cell::new(0u32));
        let observed = Rc::clone(&fired);
        let handle = state.watch(move || observed.set(observed.get() + 1));

        state.set(1);
        drop(handle);
        state.set(2);
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn watcher_may_subscribe_reentrantly() {
        let state = MutableState::new(0u32);
        let reader = state.clone();
        let late_handle: Rc<RefCell<Option<WatchHandle>>> = Rc::new(RefCell::new(None));
        let slot = Rc::clone(&late_handle);
        let _handle = state.watch(move || {
            if slot.borrow().is_none() {
                let inner = reader.watch(|| {});
                slot.borrow_mut().replace(inner);
            }
        });

        state.set(1);
        assert!(late_handle.borrow().is_some());
        state.set(2);
    }

    #[test]
    fn read_only_view_sees_writes() {
        let state = MutableState::new(1i32);
        let view = state.as_state();
        state.set(9);
        assert_eq!(view.value(), 9);
    }
}
