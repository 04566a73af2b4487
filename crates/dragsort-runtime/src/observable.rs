#![forbid(unsafe_code)]

//! Shared value cell with versioned change notification.
//!
//! An [`Observable`] is the storage behind an
//! [`ObservableList`](crate::ObservableList). Mutations go through
//! [`Observable::modify`], whose closure says whether anything changed.
//! Effective mutations bump the version and then call every live
//! subscriber, in subscription order, with the internal borrow already
//! released.
//!
//! # Failure Modes
//!
//! - **Re-entrant mutation**: a subscriber that calls `modify` on the value
//!   it is being told about recurses into notification. It works, but the
//!   subscriber has to reach a fixed point.
//! - **Forgotten guards**: a [`Subscription`] that is never dropped keeps its
//!   callback registered for the life of the value.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use dragsort_core::CollectionId;
use tracing::{debug, debug_span};
use web_time::Instant;

type Callback<T> = Rc<dyn Fn(&T)>;

struct Shared<T> {
    value: T,
    version: u64,
    /// Weak so that dropping a [`Subscription`] is enough to unsubscribe.
    listeners: Vec<Weak<dyn Fn(&T)>>,
}

/// Shared, versioned value. Clones are handles to the same cell.
///
/// The version starts at 0 and grows by one per effective mutation.
pub struct Observable<T> {
    shared: Rc<RefCell<Shared<T>>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Rc::clone(&self.shared),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shared = self.shared.borrow();
        f.debug_struct("Observable")
            .field("id", &self.id())
            .field("version", &shared.version)
            .field("value", &shared.value)
            .finish()
    }
}

impl<T> Observable<T> {
    /// Identity of the cell, shared by all clones.
    #[must_use]
    pub fn id(&self) -> CollectionId {
        CollectionId::of_rc(&self.shared)
    }

    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.shared, &other.shared)
    }

    /// Borrow the value for the duration of `f`.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.shared.borrow().value)
    }

    #[must_use]
    pub fn version(&self) -> u64 {
        self.shared.borrow().version
    }

    /// Registered listeners. Dropped ones count until the next notification
    /// prunes them.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.shared.borrow().listeners.len()
    }
}

impl<T: Clone + 'static> Observable<T> {
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            shared: Rc::new(RefCell::new(Shared {
                value,
                version: 0,
                listeners: Vec::new(),
            })),
        }
    }

    /// Clone of the current value.
    #[must_use]
    pub fn get(&self) -> T {
        self.with(T::clone)
    }

    /// Mutate in place. `f` returns its result and whether it changed the
    /// value; subscribers only hear about changes.
    pub fn modify<R>(&self, f: impl FnOnce(&mut T) -> (R, bool)) -> R {
        let (result, changed) = {
            let mut shared = self.shared.borrow_mut();
            let (result, changed) = f(&mut shared.value);
            shared.version += u64::from(changed);
            (result, changed)
        };
        if changed {
            self.notify();
        }
        result
    }

    /// Call `callback` after every effective mutation until the returned
    /// guard is dropped.
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        let callback: Callback<T> = Rc::new(callback);
        self.shared
            .borrow_mut()
            .listeners
            .push(Rc::downgrade(&callback));
        Subscription {
            _callback: Box::new(callback),
        }
    }

    fn notify(&self) {
        let (callbacks, value, version) = {
            let mut shared = self.shared.borrow_mut();
            shared.listeners.retain(|listener| listener.strong_count() > 0);
            let callbacks: Vec<Callback<T>> =
                shared.listeners.iter().filter_map(Weak::upgrade).collect();
            if callbacks.is_empty() {
                return;
            }
            (callbacks, shared.value.clone(), shared.version)
        };

        let started = Instant::now();
        let span = debug_span!(
            "observable.notify",
            version,
            subscribers = callbacks.len() as u64,
            duration_us = tracing::field::Empty
        );
        let _entered = span.enter();
        for callback in &callbacks {
            callback(&value);
        }
        let duration_us = started.elapsed().as_micros() as u64;
        span.record("duration_us", duration_us);
        debug!(duration_us, "observable subscribers notified");
    }
}

/// Keeps one subscriber callback alive. Drop it to unsubscribe.
pub struct Subscription {
    _callback: Box<dyn Any>,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn push(obs: &Observable<Vec<char>>, c: char) {
        obs.modify(|items| {
            items.push(c);
            ((), true)
        });
    }

    #[test]
    fn effective_modify_bumps_version_once() {
        let obs = Observable::new(vec!['a']);
        push(&obs, 'b');
        push(&obs, 'c');
        assert_eq!(obs.get(), vec!['a', 'b', 'c']);
        assert_eq!(obs.version(), 2);
    }

    #[test]
    fn modify_without_change_is_silent() {
        let obs = Observable::new(vec!['a', 'b']);
        let heard = Rc::new(Cell::new(0));
        let heard_in_cb = Rc::clone(&heard);
        let _sub = obs.subscribe(move |_| heard_in_cb.set(heard_in_cb.get() + 1));

        let len = obs.modify(|items| (items.len(), false));
        assert_eq!(len, 2);
        assert_eq!(obs.version(), 0);
        assert_eq!(heard.get(), 0);

        let last = obs.modify(|items| {
            let last = items.pop();
            (last, last.is_some())
        });
        assert_eq!(last, Some('b'));
        assert_eq!(heard.get(), 1);
    }

    #[test]
    fn dropped_subscription_stops_callbacks_and_is_pruned() {
        let obs = Observable::<Vec<char>>::new(Vec::new());
        let heard = Rc::new(Cell::new(0));
        let heard_in_cb = Rc::clone(&heard);
        let sub = obs.subscribe(move |_| heard_in_cb.set(heard_in_cb.get() + 1));

        push(&obs, 'x');
        drop(sub);
        assert_eq!(obs.subscriber_count(), 1);
        push(&obs, 'y');
        assert_eq!(heard.get(), 1);
        assert_eq!(obs.subscriber_count(), 0);
    }

    #[test]
    fn subscribers_run_in_subscription_order_and_see_new_value() {
        let obs = Observable::<Vec<char>>::new(Vec::new());
        let log = Rc::new(RefCell::new(Vec::new()));
        let first = Rc::clone(&log);
        let _a = obs.subscribe(move |items: &Vec<char>| {
            first.borrow_mut().push(("a", items.len()));
        });
        let second = Rc::clone(&log);
        let _b = obs.subscribe(move |items: &Vec<char>| {
            second.borrow_mut().push(("b", items.len()));
        });

        push(&obs, 'x');
        assert_eq!(*log.borrow(), vec![("a", 1), ("b", 1)]);
    }

    #[test]
    fn subscriber_can_read_the_cell_it_observes() {
        let obs = Observable::new(vec!['a']);
        let seen = Rc::new(Cell::new(0usize));
        let seen_in_cb = Rc::clone(&seen);
        let handle = obs.clone();
        let _sub = obs.subscribe(move |_| seen_in_cb.set(handle.with(Vec::len)));

        push(&obs, 'b');
        assert_eq!(seen.get(), 2);
    }

    #[test]
    fn identity_follows_the_cell() {
        let a = Observable::new(0u8);
        let b = a.clone();
        let c = Observable::new(0u8);
        assert!(a.ptr_eq(&b));
        assert_eq!(a.id(), b.id());
        assert!(!a.ptr_eq(&c));
        assert_ne!(a.id(), c.id());
    }
}
