#![forbid(unsafe_code)]

//! Host-wide drag gesture tracking.
//!
//! A host runs at most one native drag at a time, however many sortable
//! groups are attached to it. Every group on a host shares that host's
//! [`GestureTracker`]. A group that opens a session claims a fresh
//! [`GestureId`]; any session another group still holds under an older id
//! is superseded and must not move anything.

use std::cell::Cell;
use std::fmt;

/// One claimed drag gesture. Ids grow monotonically per tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GestureId(u64);

impl GestureId {
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for GestureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gesture-{}", self.0)
    }
}

/// Latest gesture claimed on one host.
#[derive(Debug, Default)]
pub struct GestureTracker {
    latest: Cell<u64>,
}

impl GestureTracker {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            latest: Cell::new(0),
        }
    }

    /// Claim the host for a new gesture, superseding every earlier claim.
    pub fn begin(&self) -> GestureId {
        let id = self.latest.get() + 1;
        self.latest.set(id);
        GestureId(id)
    }

    /// The most recent claim, if any gesture was ever started.
    #[must_use]
    pub fn current(&self) -> Option<GestureId> {
        match self.latest.get() {
            0 => None,
            raw => Some(GestureId(raw)),
        }
    }

    #[must_use]
    pub fn is_current(&self, gesture: GestureId) -> bool {
        self.latest.get() == gesture.0
    }
}
