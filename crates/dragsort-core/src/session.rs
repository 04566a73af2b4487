#![forbid(unsafe_code)]

//! Drag session state machine and reorder engine.
//!
//! [`ReorderEngine`] tracks at most one in-flight drag gesture for a
//! sortable group and turns drag-enter events into collection splices.
//!
//! # State Machine
//!
//! ```text
//!            drag_start                 drag_start (replaces)
//!   Idle ───────────────▶ Active ◀───────────────────────┐
//!    ▲                      │ drag_enter (move/highlight/ │
//!    │                      │ ignore)                     │
//!    │   drag_end           └─────────────────────────────┘
//!    └──── (ClearOnEnd only)
//! ```
//!
//! # Invariants
//!
//! 1. The session collection is fixed from drag-start until the session is
//!    replaced or closed. Candidates from any other collection are ignored
//!    before anything is mutated.
//! 2. `source_position` tracks the dragged item: after every move it equals
//!    the index the item was just inserted at. The session is updated
//!    before the splice runs, so subscribers notified by the splice already
//!    see the new position.
//! 3. A move is always remove-at-source followed by insert-at-target, with
//!    the target index taken from a fresh resolution. No index-shift
//!    arithmetic is applied, which keeps a chain `i → k → j` equivalent to
//!    a single move `i → j`.
//! 4. A failed drag-start leaves any previous session untouched.
//!
//! # Failure Modes
//!
//! - Drag-start on an element not bound to a collection member returns
//!   [`SortableError::InvalidBinding`].
//! - Drag-enter rejections are outcomes ([`EnterOutcome::Ignored`]), never
//!   errors: dragging over unrelated territory is normal.
//! - If the collection shrinks behind the engine's back while a session is
//!   open, the next drag-enter reports [`IgnoredReason::StaleSession`]
//!   instead of splicing out of range.

use tracing::{debug, debug_span, trace};

use crate::binding::{Binding, BoundTarget, GroupId, SpliceCollection};
use crate::error::SortableError;
use crate::event::{DRAG_MARKER_FORMAT, DRAG_MARKER_VALUE, DataTransfer};

/// Whether drop and drag-end close the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "snake_case"))]
pub enum SessionPolicy {
    /// Never close: the session stays until the next drag-start replaces
    /// it. Drag-enters after the gesture ended still reorder.
    Retain,
    /// Close on drop and on drag-end. Drag-end also fires when the user
    /// cancels with Escape, so cancelled gestures close too.
    #[default]
    ClearOnEnd,
}

/// State of one in-flight drag gesture.
#[derive(Debug, Clone)]
pub struct DragSession<C> {
    source_position: usize,
    collection: C,
    owner: GroupId,
    moves: u32,
}

impl<C> DragSession<C> {
    /// Current index of the dragged item.
    #[must_use]
    pub const fn source_position(&self) -> usize {
        self.source_position
    }

    /// Handle of the collection being reordered.
    #[must_use]
    pub const fn collection(&self) -> &C {
        &self.collection
    }

    #[must_use]
    pub const fn owner(&self) -> GroupId {
        self.owner
    }

    /// Number of moves performed in this session.
    #[must_use]
    pub const fn moves(&self) -> u32 {
        self.moves
    }
}

/// Why a drag-enter did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoredReason {
    /// No drag is in flight.
    NoSession,
    /// The candidate belongs to a different sortable group.
    ForeignOwner,
    /// The candidate is bound to a different collection, or to no
    /// collection at all.
    ForeignCollection,
    /// The session's source position no longer fits the collection.
    StaleSession,
    /// The candidate's index is past the end of the collection.
    OutOfRange,
}

/// Result of one drag-enter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnterOutcome {
    Ignored(IgnoredReason),
    /// The candidate is the dragged item itself: highlight it, move nothing.
    Highlight,
    /// The dragged item moved from `from` to `to`.
    Moved { from: usize, to: usize },
}

impl EnterOutcome {
    #[must_use]
    pub const fn is_ignored(self) -> bool {
        matches!(self, Self::Ignored(_))
    }

    #[must_use]
    pub const fn is_move(self) -> bool {
        matches!(self, Self::Moved { .. })
    }
}

/// Result of a drop or drag-end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndOutcome {
    NoSession,
    /// Session closed ([`SessionPolicy::ClearOnEnd`]).
    Closed,
    /// Session kept ([`SessionPolicy::Retain`]).
    Retained,
}

/// A decided drag-enter whose splice has not run yet.
///
/// The session already records the item at its new position. Dropping a
/// pending move without applying it leaves the collection out of step with
/// the session.
#[derive(Debug)]
#[must_use = "a pending move only touches the collection in `apply`"]
pub struct PendingEnter<C> {
    outcome: EnterOutcome,
    collection: Option<C>,
}

impl<C> PendingEnter<C> {
    const fn done(outcome: EnterOutcome) -> Self {
        Self {
            outcome,
            collection: None,
        }
    }

    #[must_use]
    pub const fn outcome(&self) -> EnterOutcome {
        self.outcome
    }
}

impl<C: SpliceCollection> PendingEnter<C> {
    /// Run the remove-then-insert splice, if the outcome is a move.
    pub fn apply(self) -> EnterOutcome {
        if let (EnterOutcome::Moved { from, to }, Some(collection)) =
            (self.outcome, self.collection)
        {
            let len = collection.len();
            let _span = debug_span!("dragsort.move", from, to, len).entered();
            let dragged = collection.splice(from, 1, Vec::new());
            collection.splice(to, 0, dragged);
            debug!(from, to, "item moved");
        }
        self.outcome
    }
}

/// Drag session holder and reorder algorithm for one sortable group.
#[derive(Debug)]
pub struct ReorderEngine<C> {
    session: Option<DragSession<C>>,
    policy: SessionPolicy,
    sessions_opened: u64,
}

impl<C> Default for ReorderEngine<C> {
    fn default() -> Self {
        Self::new(SessionPolicy::default())
    }
}

impl<C> ReorderEngine<C> {
    #[must_use]
    pub const fn new(policy: SessionPolicy) -> Self {
        Self {
            session: None,
            policy,
            sessions_opened: 0,
        }
    }

    #[must_use]
    pub const fn policy(&self) -> SessionPolicy {
        self.policy
    }

    /// Change the policy. Takes effect on the next drop/drag-end.
    pub fn set_policy(&mut self, policy: SessionPolicy) {
        self.policy = policy;
    }

    /// The active session, if any.
    #[must_use]
    pub const fn session(&self) -> Option<&DragSession<C>> {
        self.session.as_ref()
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Total number of sessions opened by this engine.
    #[must_use]
    pub const fn sessions_opened(&self) -> u64 {
        self.sessions_opened
    }

    /// Drop the active session regardless of policy.
    pub fn reset(&mut self) {
        if self.session.take().is_some() {
            debug!("drag session reset");
        }
    }
}

impl<C: SpliceCollection + Clone> ReorderEngine<C> {
    /// Open a session for a drag starting on the element bound by `source`.
    ///
    /// Overwrites any previous session. Writes the drag marker into
    /// `transfer` so the platform lets the drag begin.
    pub fn drag_start(
        &mut self,
        source: Binding<C>,
        transfer: &mut DataTransfer,
    ) -> Result<(), SortableError> {
        let Binding { target, owner } = source;
        let (collection, index) = match target {
            BoundTarget::Member { collection, index } => (collection, index),
            BoundTarget::Detached { keypath } => {
                return Err(SortableError::invalid_binding(format!(
                    "element is bound to `{keypath}`, which is not an array member"
                )));
            }
        };
        let len = collection.len();
        if index >= len {
            return Err(SortableError::invalid_binding(format!(
                "element index {index} is outside a collection of length {len}"
            )));
        }

        transfer.set_data(DRAG_MARKER_FORMAT, DRAG_MARKER_VALUE);

        let replaced = self.session.is_some();
        debug!(
            %owner,
            collection = %collection.collection_id(),
            source = index,
            len,
            replaced,
            "drag session opened"
        );
        self.session = Some(DragSession {
            source_position: index,
            collection,
            owner,
            moves: 0,
        });
        self.sessions_opened += 1;
        Ok(())
    }

    /// Evaluate a drag-enter over the element bound by `candidate` and
    /// apply the resulting move.
    ///
    /// `candidate` must come from a fresh resolution; cached indices break
    /// invariant 3.
    pub fn drag_enter(&mut self, candidate: Binding<C>) -> EnterOutcome {
        self.begin_enter(candidate).apply()
    }

    /// Decide a drag-enter and update the session, leaving the splice to
    /// [`PendingEnter::apply`].
    ///
    /// Callers that keep the engine behind a `RefCell` release the borrow
    /// before applying, so collection subscribers notified by the splice
    /// can query the engine.
    pub fn begin_enter(&mut self, candidate: Binding<C>) -> PendingEnter<C> {
        let Some(session) = self.session.as_mut() else {
            trace!("drag-enter ignored: no session");
            return PendingEnter::done(EnterOutcome::Ignored(IgnoredReason::NoSession));
        };
        if candidate.owner != session.owner {
            trace!(owner = %candidate.owner, session_owner = %session.owner, "drag-enter ignored: foreign owner");
            return PendingEnter::done(EnterOutcome::Ignored(IgnoredReason::ForeignOwner));
        }
        let target = match candidate.target {
            BoundTarget::Member { collection, index }
                if collection.collection_id() == session.collection.collection_id() =>
            {
                index
            }
            _ => {
                trace!("drag-enter ignored: foreign collection");
                return PendingEnter::done(EnterOutcome::Ignored(IgnoredReason::ForeignCollection));
            }
        };
        if target == session.source_position {
            return PendingEnter::done(EnterOutcome::Highlight);
        }

        let len = session.collection.len();
        if session.source_position >= len {
            trace!(source = session.source_position, len, "drag-enter ignored: stale session");
            return PendingEnter::done(EnterOutcome::Ignored(IgnoredReason::StaleSession));
        }
        if target >= len {
            trace!(target, len, "drag-enter ignored: target out of range");
            return PendingEnter::done(EnterOutcome::Ignored(IgnoredReason::OutOfRange));
        }

        let from = session.source_position;
        session.source_position = target;
        session.moves += 1;
        PendingEnter {
            outcome: EnterOutcome::Moved { from, to: target },
            collection: Some(session.collection.clone()),
        }
    }

    /// Handle drop or drag-end according to the session policy.
    pub fn drag_end(&mut self) -> EndOutcome {
        if self.session.is_none() {
            return EndOutcome::NoSession;
        }
        match self.policy {
            SessionPolicy::Retain => EndOutcome::Retained,
            SessionPolicy::ClearOnEnd => {
                if let Some(session) = self.session.take() {
                    debug!(
                        owner = %session.owner,
                        moves = session.moves,
                        "drag session closed"
                    );
                }
                EndOutcome::Closed
            }
        }
    }
}
