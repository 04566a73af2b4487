#![forbid(unsafe_code)]

//! Attachment controller for sortable elements.
//!
//! A [`Sortable`] is one sortable group: a [`ReorderEngine`], the host's
//! [`BindingResolver`], and a [`SortableConfig`], shared by every element
//! attached through it. [`Sortable::attach`] installs native drag listeners
//! on an element and returns an [`AttachmentHandle`] that removes them.
//!
//! # Event handling
//!
//! | event       | action                                                        |
//! |-------------|---------------------------------------------------------------|
//! | `dragstart` | resolve source, open session, write transfer marker           |
//! | `dragenter` | resolve candidate, move or highlight (self) or ignore          |
//! | `dragover`  | cancel default so drop is permitted and the ghost stays put   |
//! | `dragleave` | remove target class                                           |
//! | `drop`      | remove target class, apply session policy                     |
//! | `dragend`   | remove target class from the source, apply session policy     |
//!
//! # Groups sharing a host
//!
//! A successful `dragstart` claims the host's
//! [`GestureTracker`](dragsort_core::GestureTracker). A group
//! whose claim has been superseded by a later `dragstart` anywhere on the
//! host drops its session on the next event, so a retained or abandoned
//! session never moves items during another group's gesture.
//!
//! # Ownership
//!
//! Listeners hold the group weakly. Dropping the last `Sortable` handle
//! turns any listeners still attached into no-ops.
//!
//! The engine is never borrowed while a move splices the collection, so
//! list subscribers may query the `Sortable` they are being moved by.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use dragsort_core::{
    BindingResolver, DragEventKind, EndOutcome, EnterOutcome, GestureId, GroupId,
    ReorderEngine, SessionPolicy, SortableConfig, SortableError,
};
use tracing::{debug, trace, warn};

use crate::attachment::AttachmentHandle;
use crate::host::{DragEvent, DragHost, Listener};

type Collection<H, R> = <R as BindingResolver<<H as DragHost>::Node>>::Collection;

struct Group<H: DragHost, R: BindingResolver<H::Node>> {
    id: GroupId,
    host: Rc<H>,
    resolver: R,
    config: RefCell<SortableConfig>,
    engine: RefCell<ReorderEngine<Collection<H, R>>>,
    /// Host gesture the current session was opened under.
    gesture: Cell<Option<GestureId>>,
}

/// One sortable group.
///
/// Cloning yields another handle to the same group.
pub struct Sortable<H: DragHost, R: BindingResolver<H::Node>> {
    group: Rc<Group<H, R>>,
}

impl<H: DragHost, R: BindingResolver<H::Node>> Clone for Sortable<H, R> {
    fn clone(&self) -> Self {
        Self {
            group: Rc::clone(&self.group),
        }
    }
}

impl<H, R> Sortable<H, R>
where
    H: DragHost + 'static,
    R: BindingResolver<H::Node> + 'static,
{
    /// Create a group with a freshly allocated [`GroupId`].
    #[must_use]
    pub fn new(host: Rc<H>, resolver: R, config: SortableConfig) -> Self {
        Self::with_group(GroupId::next(), host, resolver, config)
    }

    /// Create a group with a caller-chosen [`GroupId`].
    #[must_use]
    pub fn with_group(id: GroupId, host: Rc<H>, resolver: R, config: SortableConfig) -> Self {
        for problem in config.validate() {
            warn!(group = %id, %problem, "sortable config problem");
        }
        let engine = ReorderEngine::new(config.session_policy);
        Self {
            group: Rc::new(Group {
                id,
                host,
                resolver,
                config: RefCell::new(config),
                engine: RefCell::new(engine),
                gesture: Cell::new(None),
            }),
        }
    }

    #[must_use]
    pub fn group_id(&self) -> GroupId {
        self.group.id
    }

    #[must_use]
    pub fn host(&self) -> &Rc<H> {
        &self.group.host
    }

    #[must_use]
    pub fn resolver(&self) -> &R {
        &self.group.resolver
    }

    /// Snapshot of the current configuration.
    #[must_use]
    pub fn config(&self) -> SortableConfig {
        self.group.config.borrow().clone()
    }

    #[must_use]
    pub fn target_class(&self) -> String {
        self.group.config.borrow().target_class.clone()
    }

    /// Change the target class. Takes effect on the next event; elements
    /// currently highlighted keep the old class until they are left.
    pub fn set_target_class(&self, class: impl Into<String>) {
        self.group.config.borrow_mut().target_class = class.into();
    }

    pub fn set_session_policy(&self, policy: SessionPolicy) {
        self.group.config.borrow_mut().session_policy = policy;
        self.group.engine.borrow_mut().set_policy(policy);
    }

    /// Whether this group holds an open session for the host's current
    /// gesture.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.group.holds_current_gesture() && self.group.engine.borrow().is_active()
    }

    /// Current source position of the open session.
    #[must_use]
    pub fn source_position(&self) -> Option<usize> {
        if !self.group.holds_current_gesture() {
            return None;
        }
        self.group
            .engine
            .borrow()
            .session()
            .map(|session| session.source_position())
    }

    /// Close any open session regardless of policy.
    pub fn reset(&self) {
        self.group.gesture.set(None);
        self.group.engine.borrow_mut().reset();
    }

    /// Make `node` sortable.
    ///
    /// Marks it draggable and registers one listener per
    /// [`DragEventKind`]. The returned handle removes exactly those
    /// listeners.
    pub fn attach(&self, node: &H::Node) -> AttachmentHandle<H> {
        let host = &self.group.host;
        host.set_draggable(node, true);
        let registrations = DragEventKind::ALL
            .into_iter()
            .map(|kind| (kind, host.add_listener(node, kind, self.listener(kind))))
            .collect();
        trace!(group = %self.group.id, ?node, "sortable attached");
        AttachmentHandle::new(Rc::clone(host), node.clone(), registrations)
    }

    fn listener(&self, kind: DragEventKind) -> Listener<H::Node> {
        let weak: Weak<Group<H, R>> = Rc::downgrade(&self.group);
        Rc::new(move |event: &mut DragEvent<'_, H::Node>| {
            let Some(group) = weak.upgrade() else {
                return Ok(());
            };
            match kind {
                DragEventKind::DragStart => group.on_drag_start(event),
                DragEventKind::DragEnter => {
                    group.on_drag_enter(event);
                    Ok(())
                }
                DragEventKind::DragOver => {
                    event.prevent_default();
                    Ok(())
                }
                DragEventKind::DragLeave => {
                    group.remove_target_class(event.current_target());
                    Ok(())
                }
                DragEventKind::Drop | DragEventKind::DragEnd => {
                    group.remove_target_class(event.current_target());
                    group.on_end(kind);
                    Ok(())
                }
            }
        })
    }
}

impl<H: DragHost, R: BindingResolver<H::Node>> Group<H, R> {
    fn on_drag_start(&self, event: &mut DragEvent<'_, H::Node>) -> Result<(), SortableError> {
        let binding = self.resolver.resolve_binding(event.current_target());
        let result = self
            .engine
            .borrow_mut()
            .drag_start(binding, event.data_transfer());
        match &result {
            Ok(()) => {
                let gesture = self.host.gestures().begin();
                self.gesture.set(Some(gesture));
                trace!(group = %self.id, %gesture, "gesture claimed");
            }
            Err(err) => {
                // Cancelling dragstart keeps the element from lifting.
                event.prevent_default();
                debug!(group = %self.id, node = ?event.current_target(), error = %err, "drag start rejected");
            }
        }
        result
    }

    fn holds_current_gesture(&self) -> bool {
        self.gesture
            .get()
            .is_some_and(|gesture| self.host.gestures().is_current(gesture))
    }

    /// Drop a session whose gesture another `dragstart` has replaced.
    fn release_superseded(&self) {
        let Some(gesture) = self.gesture.get() else {
            return;
        };
        if self.host.gestures().is_current(gesture) {
            return;
        }
        self.gesture.set(None);
        self.engine.borrow_mut().reset();
        debug!(group = %self.id, %gesture, "drag session superseded");
    }

    fn on_drag_enter(&self, event: &DragEvent<'_, H::Node>) {
        self.release_superseded();
        let node = event.current_target();
        let binding = self.resolver.resolve_binding(node);
        let pending = self.engine.borrow_mut().begin_enter(binding);
        match pending.apply() {
            EnterOutcome::Highlight => {
                let class = self.config.borrow().target_class.clone();
                self.host.add_class(node, &class);
            }
            EnterOutcome::Moved { from, to } => {
                trace!(group = %self.id, from, to, "drag-enter moved item");
            }
            EnterOutcome::Ignored(reason) => {
                trace!(group = %self.id, ?reason, "drag-enter ignored");
            }
        }
    }

    fn on_end(&self, kind: DragEventKind) {
        self.release_superseded();
        if self.engine.borrow_mut().drag_end() == EndOutcome::Closed {
            trace!(group = %self.id, event = %kind, "session closed by end event");
        }
    }

    fn remove_target_class(&self, node: &H::Node) {
        let class = self.config.borrow().target_class.clone();
        self.host.remove_class(node, &class);
    }
}

impl<H: DragHost, R: BindingResolver<H::Node>> fmt::Debug for Sortable<H, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let config = self.group.config.borrow();
        f.debug_struct("Sortable")
            .field("group", &self.group.id)
            .field("target_class", &config.target_class)
            .field("session_policy", &config.session_policy)
            .field(
                "dragging",
                &(self.group.holds_current_gesture() && self.group.engine.borrow().is_active()),
            )
            .finish()
    }
}
