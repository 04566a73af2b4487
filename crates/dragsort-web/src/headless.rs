#![forbid(unsafe_code)]

//! Deterministic in-memory host.
//!
//! [`HeadlessDocument`] stands in for a browser document: it stores
//! elements with class lists, draggable flags, text, and listener tables,
//! and dispatches drag events to listeners in registration order. It is
//! what the harness and the integration tests drive.
//!
//! [`ListView`] renders one element per member of an [`ObservableList`]
//! and re-renders synchronously on every list change. Element `k` of a
//! view always shows list item `k`, so after a splice the *content* of
//! elements moves while the elements themselves stay put, and binding
//! resolution is always by current position.
//!
//! [`Gesture`] replays the event order a browser produces for one native
//! drag: `dragstart` on the source; `dragenter` on each new target, then
//! `dragleave` on the previous one, then `dragover`; on release `drop` on
//! the target (only if `dragover` was cancelled) followed by `dragend` on
//! the source.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};

use dragsort_core::{
    Binding, BindingResolver, DataTransfer, DragEventKind, GestureTracker, GroupId, SortableError,
};
use dragsort_runtime::{ObservableList, Subscription};
use tracing::trace;

use crate::host::{DragEvent, DragHost, Listener, ListenerId};

/// Element handle in a [`HeadlessDocument`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

struct Registration {
    id: ListenerId,
    kind: DragEventKind,
    listener: Listener<NodeId>,
}

#[derive(Default)]
struct Element {
    text: Option<String>,
    classes: Vec<String>,
    draggable: bool,
    listeners: Vec<Registration>,
}

#[derive(Default)]
struct DocumentInner {
    next_node: u64,
    next_listener: u64,
    elements: BTreeMap<NodeId, Element>,
}

/// Summary of one dispatched event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchReport {
    pub kind: DragEventKind,
    pub listeners_invoked: usize,
    pub default_prevented: bool,
}

/// In-memory element store implementing [`DragHost`].
#[derive(Default)]
pub struct HeadlessDocument {
    inner: RefCell<DocumentInner>,
    gestures: GestureTracker,
}

impl HeadlessDocument {
    #[must_use]
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn create_element(&self) -> NodeId {
        let mut inner = self.inner.borrow_mut();
        inner.next_node += 1;
        let id = NodeId(inner.next_node);
        inner.elements.insert(id, Element::default());
        id
    }

    /// Remove an element and every listener on it.
    pub fn remove_element(&self, node: NodeId) -> bool {
        self.inner.borrow_mut().elements.remove(&node).is_some()
    }

    #[must_use]
    pub fn contains(&self, node: NodeId) -> bool {
        self.inner.borrow().elements.contains_key(&node)
    }

    pub fn set_text(&self, node: NodeId, text: Option<String>) {
        if let Some(element) = self.inner.borrow_mut().elements.get_mut(&node) {
            element.text = text;
        }
    }

    #[must_use]
    pub fn text(&self, node: NodeId) -> Option<String> {
        self.inner
            .borrow()
            .elements
            .get(&node)
            .and_then(|element| element.text.clone())
    }

    #[must_use]
    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.inner
            .borrow()
            .elements
            .get(&node)
            .is_some_and(|element| element.classes.iter().any(|c| c == class))
    }

    #[must_use]
    pub fn classes(&self, node: NodeId) -> Vec<String> {
        self.inner
            .borrow()
            .elements
            .get(&node)
            .map(|element| element.classes.clone())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn is_draggable(&self, node: NodeId) -> bool {
        self.inner
            .borrow()
            .elements
            .get(&node)
            .is_some_and(|element| element.draggable)
    }

    #[must_use]
    pub fn listener_count(&self, node: NodeId) -> usize {
        self.inner
            .borrow()
            .elements
            .get(&node)
            .map_or(0, |element| element.listeners.len())
    }

    #[must_use]
    pub fn total_listener_count(&self) -> usize {
        self.inner
            .borrow()
            .elements
            .values()
            .map(|element| element.listeners.len())
            .sum()
    }

    /// Dispatch `kind` to `node`'s listeners in registration order.
    ///
    /// Every matching listener runs even if an earlier one fails, as in a
    /// browser; the first error is returned afterwards. Listeners may
    /// mutate the document, including their own registrations.
    pub fn dispatch(
        &self,
        node: NodeId,
        kind: DragEventKind,
        transfer: &mut DataTransfer,
    ) -> Result<DispatchReport, SortableError> {
        let listeners: Vec<Listener<NodeId>> = {
            let inner = self.inner.borrow();
            let element = inner
                .elements
                .get(&node)
                .ok_or_else(|| SortableError::UnknownNode {
                    node: node.to_string(),
                })?;
            element
                .listeners
                .iter()
                .filter(|registration| registration.kind == kind)
                .map(|registration| Rc::clone(&registration.listener))
                .collect()
        };

        let mut event = DragEvent::new(kind, &node, transfer);
        let mut first_error = None;
        for listener in &listeners {
            if let Err(err) = listener(&mut event) {
                first_error.get_or_insert(err);
            }
        }
        trace!(%node, event = %kind, listeners = listeners.len(), "dispatched");

        match first_error {
            Some(err) => Err(err),
            None => Ok(DispatchReport {
                kind,
                listeners_invoked: listeners.len(),
                default_prevented: event.default_prevented(),
            }),
        }
    }
}

impl DragHost for HeadlessDocument {
    type Node = NodeId;

    fn gestures(&self) -> &GestureTracker {
        &self.gestures
    }

    fn set_draggable(&self, node: &NodeId, draggable: bool) {
        if let Some(element) = self.inner.borrow_mut().elements.get_mut(node) {
            element.draggable = draggable;
        }
    }

    fn add_listener(
        &self,
        node: &NodeId,
        kind: DragEventKind,
        listener: Listener<NodeId>,
    ) -> ListenerId {
        let mut inner = self.inner.borrow_mut();
        inner.next_listener += 1;
        let id = ListenerId::new(inner.next_listener);
        if let Some(element) = inner.elements.get_mut(node) {
            element.listeners.push(Registration { id, kind, listener });
        }
        id
    }

    fn remove_listener(&self, node: &NodeId, id: ListenerId) -> bool {
        let mut inner = self.inner.borrow_mut();
        let Some(element) = inner.elements.get_mut(node) else {
            return false;
        };
        let before = element.listeners.len();
        element.listeners.retain(|registration| registration.id != id);
        element.listeners.len() != before
    }

    fn add_class(&self, node: &NodeId, class: &str) {
        if let Some(element) = self.inner.borrow_mut().elements.get_mut(node) {
            if !element.classes.iter().any(|c| c == class) {
                element.classes.push(class.to_owned());
            }
        }
    }

    fn remove_class(&self, node: &NodeId, class: &str) {
        if let Some(element) = self.inner.borrow_mut().elements.get_mut(node) {
            element.classes.retain(|c| c != class);
        }
    }
}

impl fmt::Debug for HeadlessDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("HeadlessDocument")
            .field("elements", &inner.elements.len())
            .field("gesture", &self.gestures.current())
            .field(
                "listeners",
                &inner
                    .elements
                    .values()
                    .map(|e| e.listeners.len())
                    .sum::<usize>(),
            )
            .finish()
    }
}

// ---------------------------------------------------------------------------
// ListView
// ---------------------------------------------------------------------------

struct ListViewInner<T> {
    document: Rc<HeadlessDocument>,
    list: ObservableList<T>,
    owner: GroupId,
    elements: RefCell<Vec<NodeId>>,
    /// Elements created by growth since the last `take_mounted`.
    mounted: RefCell<Vec<NodeId>>,
    renders: Cell<u64>,
    subscription: RefCell<Option<Subscription>>,
}

impl<T: fmt::Display> ListViewInner<T> {
    fn render(&self, items: &[T]) {
        let mut elements = self.elements.borrow_mut();
        while elements.len() < items.len() {
            let node = self.document.create_element();
            elements.push(node);
            self.mounted.borrow_mut().push(node);
        }
        for (slot, node) in elements.iter().enumerate() {
            let text = items.get(slot).map(ToString::to_string);
            self.document.set_text(*node, text);
        }
        self.renders.set(self.renders.get() + 1);
    }
}

/// One element per list member, kept in sync with the list.
///
/// Slots past the end of the list (after the list shrinks) keep their
/// element but render no text and resolve as detached.
pub struct ListView<T> {
    inner: Rc<ListViewInner<T>>,
}

impl<T> Clone for ListView<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: Clone + fmt::Display + 'static> ListView<T> {
    /// Render `list` into `document` and subscribe to its changes.
    pub fn new(document: Rc<HeadlessDocument>, list: ObservableList<T>, owner: GroupId) -> Self {
        let inner = Rc::new(ListViewInner {
            document,
            list: list.clone(),
            owner,
            elements: RefCell::new(Vec::new()),
            mounted: RefCell::new(Vec::new()),
            renders: Cell::new(0),
            subscription: RefCell::new(None),
        });
        list.with(|items| inner.render(items));
        inner.mounted.borrow_mut().clear();

        let weak: Weak<ListViewInner<T>> = Rc::downgrade(&inner);
        let subscription = list.subscribe(move |items| {
            if let Some(view) = weak.upgrade() {
                view.render(items);
            }
        });
        *inner.subscription.borrow_mut() = Some(subscription);
        Self { inner }
    }
}

impl<T> ListView<T> {
    #[must_use]
    pub fn list(&self) -> &ObservableList<T> {
        &self.inner.list
    }

    #[must_use]
    pub fn owner(&self) -> GroupId {
        self.inner.owner
    }

    /// Every element of the view, rendered or not, in slot order.
    #[must_use]
    pub fn elements(&self) -> Vec<NodeId> {
        self.inner.elements.borrow().clone()
    }

    /// Element in slot `index`.
    #[must_use]
    pub fn element(&self, index: usize) -> Option<NodeId> {
        self.inner.elements.borrow().get(index).copied()
    }

    /// Slot of `node` in this view, rendered or not.
    #[must_use]
    pub fn slot_of(&self, node: NodeId) -> Option<usize> {
        self.inner.elements.borrow().iter().position(|n| *n == node)
    }

    /// Elements created because the list grew, since the last call. The
    /// caller decides whether to attach them.
    pub fn take_mounted(&self) -> Vec<NodeId> {
        std::mem::take(&mut *self.inner.mounted.borrow_mut())
    }

    /// Stop re-rendering on list changes. Elements keep their last text.
    pub fn freeze(&self) -> bool {
        self.inner.subscription.borrow_mut().take().is_some()
    }

    /// Number of renders, including the initial one.
    #[must_use]
    pub fn renders(&self) -> u64 {
        self.inner.renders.get()
    }

    /// Rendered text of each element that currently shows an item.
    #[must_use]
    pub fn rendered_text(&self) -> Vec<String> {
        self.inner
            .elements
            .borrow()
            .iter()
            .filter_map(|node| self.inner.document.text(*node))
            .collect()
    }
}

impl<T> fmt::Debug for ListView<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListView")
            .field("owner", &self.inner.owner)
            .field("elements", &self.inner.elements.borrow().len())
            .field("renders", &self.inner.renders.get())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// ViewRegistry
// ---------------------------------------------------------------------------

/// [`BindingResolver`] over a set of [`ListView`]s plus scalar-bound
/// elements.
pub struct ViewRegistry<T> {
    views: RefCell<Vec<ListView<T>>>,
    scalars: RefCell<BTreeMap<NodeId, (String, GroupId)>>,
}

impl<T> Default for ViewRegistry<T> {
    fn default() -> Self {
        Self {
            views: RefCell::new(Vec::new()),
            scalars: RefCell::new(BTreeMap::new()),
        }
    }
}

impl<T> ViewRegistry<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, view: ListView<T>) {
        self.views.borrow_mut().push(view);
    }

    /// Bind `node` to a value that is not a list member.
    pub fn bind_scalar(&self, node: NodeId, keypath: impl Into<String>, owner: GroupId) {
        self.scalars
            .borrow_mut()
            .insert(node, (keypath.into(), owner));
    }

    #[must_use]
    pub fn view_count(&self) -> usize {
        self.views.borrow().len()
    }
}

impl<T: Clone + 'static> BindingResolver<NodeId> for ViewRegistry<T> {
    type Collection = ObservableList<T>;

    fn resolve_binding(&self, node: &NodeId) -> Binding<ObservableList<T>> {
        for view in self.views.borrow().iter() {
            let Some(slot) = view.slot_of(*node) else {
                continue;
            };
            return if slot < view.list().len() {
                Binding::member(view.list().clone(), slot, view.owner())
            } else {
                Binding::detached(format!("unrendered slot {slot}"), view.owner())
            };
        }
        if let Some((keypath, owner)) = self.scalars.borrow().get(node) {
            return Binding::detached(keypath.clone(), *owner);
        }
        Binding::detached(format!("unbound element {node}"), GroupId::UNOWNED)
    }
}

impl<T> fmt::Debug for ViewRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewRegistry")
            .field("views", &self.views.borrow().len())
            .field("scalars", &self.scalars.borrow().len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Gesture
// ---------------------------------------------------------------------------

/// How a [`Gesture`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GestureEnd {
    /// Whether `drop` fired on a target.
    pub dropped: bool,
    pub target: Option<NodeId>,
}

/// Replays one native drag gesture against a [`HeadlessDocument`].
#[derive(Debug)]
pub struct Gesture<'d> {
    document: &'d HeadlessDocument,
    source: NodeId,
    transfer: DataTransfer,
    over: Option<NodeId>,
    drop_allowed: bool,
}

impl<'d> Gesture<'d> {
    /// Dispatch `dragstart` on `source`.
    ///
    /// Fails with the first listener error, or with
    /// [`SortableError::DragCancelled`] if a listener cancelled `dragstart`
    /// without failing (the platform would not start the drag).
    pub fn start(document: &'d HeadlessDocument, source: NodeId) -> Result<Self, SortableError> {
        let mut transfer = DataTransfer::new();
        let report = document.dispatch(source, DragEventKind::DragStart, &mut transfer)?;
        if report.default_prevented {
            return Err(SortableError::DragCancelled {
                node: source.to_string(),
            });
        }
        Ok(Self {
            document,
            source,
            transfer,
            over: None,
            drop_allowed: false,
        })
    }

    #[must_use]
    pub const fn source(&self) -> NodeId {
        self.source
    }

    #[must_use]
    pub const fn over(&self) -> Option<NodeId> {
        self.over
    }

    #[must_use]
    pub const fn transfer(&self) -> &DataTransfer {
        &self.transfer
    }

    /// Move the pointer onto `target`: `dragenter` on it, `dragleave` on
    /// the previous target, then `dragover` on it.
    pub fn enter(&mut self, target: NodeId) -> Result<DispatchReport, SortableError> {
        let report = self
            .document
            .dispatch(target, DragEventKind::DragEnter, &mut self.transfer)?;
        match self.over.replace(target) {
            Some(previous) if previous != target => {
                self.document
                    .dispatch(previous, DragEventKind::DragLeave, &mut self.transfer)?;
            }
            _ => {}
        }
        self.drag_over()?;
        Ok(report)
    }

    /// Move the pointer off every element.
    pub fn leave(&mut self) -> Result<(), SortableError> {
        if let Some(previous) = self.over.take() {
            self.document
                .dispatch(previous, DragEventKind::DragLeave, &mut self.transfer)?;
        }
        self.drop_allowed = false;
        Ok(())
    }

    /// Fire `dragover` on the current target again (pointer wiggle).
    pub fn drag_over(&mut self) -> Result<(), SortableError> {
        if let Some(target) = self.over {
            let report = self
                .document
                .dispatch(target, DragEventKind::DragOver, &mut self.transfer)?;
            self.drop_allowed = report.default_prevented;
        }
        Ok(())
    }

    /// Release the pointer: `drop` on the target if allowed, then `dragend`
    /// on the source.
    pub fn release(mut self) -> Result<GestureEnd, SortableError> {
        let target = self.over.take();
        let dropped = match target {
            Some(node) if self.drop_allowed => {
                self.document
                    .dispatch(node, DragEventKind::Drop, &mut self.transfer)?;
                true
            }
            Some(node) => {
                self.document
                    .dispatch(node, DragEventKind::DragLeave, &mut self.transfer)?;
                false
            }
            None => false,
        };
        self.document
            .dispatch(self.source, DragEventKind::DragEnd, &mut self.transfer)?;
        Ok(GestureEnd { dropped, target })
    }

    /// Abort with Escape: `dragleave` on the target, then `dragend`.
    pub fn cancel(mut self) -> Result<GestureEnd, SortableError> {
        let target = self.over;
        self.leave()?;
        self.document
            .dispatch(self.source, DragEventKind::DragEnd, &mut self.transfer)?;
        Ok(GestureEnd {
            dropped: false,
            target,
        })
    }

    /// Stop dispatching without any end event, as when the host loses the
    /// gesture (window blur, element removed).
    pub fn abandon(self) {}
}
