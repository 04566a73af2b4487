#![forbid(unsafe_code)]

//! Host element contract.
//!
//! [`DragHost`] is the narrow slice of a DOM-like element API the attachment
//! controller needs: a draggable flag, a class list, and listener
//! registration keyed by [`ListenerId`] so every registration can be undone
//! individually. The host also owns the [`GestureTracker`] its groups use
//! to agree on which of them holds the current drag.

use std::fmt;
use std::rc::Rc;

use dragsort_core::{DataTransfer, DragEventKind, GestureTracker, SortableError};

/// Registration token returned by [`DragHost::add_listener`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl ListenerId {
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Event passed to a listener.
pub struct DragEvent<'a, N> {
    kind: DragEventKind,
    current_target: &'a N,
    data_transfer: &'a mut DataTransfer,
    default_prevented: bool,
}

impl<'a, N> DragEvent<'a, N> {
    pub fn new(kind: DragEventKind, current_target: &'a N, data_transfer: &'a mut DataTransfer) -> Self {
        Self {
            kind,
            current_target,
            data_transfer,
            default_prevented: false,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> DragEventKind {
        self.kind
    }

    /// Element the listener is registered on.
    #[must_use]
    pub const fn current_target(&self) -> &N {
        self.current_target
    }

    pub fn data_transfer(&mut self) -> &mut DataTransfer {
        self.data_transfer
    }

    /// Cancel the platform default action. Ignored for events that are not
    /// cancelable.
    pub fn prevent_default(&mut self) {
        if self.kind.is_cancelable() {
            self.default_prevented = true;
        }
    }

    #[must_use]
    pub const fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

impl<N: fmt::Debug> fmt::Debug for DragEvent<'_, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DragEvent")
            .field("kind", &self.kind)
            .field("current_target", self.current_target)
            .field("default_prevented", &self.default_prevented)
            .finish_non_exhaustive()
    }
}

/// Listener callback. An `Err` is surfaced to whoever dispatched the event.
pub type Listener<N> = Rc<dyn Fn(&mut DragEvent<'_, N>) -> Result<(), SortableError>>;

/// Element operations a host UI layer provides.
///
/// All methods take `&self`: hosts are single-threaded and use interior
/// mutability, matching how a browser document behaves.
pub trait DragHost {
    type Node: Clone + fmt::Debug + 'static;

    /// Gesture claims shared by every sortable group on this host.
    fn gestures(&self) -> &GestureTracker;

    fn set_draggable(&self, node: &Self::Node, draggable: bool);

    fn add_listener(
        &self,
        node: &Self::Node,
        kind: DragEventKind,
        listener: Listener<Self::Node>,
    ) -> ListenerId;

    /// Remove one registration. Returns `false` if it was not registered.
    fn remove_listener(&self, node: &Self::Node, id: ListenerId) -> bool;

    fn add_class(&self, node: &Self::Node, class: &str);

    fn remove_class(&self, node: &Self::Node, class: &str);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prevent_default_respects_cancelability() {
        let node = 1u32;
        let mut transfer = DataTransfer::new();

        let mut over = DragEvent::new(DragEventKind::DragOver, &node, &mut transfer);
        over.prevent_default();
        assert!(over.default_prevented());

        let mut leave = DragEvent::new(DragEventKind::DragLeave, &node, &mut transfer);
        leave.prevent_default();
        assert!(!leave.default_prevented());
    }

    #[test]
    fn listener_sees_current_target_and_transfer() {
        let node = 9u32;
        let mut transfer = DataTransfer::new();
        let mut event = DragEvent::new(DragEventKind::DragStart, &node, &mut transfer);
        assert_eq!(*event.current_target(), 9);
        event.data_transfer().set_data("text/plain", "x");
        assert_eq!(event.kind(), DragEventKind::DragStart);
        drop(event);
        assert_eq!(transfer.get_data("text/plain"), Some("x"));
    }
}
