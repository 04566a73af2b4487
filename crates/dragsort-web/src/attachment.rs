#![forbid(unsafe_code)]

//! Per-element attachment state.

use std::fmt;
use std::rc::Rc;

use dragsort_core::DragEventKind;

use crate::host::{DragHost, ListenerId};

/// RAII guard for the listeners a [`Sortable`](crate::Sortable) installed on
/// one element.
///
/// [`detach`](Self::detach) removes exactly the registrations recorded at
/// attach time. Dropping the handle detaches; [`leak`](Self::leak) keeps the
/// element sortable for the life of the host instead.
pub struct AttachmentHandle<H: DragHost> {
    host: Rc<H>,
    node: H::Node,
    registrations: Vec<(DragEventKind, ListenerId)>,
}

impl<H: DragHost> AttachmentHandle<H> {
    pub(crate) fn new(
        host: Rc<H>,
        node: H::Node,
        registrations: Vec<(DragEventKind, ListenerId)>,
    ) -> Self {
        Self {
            host,
            node,
            registrations,
        }
    }

    #[must_use]
    pub fn node(&self) -> &H::Node {
        &self.node
    }

    /// Whether listeners are still registered through this handle.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        !self.registrations.is_empty()
    }

    /// Registrations held by this handle, in attach order.
    #[must_use]
    pub fn registrations(&self) -> &[(DragEventKind, ListenerId)] {
        &self.registrations
    }

    /// Remove every listener this handle registered.
    ///
    /// Returns how many registrations the host actually removed. Calling it
    /// again is harmless and returns 0.
    pub fn detach(&mut self) -> usize {
        let mut removed = 0;
        for (_, id) in self.registrations.drain(..) {
            if self.host.remove_listener(&self.node, id) {
                removed += 1;
            }
        }
        removed
    }

    /// Give up the handle without detaching.
    pub fn leak(mut self) {
        self.registrations.clear();
    }
}

impl<H: DragHost> Drop for AttachmentHandle<H> {
    fn drop(&mut self) {
        self.detach();
    }
}

impl<H: DragHost> fmt::Debug for AttachmentHandle<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttachmentHandle")
            .field("node", &self.node)
            .field("registrations", &self.registrations.len())
            .finish()
    }
}
