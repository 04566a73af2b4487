use thiserror::Error;

/// Failures surfaced by sortable event handling.
///
/// Rejected drag-enters are not errors; see
/// [`EnterOutcome::Ignored`](crate::EnterOutcome::Ignored).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SortableError {
    /// A drag started on an element that is not bound to a member of an
    /// ordered, index-addressable collection. Fatal to the gesture.
    #[error(
        "the sortable decorator only works with elements that correspond to array members ({reason})"
    )]
    InvalidBinding { reason: String },

    /// A `dragstart` listener cancelled the event without reporting an
    /// error, so the platform never lifts the element.
    #[error("dragstart on {node} was cancelled")]
    DragCancelled { node: String },

    /// The host was asked to dispatch to an element it does not know.
    #[error("unknown element: {node}")]
    UnknownNode { node: String },
}

impl SortableError {
    #[must_use]
    pub fn invalid_binding(reason: impl Into<String>) -> Self {
        Self::InvalidBinding {
            reason: reason.into(),
        }
    }

    #[must_use]
    pub const fn is_invalid_binding(&self) -> bool {
        matches!(self, Self::InvalidBinding { .. })
    }
}
