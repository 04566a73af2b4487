#![forbid(unsafe_code)]

//! Native drag event kinds and the drag-transfer payload.

use std::fmt;

/// Payload format written on drag-start. Some browsers refuse to start a
/// drag with an empty transfer, so the engine always writes a marker; its
/// value carries no meaning.
pub const DRAG_MARKER_FORMAT: &str = "text/x-dragsort";
pub const DRAG_MARKER_VALUE: &str = "1";

/// Native drag events a sortable element listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DragEventKind {
    DragStart,
    DragEnter,
    DragLeave,
    DragOver,
    Drop,
    DragEnd,
}

impl DragEventKind {
    /// Every kind, in the order listeners are registered.
    pub const ALL: [Self; 6] = [
        Self::DragStart,
        Self::DragEnter,
        Self::DragLeave,
        Self::Drop,
        Self::DragOver,
        Self::DragEnd,
    ];

    /// DOM event type name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DragStart => "dragstart",
            Self::DragEnter => "dragenter",
            Self::DragLeave => "dragleave",
            Self::DragOver => "dragover",
            Self::Drop => "drop",
            Self::DragEnd => "dragend",
        }
    }

    /// Parse a DOM event type name.
    #[must_use]
    pub fn from_dom_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }

    /// Whether the platform lets listeners cancel this event's default
    /// action. `dragleave` and `dragend` are not cancelable.
    #[must_use]
    pub const fn is_cancelable(self) -> bool {
        !matches!(self, Self::DragLeave | Self::DragEnd)
    }
}

impl fmt::Display for DragEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Drag-transfer payload, keyed by format string.
///
/// Mirrors the subset of the platform `DataTransfer` the engine needs.
/// Formats keep insertion order; setting an existing format replaces its
/// value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataTransfer {
    entries: Vec<(String, String)>,
}

impl DataTransfer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_data(&mut self, format: impl Into<String>, value: impl Into<String>) {
        let format = format.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(f, _)| *f == format) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((format, value)),
        }
    }

    #[must_use]
    pub fn get_data(&self, format: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(f, _)| f == format)
            .map(|(_, v)| v.as_str())
    }

    /// Registered formats in insertion order.
    pub fn types(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(f, _)| f.as_str())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Whether the sortable marker has been written.
    #[must_use]
    pub fn has_drag_marker(&self) -> bool {
        self.get_data(DRAG_MARKER_FORMAT).is_some()
    }
}
