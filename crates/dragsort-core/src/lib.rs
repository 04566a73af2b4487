#![forbid(unsafe_code)]

//! Core: drag sessions, binding resolution, and the reorder engine.
//!
//! # Role in dragsort
//! `dragsort-core` is the decision layer. It owns the [`ReorderEngine`]
//! state machine that tracks one in-flight drag gesture per sortable group
//! and turns drag-enter events into remove-then-insert splices on the bound
//! collection.
//!
//! # Primary responsibilities
//! - **Binding**: the [`Binding`] a host resolves for a sortable element,
//!   plus the [`BindingResolver`] and [`SpliceCollection`] collaborator traits.
//! - **Session**: [`DragSession`] and the [`SessionPolicy`] that decides
//!   whether drop/drag-end closes it.
//! - **Events**: [`DragEventKind`] and the [`DataTransfer`] payload.
//! - **Gestures**: the host-wide [`GestureTracker`] that lets only the
//!   group which started the current drag keep a live session.
//! - **Config**: [`SortableConfig`], optionally loaded from TOML/JSON.
//!
//! # How it fits in the system
//! `dragsort-web` wires host element listeners to the engine;
//! `dragsort-runtime` provides an observable list that implements
//! [`SpliceCollection`]. The engine itself never touches elements.

pub mod binding;
pub mod config;
pub mod error;
pub mod event;
pub mod gesture;
pub mod session;

pub use binding::{
    Binding, BindingResolver, BoundTarget, CollectionId, GroupId, SpliceCollection,
};
pub use config::{DEFAULT_TARGET_CLASS, SortableConfig};
#[cfg(feature = "config")]
pub use config::ConfigError;
pub use error::SortableError;
pub use event::{DRAG_MARKER_FORMAT, DRAG_MARKER_VALUE, DataTransfer, DragEventKind};
pub use gesture::{GestureId, GestureTracker};
pub use session::{
    DragSession, EndOutcome, EnterOutcome, IgnoredReason, PendingEnter, ReorderEngine,
    SessionPolicy,
};
