#![forbid(unsafe_code)]

//! Sortable attachment for DOM-like hosts.
//!
//! [`Sortable`] wires a [`dragsort_core::ReorderEngine`] to native drag
//! events on host elements. Hosts implement [`DragHost`] (elements,
//! classes, listeners) and [`dragsort_core::BindingResolver`] (element to
//! collection member). [`HeadlessDocument`] is an in-memory host used by
//! the harness and the tests.
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//!
//! use dragsort_core::{DEFAULT_TARGET_CLASS, GroupId, SortableConfig};
//! use dragsort_runtime::ObservableList;
//! use dragsort_web::{Gesture, HeadlessDocument, ListView, Sortable, ViewRegistry};
//!
//! let doc = HeadlessDocument::new();
//! let group = GroupId::next();
//! let list = ObservableList::new(["A", "B", "C", "D"]);
//! let view = ListView::new(Rc::clone(&doc), list.clone(), group);
//! let registry = ViewRegistry::new();
//! registry.register(view.clone());
//!
//! let sortable = Sortable::with_group(group, Rc::clone(&doc), registry, SortableConfig::default());
//! let _handles: Vec<_> = view.elements().iter().map(|n| sortable.attach(n)).collect();
//!
//! let mut gesture = Gesture::start(&doc, view.element(0).unwrap()).unwrap();
//! gesture.enter(view.element(1).unwrap()).unwrap();
//! gesture.enter(view.element(2).unwrap()).unwrap();
//! gesture.release().unwrap();
//!
//! assert_eq!(list.to_vec(), vec!["B", "C", "A", "D"]);
//! assert!(!doc.has_class(view.element(2).unwrap(), DEFAULT_TARGET_CLASS));
//! ```

pub mod attachment;
pub mod headless;
pub mod host;
pub mod sortable;

pub use attachment::AttachmentHandle;
pub use headless::{
    DispatchReport, Gesture, GestureEnd, HeadlessDocument, ListView, NodeId, ViewRegistry,
};
pub use host::{DragEvent, DragHost, Listener, ListenerId};
pub use sortable::Sortable;
