#![forbid(unsafe_code)]

//! Reactive data layer for dragsort.
//!
//! Provides [`Observable`], a shared version-tracked value with change
//! notification, and [`ObservableList`], the list type sortable views bind
//! to. `ObservableList` implements [`dragsort_core::SpliceCollection`], so
//! the reorder engine can splice it directly and every rendered view
//! subscribed to it re-renders before the next event is processed.

pub mod list;
pub mod observable;

pub use list::ObservableList;
pub use observable::{Observable, Subscription};
