#![forbid(unsafe_code)]

//! Observable list: the reorderable collection of a sortable view.

use dragsort_core::{CollectionId, SpliceCollection};

use crate::observable::{Observable, Subscription};

/// A shared list that notifies subscribers on every effective splice.
///
/// Clones share the same list. Identity ([`SpliceCollection::collection_id`])
/// is the shared allocation, so two lists with equal items are still
/// distinct collections.
#[derive(Debug)]
pub struct ObservableList<T> {
    items: Observable<Vec<T>>,
}

impl<T> Clone for ObservableList<T> {
    fn clone(&self) -> Self {
        Self {
            items: self.items.clone(),
        }
    }
}

impl<T: Clone + 'static> ObservableList<T> {
    #[must_use]
    pub fn new(items: impl IntoIterator<Item = T>) -> Self {
        Self {
            items: Observable::new(items.into_iter().collect()),
        }
    }

    /// Snapshot of the items.
    #[must_use]
    pub fn to_vec(&self) -> Vec<T> {
        self.items.get()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<T> {
        self.items.with(|items| items.get(index).cloned())
    }

    pub fn with<R>(&self, f: impl FnOnce(&[T]) -> R) -> R {
        self.items.with(|items| f(items))
    }

    /// Incremented once per effective mutation.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.items.version()
    }

    /// Subscribe to list changes. Callbacks receive the whole new list.
    pub fn subscribe(&self, callback: impl Fn(&Vec<T>) + 'static) -> Subscription {
        self.items.subscribe(callback)
    }

    /// Append one item.
    pub fn push(&self, item: T) {
        self.items.modify(|items| {
            items.push(item);
            ((), true)
        });
    }

    /// Replace all items. Always notifies.
    pub fn replace(&self, items: impl IntoIterator<Item = T>) {
        let items: Vec<T> = items.into_iter().collect();
        self.items.modify(move |current| {
            *current = items;
            ((), true)
        });
    }

    /// Remove `remove` items at `index` and insert `insert` there.
    ///
    /// Notifies once, and only if something was removed or inserted.
    ///
    /// # Panics
    ///
    /// Panics if `index + remove` exceeds the length.
    pub fn splice(&self, index: usize, remove: usize, insert: Vec<T>) -> Vec<T> {
        let inserting = !insert.is_empty();
        self.items.modify(move |items| {
            let removed: Vec<T> = items.splice(index..index + remove, insert).collect();
            let changed = inserting || !removed.is_empty();
            (removed, changed)
        })
    }
}

impl<T> ObservableList<T> {
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.with(Vec::len)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.items.ptr_eq(&other.items)
    }
}

impl<T: Clone + 'static> SpliceCollection for ObservableList<T> {
    type Item = T;

    fn collection_id(&self) -> CollectionId {
        self.items.id()
    }

    fn len(&self) -> usize {
        ObservableList::len(self)
    }

    fn splice(&self, index: usize, remove: usize, items: Vec<T>) -> Vec<T> {
        ObservableList::splice(self, index, remove, items)
    }
}
