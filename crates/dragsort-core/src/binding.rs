#![forbid(unsafe_code)]

//! Binding model: how a sortable element maps onto collection data.
//!
//! A host UI layer renders one element per collection member. For every
//! element it can answer three questions: which collection the element is
//! bound to, at which index, and which UI instance owns it. Those answers
//! form a [`Binding`], produced fresh on every event by a
//! [`BindingResolver`].
//!
//! # Identity
//!
//! Collections are compared by identity ([`CollectionId`]), never by
//! contents: two lists holding `["a", "b"]` are different collections.
//! Owners are compared by a dedicated [`GroupId`] token rather than by
//! incidental equality of some larger framework object.

use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_GROUP_ID: AtomicU64 = AtomicU64::new(1);

/// Owner token of a sortable group.
///
/// Drags never cross from one group into another: a drag-enter over an
/// element whose owner differs from the session's owner is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupId(u64);

impl GroupId {
    /// Owner reported for elements that belong to no sortable group.
    /// [`GroupId::next`] never returns it.
    pub const UNOWNED: Self = Self(0);

    /// Allocate a fresh, process-unique group id.
    #[must_use]
    pub fn next() -> Self {
        Self(NEXT_GROUP_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Wrap a host-provided raw id.
    ///
    /// Raw ids are not checked against [`GroupId::next`] allocations; hosts
    /// mixing both schemes must keep them disjoint.
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "group#{}", self.0)
    }
}

/// Identity of a bound collection.
///
/// For `Rc`-backed collections this is the address of the shared
/// allocation. The address stays unique for as long as some handle keeps
/// the allocation alive, which an active session always does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CollectionId(usize);

impl CollectionId {
    /// Identity of the allocation behind `rc`.
    #[must_use]
    pub fn of_rc<T: ?Sized>(rc: &Rc<T>) -> Self {
        Self(Rc::as_ptr(rc).cast::<()>() as usize)
    }

    #[must_use]
    pub const fn from_raw(raw: usize) -> Self {
        Self(raw)
    }
}

impl fmt::Display for CollectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "collection@{:#x}", self.0)
    }
}

/// An ordered, index-addressable collection mutated in place.
///
/// Handles are cheap to clone and share state (like an `Rc`), which is why
/// [`splice`](SpliceCollection::splice) takes `&self`.
pub trait SpliceCollection {
    type Item;

    /// Identity of the underlying collection, shared by all handle clones.
    fn collection_id(&self) -> CollectionId;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove `remove` items starting at `index`, insert `items` at `index`,
    /// and return the removed items in order.
    ///
    /// The change must be propagated to the rendered view before this
    /// returns, so that the next event resolves against the new order.
    ///
    /// # Panics
    ///
    /// Implementations may panic if `index > len()` or
    /// `index + remove > len()`.
    fn splice(&self, index: usize, remove: usize, items: Vec<Self::Item>) -> Vec<Self::Item>;
}

/// What a sortable element is bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoundTarget<C> {
    /// The element renders member `index` of `collection`.
    Member { collection: C, index: usize },
    /// The element is bound to something that is not a collection member
    /// (a scalar, an object field, nothing at all). `keypath` describes it
    /// for error messages.
    Detached { keypath: String },
}

/// A resolved binding: target plus owner token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding<C> {
    pub target: BoundTarget<C>,
    pub owner: GroupId,
}

impl<C> Binding<C> {
    #[must_use]
    pub fn member(collection: C, index: usize, owner: GroupId) -> Self {
        Self {
            target: BoundTarget::Member { collection, index },
            owner,
        }
    }

    #[must_use]
    pub fn detached(keypath: impl Into<String>, owner: GroupId) -> Self {
        Self {
            target: BoundTarget::Detached {
                keypath: keypath.into(),
            },
            owner,
        }
    }

    /// Collection and index, if bound to a member.
    #[must_use]
    pub fn member_parts(&self) -> Option<(&C, usize)> {
        match &self.target {
            BoundTarget::Member { collection, index } => Some((collection, *index)),
            BoundTarget::Detached { .. } => None,
        }
    }
}

/// Host-side lookup from an element to its [`Binding`].
///
/// Implementations must resolve against the *current* render state on every
/// call; the engine relies on fresh indices after each splice.
pub trait BindingResolver<N: ?Sized> {
    type Collection: SpliceCollection + Clone;

    fn resolve_binding(&self, node: &N) -> Binding<Self::Collection>;
}

impl<N: ?Sized, R: BindingResolver<N> + ?Sized> BindingResolver<N> for Rc<R> {
    type Collection = R::Collection;

    fn resolve_binding(&self, node: &N) -> Binding<Self::Collection> {
        (**self).resolve_binding(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_ids_are_unique() {
        let a = GroupId::next();
        let b = GroupId::next();
        assert_ne!(a, b);
        assert!(b.get() > a.get());
        assert_ne!(a, GroupId::UNOWNED);
    }

    #[test]
    fn collection_id_follows_allocation_not_contents() {
        let a = Rc::new(vec![1, 2, 3]);
        let b = Rc::new(vec![1, 2, 3]);
        let a2 = Rc::clone(&a);
        assert_eq!(CollectionId::of_rc(&a), CollectionId::of_rc(&a2));
        assert_ne!(CollectionId::of_rc(&a), CollectionId::of_rc(&b));
    }

    #[test]
    fn member_parts_only_for_members() {
        let owner = GroupId::from_raw(7);
        let member: Binding<&str> = Binding::member("list", 3, owner);
        assert_eq!(member.member_parts(), Some((&"list", 3)));

        let detached: Binding<&str> = Binding::detached("user.name", owner);
        assert_eq!(detached.member_parts(), None);
        assert_eq!(detached.owner, owner);
    }

    #[test]
    fn display_formats() {
        assert_eq!(GroupId::from_raw(4).to_string(), "group#4");
        assert_eq!(CollectionId::from_raw(0x10).to_string(), "collection@0x10");
    }
}
