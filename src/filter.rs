//! Filtered derived views.
//!
//! A [`FilteredView`] watches an [`ObservableList`] source and maintains a
//! derived observable collection equal to the source filtered by a
//! predicate, in source order. Structural source changes (insert, remove,
//! replace, reset) trigger a full resync through the collection patcher —
//! a source-level change does not map one-to-one onto filtered-view deltas
//! when items cross the predicate boundary. In-place item updates whose
//! [`ChangeMask`] intersects the view's tracked mask take a single-item
//! fast path instead: re-evaluate the predicate and insert or remove just
//! that item.
//!
//! The view keeps a shadow copy of the source (events carry cloned items),
//! so reacting never re-enters the source collection.
//!
//! [`FilteredView::defer_refresh`] suspends reactive resyncs for a scope
//! and performs one consolidated resync when the last guard drops. This is
//! reentrancy suppression for batched synchronous mutations, not a
//! concurrency primitive.

use std::cell::RefCell;
use std::hash::Hash;
use std::rc::{Rc, Weak};

use crate::observe::{ChangeMask, ListEvent, ObservableList, Subscription};
use crate::patch::sync_with;

// =============================================================================
// Filtered View
// =============================================================================

/// A live derived collection: `source` filtered by a swappable predicate.
pub struct FilteredView<T> {
    inner: Rc<RefCell<Inner<T>>>,
    _source_sub: Subscription,
}

struct Inner<T> {
    /// Mirror of the source contents, maintained from events.
    shadow: Vec<T>,
    /// Membership flag per shadow slot (the included/excluded state of
    /// each watched item).
    included: Vec<bool>,
    /// The derived collection downstream consumers observe.
    output: ObservableList<T>,
    predicate: Rc<dyn Fn(&T) -> bool>,
    /// Updates whose mask misses this are ignored by the fast path.
    tracked: ChangeMask,
    /// Nesting depth of active defer guards.
    defer_depth: usize,
    /// A reaction was suppressed while deferred.
    dirty: bool,
}

impl<T> FilteredView<T>
where
    T: Clone + Hash + Eq + 'static,
{
    /// Create a view over `source`. In-place item updates are ignored;
    /// use [`with_tracked`](Self::with_tracked) to react to them.
    pub fn new(
        source: &mut ObservableList<T>,
        predicate: impl Fn(&T) -> bool + 'static,
    ) -> Self {
        Self::with_tracked(source, predicate, ChangeMask::NONE)
    }

    /// Create a view that additionally watches in-place item updates
    /// whose mask intersects `tracked`, taking the single-item fast path
    /// for those.
    pub fn with_tracked(
        source: &mut ObservableList<T>,
        predicate: impl Fn(&T) -> bool + 'static,
        tracked: ChangeMask,
    ) -> Self {
        let mut inner = Inner {
            shadow: source.as_slice().to_vec(),
            included: Vec::new(),
            output: ObservableList::new(),
            predicate: Rc::new(predicate),
            tracked,
            defer_depth: 0,
            dirty: false,
        };
        inner.resync();

        let inner = Rc::new(RefCell::new(inner));
        let weak: Weak<RefCell<Inner<T>>> = Rc::downgrade(&inner);
        let source_sub = source.subscribe(move |event| {
            if let Some(inner) = weak.upgrade() {
                inner.borrow_mut().on_source_event(event);
            }
        });

        Self {
            inner,
            _source_sub: source_sub,
        }
    }

    /// Number of elements currently in the view.
    pub fn len(&self) -> usize {
        self.inner.borrow().output.len()
    }

    /// Check if the view is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().output.is_empty()
    }

    /// Clone the current view contents.
    pub fn snapshot(&self) -> Vec<T> {
        self.inner.borrow().output.as_slice().to_vec()
    }

    /// Subscribe to the derived collection's change events.
    pub fn subscribe(&self, handler: impl Fn(&ListEvent<T>) + 'static) -> Subscription {
        self.inner.borrow_mut().output.subscribe(handler)
    }

    /// Swap the predicate; triggers a full resync (or marks the view
    /// dirty inside a defer scope).
    pub fn set_predicate(&self, predicate: impl Fn(&T) -> bool + 'static) {
        let mut inner = self.inner.borrow_mut();
        inner.predicate = Rc::new(predicate);
        inner.react();
    }

    /// Suspend reactive resyncs until the returned guard (and any nested
    /// ones) drop, then resync once if anything changed meanwhile.
    pub fn defer_refresh(&self) -> DeferGuard<T> {
        self.inner.borrow_mut().defer_depth += 1;
        DeferGuard {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> Inner<T>
where
    T: Clone + Hash + Eq,
{
    fn on_source_event(&mut self, event: &ListEvent<T>) {
        match event {
            ListEvent::Inserted { index, item } => {
                self.shadow.insert(*index, item.clone());
                self.react();
            }
            ListEvent::Removed { index, .. } => {
                self.shadow.remove(*index);
                self.react();
            }
            ListEvent::Replaced { index, new, .. } => {
                self.shadow[*index] = new.clone();
                self.react();
            }
            ListEvent::Reset { items } => {
                self.shadow = items.clone();
                self.react();
            }
            ListEvent::Updated { index, item, mask } => {
                self.shadow[*index] = item.clone();
                if !self.tracked.intersects(*mask) {
                    return; // untracked aspect: cannot move the item across the filter
                }
                if self.defer_depth > 0 {
                    self.dirty = true;
                } else {
                    self.item_updated(*index);
                }
            }
        }
    }

    fn react(&mut self) {
        if self.defer_depth > 0 {
            self.dirty = true;
        } else {
            self.resync();
        }
    }

    /// Full resync: recompute membership and patch the output with the
    /// fewest edits. Unchanged view elements keep their slots.
    fn resync(&mut self) {
        let predicate = Rc::clone(&self.predicate);
        self.included = self.shadow.iter().map(|item| predicate(item)).collect();

        let desired: Vec<T> = self
            .shadow
            .iter()
            .zip(&self.included)
            .filter(|(_, included)| **included)
            .map(|(item, _)| item.clone())
            .collect();

        sync_with(&mut self.output, &desired);
    }

    /// Single-item fast path for a tracked in-place update: toggle the
    /// item's membership without a full resync.
    fn item_updated(&mut self, index: usize) {
        let item = self.shadow[index].clone();
        let was_included = self.included[index];
        let now_included = (self.predicate)(&item);

        // Position in the view = number of included items before this one.
        let position = self.included[..index].iter().filter(|b| **b).count();

        if now_included && !was_included {
            self.included[index] = true;
            self.output.insert(position, item);
        } else if !now_included && was_included {
            self.included[index] = false;
            self.output.remove(position);
        } else if now_included && self.output.get(position) != Some(&item) {
            // Still included but the stored clone went stale.
            self.output.replace(position, item);
        }
    }
}

// =============================================================================
// Defer Guard
// =============================================================================

/// Scope guard returned by [`FilteredView::defer_refresh`].
///
/// Guards nest: only the last one to drop performs the consolidated
/// resync, and only if a reaction was suppressed inside the scope.
#[must_use = "dropping the guard immediately ends the defer scope"]
pub struct DeferGuard<T: Clone + Hash + Eq> {
    inner: Rc<RefCell<Inner<T>>>,
}

impl<T: Clone + Hash + Eq> Drop for DeferGuard<T> {
    fn drop(&mut self) {
        let mut inner = self.inner.borrow_mut();
        inner.defer_depth -= 1;
        if inner.defer_depth == 0 && inner.dirty {
            inner.dirty = false;
            // One consolidated resync covers the whole batch; membership
            // is recomputed wholesale, so deferred fast-path updates are
            // folded in too.
            inner.resync();
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
