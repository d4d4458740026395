//! Observable ordered collections.
//!
//! [`ObservableList`] is a `Vec` that emits one [`ListEvent`] per mutation,
//! synchronously, after the mutation has completed. It is the live
//! collection the patcher and [`FilteredView`](crate::filter::FilteredView)
//! operate on.
//!
//! Single-writer: events are delivered on the mutating call stack, and the
//! list is not safe for concurrent mutation. Handlers receive cloned item
//! data, never a borrow of the list, so a handler may freely mutate other
//! collections (including derived ones) while reacting.
//!
//! Item updates carry a [`ChangeMask`] — a caller-defined bitmask naming
//! which aspects of the item changed — so observers can decide cheaply
//! whether an in-place change is relevant to them.

use std::cell::RefCell;
use std::ops::BitOr;
use std::rc::{Rc, Weak};

use smallvec::SmallVec;

// =============================================================================
// Change Mask
// =============================================================================

/// Bitmask of caller-defined changed aspects of an item.
///
/// Which bit means what is up to the collection's owner; observers match
/// against the masks they care about with [`ChangeMask::intersects`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChangeMask(pub u32);

impl ChangeMask {
    /// No aspect changed.
    pub const NONE: ChangeMask = ChangeMask(0);
    /// Every aspect changed (or: match everything).
    pub const ALL: ChangeMask = ChangeMask(u32::MAX);

    /// Mask with the single bit `n` set (`n < 32`).
    pub const fn bit(n: u32) -> Self {
        ChangeMask(1 << n)
    }

    /// Check whether the two masks share any bit.
    pub fn intersects(self, other: ChangeMask) -> bool {
        self.0 & other.0 != 0
    }
}

impl BitOr for ChangeMask {
    type Output = ChangeMask;

    fn bitor(self, rhs: ChangeMask) -> ChangeMask {
        ChangeMask(self.0 | rhs.0)
    }
}

// =============================================================================
// Events
// =============================================================================

/// One mutation of an [`ObservableList`], carrying cloned item data.
#[derive(Debug, Clone)]
pub enum ListEvent<T> {
    /// An element was inserted at `index`.
    Inserted { index: usize, item: T },
    /// The element at `index` was removed.
    Removed { index: usize, item: T },
    /// The element at `index` was replaced wholesale.
    Replaced { index: usize, old: T, new: T },
    /// The element at `index` was mutated in place; `mask` names the
    /// changed aspects and `item` is the post-update value.
    Updated {
        index: usize,
        item: T,
        mask: ChangeMask,
    },
    /// The whole contents were replaced; `items` is the new contents.
    Reset { items: Vec<T> },
}

// =============================================================================
// Subscriptions
// =============================================================================

type Handler<T> = Rc<dyn Fn(&ListEvent<T>)>;
type HandlerList<T> = Rc<RefCell<SmallVec<[(u64, Handler<T>); 2]>>>;

/// Handle for an active event subscription; unhooks on drop.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Unhook explicitly (equivalent to dropping).
    pub fn unsubscribe(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

// =============================================================================
// Observable List
// =============================================================================

/// An ordered collection that notifies subscribers of every mutation.
pub struct ObservableList<T> {
    items: Vec<T>,
    handlers: HandlerList<T>,
    next_id: u64,
}

impl<T: std::fmt::Debug> std::fmt::Debug for ObservableList<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObservableList")
            .field("items", &self.items)
            .field("handlers", &self.handlers.borrow().len())
            .finish()
    }
}

impl<T> Default for ObservableList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ObservableList<T> {
    /// Create an empty list.
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            handlers: Rc::new(RefCell::new(SmallVec::new())),
            next_id: 0,
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Borrow the element at `index`.
    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    /// Borrow the contents as a slice.
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Iterate over the contents.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Register an event handler; events fire until the returned
    /// [`Subscription`] is dropped.
    pub fn subscribe(&mut self, handler: impl Fn(&ListEvent<T>) + 'static) -> Subscription
    where
        T: 'static,
    {
        let id = self.next_id;
        self.next_id += 1;
        self.handlers.borrow_mut().push((id, Rc::new(handler)));

        let weak: Weak<RefCell<SmallVec<[(u64, Handler<T>); 2]>>> = Rc::downgrade(&self.handlers);
        Subscription {
            cancel: Some(Box::new(move || {
                if let Some(handlers) = weak.upgrade() {
                    handlers.borrow_mut().retain(|(hid, _)| *hid != id);
                }
            })),
        }
    }
}

impl<T: Clone> ObservableList<T> {
    /// Create a list with initial contents (no event fires).
    pub fn from_items(items: Vec<T>) -> Self {
        Self {
            items,
            handlers: Rc::new(RefCell::new(SmallVec::new())),
            next_id: 0,
        }
    }

    /// Append an element.
    pub fn push(&mut self, item: T) {
        let index = self.items.len();
        self.items.push(item.clone());
        self.emit(ListEvent::Inserted { index, item });
    }

    /// Insert an element at `index`.
    pub fn insert(&mut self, index: usize, item: T) {
        self.items.insert(index, item.clone());
        self.emit(ListEvent::Inserted { index, item });
    }

    /// Remove and return the element at `index`.
    pub fn remove(&mut self, index: usize) -> T {
        let item = self.items.remove(index);
        self.emit(ListEvent::Removed {
            index,
            item: item.clone(),
        });
        item
    }

    /// Replace the element at `index`, returning the old value.
    pub fn replace(&mut self, index: usize, new: T) -> T {
        let old = std::mem::replace(&mut self.items[index], new.clone());
        self.emit(ListEvent::Replaced {
            index,
            old: old.clone(),
            new,
        });
        old
    }

    /// Mutate the element at `index` in place; `mask` names the changed
    /// aspects for observers.
    pub fn update(&mut self, index: usize, mask: ChangeMask, f: impl FnOnce(&mut T)) {
        f(&mut self.items[index]);
        let item = self.items[index].clone();
        self.emit(ListEvent::Updated { index, item, mask });
    }

    /// Remove everything (a single reset event).
    pub fn clear(&mut self) {
        self.items.clear();
        self.emit(ListEvent::Reset { items: Vec::new() });
    }

    /// Replace the whole contents (a single reset event).
    pub fn replace_all(&mut self, items: Vec<T>) {
        self.items = items.clone();
        self.emit(ListEvent::Reset { items });
    }

    fn emit(&self, event: ListEvent<T>) {
        // Snapshot the handler list so handlers can (un)subscribe while
        // the event is being dispatched.
        let handlers: SmallVec<[Handler<T>; 2]> = self
            .handlers
            .borrow()
            .iter()
            .map(|(_, handler)| Rc::clone(handler))
            .collect();
        for handler in handlers {
            handler(&event);
        }
    }
}

impl<T: Clone> crate::patch::ListMut<T> for ObservableList<T> {
    fn len(&self) -> usize {
        ObservableList::len(self)
    }

    fn item(&self, index: usize) -> &T {
        &self.items[index]
    }

    fn insert_at(&mut self, index: usize, item: T) {
        self.insert(index, item);
    }

    fn remove_at(&mut self, index: usize) -> T {
        self.remove(index)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn record_events(list: &mut ObservableList<u32>) -> (Rc<RefCell<Vec<String>>>, Subscription) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let log_for_handler = Rc::clone(&log);
        let sub = list.subscribe(move |event| {
            let line = match event {
                ListEvent::Inserted { index, item } => format!("ins {index} {item}"),
                ListEvent::Removed { index, item } => format!("rem {index} {item}"),
                ListEvent::Replaced { index, new, .. } => format!("rep {index} {new}"),
                ListEvent::Updated { index, item, .. } => format!("upd {index} {item}"),
                ListEvent::Reset { items } => format!("rst {}", items.len()),
            };
            log_for_handler.borrow_mut().push(line);
        });
        (log, sub)
    }

    #[test]
    fn test_events_fire_per_mutation() {
        let mut list = ObservableList::new();
        let (log, _sub) = record_events(&mut list);

        list.push(1);
        list.insert(0, 2);
        list.replace(1, 3);
        list.remove(0);
        list.clear();

        assert_eq!(
            log.borrow().as_slice(),
            ["ins 0 1", "ins 0 2", "rep 1 3", "rem 0 2", "rst 0"]
        );
    }

    #[test]
    fn test_update_carries_mask_and_new_value() {
        let mut list = ObservableList::from_items(vec![10u32]);
        let seen = Rc::new(RefCell::new(None));
        let seen_for_handler = Rc::clone(&seen);
        let _sub = list.subscribe(move |event| {
            if let ListEvent::Updated { item, mask, .. } = event {
                *seen_for_handler.borrow_mut() = Some((*item, *mask));
            }
        });

        list.update(0, ChangeMask::bit(3), |v| *v += 5);
        assert_eq!(*seen.borrow(), Some((15, ChangeMask::bit(3))));
        assert_eq!(list.as_slice(), [15]);
    }

    #[test]
    fn test_dropping_subscription_unhooks() {
        let mut list = ObservableList::new();
        let (log, sub) = record_events(&mut list);

        list.push(1);
        drop(sub);
        list.push(2);

        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn test_sync_with_fires_individual_events() {
        use crate::patch::sync_with;

        let mut list = ObservableList::from_items(vec![1u32, 2, 3, 4]);
        let (log, _sub) = record_events(&mut list);

        sync_with(&mut list, &[1, 9, 3, 4]);

        // One removal and one insertion, each its own event.
        assert_eq!(log.borrow().as_slice(), ["rem 1 2", "ins 1 9"]);
        assert_eq!(list.as_slice(), [1, 9, 3, 4]);
    }

    #[test]
    fn test_change_mask_ops() {
        let mask = ChangeMask::bit(0) | ChangeMask::bit(4);
        assert!(mask.intersects(ChangeMask::bit(4)));
        assert!(!mask.intersects(ChangeMask::bit(1)));
        assert!(!ChangeMask::NONE.intersects(ChangeMask::ALL));
        assert!(ChangeMask::ALL.intersects(mask));
    }
}
