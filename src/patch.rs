//! Collection Patcher
//!
//! Applies a shortest edit script to a live mutable sequence, turning it
//! into the shape of a source sequence with the fewest insert/remove
//! operations. Elements that the diff leaves untouched keep their original
//! slot, which is what lets downstream state tied to element identity
//! (selection, animation, bindings) survive a resync.
//!
//! The destination is anything implementing [`ListMut`]; for an
//! [`ObservableList`](crate::observe::ObservableList) destination each
//! individual insert/remove fires its own change event — there is no
//! batched notification per `sync_with` call.

use std::hash::Hash;

use crate::algo::diff_by_key;

// =============================================================================
// Destination Trait
// =============================================================================

/// A mutable, index-addressable ordered collection.
///
/// The minimal surface the patcher needs: length, indexed read, and
/// positional insert/remove. Implemented for `Vec<T>` and for
/// `ObservableList<T>`.
pub trait ListMut<T> {
    /// Number of elements.
    fn len(&self) -> usize;

    /// Check if the collection is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Borrow the element at `index`. Panics if out of bounds.
    fn item(&self, index: usize) -> &T;

    /// Insert `item` at `index`, shifting later elements right.
    fn insert_at(&mut self, index: usize, item: T);

    /// Remove and return the element at `index`, shifting later elements left.
    fn remove_at(&mut self, index: usize) -> T;
}

impl<T> ListMut<T> for Vec<T> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn item(&self, index: usize) -> &T {
        &self[index]
    }

    fn insert_at(&mut self, index: usize, item: T) {
        self.insert(index, item);
    }

    fn remove_at(&mut self, index: usize) -> T {
        self.remove(index)
    }
}

// =============================================================================
// Sync
// =============================================================================

/// Mutate `dest` in place until it is element-wise equal to `src`.
///
/// Computes the shortest edit script between the two and applies it with
/// the fewest insert/remove operations; unchanged elements are never
/// touched. Equal elements are identified by value (`Hash + Eq`).
pub fn sync_with<T, L>(dest: &mut L, src: &[T])
where
    T: Clone + Hash + Eq,
    L: ListMut<T>,
{
    sync_with_by_key(dest, src, |item| item.clone());
}

/// Like [`sync_with`], but element equality is defined by a caller-supplied
/// key function into any `Hash + Eq` type.
pub fn sync_with_by_key<T, K, L, F>(dest: &mut L, src: &[T], key_of: F)
where
    T: Clone,
    K: Hash + Eq,
    L: ListMut<T>,
    F: Fn(&T) -> K,
{
    // Snapshot both sides as key sequences; the diff runs on those, the
    // edits are applied to the live destination.
    let dest_keys: Vec<K> = (0..dest.len()).map(|i| key_of(dest.item(i))).collect();
    let src_keys: Vec<K> = src.iter().map(&key_of).collect();

    let script = diff_by_key(&dest_keys, &src_keys, |k| k);

    // Each applied item shifts index space for everything after it by
    // (inserted - deleted); track the running adjustment.
    let mut shift: isize = 0;
    for item in script {
        let start = (item.start_left as isize + shift) as usize;

        for _ in 0..item.deleted_left {
            dest.remove_at(start);
        }
        for offset in 0..item.inserted_right {
            dest.insert_at(start + offset, src[item.start_right + offset].clone());
        }

        shift += item.inserted_right as isize - item.deleted_left as isize;
    }
}

/// The cleared-source path: remove every element of `dest`.
///
/// Synchronizing against an absent source is defined behavior, not an
/// error; each removal is an individual mutation.
pub fn sync_cleared<T, L: ListMut<T>>(dest: &mut L) {
    while !dest.is_empty() {
        dest.remove_at(dest.len() - 1);
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn test_round_trip() {
        let mut dest = vec!["a", "b", "c", "d"];
        let src = vec!["b", "c", "x", "d", "e"];
        sync_with(&mut dest, &src);
        assert_eq!(dest, src);
    }

    #[test]
    fn test_replace_preserves_identity_of_unchanged_slots() {
        // Rc identity: unchanged elements must keep their original allocation.
        let a = Rc::new(1);
        let b = Rc::new(2);
        let c = Rc::new(3);
        let d = Rc::new(4);
        let x = Rc::new(9);

        let mut dest = vec![a.clone(), b, c.clone(), d.clone()];
        let src = vec![a.clone(), x, c.clone(), d.clone()];
        sync_with(&mut dest, &src);

        assert_eq!(dest.len(), 4);
        assert!(Rc::ptr_eq(&dest[0], &a), "slot 0 was touched");
        assert_eq!(*dest[1], 9);
        assert!(Rc::ptr_eq(&dest[2], &c), "slot 2 was touched");
        assert!(Rc::ptr_eq(&dest[3], &d), "slot 3 was touched");
    }

    #[test]
    fn test_idempotent_sync_performs_no_edits() {
        struct CountingVec {
            inner: Vec<u32>,
            edits: usize,
        }

        impl ListMut<u32> for CountingVec {
            fn len(&self) -> usize {
                self.inner.len()
            }
            fn item(&self, index: usize) -> &u32 {
                &self.inner[index]
            }
            fn insert_at(&mut self, index: usize, item: u32) {
                self.edits += 1;
                self.inner.insert(index, item);
            }
            fn remove_at(&mut self, index: usize) -> u32 {
                self.edits += 1;
                self.inner.remove(index)
            }
        }

        let mut dest = CountingVec {
            inner: vec![1, 2, 3],
            edits: 0,
        };
        let src = dest.inner.clone();
        sync_with(&mut dest, &src);
        assert_eq!(dest.edits, 0);
        assert_eq!(dest.inner, src);
    }

    #[test]
    fn test_into_empty_and_from_empty() {
        let mut dest: Vec<u32> = vec![];
        sync_with(&mut dest, &[1, 2]);
        assert_eq!(dest, [1, 2]);

        sync_with(&mut dest, &[]);
        assert!(dest.is_empty());
    }

    #[test]
    fn test_multi_region_index_shift() {
        // Two separated edit regions; the second one's indices must be
        // adjusted by the first one's net size change.
        let mut dest = vec![0, 1, 2, 3, 4, 5, 6];
        let src = vec![0, 9, 9, 9, 2, 3, 4, 6, 7];
        sync_with(&mut dest, &src);
        assert_eq!(dest, src);
    }

    #[test]
    fn test_sync_cleared() {
        let mut dest = vec![1, 2, 3];
        sync_cleared(&mut dest);
        assert!(dest.is_empty());
    }

    #[test]
    fn test_sync_by_key() {
        #[derive(Clone, Debug, PartialEq)]
        struct Row {
            id: u64,
            label: &'static str,
        }

        let mut dest = vec![
            Row { id: 1, label: "one" },
            Row { id: 2, label: "two" },
        ];
        let src = vec![
            Row { id: 1, label: "uno" },
            Row { id: 3, label: "three" },
        ];

        sync_with_by_key(&mut dest, &src, |row| row.id);

        // Row 1 is key-equal: the destination's original value stays put.
        assert_eq!(dest[0].label, "one");
        assert_eq!(dest[1], src[1]);
        assert_eq!(dest.len(), 2);
    }
}
