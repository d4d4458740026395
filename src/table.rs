//! Keyed incremental tables.
//!
//! A [`KeyedTable`] is an immutable snapshot of a keyed collection plus
//! the delta (added / changed / removed values) that produced it from the
//! prior snapshot. Every update returns a new table; no table is ever
//! mutated in place, so snapshots are cheap to hold and safe to read from
//! anywhere.
//!
//! # Update Modes
//!
//! - **Incremental** ([`KeyedTable::apply`]): the caller already knows the
//!   delta and folds it onto the state (removes, then changes, then adds).
//! - **Whole-state diff** ([`KeyedTable::diff_states`]): only a full new
//!   snapshot is available; the table compares entry-by-entry and derives
//!   the delta itself.
//!
//! Both modes agree: any sequence of incremental updates reaches the same
//! state as one whole-state diff against the final snapshot.
//!
//! # Filtering
//!
//! [`filtered_update`] re-derives a *filtered* delta from a raw one — a
//! change crossing the predicate boundary becomes an addition to or
//! removal from the filtered table. [`predicate_changed`] recomputes the
//! filtered delta when only the predicate moved.
//!
//! # Accumulation
//!
//! [`TableBuilder`] batches many small mutations into one delta, cancelling
//! redundant operations along the way (an add immediately removed again
//! never surfaces).

use std::fmt;
use std::hash::Hash;
use std::rc::Rc;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::error::{TableError, TableResult};

// =============================================================================
// Change
// =============================================================================

/// One keyed value transition: the value before and after an update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change<V> {
    /// Value prior to the update.
    pub old: V,
    /// Value after the update.
    pub new: V,
}

impl<V> Change<V> {
    /// Create a change pair.
    pub fn new(old: V, new: V) -> Self {
        Self { old, new }
    }
}

// =============================================================================
// Keyed Table
// =============================================================================

/// Shared-ownership predicate over table values.
///
/// `Rc`-based so a predicate swap can be detected by pointer identity
/// (see [`predicate_changed`]).
pub type TablePredicate<V> = Rc<dyn Fn(&V) -> bool>;

/// Immutable keyed snapshot plus the delta that produced it.
///
/// The state is a copy-on-write map behind an `Arc`: cloning a table is
/// cheap, and concurrent reads of a snapshot are safe. All update
/// functions assume a single producer advancing one table timeline.
pub struct KeyedTable<K, V> {
    state: Arc<FxHashMap<K, V>>,
    added: Vec<V>,
    changed: Vec<Change<V>>,
    removed: Vec<V>,
}

impl<K, V> Clone for KeyedTable<K, V>
where
    V: Clone,
{
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            added: self.added.clone(),
            changed: self.changed.clone(),
            removed: self.removed.clone(),
        }
    }
}

impl<K, V> Default for KeyedTable<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for KeyedTable<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyedTable")
            .field("state", &self.state)
            .field("added", &self.added)
            .field("changed", &self.changed)
            .field("removed", &self.removed)
            .finish()
    }
}

impl<K, V> KeyedTable<K, V> {
    /// Create an empty table with an empty delta.
    pub fn new() -> Self {
        Self {
            state: Arc::new(FxHashMap::default()),
            added: Vec::new(),
            changed: Vec::new(),
            removed: Vec::new(),
        }
    }

    /// The full key-to-value state of this snapshot.
    pub fn state(&self) -> &FxHashMap<K, V> {
        &self.state
    }

    /// Number of entries in the state.
    pub fn len(&self) -> usize {
        self.state.len()
    }

    /// Check if the state is empty.
    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }

    /// Values added by the update that produced this snapshot.
    pub fn added(&self) -> &[V] {
        &self.added
    }

    /// Value transitions of the update that produced this snapshot.
    pub fn changed(&self) -> &[Change<V>] {
        &self.changed
    }

    /// Values removed by the update that produced this snapshot.
    pub fn removed(&self) -> &[V] {
        &self.removed
    }

    /// Check if the producing delta was non-empty.
    pub fn has_changes(&self) -> bool {
        !self.added.is_empty() || !self.changed.is_empty() || !self.removed.is_empty()
    }
}

impl<K, V> KeyedTable<K, V>
where
    K: Hash + Eq,
{
    /// Look up a value by key.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.state.get(key)
    }

    /// Check if a key is present.
    pub fn contains_key(&self, key: &K) -> bool {
        self.state.contains_key(key)
    }
}

impl<K, V> KeyedTable<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    /// The same state with an empty delta: "nothing happened since".
    pub fn quiesced(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            added: Vec::new(),
            changed: Vec::new(),
            removed: Vec::new(),
        }
    }

    /// Incremental update: fold an externally-computed delta onto the
    /// state (removes, then changes, then adds) and return a new table
    /// carrying exactly that delta.
    ///
    /// Delta consistency is the caller's responsibility: this path
    /// best-effort overwrites on an inconsistent delta (an "added" key
    /// already present silently replaces, a "removed" key absent is a
    /// no-op), with `debug_assert!`s flagging the inconsistency in debug
    /// builds. Use [`apply_checked`](Self::apply_checked) to fail loudly
    /// instead.
    pub fn apply<F>(
        &self,
        added: Vec<V>,
        changes: Vec<Change<V>>,
        removed: Vec<V>,
        key_of: F,
    ) -> Self
    where
        F: Fn(&V) -> K,
    {
        let mut state = (*self.state).clone();

        for value in &removed {
            let key = key_of(value);
            let prior = state.remove(&key);
            debug_assert!(prior.is_some(), "removed key not present in prior state");
        }
        for change in &changes {
            let key = key_of(&change.new);
            let prior = state.insert(key, change.new.clone());
            debug_assert!(prior.is_some(), "changed key not present in prior state");
        }
        for value in &added {
            let key = key_of(value);
            let prior = state.insert(key, value.clone());
            debug_assert!(prior.is_none(), "added key already present in prior state");
        }

        Self {
            state: Arc::new(state),
            added,
            changed: changes,
            removed,
        }
    }

    /// Like [`apply`](Self::apply), but rejects an inconsistent delta
    /// instead of overwriting.
    pub fn apply_checked<F>(
        &self,
        added: Vec<V>,
        changes: Vec<Change<V>>,
        removed: Vec<V>,
        key_of: F,
    ) -> TableResult<Self>
    where
        K: fmt::Debug,
        F: Fn(&V) -> K,
    {
        let mut state = (*self.state).clone();

        for value in &removed {
            let key = key_of(value);
            if state.remove(&key).is_none() {
                return Err(TableError::MissingRemove {
                    key: format!("{key:?}"),
                });
            }
        }
        for change in &changes {
            let key = key_of(&change.new);
            if !state.contains_key(&key) {
                return Err(TableError::MissingChange {
                    key: format!("{key:?}"),
                });
            }
            state.insert(key, change.new.clone());
        }
        for value in &added {
            let key = key_of(value);
            if state.contains_key(&key) {
                return Err(TableError::DuplicateAdd {
                    key: format!("{key:?}"),
                });
            }
            state.insert(key, value.clone());
        }

        Ok(Self {
            state: Arc::new(state),
            added,
            changed: changes,
            removed,
        })
    }

    /// Whole-state-diff update: compare the prior state entry-by-entry
    /// against a complete new snapshot and derive the delta.
    ///
    /// A key present only in the new snapshot is an addition, only in the
    /// old state a removal, in both with unequal values a change.
    pub fn diff_states<I, F>(&self, new_items: I, key_of: F) -> Self
    where
        V: PartialEq,
        I: IntoIterator<Item = V>,
        F: Fn(&V) -> K,
    {
        self.diff_states_by(new_items, key_of, |a, b| a == b)
    }

    /// Like [`diff_states`](Self::diff_states), with value equality
    /// supplied by the caller.
    pub fn diff_states_by<I, F, E>(&self, new_items: I, key_of: F, value_eq: E) -> Self
    where
        I: IntoIterator<Item = V>,
        F: Fn(&V) -> K,
        E: Fn(&V, &V) -> bool,
    {
        let mut new_state = FxHashMap::default();
        for value in new_items {
            let prior = new_state.insert(key_of(&value), value);
            debug_assert!(prior.is_none(), "duplicate key in new state");
        }

        let mut added = Vec::new();
        let mut changed = Vec::new();
        let mut removed = Vec::new();

        for (key, new_value) in &new_state {
            match self.state.get(key) {
                None => added.push(new_value.clone()),
                Some(old_value) if !value_eq(old_value, new_value) => {
                    changed.push(Change::new(old_value.clone(), new_value.clone()));
                }
                Some(_) => {}
            }
        }
        for (key, old_value) in self.state.iter() {
            if !new_state.contains_key(key) {
                removed.push(old_value.clone());
            }
        }

        Self {
            state: Arc::new(new_state),
            added,
            changed,
            removed,
        }
    }
}

// =============================================================================
// Filter Helpers
// =============================================================================

/// Re-derive a filtered delta from a raw (unfiltered) one and advance the
/// filtered table.
///
/// Membership in `filtered` decides each raw entry's fate:
///
/// - a raw addition passing the predicate is an addition; otherwise dropped;
/// - a raw removal is a removal only if the key was in the filtered table;
/// - a raw change stays a change while the key remains in (present and
///   still passing), becomes an addition when the new value newly passes,
///   and becomes a removal when it newly fails.
pub fn filtered_update<K, V, F>(
    filtered: &KeyedTable<K, V>,
    raw_added: &[V],
    raw_changes: &[Change<V>],
    raw_removed: &[V],
    predicate: &TablePredicate<V>,
    key_of: F,
) -> KeyedTable<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
    F: Fn(&V) -> K,
{
    let mut added = Vec::new();
    let mut changed = Vec::new();
    let mut removed = Vec::new();

    for value in raw_added {
        if predicate(value) {
            added.push(value.clone());
        }
    }
    for value in raw_removed {
        if let Some(old) = filtered.get(&key_of(value)) {
            removed.push(old.clone());
        }
    }
    for change in raw_changes {
        let present = filtered.get(&key_of(&change.new));
        let passes = predicate(&change.new);
        match (present, passes) {
            // The filtered consumer last saw the filtered state's value,
            // so that is the "old" side of the transition.
            (Some(old), true) => changed.push(Change::new(old.clone(), change.new.clone())),
            (Some(old), false) => removed.push(old.clone()),
            (None, true) => added.push(change.new.clone()),
            (None, false) => {}
        }
    }

    filtered.apply(added, changed, removed, key_of)
}

/// Recompute the filtered delta after a predicate swap, with no source
/// mutation involved.
///
/// Scans the unfiltered `baseline` and classifies each key's membership
/// transition: newly passing keys become additions, keys that stop
/// passing become removals. Returns a quiesced clone when both predicates
/// are the same `Rc` (pointer identity).
pub fn predicate_changed<K, V, F>(
    filtered: &KeyedTable<K, V>,
    baseline: &KeyedTable<K, V>,
    old_predicate: &TablePredicate<V>,
    new_predicate: &TablePredicate<V>,
    key_of: F,
) -> KeyedTable<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
    F: Fn(&V) -> K,
{
    if Rc::ptr_eq(old_predicate, new_predicate) {
        return filtered.quiesced();
    }

    let mut added = Vec::new();
    let mut removed = Vec::new();

    for (key, value) in baseline.state().iter() {
        let was_in = filtered.contains_key(key);
        let now_in = new_predicate(value);
        if now_in && !was_in {
            added.push(value.clone());
        } else if !now_in && was_in {
            if let Some(old) = filtered.get(key) {
                removed.push(old.clone());
            }
        }
    }

    filtered.apply(added, Vec::new(), removed, key_of)
}

// =============================================================================
// Builder
// =============================================================================

/// Pending operation on one key, relative to the builder's baseline.
enum Pending<V> {
    Add(V),
    Update(V),
    Remove,
}

/// Mutable delta accumulator over a baseline table.
///
/// Batches any number of add/update/remove calls and materializes them as
/// one [`KeyedTable`] update. Redundant operations cancel out: removing a
/// key that was only just added (and has no baseline entry) erases the
/// pending add instead of recording a spurious removal.
pub struct TableBuilder<K, V> {
    baseline: Arc<FxHashMap<K, V>>,
    pending: FxHashMap<K, Pending<V>>,
}

impl<K, V> TableBuilder<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    /// Start accumulating on top of `table`'s state.
    pub fn new(table: &KeyedTable<K, V>) -> Self {
        Self {
            baseline: Arc::clone(&table.state),
            pending: FxHashMap::default(),
        }
    }

    /// Record an upsert: an addition if the baseline lacks the key, a
    /// change otherwise. Later calls on the same key overwrite earlier
    /// ones.
    pub fn add_or_update(&mut self, key: K, value: V) {
        let pending = if self.baseline.contains_key(&key) {
            Pending::Update(value)
        } else {
            Pending::Add(value)
        };
        self.pending.insert(key, pending);
    }

    /// Record a removal. A removal of a key with no baseline entry cancels
    /// any pending add for it and records nothing.
    pub fn remove(&mut self, key: K) {
        if self.baseline.contains_key(&key) {
            self.pending.insert(key, Pending::Remove);
        } else {
            self.pending.remove(&key);
        }
    }

    /// Fold another table's delta into this accumulator.
    pub fn merge<F>(&mut self, other: &KeyedTable<K, V>, key_of: F)
    where
        F: Fn(&V) -> K,
    {
        for value in other.added() {
            self.add_or_update(key_of(value), value.clone());
        }
        for change in other.changed() {
            self.add_or_update(key_of(&change.new), change.new.clone());
        }
        for value in other.removed() {
            self.remove(key_of(value));
        }
    }

    /// Discard everything accumulated so far.
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Check if nothing has been accumulated.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Materialize the accumulated delta as a new table.
    pub fn build(self) -> KeyedTable<K, V> {
        self.build_inner(None::<fn(&V, &V) -> bool>)
    }

    /// Like [`build`](Self::build), but drops changes whose new value
    /// equals the old under `value_eq`, so no-op transitions never reach
    /// downstream observers.
    pub fn build_dedup<E>(self, value_eq: E) -> KeyedTable<K, V>
    where
        E: Fn(&V, &V) -> bool,
    {
        self.build_inner(Some(value_eq))
    }

    fn build_inner<E>(self, value_eq: Option<E>) -> KeyedTable<K, V>
    where
        E: Fn(&V, &V) -> bool,
    {
        let TableBuilder { baseline, pending } = self;

        let mut state = (*baseline).clone();
        let mut added = Vec::new();
        let mut changed = Vec::new();
        let mut removed = Vec::new();

        for (key, op) in pending {
            match op {
                Pending::Add(value) => {
                    state.insert(key, value.clone());
                    added.push(value);
                }
                Pending::Update(value) => {
                    let old = match baseline.get(&key) {
                        Some(old) => old.clone(),
                        None => {
                            // Update without a baseline entry is recorded
                            // as an add; only reachable via inconsistent
                            // external deltas merged in.
                            debug_assert!(false, "pending update without baseline entry");
                            state.insert(key, value.clone());
                            added.push(value);
                            continue;
                        }
                    };
                    if let Some(eq) = &value_eq {
                        if eq(&old, &value) {
                            continue; // no-op transition dropped
                        }
                    }
                    state.insert(key, value.clone());
                    changed.push(Change::new(old, value));
                }
                Pending::Remove => {
                    if let Some(old) = state.remove(&key) {
                        removed.push(old);
                    }
                }
            }
        }

        KeyedTable {
            state: Arc::new(state),
            added,
            changed,
            removed,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use static_assertions::assert_impl_all;

    assert_impl_all!(KeyedTable<u64, String>: Send, Sync);

    type Entry = (u64, &'static str);

    fn key_of(entry: &Entry) -> u64 {
        entry.0
    }

    fn sorted(values: &[Entry]) -> Vec<Entry> {
        let mut values = values.to_vec();
        values.sort_unstable();
        values
    }

    #[test]
    fn test_incremental_updates_fold_delta() {
        // Scenario: start empty, add {1:x, 2:y}, then change 1 -> z and
        // remove 2.
        let empty = KeyedTable::new();
        let first = empty.apply(vec![(1, "x"), (2, "y")], vec![], vec![], key_of);

        assert_eq!(first.len(), 2);
        assert_eq!(sorted(first.added()), [(1, "x"), (2, "y")]);
        assert!(first.changed().is_empty() && first.removed().is_empty());

        let second = first.apply(
            vec![],
            vec![Change::new((1, "x"), (1, "z"))],
            vec![(2, "y")],
            key_of,
        );

        assert_eq!(second.state().len(), 1);
        assert_eq!(second.get(&1), Some(&(1, "z")));
        assert!(second.added().is_empty());
        assert_eq!(second.changed(), [Change::new((1, "x"), (1, "z"))]);
        assert_eq!(second.removed(), [(2, "y")]);
    }

    #[test]
    fn test_whole_state_diff_classification() {
        let base = KeyedTable::new().apply(vec![(1, "a"), (2, "b"), (3, "c")], vec![], vec![], key_of);

        let next = base.diff_states(vec![(2, "b"), (3, "x"), (4, "d")], key_of);

        assert_eq!(next.added(), [(4, "d")]);
        assert_eq!(next.changed(), [Change::new((3, "c"), (3, "x"))]);
        assert_eq!(next.removed(), [(1, "a")]);
        assert_eq!(next.len(), 3);
    }

    #[test]
    fn test_mode_agreement() {
        // A chain of incremental updates must land on the same state as a
        // single whole-state diff to the final snapshot.
        let start = KeyedTable::new().apply(vec![(1, "a"), (2, "b")], vec![], vec![], key_of);

        let step1 = start.apply(vec![(3, "c")], vec![], vec![(1, "a")], key_of);
        let step2 = step1.apply(
            vec![],
            vec![Change::new((2, "b"), (2, "z"))],
            vec![],
            key_of,
        );

        let direct = start.diff_states(vec![(2, "z"), (3, "c")], key_of);
        assert_eq!(step2.state(), direct.state());
    }

    #[test]
    fn test_apply_checked_rejects_inconsistent_deltas() {
        let base = KeyedTable::new().apply(vec![(1, "a")], vec![], vec![], key_of);

        let dup = base.apply_checked(vec![(1, "again")], vec![], vec![], key_of);
        assert_eq!(dup.unwrap_err(), TableError::DuplicateAdd { key: "1".into() });

        let gone = base.apply_checked(vec![], vec![], vec![(9, "nope")], key_of);
        assert_eq!(gone.unwrap_err(), TableError::MissingRemove { key: "9".into() });

        let missing = base.apply_checked(
            vec![],
            vec![Change::new((5, "old"), (5, "new"))],
            vec![],
            key_of,
        );
        assert_eq!(
            missing.unwrap_err(),
            TableError::MissingChange { key: "5".into() }
        );
    }

    #[test]
    fn test_filtered_update_rederives_delta() {
        let even: TablePredicate<Entry> = Rc::new(|entry: &Entry| entry.0 % 2 == 0);

        // Unfiltered source holds 1..=4; filtered table holds 2 and 4.
        let filtered = KeyedTable::new().apply(vec![(2, "b"), (4, "d")], vec![], vec![], key_of);

        // Raw delta: add 5 (odd, dropped) and 6 (even, kept); change 2
        // (stays in); remove 4 (was in the filtered table).
        let next = filtered_update(
            &filtered,
            &[(5, "e"), (6, "f")],
            &[Change::new((2, "b"), (2, "B"))],
            &[(4, "d")],
            &even,
            key_of,
        );

        assert_eq!(next.added(), [(6, "f")]);
        assert_eq!(next.changed(), [Change::new((2, "b"), (2, "B"))]);
        assert_eq!(next.removed(), [(4, "d")]);
        assert_eq!(next.len(), 2);
        assert!(next.contains_key(&6) && next.contains_key(&2));
    }

    #[test]
    fn test_filtered_update_membership_crossing() {
        // Predicate over the value: only short labels pass.
        let short: TablePredicate<Entry> = Rc::new(|entry: &Entry| entry.1.len() <= 1);

        let filtered = KeyedTable::new().apply(vec![(1, "a")], vec![], vec![], key_of);

        // Key 1 grows a long label (exits); key 2 shrinks to a short one
        // (enters, was never in the filtered table).
        let next = filtered_update(
            &filtered,
            &[],
            &[
                Change::new((1, "a"), (1, "long")),
                Change::new((2, "long"), (2, "b")),
            ],
            &[],
            &short,
            key_of,
        );

        assert_eq!(next.added(), [(2, "b")]);
        assert!(next.changed().is_empty());
        assert_eq!(next.removed(), [(1, "a")]);
    }

    #[test]
    fn test_predicate_changed_reclassifies_membership() {
        let baseline = KeyedTable::new().apply(
            vec![(1, "a"), (2, "b"), (3, "c"), (4, "d")],
            vec![],
            vec![],
            key_of,
        );
        let even: TablePredicate<Entry> = Rc::new(|entry: &Entry| entry.0 % 2 == 0);
        let odd: TablePredicate<Entry> = Rc::new(|entry: &Entry| entry.0 % 2 == 1);

        let filtered = KeyedTable::new().apply(vec![(2, "b"), (4, "d")], vec![], vec![], key_of);

        let swapped = predicate_changed(&filtered, &baseline, &even, &odd, key_of);
        assert_eq!(sorted(swapped.added()), [(1, "a"), (3, "c")]);
        assert_eq!(sorted(swapped.removed()), [(2, "b"), (4, "d")]);
        assert!(swapped.contains_key(&1) && swapped.contains_key(&3));
        assert_eq!(swapped.len(), 2);
    }

    #[test]
    fn test_predicate_changed_same_rc_is_noop() {
        let baseline = KeyedTable::new().apply(vec![(1, "a")], vec![], vec![], key_of);
        let filtered = KeyedTable::new().apply(vec![(1, "a")], vec![], vec![], key_of);
        let pred: TablePredicate<Entry> = Rc::new(|_| true);

        let result = predicate_changed(&filtered, &baseline, &pred, &pred, key_of);
        assert!(!result.has_changes());
        assert_eq!(result.state(), filtered.state());
    }

    #[test]
    fn test_builder_accumulates_and_cancels() {
        let base = KeyedTable::new().apply(vec![(1, "a"), (2, "b")], vec![], vec![], key_of);

        let mut builder = TableBuilder::new(&base);
        builder.add_or_update(3, (3, "c")); // fresh add
        builder.add_or_update(1, (1, "A")); // change over baseline
        builder.add_or_update(4, (4, "d"));
        builder.remove(4); // cancels the pending add entirely
        builder.remove(2); // genuine removal

        let table = builder.build();
        assert_eq!(table.added(), [(3, "c")]);
        assert_eq!(table.changed(), [Change::new((1, "a"), (1, "A"))]);
        assert_eq!(table.removed(), [(2, "b")]);
        assert_eq!(table.len(), 2);
        assert!(!table.contains_key(&4));
    }

    #[test]
    fn test_builder_dedup_drops_noop_changes() {
        let base = KeyedTable::new().apply(vec![(1, "a")], vec![], vec![], key_of);

        let mut builder = TableBuilder::new(&base);
        builder.add_or_update(1, (1, "a")); // same value

        let table = builder.build_dedup(|old, new| old == new);
        assert!(!table.has_changes());
        assert_eq!(table.get(&1), Some(&(1, "a")));
    }

    #[test]
    fn test_builder_merge_folds_foreign_delta() {
        let base = KeyedTable::new().apply(vec![(1, "a"), (2, "b")], vec![], vec![], key_of);

        // A delta computed elsewhere: add 3, change 1, remove 2.
        let foreign = base.apply(
            vec![(3, "c")],
            vec![Change::new((1, "a"), (1, "z"))],
            vec![(2, "b")],
            key_of,
        );

        let mut builder = TableBuilder::new(&base);
        builder.merge(&foreign, key_of);
        let table = builder.build();

        assert_eq!(table.state(), foreign.state());
        assert_eq!(table.added(), [(3, "c")]);
        assert_eq!(table.changed(), [Change::new((1, "a"), (1, "z"))]);
        assert_eq!(table.removed(), [(2, "b")]);
    }

    #[test]
    fn test_clear_and_is_empty() {
        let base = KeyedTable::new();
        let mut builder = TableBuilder::new(&base);
        assert!(builder.is_empty());
        builder.add_or_update(1, (1, "a"));
        assert!(!builder.is_empty());
        builder.clear();
        assert!(builder.is_empty());
        assert!(!builder.build().has_changes());
    }

    #[test]
    fn test_snapshots_are_persistent() {
        let first = KeyedTable::new().apply(vec![(1, "a")], vec![], vec![], key_of);
        let second = first.apply(vec![(2, "b")], vec![], vec![], key_of);

        // The earlier snapshot is untouched by the later update.
        assert_eq!(first.len(), 1);
        assert!(!first.contains_key(&2));
        assert_eq!(second.len(), 2);
    }
}
