//! syncview - Diff-and-Reconcile Engine for Live Collections
//!
//! Keeps live, observable collections and keyed table views synchronized
//! with minimal mutation while preserving element identity. The engine is
//! deliberately UI-agnostic: it operates on abstract ordered sequences and
//! keyed maps, and the consumer (a grid syncing its visible columns, a
//! selection model, a query result cache) supplies the collections.
//!
//! ## Core Concepts
//!
//! - **Edit scripts** ([`algo::diff`]): Myers shortest-edit-script diff
//!   between two ordered sequences, as grouped replace/insert/delete
//!   regions.
//! - **Patching** ([`patch::sync_with`]): applies an edit script to a live
//!   mutable list with the fewest insert/remove operations; untouched
//!   elements keep their slots, so identity-bound state (selection,
//!   animation) survives the resync.
//! - **Keyed tables** ([`table::KeyedTable`]): immutable snapshots of a
//!   keyed collection plus the added/changed/removed delta that produced
//!   each one, with incremental and whole-state-diff update modes, filter
//!   re-derivation, and a batching builder.
//! - **Filtered views** ([`filter::FilteredView`]): a derived observable
//!   collection equal to a source filtered by a swappable predicate, in
//!   source order, with a single-item fast path for in-place updates.
//!
//! ## Modules
//! - `algo`: diff algorithms
//! - `patch`: edit-script application to live lists
//! - `table`: keyed incremental tables and builders
//! - `observe`: observable list and change events
//! - `filter`: filtered derived views
//! - `shared`: thread-safe table timeline handles
//!
//! ## Usage
//!
//! ```
//! use syncview::observe::ObservableList;
//! use syncview::filter::FilteredView;
//!
//! let mut numbers = ObservableList::from_items(vec![1u32, 2, 3, 4, 5]);
//! let evens = FilteredView::new(&mut numbers, |n| n % 2 == 0);
//! assert_eq!(evens.snapshot(), [2, 4]);
//!
//! numbers.push(6);
//! assert_eq!(evens.snapshot(), [2, 4, 6]);
//! ```
//!
//! All components assume a single logical writer (the thread or actor that
//! owns a collection's mutation stream); [`table::KeyedTable`] snapshots
//! are immutable and may be read from anywhere.

// =============================================================================
// Core modules
// =============================================================================

/// Algorithms: shortest-edit-script diff
pub mod algo;

/// Edit-script application to live mutable lists
pub mod patch;

/// Keyed incremental tables
pub mod table;

/// Observable ordered collections and change events
pub mod observe;

/// Filtered derived views
pub mod filter;

/// Thread-safe table timeline handles
pub mod shared;

/// Error types
pub mod error;

/// Prelude for common imports
pub mod prelude;

// =============================================================================
// Re-exports
// =============================================================================

// Algorithms
pub use algo::{diff, diff_by_key, EditItem};

// Patching
pub use patch::{sync_cleared, sync_with, sync_with_by_key, ListMut};

// Keyed tables
pub use table::{
    filtered_update, predicate_changed, Change, KeyedTable, TableBuilder, TablePredicate,
};

// Observable collections
pub use observe::{ChangeMask, ListEvent, ObservableList, Subscription};

// Filtered views
pub use filter::{DeferGuard, FilteredView};

// Shared handles
pub use shared::SharedTable;

// Errors
pub use error::{TableError, TableResult};
