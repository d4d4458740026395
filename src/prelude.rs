//! Prelude module for common imports.
//!
//! ```ignore
//! use syncview::prelude::*;
//! ```

// Algorithms
pub use crate::algo::{diff, diff_by_key, EditItem};

// Patching
pub use crate::patch::{sync_cleared, sync_with, sync_with_by_key, ListMut};

// Keyed tables
pub use crate::table::{
    filtered_update, predicate_changed, Change, KeyedTable, TableBuilder, TablePredicate,
};

// Observable collections
pub use crate::observe::{ChangeMask, ListEvent, ObservableList, Subscription};

// Filtered views
pub use crate::filter::{DeferGuard, FilteredView};

// Shared handles
pub use crate::shared::SharedTable;

// Errors
pub use crate::error::{TableError, TableResult};
