//! Pure algorithms for sequence reconciliation.
//!
//! - `myers`: shortest-edit-script diff (middle-snake divide and conquer)

mod myers;

pub use myers::{diff, diff_by_key, EditItem};
