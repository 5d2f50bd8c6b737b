//! Structural event counters.

use core::fmt;

/// Counts of the structural changes a [`BPlusTree`](crate::BPlusTree) has made.
///
/// The tree updates these in place as it splits and rebalances nodes; callers get a
/// copy from [`BPlusTree::stats`](crate::BPlusTree::stats).
///
/// # Examples
///
/// ```
/// use bplus_index::{BPlusTree, Order};
///
/// let mut tree = BPlusTree::with_order(Order::new(4).unwrap());
/// for key in 1..=4 {
///     tree.insert(key, ());
/// }
///
/// let stats = tree.stats();
/// assert_eq!(stats.leaf_splits, 1);
/// assert_eq!(stats.root_grows, 1);
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct Stats {
    /// Leaves split because an insert overflowed them.
    pub leaf_splits: u64,
    /// Internal nodes split because a promotion overflowed them.
    pub internal_splits: u64,
    /// New roots created above a split root.
    pub root_grows: u64,
    /// Sibling pairs merged after an underflow.
    pub merges: u64,
    /// Entries moved between siblings after an underflow.
    pub borrows: u64,
    /// Roots discarded because they were left with a single child.
    pub root_shrinks: u64,
}

impl Stats {
    /// Total number of splits at any level.
    #[must_use]
    pub const fn splits(&self) -> u64 {
        self.leaf_splits + self.internal_splits
    }

    /// Total number of underflow repairs.
    #[must_use]
    pub const fn rebalances(&self) -> u64 {
        self.merges + self.borrows
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Stats {{ splits: {} ({} leaf, {} internal), merges: {}, borrows: {}, root grows: {}, root shrinks: {} }}",
            self.splits(),
            self.leaf_splits,
            self.internal_splits,
            self.merges,
            self.borrows,
            self.root_grows,
            self.root_shrinks
        )
    }
}
