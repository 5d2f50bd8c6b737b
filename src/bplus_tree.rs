use core::fmt;
use core::ops::RangeBounds;

use crate::error::Result;
use crate::order::Order;
use crate::raw::RawBPlusTree;
use crate::stats::Stats;

mod iter;

pub use iter::{Iter, Keys, Range, Values};
use iter::Cursor;

/// An ordered index based on a [B+ Tree].
///
/// Entries live only in the leaves, and the leaves are linked in ascending key order so
/// that full and bounded scans walk the bottom level without revisiting internal nodes.
/// Every internal node holds at most [`Order::get`] children and every non-root node stays
/// at least half full, which keeps all leaves at the same depth.
///
/// The tree is a multimap: inserting a key that is already present adds another entry
/// after the existing ones. [`get`](Self::get) and [`delete`](Self::delete) act on the
/// first occurrence in scan order.
///
/// Nodes are kept in an arena and refer to each other by index, so the structure owns
/// all of its memory and hands freed node slots to later insertions.
///
/// # Examples
///
/// ```
/// use bplus_index::BPlusTree;
///
/// let mut index = BPlusTree::new();
/// for key in [30, 10, 50, 20, 40] {
///     index.insert(key, key * 100);
/// }
///
/// assert_eq!(index.get(&20), Some(&2000));
/// assert_eq!(index.len(), 5);
///
/// let keys: Vec<_> = index.scan_range(20, 40).map(|(k, _)| *k).collect();
/// assert_eq!(keys, [20, 30, 40]);
///
/// assert_eq!(index.delete(&10), Some(1000));
/// assert_eq!(index.delete(&10), None);
/// ```
///
/// [B+ Tree]: https://en.wikipedia.org/wiki/B%2B_tree
pub struct BPlusTree<K, V> {
    raw: RawBPlusTree<K, V>,
}

impl<K, V> BPlusTree<K, V> {
    /// Makes a new, empty tree of [`Order::DEFAULT`].
    ///
    /// Does not allocate anything on its own; the root leaf is created by the first
    /// insertion.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplus_index::BPlusTree;
    ///
    /// let mut index = BPlusTree::new();
    /// index.insert(1, "a");
    /// ```
    #[must_use]
    pub const fn new() -> Self {
        Self::with_order(Order::DEFAULT)
    }

    /// Makes a new, empty tree with the given fan-out.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplus_index::{BPlusTree, Order};
    ///
    /// let index: BPlusTree<u64, ()> = BPlusTree::with_order(Order::new(32)?);
    /// assert_eq!(index.order().get(), 32);
    /// # Ok::<(), bplus_index::Error>(())
    /// ```
    #[must_use]
    pub const fn with_order(order: Order) -> Self {
        Self {
            raw: RawBPlusTree::new(order),
        }
    }

    /// Returns the fan-out this tree was built with.
    #[must_use]
    pub const fn order(&self) -> Order {
        self.raw.order()
    }

    /// Returns the number of entries, counting every duplicate.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns `true` if the tree holds no entries.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Returns the number of levels, counting the leaf level.
    ///
    /// A tree that has never held an entry, or was [`clear`](Self::clear)ed, has height 0.
    /// A tree emptied by deletions keeps an empty root leaf and has height 1.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplus_index::BPlusTree;
    ///
    /// let mut index = BPlusTree::new();
    /// assert_eq!(index.height(), 0);
    /// index.extend((1..=4).map(|k| (k, ())));
    /// assert_eq!(index.height(), 2);
    /// ```
    #[must_use]
    pub fn height(&self) -> usize {
        self.raw.height()
    }

    /// Returns a snapshot of the structural event counters.
    #[must_use]
    pub const fn stats(&self) -> Stats {
        self.raw.stats()
    }

    /// Zeroes the structural event counters.
    pub fn reset_stats(&mut self) {
        self.raw.reset_stats();
    }

    /// Removes every entry and frees every node.
    ///
    /// The counters in [`stats`](Self::stats) are kept.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplus_index::BPlusTree;
    ///
    /// let mut index: BPlusTree<_, _> = (0..100).map(|k| (k, k)).collect();
    /// index.clear();
    /// assert!(index.is_empty());
    /// assert_eq!(index.height(), 0);
    /// ```
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Returns the entry with the smallest key.
    #[must_use]
    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        self.raw.first_key_value()
    }

    /// Returns the last entry in scan order, whose key is the largest.
    #[must_use]
    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        self.raw.last_key_value()
    }

    /// Gets an iterator over every entry in ascending key order.
    ///
    /// Entries with equal keys come out in the order they were inserted.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplus_index::BPlusTree;
    ///
    /// let mut index = BPlusTree::new();
    /// index.insert(2, "b");
    /// index.insert(1, "a");
    /// index.insert(2, "c");
    ///
    /// let entries: Vec<_> = index.iter().collect();
    /// assert_eq!(entries, [(&1, &"a"), (&2, &"b"), (&2, &"c")]);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n) to find the leftmost leaf; O(1) amortized per step via the leaf chain.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(Cursor::new(&self.raw, self.raw.leftmost_leaf(), 0), self.raw.len())
    }

    /// Same as [`iter`](Self::iter). Each call starts a fresh scan.
    pub fn scan_all(&self) -> Iter<'_, K, V> {
        self.iter()
    }

    /// Gets an iterator over the keys, in ascending order.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys::new(self.iter())
    }

    /// Gets an iterator over the values, in ascending key order.
    pub fn values(&self) -> Values<'_, K, V> {
        Values::new(self.iter())
    }
}

impl<K: Ord + Copy, V> BPlusTree<K, V> {
    /// Inserts an entry.
    ///
    /// A key that is already present is not replaced: the new entry is placed after every
    /// existing entry with the same key.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplus_index::BPlusTree;
    ///
    /// let mut index = BPlusTree::new();
    /// index.insert(7, "first");
    /// index.insert(7, "second");
    /// assert_eq!(index.len(), 2);
    /// assert_eq!(index.get(&7), Some(&"first"));
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if the tree would need more nodes than its node arena can address.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn insert(&mut self, key: K, value: V) {
        self.raw.insert(key, value);
    }

    /// Removes the first entry with `key` and returns its value.
    ///
    /// Returns `None` and leaves the tree unchanged if `key` is absent.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplus_index::BPlusTree;
    ///
    /// let mut index = BPlusTree::new();
    /// index.insert(1, "a");
    /// assert_eq!(index.delete(&1), Some("a"));
    /// assert_eq!(index.delete(&1), None);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn delete(&mut self, key: &K) -> Option<V> {
        self.raw.delete(key)
    }

    /// Returns the value of the first entry with `key`.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<&V> {
        self.raw.get(key)
    }

    /// Returns `true` if at least one entry has `key`.
    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        self.raw.locate(key).is_some()
    }

    /// Gets an iterator over the entries with `low <= key <= high`.
    ///
    /// An inverted range (`low > high`) yields nothing.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplus_index::BPlusTree;
    ///
    /// let index: BPlusTree<_, _> = [10, 20, 30, 40, 50].into_iter().map(|k| (k, ())).collect();
    /// let keys: Vec<_> = index.scan_range(20, 40).map(|(k, _)| *k).collect();
    /// assert_eq!(keys, [20, 30, 40]);
    /// assert_eq!(index.scan_range(40, 20).count(), 0);
    /// ```
    pub fn scan_range(&self, low: K, high: K) -> Range<'_, K, V> {
        self.range(low..=high)
    }

    /// Gets an iterator over the entries whose keys fall in `range`.
    ///
    /// The scan starts at the first qualifying entry and stops at the first key past the
    /// end bound, without visiting the rest of the leaf level.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::ops::Bound::{Excluded, Unbounded};
    /// use bplus_index::BPlusTree;
    ///
    /// let index: BPlusTree<_, _> = (1..=10).map(|k| (k, k * k)).collect();
    ///
    /// let squares: Vec<_> = index.range(3..6).map(|(_, v)| *v).collect();
    /// assert_eq!(squares, [9, 16, 25]);
    ///
    /// let tail: Vec<_> = index.range((Excluded(8), Unbounded)).map(|(k, _)| *k).collect();
    /// assert_eq!(tail, [9, 10]);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n) to find the start; O(1) amortized per step.
    pub fn range<R: RangeBounds<K>>(&self, range: R) -> Range<'_, K, V> {
        let (leaf, index) = self.raw.seek(range.start_bound()).unzip();
        Range::new(Cursor::new(&self.raw, leaf, index.unwrap_or(0)), range.end_bound().cloned())
    }
}

impl<K: Ord + fmt::Debug, V> BPlusTree<K, V> {
    /// Checks every structural invariant of the tree.
    ///
    /// Intended for tests and debugging; it visits every node.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Corrupt`](crate::Error::Corrupt) listing every violation found.
    pub fn validate(&self) -> Result<()> {
        self.raw.validate()
    }
}

impl<K: PartialEq, V: PartialEq> PartialEq for BPlusTree<K, V> {
    /// Trees are equal when they hold the same entries in the same order, whatever their
    /// order or shape.
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K: Eq, V: Eq> Eq for BPlusTree<K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for BPlusTree<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Writes the bracketed structural dump: each node in brackets, leaf keys separated by
/// spaces, internal nodes as children interleaved with their separators.
///
/// ```
/// use bplus_index::BPlusTree;
///
/// let mut index = BPlusTree::new();
/// assert_eq!(index.to_string(), "[]");
/// for key in 1..=4 {
///     index.insert(key, ());
/// }
/// assert_eq!(index.to_string(), "[[1 2]3[3 4]]");
/// ```
impl<K: fmt::Display, V> fmt::Display for BPlusTree<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.raw.render(f)
    }
}

impl<K, V> Default for BPlusTree<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord + Copy, V> FromIterator<(K, V)> for BPlusTree<K, V> {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

impl<K: Ord + Copy, V> Extend<(K, V)> for BPlusTree<K, V> {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<'a, K, V> IntoIterator for &'a BPlusTree<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}
