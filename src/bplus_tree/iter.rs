use core::fmt;
use core::iter::FusedIterator;
use core::ops::Bound;

use crate::raw::{Handle, RawBPlusTree};

/// A position on the leaf level.
///
/// `index` may run past the end of `leaf`; the next read then moves along the chain.
pub(super) struct Cursor<'a, K, V> {
    raw: &'a RawBPlusTree<K, V>,
    leaf: Option<Handle>,
    index: usize,
}

impl<'a, K, V> Cursor<'a, K, V> {
    pub(super) const fn new(raw: &'a RawBPlusTree<K, V>, leaf: Option<Handle>, index: usize) -> Self {
        Self { raw, leaf, index }
    }

    fn next_entry(&mut self) -> Option<(&'a K, &'a V)> {
        loop {
            let leaf = self.raw.node(self.leaf?).as_leaf();
            if self.index < leaf.key_count() {
                let entry = (leaf.key(self.index), leaf.value(self.index));
                self.index += 1;
                return Some(entry);
            }
            // Emptied root leaves and exhausted leaves both fall through to the next link.
            self.leaf = leaf.next();
            self.index = 0;
        }
    }

    fn finish(&mut self) {
        self.leaf = None;
    }
}

impl<K, V> Clone for Cursor<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            raw: self.raw,
            leaf: self.leaf,
            index: self.index,
        }
    }
}

/// An iterator over the entries of a `BPlusTree`.
///
/// This `struct` is created by the [`iter`] method on [`BPlusTree`]. See its
/// documentation for more.
///
/// # Examples
///
/// ```
/// use bplus_index::BPlusTree;
///
/// let index: BPlusTree<_, _> = [(1, "a"), (2, "b")].into_iter().collect();
/// let mut iter = index.iter();
/// assert_eq!(iter.next(), Some((&1, &"a")));
/// assert_eq!(iter.next(), Some((&2, &"b")));
/// assert_eq!(iter.next(), None);
/// ```
///
/// [`iter`]: crate::BPlusTree::iter
/// [`BPlusTree`]: crate::BPlusTree
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, K, V> {
    cursor: Cursor<'a, K, V>,
    remaining: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    pub(super) const fn new(cursor: Cursor<'a, K, V>, remaining: usize) -> Self {
        Self { cursor, remaining }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let entry = self.cursor.next_entry()?;
        self.remaining -= 1;
        Some(entry)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            cursor: self.cursor.clone(),
            remaining: self.remaining,
        }
    }
}

impl<K, V> fmt::Debug for Iter<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Iter").field("remaining", &self.remaining).finish()
    }
}

/// An iterator over a sub-range of the entries of a `BPlusTree`.
///
/// This `struct` is created by the [`range`] and [`scan_range`] methods on [`BPlusTree`].
///
/// [`range`]: crate::BPlusTree::range
/// [`scan_range`]: crate::BPlusTree::scan_range
/// [`BPlusTree`]: crate::BPlusTree
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Range<'a, K, V> {
    cursor: Cursor<'a, K, V>,
    end: Bound<K>,
}

impl<'a, K, V> Range<'a, K, V> {
    pub(super) const fn new(cursor: Cursor<'a, K, V>, end: Bound<K>) -> Self {
        Self { cursor, end }
    }
}

impl<'a, K: Ord, V> Iterator for Range<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let (key, value) = self.cursor.next_entry()?;
        let past_end = match &self.end {
            Bound::Included(end) => key > end,
            Bound::Excluded(end) => key >= end,
            Bound::Unbounded => false,
        };
        if past_end {
            self.cursor.finish();
            return None;
        }
        Some((key, value))
    }
}

impl<K: Ord, V> FusedIterator for Range<'_, K, V> {}

impl<K: Clone, V> Clone for Range<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            cursor: self.cursor.clone(),
            end: self.end.clone(),
        }
    }
}

impl<K: fmt::Debug, V> fmt::Debug for Range<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Range").field("end", &self.end).finish_non_exhaustive()
    }
}

/// An iterator over the keys of a `BPlusTree`.
///
/// This `struct` is created by the [`keys`](crate::BPlusTree::keys) method.
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Keys<'a, K, V> {
    pub(super) const fn new(inner: Iter<'a, K, V>) -> Self {
        Self { inner }
    }
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V> FusedIterator for Keys<'_, K, V> {}

impl<K, V> Clone for Keys<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<K, V> fmt::Debug for Keys<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keys").field("remaining", &self.inner.remaining).finish()
    }
}

/// An iterator over the values of a `BPlusTree`.
///
/// This `struct` is created by the [`values`](crate::BPlusTree::values) method.
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Values<'a, K, V> {
    pub(super) const fn new(inner: Iter<'a, K, V>) -> Self {
        Self { inner }
    }
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V> FusedIterator for Values<'_, K, V> {}

impl<K, V> Clone for Values<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<K, V> fmt::Debug for Values<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Values").field("remaining", &self.inner.remaining).finish()
    }
}
