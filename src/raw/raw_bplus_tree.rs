use core::fmt;
use core::ops::Bound;

use super::arena::Arena;
use super::handle::Handle;
use super::node::{LeafNode, Node};
use crate::order::Order;
use crate::stats::Stats;

/// The core B+Tree implementation backing `BPlusTree`.
///
/// Nodes live in an arena and refer to each other by [`Handle`]: internal nodes own
/// their children, every node except the root names its parent, and every leaf names
/// the leaf that follows it in key order.
pub(crate) struct RawBPlusTree<K, V> {
    /// Arena storing all tree nodes; payloads are stored inline in leaves.
    pub(super) nodes: Arena<Node<K, V>>,
    /// Handle to the root node, `None` until the first insertion.
    pub(super) root: Option<Handle>,
    /// Fan-out of every node.
    pub(super) order: Order,
    /// Total number of entries in the tree.
    pub(super) len: usize,
    /// Structural event counters.
    pub(super) stats: Stats,
}

impl<K, V> RawBPlusTree<K, V> {
    /// Creates a new tree with no root.
    pub(crate) const fn new(order: Order) -> Self {
        Self {
            nodes: Arena::new(),
            root: None,
            order,
            len: 0,
            stats: Stats {
                leaf_splits: 0,
                internal_splits: 0,
                root_grows: 0,
                merges: 0,
                borrows: 0,
                root_shrinks: 0,
            },
        }
    }

    pub(crate) const fn order(&self) -> Order {
        self.order
    }

    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    pub(crate) const fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub(crate) const fn stats(&self) -> Stats {
        self.stats
    }

    pub(crate) fn reset_stats(&mut self) {
        self.stats = Stats::default();
    }

    /// Number of live nodes.
    pub(crate) const fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Drops every node and returns to the rootless state. Counters are kept.
    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
        self.len = 0;
    }

    pub(crate) fn node(&self, handle: Handle) -> &Node<K, V> {
        self.nodes.get(handle)
    }

    pub(super) fn set_parent(&mut self, handle: Handle, parent: Option<Handle>) {
        self.nodes.get_mut(handle).set_parent(parent);
    }

    /// Number of levels from the root down to the leaves; 0 for a rootless tree.
    pub(crate) fn height(&self) -> usize {
        let Some(mut current) = self.root else {
            return 0;
        };
        let mut height = 1;
        while let Node::Internal(internal) = self.nodes.get(current) {
            current = internal.child(0);
            height += 1;
        }
        height
    }

    /// Descends along the first child of every level.
    pub(crate) fn leftmost_leaf(&self) -> Option<Handle> {
        let mut current = self.root?;
        while let Node::Internal(internal) = self.nodes.get(current) {
            current = internal.child(0);
        }
        Some(current)
    }

    /// Descends along the last child of every level.
    pub(crate) fn rightmost_leaf(&self) -> Option<Handle> {
        let mut current = self.root?;
        while let Node::Internal(internal) = self.nodes.get(current) {
            current = internal.child(internal.child_count() - 1);
        }
        Some(current)
    }

    pub(crate) fn first_key_value(&self) -> Option<(&K, &V)> {
        let leaf = self.nodes.get(self.leftmost_leaf()?).as_leaf();
        if leaf.key_count() == 0 {
            return None;
        }
        Some((leaf.key(0), leaf.value(0)))
    }

    pub(crate) fn last_key_value(&self) -> Option<(&K, &V)> {
        let leaf = self.nodes.get(self.rightmost_leaf()?).as_leaf();
        let last = leaf.key_count().checked_sub(1)?;
        Some((leaf.key(last), leaf.value(last)))
    }
}

impl<K: Ord, V> RawBPlusTree<K, V> {
    /// Descends from `start` to the leaf that would hold `key`.
    ///
    /// At each internal node the first child whose separator is greater than `key` is
    /// taken, so keys equal to a separator go right.
    pub(crate) fn find_leaf(&self, start: Handle, key: &K) -> Handle {
        let mut current = start;
        while let Node::Internal(internal) = self.nodes.get(current) {
            current = internal.child(internal.route(key));
        }
        current
    }

    /// Descends from `start` to the leftmost leaf that may hold `key`.
    ///
    /// Equal keys can sit on both sides of a separator after a split, so searches for
    /// the first occurrence go left on a tie and walk the leaf chain from there.
    pub(crate) fn find_leaf_lower(&self, start: Handle, key: &K) -> Handle {
        let mut current = start;
        while let Node::Internal(internal) = self.nodes.get(current) {
            current = internal.child(internal.route_lower(key));
        }
        current
    }

    /// Finds the first occurrence of `key` in scan order.
    pub(crate) fn locate(&self, key: &K) -> Option<(Handle, usize)> {
        let mut handle = self.find_leaf_lower(self.root?, key);
        loop {
            let leaf = self.nodes.get(handle).as_leaf();
            let index = leaf.lower_bound(key);
            if index < leaf.key_count() {
                return (leaf.key(index) == key).then_some((handle, index));
            }
            handle = leaf.next()?;
        }
    }

    pub(crate) fn get(&self, key: &K) -> Option<&V> {
        let (handle, index) = self.locate(key)?;
        Some(self.nodes.get(handle).as_leaf().value(index))
    }

    /// Position of the first entry at or after `start`.
    ///
    /// The returned index may equal the leaf's key count, meaning "continue with the
    /// next leaf".
    pub(crate) fn seek(&self, start: Bound<&K>) -> Option<(Handle, usize)> {
        let root = self.root?;
        let position = match start {
            Bound::Unbounded => (self.leftmost_leaf()?, 0),
            Bound::Included(key) => {
                let handle = self.find_leaf_lower(root, key);
                (handle, self.nodes.get(handle).as_leaf().lower_bound(key))
            }
            Bound::Excluded(key) => {
                let handle = self.find_leaf(root, key);
                (handle, self.nodes.get(handle).as_leaf().upper_bound(key))
            }
        };
        Some(position)
    }
}

impl<K: fmt::Display, V> RawBPlusTree<K, V> {
    /// Writes the bracketed structural dump of the tree.
    pub(crate) fn render(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.root {
            Some(root) => self.render_node(root, f),
            None => f.write_str("[]"),
        }
    }

    fn render_node(&self, handle: Handle, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        match self.nodes.get(handle) {
            Node::Leaf(leaf) => render_leaf(leaf, f)?,
            Node::Internal(internal) => {
                for (index, key) in internal.keys().iter().enumerate() {
                    self.render_node(internal.child(index), f)?;
                    write!(f, "{key}")?;
                }
                self.render_node(internal.child(internal.key_count()), f)?;
            }
        }
        f.write_str("]")
    }
}

fn render_leaf<K: fmt::Display, V>(leaf: &LeafNode<K, V>, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (index, key) in leaf.keys().iter().enumerate() {
        if index > 0 {
            f.write_str(" ")?;
        }
        write!(f, "{key}")?;
    }
    Ok(())
}
