//! Insertion: sorted placement, leaf splits and promotion toward the root.

use smallvec::smallvec;

use super::handle::Handle;
use super::node::{Children, InternalNode, Keys, LeafNode, Node, Values};
use super::raw_bplus_tree::RawBPlusTree;

/// A full leaf's entries plus the entry that did not fit.
///
/// Lives only for the duration of one split.
struct LeafOverflow<K, V> {
    keys: Keys<K>,
    values: Values<V>,
}

impl<K: Ord, V> LeafOverflow<K, V> {
    /// Moves every entry out of `leaf`, leaving it empty.
    fn drain(leaf: &mut LeafNode<K, V>) -> Self {
        let (keys, values) = leaf.take_all();
        Self { keys, values }
    }

    fn insert(&mut self, key: K, value: V) {
        let index = self.keys.partition_point(|k| *k <= key);
        self.keys.insert(index, key);
        self.values.insert(index, value);
    }

    /// Splits into `[0, at)` and `[at, len)`.
    fn split(mut self, at: usize) -> (Self, Self) {
        let right = Self {
            keys: self.keys.drain(at..).collect(),
            values: self.values.drain(at..).collect(),
        };
        (self, right)
    }
}

/// A full internal node's keys and children plus the promoted pair that did not fit.
struct InternalOverflow<K> {
    keys: Keys<K>,
    children: Children,
}

impl<K> InternalOverflow<K> {
    /// Moves every key and child out of `node`, leaving it empty.
    fn drain(node: &mut InternalNode<K>) -> Self {
        let (keys, children) = node.take_all();
        Self { keys, children }
    }

    /// Inserts `key` and `child` right after the child at `position`.
    fn insert_after(&mut self, position: usize, key: K, child: Handle) {
        self.keys.insert(position, key);
        self.children.insert(position + 1, child);
    }

    /// Splits around the key at `at`, which belongs to neither half.
    ///
    /// The left half keeps keys `[0, at)` and children `[0, at]`; the right half gets
    /// keys `(at, len)` and children `(at, len]`.
    fn split(mut self, at: usize) -> (Self, K, Self) {
        let right = Self {
            keys: self.keys.drain(at + 1..).collect(),
            children: self.children.drain(at + 1..).collect(),
        };
        let middle = self.keys.pop().expect("split point lies inside the overflow buffer");
        (self, middle, right)
    }
}

impl<K: Ord + Copy, V> RawBPlusTree<K, V> {
    /// Inserts an entry. An existing equal key is kept and the new entry goes after it.
    pub(crate) fn insert(&mut self, key: K, value: V) {
        let leaf_handle = match self.root {
            Some(root) => self.find_leaf(root, &key),
            None => {
                let handle = self.nodes.alloc(Node::Leaf(LeafNode::new(None)));
                self.root = Some(handle);
                handle
            }
        };
        self.len += 1;

        let max_keys = self.order.max_keys();
        let leaf = self.nodes.get_mut(leaf_handle).as_leaf_mut();
        if leaf.key_count() < max_keys {
            let index = leaf.insert_position(&key);
            leaf.insert(index, key, value);
            return;
        }

        self.split_leaf(leaf_handle, key, value);
    }

    /// Splits a full leaf around the incoming entry and promotes the new sibling.
    fn split_leaf(&mut self, leaf_handle: Handle, key: K, value: V) {
        let split_index = self.order.leaf_split_index();
        let leaf = self.nodes.get_mut(leaf_handle).as_leaf_mut();

        let mut overflow = LeafOverflow::drain(leaf);
        overflow.insert(key, value);
        let (left, right) = overflow.split(split_index);

        leaf.set_all(left.keys, left.values);
        let parent = self.nodes.get(leaf_handle).parent();
        let old_next = self.nodes.get(leaf_handle).as_leaf().next();

        let separator = right.keys[0];
        let mut sibling = LeafNode::new(parent);
        sibling.set_all(right.keys, right.values);
        sibling.set_next(old_next);
        let sibling_handle = self.nodes.alloc(Node::Leaf(sibling));

        // Splice the sibling into the chain right after the original leaf.
        self.nodes.get_mut(leaf_handle).as_leaf_mut().set_next(Some(sibling_handle));
        self.stats.leaf_splits += 1;

        self.promote(leaf_handle, separator, sibling_handle);
    }

    /// Inserts `key` and `sibling` into the parent of `original`, splitting full
    /// internal nodes up to the root as needed.
    fn promote(&mut self, mut original: Handle, mut key: K, mut sibling: Handle) {
        let max_keys = self.order.max_keys();
        let split_index = self.order.internal_split_index();

        loop {
            let Some(parent_handle) = self.nodes.get(original).parent() else {
                self.grow_root(original, key, sibling);
                return;
            };

            let parent = self.nodes.get_mut(parent_handle).as_internal_mut();
            let position = parent.position_of(original);

            if parent.key_count() < max_keys {
                parent.insert_child(position, key, sibling);
                self.set_parent(sibling, Some(parent_handle));
                return;
            }

            let mut overflow = InternalOverflow::drain(parent);
            overflow.insert_after(position, key, sibling);
            let (left, middle, right) = overflow.split(split_index);
            parent.set_all(left.keys, left.children);
            let grandparent = parent.parent();

            let moved = right.children.clone();
            let new_internal = self
                .nodes
                .alloc(Node::Internal(InternalNode::from_parts(grandparent, right.keys, right.children)));

            // The new sibling may have landed in either half.
            self.set_parent(sibling, Some(parent_handle));
            for child in moved {
                self.set_parent(child, Some(new_internal));
            }
            self.stats.internal_splits += 1;

            original = parent_handle;
            key = middle;
            sibling = new_internal;
        }
    }

    /// Puts a new internal root above the old root and its split-off sibling.
    fn grow_root(&mut self, old_root: Handle, key: K, sibling: Handle) {
        debug_assert_eq!(self.root, Some(old_root), "only the root has no parent");

        let children: Children = smallvec![old_root, sibling];
        let root = InternalNode::from_parts(None, smallvec![key], children);
        let root_handle = self.nodes.alloc(Node::Internal(root));

        self.set_parent(old_root, Some(root_handle));
        self.set_parent(sibling, Some(root_handle));
        self.root = Some(root_handle);
        self.stats.root_grows += 1;
    }
}
