//! Deletion: entry removal, underflow repair by merge or redistribution, root shrinking.

use super::handle::Handle;
use super::node::Node;
use super::raw_bplus_tree::RawBPlusTree;

impl<K: Ord + Copy, V> RawBPlusTree<K, V> {
    /// Removes the first occurrence of `key` in scan order, returning its payload.
    ///
    /// An absent key leaves the tree untouched.
    pub(crate) fn delete(&mut self, key: &K) -> Option<V> {
        let (leaf, index) = self.locate(key)?;
        let (_, value) = self.nodes.get_mut(leaf).as_leaf_mut().remove(index);
        self.len -= 1;
        self.rebalance(leaf);
        Some(value)
    }

    /// Repairs `handle` after something was removed from it.
    fn rebalance(&mut self, handle: Handle) {
        let node = self.nodes.get(handle);
        let Some(parent_handle) = node.parent() else {
            if let Node::Internal(root) = node
                && root.key_count() == 0
            {
                let only_child = root.child(0);
                self.shrink_root(handle, only_child);
            }
            return;
        };

        if !node.underflows(self.order) {
            return;
        }

        // The leftmost child pairs with its right sibling, every other child with its left.
        let parent = self.nodes.get(parent_handle).as_internal();
        let position = parent.position_of(handle);
        let separator_index = position.saturating_sub(1);
        let left = parent.child(separator_index);
        let right = parent.child(separator_index + 1);

        if self.can_merge(left, right) {
            self.merge(parent_handle, separator_index, left, right);
        } else if position == 0 {
            self.borrow_from_right(parent_handle, separator_index, left, right);
        } else {
            self.borrow_from_left(parent_handle, separator_index, left, right);
        }
    }

    /// Replaces an internal root that lost its last key with its only child.
    fn shrink_root(&mut self, old_root: Handle, only_child: Handle) {
        self.nodes.free(old_root);
        self.set_parent(only_child, None);
        self.root = Some(only_child);
        self.stats.root_shrinks += 1;
    }

    fn can_merge(&self, left: Handle, right: Handle) -> bool {
        let order = self.order.get();
        match (self.nodes.get(left), self.nodes.get(right)) {
            (Node::Leaf(l), Node::Leaf(r)) => l.key_count() + r.key_count() < order,
            (Node::Internal(l), Node::Internal(r)) => {
                l.key_count() + r.key_count() < order && l.child_count() + r.child_count() <= order
            }
            _ => panic!("siblings {left} and {right} are at different depths"),
        }
    }

    /// Folds `right` into `left` and removes their separator from the parent.
    fn merge(&mut self, parent: Handle, separator_index: usize, left: Handle, right: Handle) {
        let (separator, unlinked) = self.nodes.get_mut(parent).as_internal_mut().remove_separator(separator_index);
        debug_assert_eq!(unlinked, right, "separator {separator_index} of {parent} does not lead to {right}");

        match self.nodes.take(right) {
            Node::Leaf(right_leaf) => {
                // `left` takes over `right`'s chain link, unlinking `right`.
                self.nodes.get_mut(left).as_leaf_mut().absorb(right_leaf);
            }
            Node::Internal(right_node) => {
                let moved = self.nodes.get_mut(left).as_internal_mut().absorb(separator, right_node);
                for child in moved {
                    self.set_parent(child, Some(left));
                }
            }
        }
        self.stats.merges += 1;

        // May underflow the parent in turn.
        self.rebalance(parent);
    }

    /// Moves the first entry of `right` to the end of `left`.
    fn borrow_from_right(&mut self, parent: Handle, separator_index: usize, left: Handle, right: Handle) {
        let separator = *self.nodes.get(parent).as_internal().key(separator_index);

        let new_separator = match self.nodes.get_mut(right) {
            Node::Leaf(lender) => {
                let (key, value) = lender.pop_front().expect("lending leaf has entries to spare");
                let new_separator = *lender.first_key().expect("lending leaf keeps its minimum");
                self.nodes.get_mut(left).as_leaf_mut().push(key, value);
                new_separator
            }
            Node::Internal(lender) => {
                let (child, key) = lender.pop_front().expect("lending node has children to spare");
                self.nodes.get_mut(left).as_internal_mut().push(separator, child);
                self.set_parent(child, Some(left));
                key
            }
        };

        self.nodes.get_mut(parent).as_internal_mut().set_key(separator_index, new_separator);
        self.stats.borrows += 1;
    }

    /// Moves the last entry of `left` to the front of `right`.
    fn borrow_from_left(&mut self, parent: Handle, separator_index: usize, left: Handle, right: Handle) {
        let separator = *self.nodes.get(parent).as_internal().key(separator_index);

        let new_separator = match self.nodes.get_mut(left) {
            Node::Leaf(lender) => {
                let (key, value) = lender.pop().expect("lending leaf has entries to spare");
                self.nodes.get_mut(right).as_leaf_mut().push_front(key, value);
                key
            }
            Node::Internal(lender) => {
                let (key, child) = lender.pop().expect("lending node has children to spare");
                self.nodes.get_mut(right).as_internal_mut().push_front(child, separator);
                self.set_parent(child, Some(right));
                key
            }
        };

        self.nodes.get_mut(parent).as_internal_mut().set_key(separator_index, new_separator);
        self.stats.borrows += 1;
    }
}
