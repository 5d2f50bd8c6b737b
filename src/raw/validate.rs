//! Structural self-check.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::Debug;

use super::handle::Handle;
use super::node::Node;
use super::raw_bplus_tree::RawBPlusTree;
use crate::error::{Error, Result};

/// State gathered while walking the tree.
struct Walk {
    leaf_depth: Option<usize>,
    leaves: Vec<Handle>,
    entries: usize,
    reachable: usize,
    errors: Vec<String>,
}

impl<K: Ord + Debug, V> RawBPlusTree<K, V> {
    /// Checks every structural invariant and reports all violations found.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Corrupt`] listing each violation.
    pub(crate) fn validate(&self) -> Result<()> {
        let mut walk = Walk {
            leaf_depth: None,
            leaves: Vec::new(),
            entries: 0,
            reachable: 0,
            errors: Vec::new(),
        };

        if let Some(root) = self.root {
            if let Node::Internal(internal) = self.nodes.get(root)
                && internal.key_count() == 0
            {
                walk.errors.push(format!("internal root {root} has no keys"));
            }
            self.validate_node(root, None, 0, None, None, &mut walk);
            self.validate_leaf_chain(&mut walk);
        }

        if walk.entries != self.len {
            walk.errors.push(format!("len mismatch: len={}, entries in leaves={}", self.len, walk.entries));
        }
        if walk.reachable != self.node_count() {
            walk.errors.push(format!(
                "node count mismatch: live nodes={}, reachable from root={}",
                self.node_count(),
                walk.reachable
            ));
        }

        if walk.errors.is_empty() {
            Ok(())
        } else {
            Err(Error::Corrupt(walk.errors))
        }
    }

    /// Walks the subtree under `handle`, whose keys must all lie in `[lower, upper]`.
    fn validate_node<'a>(
        &'a self,
        handle: Handle,
        expected_parent: Option<Handle>,
        depth: usize,
        lower: Option<&'a K>,
        upper: Option<&'a K>,
        walk: &mut Walk,
    ) {
        let node = self.nodes.get(handle);
        let is_root = expected_parent.is_none();
        walk.reachable += 1;

        if node.parent() != expected_parent {
            walk.errors.push(format!(
                "parent mismatch at {handle}: stored {:?}, expected {expected_parent:?}",
                node.parent()
            ));
        }
        if node.key_count() > self.order.max_keys() {
            walk.errors.push(format!(
                "node {handle} holds {} keys, more than {}",
                node.key_count(),
                self.order.max_keys()
            ));
        }
        if !is_root && node.underflows(self.order) {
            walk.errors.push(format!("non-root node {handle} is below minimum occupancy"));
        }

        let keys = match node {
            Node::Leaf(leaf) => leaf.keys(),
            Node::Internal(internal) => internal.keys(),
        };
        for (index, pair) in keys.windows(2).enumerate() {
            if pair[0] > pair[1] {
                walk.errors.push(format!("keys out of order at {handle}, indices {} and {}", index, index + 1));
            }
        }
        for key in keys {
            if lower.is_some_and(|bound| key < bound) || upper.is_some_and(|bound| key > bound) {
                walk.errors.push(format!("key {key:?} at {handle} lies outside [{lower:?}, {upper:?}]"));
            }
        }

        match node {
            Node::Leaf(leaf) => {
                match walk.leaf_depth {
                    None => walk.leaf_depth = Some(depth),
                    Some(expected) if expected != depth => {
                        walk.errors.push(format!("leaf {handle} at depth {depth}, expected {expected}"));
                    }
                    Some(_) => {}
                }
                walk.leaves.push(handle);
                walk.entries += leaf.key_count();
            }
            Node::Internal(internal) => {
                if internal.child_count() != internal.key_count() + 1 {
                    walk.errors.push(format!(
                        "internal node {handle} has {} keys but {} children",
                        internal.key_count(),
                        internal.child_count()
                    ));
                    return;
                }
                for (index, &child) in internal.children().iter().enumerate() {
                    let child_lower = if index == 0 { lower } else { Some(internal.key(index - 1)) };
                    let child_upper = if index == internal.key_count() { upper } else { Some(internal.key(index)) };
                    self.validate_node(child, Some(handle), depth + 1, child_lower, child_upper, walk);
                }
            }
        }
    }

    /// The `next` links must visit exactly the leaves found by the tree walk, in order.
    fn validate_leaf_chain(&self, walk: &mut Walk) {
        let mut chained = Vec::with_capacity(walk.leaves.len());
        let mut current = walk.leaves.first().copied();
        while let Some(handle) = current {
            if chained.len() > walk.leaves.len() {
                walk.errors.push(String::from("leaf chain is longer than the leaf level, likely a cycle"));
                return;
            }
            chained.push(handle);
            current = self.nodes.get(handle).as_leaf().next();
        }

        if chained != walk.leaves {
            walk.errors.push(format!("leaf chain {chained:?} does not match leaf level {:?}", walk.leaves));
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::order::Order;
    use pretty_assertions::assert_eq;

    fn tree(keys: impl IntoIterator<Item = i32>) -> RawBPlusTree<i32, ()> {
        let mut tree = RawBPlusTree::new(Order::DEFAULT);
        for key in keys {
            tree.insert(key, ());
        }
        tree
    }

    fn violations(tree: &RawBPlusTree<i32, ()>) -> Vec<String> {
        match tree.validate() {
            Ok(()) => Vec::new(),
            Err(Error::Corrupt(errors)) => errors,
            Err(other) => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn empty_and_small_trees_are_valid() {
        assert_eq!(violations(&tree([])), Vec::<String>::new());
        assert_eq!(violations(&tree([1])), Vec::<String>::new());
        assert_eq!(violations(&tree(1..=50)), Vec::<String>::new());
    }

    #[test]
    fn detects_len_drift() {
        let mut tree = tree(1..=10);
        tree.len += 1;
        let errors = violations(&tree);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("len mismatch"));
    }

    #[test]
    fn detects_out_of_place_key() {
        let mut tree = tree(1..=4);
        // [[1 2]3[3 4]]: a key below the separator in the right leaf.
        let right = tree.nodes.get(tree.root.unwrap()).as_internal().child(1);
        tree.nodes.get_mut(right).as_leaf_mut().push_front(0, ());
        tree.len += 1;
        let errors = violations(&tree);
        assert!(errors.iter().any(|e| e.contains("outside")), "{errors:?}");
    }

    #[test]
    fn detects_broken_leaf_chain() {
        let mut tree = tree(1..=4);
        let left = tree.leftmost_leaf().unwrap();
        tree.nodes.get_mut(left).as_leaf_mut().set_next(None);
        let errors = violations(&tree);
        assert!(errors.iter().any(|e| e.starts_with("leaf chain")), "{errors:?}");
    }

    #[test]
    fn detects_wrong_parent() {
        let mut tree = tree(1..=4);
        let left = tree.leftmost_leaf().unwrap();
        tree.set_parent(left, None);
        let errors = violations(&tree);
        assert!(errors.iter().any(|e| e.starts_with("parent mismatch")), "{errors:?}");
    }

    #[test]
    fn corrupt_error_lists_every_violation() {
        let mut tree = tree(1..=4);
        tree.len = 0;
        let left = tree.leftmost_leaf().unwrap();
        tree.set_parent(left, None);
        let err = tree.validate().unwrap_err();
        let Error::Corrupt(errors) = &err else {
            panic!("unexpected error {err:?}");
        };
        assert_eq!(errors.len(), 2);
    }
}
