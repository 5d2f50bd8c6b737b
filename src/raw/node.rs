use smallvec::SmallVec;

use super::handle::Handle;
use crate::order::Order;

// Inline room for a node of the default order plus the one-entry overflow of a split.
// Larger orders spill to the heap.
pub(crate) const INLINE_KEYS: usize = Order::DEFAULT.get();
pub(crate) const INLINE_CHILDREN: usize = INLINE_KEYS + 1;

pub(crate) type Keys<K> = SmallVec<[K; INLINE_KEYS]>;
pub(crate) type Values<V> = SmallVec<[V; INLINE_KEYS]>;
pub(crate) type Children = SmallVec<[Handle; INLINE_CHILDREN]>;

#[allow(clippy::large_enum_variant)]
pub(crate) enum Node<K, V> {
    Internal(InternalNode<K>),
    Leaf(LeafNode<K, V>),
}

// B+Tree: separator keys and child handles. children.len() == keys.len() + 1.
// Keys in children[i] are < keys[i]; keys in children[i + 1] are >= keys[i].
pub(crate) struct InternalNode<K> {
    parent: Option<Handle>,
    keys: Keys<K>,
    children: Children,
}

// B+Tree: entries live only in leaves, which are chained in key order.
pub(crate) struct LeafNode<K, V> {
    parent: Option<Handle>,
    next: Option<Handle>,
    keys: Keys<K>,
    values: Values<V>,
}

impl<K, V> Node<K, V> {
    pub(crate) fn parent(&self) -> Option<Handle> {
        match self {
            Node::Internal(internal) => internal.parent,
            Node::Leaf(leaf) => leaf.parent,
        }
    }

    pub(crate) fn set_parent(&mut self, parent: Option<Handle>) {
        match self {
            Node::Internal(internal) => internal.parent = parent,
            Node::Leaf(leaf) => leaf.parent = parent,
        }
    }

    pub(crate) fn key_count(&self) -> usize {
        match self {
            Node::Internal(internal) => internal.key_count(),
            Node::Leaf(leaf) => leaf.key_count(),
        }
    }

    /// Returns true if this non-root node has fallen below its minimum occupancy.
    pub(crate) fn underflows(&self, order: Order) -> bool {
        match self {
            Node::Internal(internal) => internal.child_count() < order.min_children(),
            Node::Leaf(leaf) => leaf.key_count() < order.min_leaf_keys(),
        }
    }

    /// Returns the leaf node, panicking if this is not a leaf.
    pub(crate) fn as_leaf(&self) -> &LeafNode<K, V> {
        match self {
            Node::Leaf(leaf) => leaf,
            Node::Internal(_) => panic!("expected leaf node"),
        }
    }

    /// Returns the leaf node mutably, panicking if this is not a leaf.
    pub(crate) fn as_leaf_mut(&mut self) -> &mut LeafNode<K, V> {
        match self {
            Node::Leaf(leaf) => leaf,
            Node::Internal(_) => panic!("expected leaf node"),
        }
    }

    /// Returns the internal node, panicking if this is not internal.
    pub(crate) fn as_internal(&self) -> &InternalNode<K> {
        match self {
            Node::Internal(internal) => internal,
            Node::Leaf(_) => panic!("expected internal node"),
        }
    }

    /// Returns the internal node mutably, panicking if this is not internal.
    pub(crate) fn as_internal_mut(&mut self) -> &mut InternalNode<K> {
        match self {
            Node::Internal(internal) => internal,
            Node::Leaf(_) => panic!("expected internal node"),
        }
    }
}

impl<K> InternalNode<K> {
    /// Builds a node from already-ordered keys and children.
    pub(crate) fn from_parts(parent: Option<Handle>, keys: Keys<K>, children: Children) -> Self {
        debug_assert_eq!(children.len(), keys.len() + 1, "internal node needs one more child than keys");
        Self { parent, keys, children }
    }

    pub(crate) fn parent(&self) -> Option<Handle> {
        self.parent
    }

    pub(crate) fn key_count(&self) -> usize {
        self.keys.len()
    }

    pub(crate) fn child_count(&self) -> usize {
        self.children.len()
    }

    #[inline]
    pub(crate) fn key(&self, index: usize) -> &K {
        &self.keys[index]
    }

    pub(crate) fn keys(&self) -> &[K] {
        &self.keys
    }

    #[inline]
    pub(crate) fn child(&self, index: usize) -> Handle {
        self.children[index]
    }

    pub(crate) fn children(&self) -> &[Handle] {
        &self.children
    }

    pub(crate) fn set_key(&mut self, index: usize, key: K) {
        self.keys[index] = key;
    }

    /// Position of `child` among this node's children.
    pub(crate) fn position_of(&self, child: Handle) -> usize {
        self.children
            .iter()
            .position(|&c| c == child)
            .expect("child handle is not listed in its parent")
    }

    /// Inserts `key` at `index` and `child` immediately to its right.
    pub(crate) fn insert_child(&mut self, index: usize, key: K, child: Handle) {
        self.keys.insert(index, key);
        self.children.insert(index + 1, child);
    }

    /// Removes the separator at `index` together with the child to its right.
    pub(crate) fn remove_separator(&mut self, index: usize) -> (K, Handle) {
        let key = self.keys.remove(index);
        let child = self.children.remove(index + 1);
        (key, child)
    }

    /// Appends a separator and the child to its right.
    pub(crate) fn push(&mut self, key: K, child: Handle) {
        self.keys.push(key);
        self.children.push(child);
    }

    /// Prepends a child and the separator to its right.
    pub(crate) fn push_front(&mut self, child: Handle, key: K) {
        self.keys.insert(0, key);
        self.children.insert(0, child);
    }

    /// Removes the last separator and the last child.
    pub(crate) fn pop(&mut self) -> Option<(K, Handle)> {
        let key = self.keys.pop()?;
        let child = self.children.pop().expect("internal node has a child per key");
        Some((key, child))
    }

    /// Removes the first child and the separator to its right.
    pub(crate) fn pop_front(&mut self) -> Option<(Handle, K)> {
        if self.keys.is_empty() {
            return None;
        }
        let child = self.children.remove(0);
        let key = self.keys.remove(0);
        Some((child, key))
    }

    /// Empties the node, handing back its keys and children.
    pub(crate) fn take_all(&mut self) -> (Keys<K>, Children) {
        (core::mem::take(&mut self.keys), core::mem::take(&mut self.children))
    }

    /// Refills an emptied node.
    pub(crate) fn set_all(&mut self, keys: Keys<K>, children: Children) {
        debug_assert_eq!(children.len(), keys.len() + 1, "internal node needs one more child than keys");
        self.keys = keys;
        self.children = children;
    }

    /// Appends the separator and then all of `right`'s keys and children.
    /// Returns the moved child handles so the caller can re-parent them.
    pub(crate) fn absorb(&mut self, separator: K, right: InternalNode<K>) -> Children {
        let InternalNode { keys, children, .. } = right;
        self.keys.push(separator);
        self.keys.extend(keys);
        self.children.extend(children.iter().copied());
        children
    }
}

impl<K: Ord> InternalNode<K> {
    /// Child to descend into for `key`: the first `i` with `key < keys[i]`, else the last child.
    #[inline]
    pub(crate) fn route(&self, key: &K) -> usize {
        self.keys.partition_point(|k| k <= key)
    }

    /// Leftmost child that may hold `key`: the first `i` with `key <= keys[i]`, else the last child.
    #[inline]
    pub(crate) fn route_lower(&self, key: &K) -> usize {
        self.keys.partition_point(|k| k < key)
    }
}

impl<K, V> LeafNode<K, V> {
    pub(crate) fn new(parent: Option<Handle>) -> Self {
        Self {
            parent,
            next: None,
            keys: SmallVec::new(),
            values: SmallVec::new(),
        }
    }

    pub(crate) fn key_count(&self) -> usize {
        self.keys.len()
    }

    #[inline]
    pub(crate) fn key(&self, index: usize) -> &K {
        &self.keys[index]
    }

    pub(crate) fn keys(&self) -> &[K] {
        &self.keys
    }

    #[inline]
    pub(crate) fn value(&self, index: usize) -> &V {
        &self.values[index]
    }

    pub(crate) fn next(&self) -> Option<Handle> {
        self.next
    }

    pub(crate) fn set_next(&mut self, next: Option<Handle>) {
        self.next = next;
    }

    pub(crate) fn first_key(&self) -> Option<&K> {
        self.keys.first()
    }

    pub(crate) fn insert(&mut self, index: usize, key: K, value: V) {
        self.keys.insert(index, key);
        self.values.insert(index, value);
    }

    pub(crate) fn remove(&mut self, index: usize) -> (K, V) {
        let key = self.keys.remove(index);
        let value = self.values.remove(index);
        (key, value)
    }

    pub(crate) fn push(&mut self, key: K, value: V) {
        self.keys.push(key);
        self.values.push(value);
    }

    pub(crate) fn push_front(&mut self, key: K, value: V) {
        self.keys.insert(0, key);
        self.values.insert(0, value);
    }

    pub(crate) fn pop(&mut self) -> Option<(K, V)> {
        let key = self.keys.pop()?;
        let value = self.values.pop().expect("leaf holds a value per key");
        Some((key, value))
    }

    pub(crate) fn pop_front(&mut self) -> Option<(K, V)> {
        if self.keys.is_empty() {
            return None;
        }
        Some(self.remove(0))
    }

    /// Empties the leaf, handing back its entries. The chain link is kept.
    pub(crate) fn take_all(&mut self) -> (Keys<K>, Values<V>) {
        (core::mem::take(&mut self.keys), core::mem::take(&mut self.values))
    }

    /// Refills an emptied leaf.
    pub(crate) fn set_all(&mut self, keys: Keys<K>, values: Values<V>) {
        debug_assert_eq!(keys.len(), values.len(), "leaf holds a value per key");
        self.keys = keys;
        self.values = values;
    }

    /// Appends every entry of `right` and takes over its chain link.
    pub(crate) fn absorb(&mut self, right: LeafNode<K, V>) {
        self.keys.extend(right.keys);
        self.values.extend(right.values);
        self.next = right.next;
    }
}

impl<K: Ord, V> LeafNode<K, V> {
    /// Slot for a new `key`: after every existing key that is `<= key`.
    #[inline]
    pub(crate) fn insert_position(&self, key: &K) -> usize {
        self.keys.partition_point(|k| k <= key)
    }

    /// First slot whose key is `>= key`.
    #[inline]
    pub(crate) fn lower_bound(&self, key: &K) -> usize {
        self.keys.partition_point(|k| k < key)
    }

    /// First slot whose key is `> key`.
    #[inline]
    pub(crate) fn upper_bound(&self, key: &K) -> usize {
        self.keys.partition_point(|k| k <= key)
    }
}
