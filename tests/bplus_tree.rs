use std::collections::{BTreeMap, VecDeque};
use std::ops::Bound;

use bplus_index::{BPlusTree, Order};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

/// The number of operations to perform in each proptest case.
const TEST_SIZE: usize = 2_000;

/// Keys drawn from a range much smaller than `TEST_SIZE` so that duplicates and repeated
/// deletes of the same key are common.
fn key_strategy() -> impl Strategy<Value = i64> {
    -500i64..500i64
}

fn value_strategy() -> impl Strategy<Value = i64> {
    any::<i64>()
}

fn order_strategy() -> impl Strategy<Value = Order> {
    prop_oneof![Just(3usize), Just(4), Just(5), Just(8), 3usize..64].prop_map(|m| Order::new(m).unwrap())
}

/// Reference multimap: every key keeps its values in insertion order.
#[derive(Default)]
struct Model {
    map: BTreeMap<i64, VecDeque<i64>>,
    len: usize,
}

impl Model {
    fn insert(&mut self, key: i64, value: i64) {
        self.map.entry(key).or_default().push_back(value);
        self.len += 1;
    }

    fn delete(&mut self, key: i64) -> Option<i64> {
        let values = self.map.get_mut(&key)?;
        let value = values.pop_front();
        if values.is_empty() {
            self.map.remove(&key);
        }
        self.len -= 1;
        value
    }

    fn get(&self, key: i64) -> Option<&i64> {
        self.map.get(&key).and_then(VecDeque::front)
    }

    fn entries(&self, range: (Bound<i64>, Bound<i64>)) -> Vec<(i64, i64)> {
        self.map
            .range(range)
            .flat_map(|(&k, values)| values.iter().map(move |&v| (k, v)))
            .collect()
    }
}

fn entries<'a>(iter: impl Iterator<Item = (&'a i64, &'a i64)>) -> Vec<(i64, i64)> {
    iter.map(|(&k, &v)| (k, v)).collect()
}

// ─── Operations enum for driving randomized tests ────────────────────────────

#[derive(Debug, Clone)]
enum TreeOp {
    Insert(i64, i64),
    Delete(i64),
    Get(i64),
    ContainsKey(i64),
    FirstKeyValue,
    LastKeyValue,
}

fn tree_op_strategy() -> impl Strategy<Value = TreeOp> {
    prop_oneof![
        5 => (key_strategy(), value_strategy()).prop_map(|(k, v)| TreeOp::Insert(k, v)),
        4 => key_strategy().prop_map(TreeOp::Delete),
        2 => key_strategy().prop_map(TreeOp::Get),
        1 => key_strategy().prop_map(TreeOp::ContainsKey),
        1 => Just(TreeOp::FirstKeyValue),
        1 => Just(TreeOp::LastKeyValue),
    ]
}

// ─── Core operations ─────────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    /// Replays a random sequence of operations on both the tree and the model and
    /// asserts identical results and a valid structure at every step.
    #[test]
    fn ops_match_model(order in order_strategy(), ops in proptest::collection::vec(tree_op_strategy(), TEST_SIZE)) {
        let mut tree = BPlusTree::with_order(order);
        let mut model = Model::default();

        for op in &ops {
            match *op {
                TreeOp::Insert(k, v) => {
                    tree.insert(k, v);
                    model.insert(k, v);
                }
                TreeOp::Delete(k) => {
                    prop_assert_eq!(tree.delete(&k), model.delete(k), "delete({})", k);
                }
                TreeOp::Get(k) => {
                    prop_assert_eq!(tree.get(&k), model.get(k), "get({})", k);
                }
                TreeOp::ContainsKey(k) => {
                    prop_assert_eq!(tree.contains_key(&k), model.map.contains_key(&k), "contains_key({})", k);
                }
                TreeOp::FirstKeyValue => {
                    let expected = model.map.iter().next().map(|(k, vs)| (k, &vs[0]));
                    prop_assert_eq!(tree.first_key_value(), expected);
                }
                TreeOp::LastKeyValue => {
                    let expected = model.map.iter().next_back().map(|(k, vs)| (k, &vs[vs.len() - 1]));
                    prop_assert_eq!(tree.last_key_value(), expected);
                }
            }
            if let Err(err) = tree.validate() {
                return Err(TestCaseError::fail(format!("after {op:?}: {err}")));
            }
            prop_assert_eq!(tree.len(), model.len);
        }

        prop_assert_eq!(entries(tree.iter()), model.entries((Bound::Unbounded, Bound::Unbounded)));
    }

    /// Scans are sorted, complete and identical across repeated calls.
    #[test]
    fn scan_all_matches_model(
        order in order_strategy(),
        entries_in in proptest::collection::vec((key_strategy(), value_strategy()), 0..TEST_SIZE),
    ) {
        let mut tree = BPlusTree::with_order(order);
        let mut model = Model::default();
        for &(k, v) in &entries_in {
            tree.insert(k, v);
            model.insert(k, v);
        }

        let first = entries(tree.scan_all());
        prop_assert!(first.windows(2).all(|w| w[0].0 <= w[1].0));
        prop_assert_eq!(&first, &model.entries((Bound::Unbounded, Bound::Unbounded)));
        prop_assert_eq!(&first, &entries(tree.scan_all()));
        prop_assert_eq!(tree.iter().len(), entries_in.len());

        let keys: Vec<i64> = tree.keys().copied().collect();
        let values: Vec<i64> = tree.values().copied().collect();
        prop_assert_eq!(keys, first.iter().map(|e| e.0).collect::<Vec<_>>());
        prop_assert_eq!(values, first.iter().map(|e| e.1).collect::<Vec<_>>());
    }

    /// Every bound combination yields exactly the model's entries in range.
    #[test]
    fn range_matches_model(
        order in order_strategy(),
        entries_in in proptest::collection::vec((key_strategy(), value_strategy()), 0..TEST_SIZE),
        deletes in proptest::collection::vec(key_strategy(), 0..TEST_SIZE / 2),
        low in key_strategy(),
        span in 0i64..200,
        start_kind in 0u8..3,
        end_kind in 0u8..3,
    ) {
        let mut tree = BPlusTree::with_order(order);
        let mut model = Model::default();
        for &(k, v) in &entries_in {
            tree.insert(k, v);
            model.insert(k, v);
        }
        for k in &deletes {
            tree.delete(k);
            model.delete(*k);
        }

        let high = low + span;
        let bound = |kind: u8, key: i64| match kind {
            0 => Bound::Included(key),
            1 => Bound::Excluded(key),
            _ => Bound::Unbounded,
        };
        let range = (bound(start_kind, low), bound(end_kind, high));
        // BTreeMap rejects `(Excluded(x), Excluded(x))`; the tree simply yields nothing.
        let expected = if matches!(range, (Bound::Excluded(a), Bound::Excluded(b)) if a == b) {
            Vec::new()
        } else {
            model.entries(range)
        };
        prop_assert_eq!(entries(tree.range(range)), expected);
        prop_assert_eq!(entries(tree.scan_range(low, high)), model.entries((Bound::Included(low), Bound::Included(high))));
    }

    /// Inserting a set of keys and deleting them again in any order leaves an empty root leaf.
    #[test]
    fn round_trip_leaves_empty_root_leaf(
        order in order_strategy(),
        keys in proptest::collection::vec(key_strategy(), 1..TEST_SIZE).prop_shuffle(),
        seed in any::<u64>(),
    ) {
        let mut tree = BPlusTree::with_order(order);
        for &k in &keys {
            tree.insert(k, k);
        }

        let mut order_of_deletion = keys.clone();
        let shift = usize::try_from(seed % keys.len() as u64).unwrap();
        order_of_deletion.rotate_left(shift);
        for k in &order_of_deletion {
            prop_assert_eq!(tree.delete(k), Some(*k));
            prop_assert!(tree.validate().is_ok());
        }

        prop_assert!(tree.is_empty());
        prop_assert_eq!(tree.height(), 1);
        prop_assert_eq!(tree.to_string(), "[]");
    }
}

// ─── Deterministic scenarios ─────────────────────────────────────────────────

#[test]
fn order_four_render_scenario() {
    let mut tree = BPlusTree::with_order(Order::new(4).unwrap());
    for key in [1, 2, 3] {
        tree.insert(key, ());
    }
    assert_eq!(tree.to_string(), "[1 2 3]");

    tree.insert(4, ());
    assert_eq!(tree.to_string(), "[[1 2]3[3 4]]");

    assert_eq!(tree.delete(&1), Some(()));
    assert_eq!(tree.to_string(), "[2 3 4]");
}

#[test]
fn scan_range_scenario() {
    let tree: BPlusTree<_, _> = [10, 20, 30, 40, 50].into_iter().map(|k| (k, k)).collect();
    let keys: Vec<_> = tree.scan_range(20, 40).map(|(k, _)| *k).collect();
    assert_eq!(keys, [20, 30, 40]);
}

#[test]
fn inverted_scan_range_is_empty() {
    let tree: BPlusTree<_, _> = (0..100).map(|k| (k, ())).collect();
    assert_eq!(tree.scan_range(60, 40).count(), 0);
}

#[test]
fn filling_one_leaf_past_capacity_splits_once() {
    for m in [3usize, 4, 5, 8, 16] {
        let order = Order::new(m).unwrap();
        let mut tree = BPlusTree::with_order(order);
        for key in 0..i32::try_from(m).unwrap() {
            tree.insert(key, ());
        }

        let stats = tree.stats();
        assert_eq!(stats.leaf_splits, 1, "order {m}");
        assert_eq!(stats.root_grows, 1, "order {m}");
        assert_eq!(tree.height(), 2, "order {m}");
        tree.validate().unwrap();

        // The promoted separator is the first key of the right leaf.
        let split = i32::try_from(m.div_ceil(2)).unwrap();
        let left: Vec<String> = (0..split).map(|k| k.to_string()).collect();
        let right: Vec<String> = (split..i32::try_from(m).unwrap()).map(|k| k.to_string()).collect();
        assert_eq!(tree.to_string(), format!("[[{}]{split}[{}]]", left.join(" "), right.join(" ")));
    }
}

#[test]
fn deleting_from_minimal_tree_cascades_to_root_shrink() {
    let mut tree = BPlusTree::with_order(Order::new(3).unwrap());
    for key in 1..=16 {
        tree.insert(key, ());
    }
    let height = tree.height();
    assert!(height >= 3);

    for key in 1..=15 {
        tree.delete(&key);
        tree.validate().unwrap();
    }
    let stats = tree.stats();
    assert!(stats.merges > 0);
    assert_eq!(stats.root_shrinks, u64::try_from(height - 1).unwrap());
    assert_eq!(tree.to_string(), "[16]");
}

#[test]
fn duplicates_come_out_in_insertion_order() {
    let mut tree = BPlusTree::with_order(Order::new(3).unwrap());
    for (i, key) in [5, 1, 5, 3, 5, 5, 1].into_iter().enumerate() {
        tree.insert(key, i);
    }
    let entries: Vec<_> = tree.iter().map(|(&k, &v)| (k, v)).collect();
    assert_eq!(entries, [(1, 1), (1, 6), (3, 3), (5, 0), (5, 2), (5, 4), (5, 5)]);

    assert_eq!(tree.get(&5), Some(&0));
    assert_eq!(tree.delete(&5), Some(0));
    assert_eq!(tree.get(&5), Some(&2));
}

#[test]
fn absent_delete_changes_nothing() {
    let mut tree: BPlusTree<_, _> = (0..50).map(|k| (k * 2, k)).collect();
    let before = tree.to_string();
    let stats = tree.stats();

    assert_eq!(tree.delete(&7), None);
    assert_eq!(tree.delete(&-1), None);
    assert_eq!(tree.delete(&1000), None);

    assert_eq!(tree.to_string(), before);
    assert_eq!(tree.stats(), stats);
    assert_eq!(tree.len(), 50);
}

#[test]
fn invalid_order_is_rejected() {
    let err = Order::new(2).unwrap_err();
    assert_eq!(err, bplus_index::Error::InvalidOrder { order: 2, min: 3 });
}

#[test]
fn stats_display() {
    let tree: BPlusTree<_, _> = (1..=4).map(|k| (k, ())).collect();
    assert_eq!(
        tree.stats().to_string(),
        "Stats { splits: 1 (1 leaf, 0 internal), merges: 0, borrows: 0, root grows: 1, root shrinks: 0 }"
    );
}
