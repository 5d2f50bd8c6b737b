//! An in-memory B+ tree index for Rust.
//!
//! This crate provides [`BPlusTree`], an ordered index that maps keys to opaque payloads
//! and supports point insertion, point deletion, and full or bounded ordered scans. It is
//! the kind of structure that sits under the indexing layer of a storage engine.
//!
//! # Example
//!
//! ```
//! use bplus_index::{BPlusTree, Order};
//!
//! let mut index = BPlusTree::with_order(Order::new(4)?);
//! for key in 1..=4 {
//!     index.insert(key, key * 10);
//! }
//!
//! // Entries live in the leaves; the root holds the separator `3`.
//! assert_eq!(index.to_string(), "[[1 2]3[3 4]]");
//!
//! // Range scans walk the linked leaf level.
//! let found: Vec<_> = index.scan_range(2, 3).collect();
//! assert_eq!(found, [(&2, &20), (&3, &30)]);
//!
//! // Deleting `1` underflows its leaf, which merges with its sibling and shrinks the root.
//! assert_eq!(index.delete(&1), Some(10));
//! assert_eq!(index.to_string(), "[2 3 4]");
//! assert_eq!(index.stats().root_shrinks, 1);
//! # Ok::<(), bplus_index::Error>(())
//! ```
//!
//! # Features
//!
//! - **`no_std` compatible** - Only requires `alloc`, no standard library dependency
//! - **Configurable fan-out** - Any [`Order`] of 3 or more
//! - **Duplicate keys** - Equal keys are kept in insertion order
//! - **Observable** - [`Stats`] counts splits, merges, borrows and root height changes
//! - **Self-checking** - [`BPlusTree::validate`] reports every broken invariant
//!
//! # Implementation
//!
//! Nodes are stored in an arena and addressed by compact handles. Internal nodes own their
//! children through those handles; every node also names its parent, and every leaf names
//! the leaf that follows it, so splits and merges walk upward without recursion through
//! borrowed references and scans walk the leaf level without revisiting internal nodes.

#![no_std]
// These forbid rules and lint groups are meant to be very restrictive.
#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;

mod error;
mod order;
mod raw;
mod stats;

pub mod bplus_tree;

pub use bplus_tree::BPlusTree;
pub use error::{Error, Result};
pub use order::Order;
pub use stats::Stats;
