//! Error type for the crate.

use alloc::string::String;
use alloc::vec::Vec;

/// Convenient `Result` alias used throughout the crate.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors reported by [`BPlusTree`](crate::BPlusTree) and [`Order`](crate::Order).
///
/// Looking up or deleting an absent key is not an error; those operations return `None`.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    /// The requested fan-out is too small to build a B+ tree.
    #[error("order {order} is invalid: a B+ tree needs at least {min} children per node")]
    InvalidOrder {
        /// The rejected order.
        order: usize,
        /// The smallest accepted order.
        min: usize,
    },

    /// [`BPlusTree::validate`](crate::BPlusTree::validate) found broken invariants.
    ///
    /// Each entry describes one violation.
    #[error("tree invariant violations:\n{}", .0.join("\n"))]
    Corrupt(Vec<String>),
}
