use core::fmt;

use crate::error::{Error, Result};

/// The fan-out `M` of a [`BPlusTree`](crate::BPlusTree).
///
/// An internal node holds at most `M` children and `M - 1` separator keys; a leaf holds at
/// most `M - 1` entries. Every non-root node stays at least half full: a leaf keeps
/// `⌈(M - 1) / 2⌉` entries and an internal node keeps `⌈M / 2⌉` children.
///
/// # Examples
///
/// ```
/// use bplus_index::Order;
///
/// let order = Order::new(4).unwrap();
/// assert_eq!(order.max_keys(), 3);
/// assert_eq!(order.min_leaf_keys(), 2);
/// assert_eq!(order.min_children(), 2);
///
/// assert!(Order::new(2).is_err());
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Order(usize);

impl Order {
    /// Smallest order that can be split and merged.
    pub const MIN: usize = 3;

    /// Order used by [`BPlusTree::new`](crate::BPlusTree::new).
    pub const DEFAULT: Self = Self(4);

    /// Validates `order` as a tree fan-out.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOrder`] if `order` is below [`Order::MIN`].
    pub const fn new(order: usize) -> Result<Self> {
        if order < Self::MIN {
            return Err(Error::InvalidOrder { order, min: Self::MIN });
        }
        Ok(Self(order))
    }

    /// Returns `M`.
    #[must_use]
    pub const fn get(self) -> usize {
        self.0
    }

    /// Most keys a node may hold (`M - 1`).
    #[must_use]
    pub const fn max_keys(self) -> usize {
        self.0 - 1
    }

    /// Fewest entries a non-root leaf may hold.
    #[must_use]
    pub const fn min_leaf_keys(self) -> usize {
        self.max_keys().div_ceil(2)
    }

    /// Fewest children a non-root internal node may hold.
    #[must_use]
    pub const fn min_children(self) -> usize {
        self.0.div_ceil(2)
    }

    /// Number of entries that stay in the original leaf when `M` entries are split.
    pub(crate) const fn leaf_split_index(self) -> usize {
        self.0.div_ceil(2)
    }

    /// Index of the key pushed up when `M` keys of an internal node are split.
    ///
    /// Rounds down so both halves keep at least `⌈M / 2⌉` children for odd `M`.
    pub(crate) const fn internal_split_index(self) -> usize {
        self.0 / 2
    }
}

impl Default for Order {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<usize> for Order {
    type Error = Error;

    fn try_from(order: usize) -> Result<Self> {
        Self::new(order)
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
