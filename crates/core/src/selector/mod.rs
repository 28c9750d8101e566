// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Weighted random selection over the catalog
//!
//! Both implementations keep a cumulative weight per catalog position and
//! answer "which position covers draw `r`" for a uniform `r` in
//! `1..=total_available()`. Ties resolve to the lowest position, so catalog
//! order is the tie-break.
//!
//! ```text
//! catalog   gold(10)  silver(20)  rock(90)
//! cumsum       10        30         120
//! r = 25  ──────────────► silver
//! ```

mod fenwick;
mod prefix_sum;
mod slots;

pub use fenwick::FenwickIndex;
pub use prefix_sum::PrefixSumIndex;

use crate::error::PoolError;
use crate::item::RewardItem;
use rand::RngCore;
use serde::{Deserialize, Serialize};

/// Weighted index contract shared by both implementations
///
/// An item's weight counts toward the total only while its remaining
/// quantity is positive.
pub trait WeightedIndex: Send {
    /// Rebuild from scratch; catalog order becomes position order
    fn reset(&mut self, catalog: &[RewardItem]);

    /// Pick an item id with probability `weight / total_available()`
    fn select(&self, rng: &mut dyn RngCore) -> Result<&str, PoolError>;

    /// Adjust an item's remaining quantity by `delta`; unknown ids are ignored
    fn update(&mut self, item_id: &str, delta: i64);

    /// Overwrite an item's remaining quantity and weight
    ///
    /// Returns false when the id is not indexed.
    fn set_item(&mut self, item_id: &str, quantity: u64, weight: u64) -> bool;

    /// Sum of weights of items with remaining quantity
    fn total_available(&self) -> u64;

    /// Remaining quantity, or None for an unknown id
    fn item_remaining(&self, item_id: &str) -> Option<u64>;
}

/// Which index implementation a pool is built with
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectorKind {
    PrefixSum,
    #[default]
    Fenwick,
}

impl SelectorKind {
    /// Construct an empty index of this kind
    pub fn build(self) -> Box<dyn WeightedIndex> {
        match self {
            SelectorKind::PrefixSum => Box::new(PrefixSumIndex::new()),
            SelectorKind::Fenwick => Box::new(FenwickIndex::new()),
        }
    }
}

#[cfg(test)]
#[path = "selector_tests.rs"]
mod tests;
