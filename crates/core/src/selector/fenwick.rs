// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fenwick-tree index: O(log n) select and update
//!
//! Every positive integer is a sum of powers of two, so `sum(1..=12)` is
//! `tree[8] + tree[12]` where `tree[12]` covers `9..=12`. Selection walks the
//! same structure top-down (binary lifting) instead of binary searching over
//! prefix queries.

use super::slots::Slots;
use super::WeightedIndex;
use crate::error::PoolError;
use crate::item::RewardItem;
use rand::{Rng, RngCore};

/// Weighted index backed by a binary indexed tree
#[derive(Debug, Default)]
pub struct FenwickIndex {
    slots: Slots,
    tree: FenwickTree,
    total: u64,
}

impl FenwickIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_catalog(catalog: &[RewardItem]) -> Self {
        let mut index = Self::new();
        index.reset(catalog);
        index
    }

    fn apply(&mut self, pos: usize, diff: i64) {
        if diff == 0 {
            return;
        }
        self.tree.add(pos, diff);
        self.total = self.total.saturating_add_signed(diff);
    }
}

impl WeightedIndex for FenwickIndex {
    fn reset(&mut self, catalog: &[RewardItem]) {
        self.slots = Slots::from_catalog(catalog);
        let weights: Vec<i64> = (0..self.slots.len())
            .map(|pos| self.slots.active_weight(pos) as i64)
            .collect();
        self.total = weights.iter().map(|&w| w as u64).sum();
        self.tree = FenwickTree::from_weights(&weights);
    }

    fn select(&self, rng: &mut dyn RngCore) -> Result<&str, PoolError> {
        if self.total == 0 {
            return Err(PoolError::EmptyRewardPool);
        }
        let draw = rng.gen_range(1..=self.total);
        match self.tree.lower_bound(draw as i64) {
            Some(pos) => Ok(self.slots.id(pos)),
            None => Err(PoolError::EmptyRewardPool),
        }
    }

    fn update(&mut self, item_id: &str, delta: i64) {
        let Some(pos) = self.slots.position(item_id) else {
            return;
        };
        let diff = self.slots.adjust(pos, delta);
        self.apply(pos, diff);
    }

    fn set_item(&mut self, item_id: &str, quantity: u64, weight: u64) -> bool {
        let Some(pos) = self.slots.position(item_id) else {
            return false;
        };
        let diff = self.slots.overwrite(pos, quantity, weight);
        self.apply(pos, diff);
        true
    }

    fn total_available(&self) -> u64 {
        self.total
    }

    fn item_remaining(&self, item_id: &str) -> Option<u64> {
        self.slots.position(item_id).map(|pos| self.slots.quantity(pos))
    }
}

/// 1-based binary indexed tree over signed weights
#[derive(Debug, Default, Clone)]
pub(super) struct FenwickTree {
    tree: Vec<i64>,
}

impl FenwickTree {
    /// Build in O(n) by pushing each node's sum to its parent
    pub(super) fn from_weights(weights: &[i64]) -> Self {
        let n = weights.len();
        let mut tree = vec![0i64; n + 1];
        tree[1..].copy_from_slice(weights);
        for i in 1..=n {
            let parent = i + lowbit(i);
            if parent <= n {
                tree[parent] += tree[i];
            }
        }
        Self { tree }
    }

    pub(super) fn len(&self) -> usize {
        self.tree.len().saturating_sub(1)
    }

    /// Add `delta` at 0-based position `pos`
    pub(super) fn add(&mut self, pos: usize, delta: i64) {
        let n = self.len();
        let mut i = pos + 1;
        while i <= n {
            self.tree[i] += delta;
            i += lowbit(i);
        }
    }

    /// Sum of positions `0..=pos`
    #[cfg(test)]
    pub(super) fn prefix_sum(&self, pos: usize) -> i64 {
        let mut i = (pos + 1).min(self.len());
        let mut sum = 0;
        while i > 0 {
            sum += self.tree[i];
            i -= lowbit(i);
        }
        sum
    }

    /// Smallest 0-based position whose prefix sum is >= `target`
    pub(super) fn lower_bound(&self, target: i64) -> Option<usize> {
        let n = self.len();
        if n == 0 {
            return None;
        }
        let mut pos = 0usize;
        let mut remaining = target;
        let mut step = 1usize << (usize::BITS - 1 - n.leading_zeros());
        while step > 0 {
            let next = pos + step;
            if next <= n && self.tree[next] < remaining {
                pos = next;
                remaining -= self.tree[next];
            }
            step >>= 1;
        }
        // pos is the 1-based index of the last prefix still below target
        (pos < n).then_some(pos)
    }
}

fn lowbit(i: usize) -> usize {
    i & i.wrapping_neg()
}
