// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Prefix-sum array index: O(log n) select, O(n) update

use super::slots::Slots;
use super::WeightedIndex;
use crate::error::PoolError;
use crate::item::RewardItem;
use rand::{Rng, RngCore};

/// Weighted index backed by a cumulative-sum array
#[derive(Debug, Default)]
pub struct PrefixSumIndex {
    slots: Slots,
    /// `prefix[i]` is the sum of active weights at positions `0..=i`
    prefix: Vec<u64>,
    total: u64,
}

impl PrefixSumIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_catalog(catalog: &[RewardItem]) -> Self {
        let mut index = Self::new();
        index.reset(catalog);
        index
    }

    fn add_suffix(&mut self, pos: usize, diff: i64) {
        if diff == 0 {
            return;
        }
        for sum in &mut self.prefix[pos..] {
            *sum = sum.saturating_add_signed(diff);
        }
        self.total = self.total.saturating_add_signed(diff);
    }
}

impl WeightedIndex for PrefixSumIndex {
    fn reset(&mut self, catalog: &[RewardItem]) {
        self.slots = Slots::from_catalog(catalog);
        self.prefix = Vec::with_capacity(catalog.len());

        let mut running = 0u64;
        for pos in 0..self.slots.len() {
            running += self.slots.active_weight(pos);
            self.prefix.push(running);
        }
        self.total = running;
    }

    fn select(&self, rng: &mut dyn RngCore) -> Result<&str, PoolError> {
        if self.total == 0 {
            return Err(PoolError::EmptyRewardPool);
        }
        let draw = rng.gen_range(1..=self.total);
        let pos = self.prefix.partition_point(|&sum| sum < draw);
        if pos >= self.slots.len() {
            return Err(PoolError::EmptyRewardPool);
        }
        Ok(self.slots.id(pos))
    }

    fn update(&mut self, item_id: &str, delta: i64) {
        let Some(pos) = self.slots.position(item_id) else {
            return;
        };
        let diff = self.slots.adjust(pos, delta);
        self.add_suffix(pos, diff);
    }

    fn set_item(&mut self, item_id: &str, quantity: u64, weight: u64) -> bool {
        let Some(pos) = self.slots.position(item_id) else {
            return false;
        };
        let diff = self.slots.overwrite(pos, quantity, weight);
        self.add_suffix(pos, diff);
        true
    }

    fn total_available(&self) -> u64 {
        self.total
    }

    fn item_remaining(&self, item_id: &str) -> Option<u64> {
        self.slots.position(item_id).map(|pos| self.slots.quantity(pos))
    }
}
