// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-position bookkeeping shared by the index implementations

use crate::item::RewardItem;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub(super) struct Slots {
    ids: Vec<String>,
    positions: HashMap<String, usize>,
    quantities: Vec<u64>,
    weights: Vec<u64>,
}

impl Slots {
    pub(super) fn from_catalog(catalog: &[RewardItem]) -> Self {
        let mut slots = Self {
            ids: Vec::with_capacity(catalog.len()),
            positions: HashMap::with_capacity(catalog.len()),
            quantities: Vec::with_capacity(catalog.len()),
            weights: Vec::with_capacity(catalog.len()),
        };
        for (pos, item) in catalog.iter().enumerate() {
            slots.ids.push(item.item_id.clone());
            slots.positions.insert(item.item_id.clone(), pos);
            slots.quantities.push(item.quantity);
            slots.weights.push(item.weight);
        }
        slots
    }

    pub(super) fn len(&self) -> usize {
        self.ids.len()
    }

    pub(super) fn position(&self, item_id: &str) -> Option<usize> {
        self.positions.get(item_id).copied()
    }

    pub(super) fn id(&self, pos: usize) -> &str {
        &self.ids[pos]
    }

    pub(super) fn quantity(&self, pos: usize) -> u64 {
        self.quantities[pos]
    }

    /// Weight contributed to the cumulative sums
    pub(super) fn active_weight(&self, pos: usize) -> u64 {
        if self.quantities[pos] > 0 {
            self.weights[pos]
        } else {
            0
        }
    }

    /// Apply a quantity delta and return the change in active weight
    pub(super) fn adjust(&mut self, pos: usize, delta: i64) -> i64 {
        let before = self.active_weight(pos);
        let current = self.quantities[pos];
        debug_assert!(
            delta >= 0 || current >= delta.unsigned_abs(),
            "remaining quantity would go negative"
        );
        self.quantities[pos] = current.saturating_add_signed(delta);
        weight_diff(before, self.active_weight(pos))
    }

    /// Overwrite quantity and weight and return the change in active weight
    pub(super) fn overwrite(&mut self, pos: usize, quantity: u64, weight: u64) -> i64 {
        let before = self.active_weight(pos);
        self.quantities[pos] = quantity;
        self.weights[pos] = weight;
        weight_diff(before, self.active_weight(pos))
    }
}

fn weight_diff(before: u64, after: u64) -> i64 {
    after as i64 - before as i64
}
