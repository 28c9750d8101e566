// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reward pool with staged draws
//!
//! Two views of inventory are kept:
//! - the catalog holds *persisted* quantities, changed only by commit,
//!   administrative updates and replay
//! - the weighted index holds *available* quantities, which also reflect
//!   draws selected since the last flush
//!
//! The difference between the two is exactly the pending batch.

use crate::error::PoolError;
use crate::item::{PoolConfig, PoolSnapshot, RewardItem};
use crate::selector::{SelectorKind, WeightedIndex};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// Catalog plus weighted index with select/commit/revert staging
pub struct RewardPool {
    catalog: Vec<RewardItem>,
    positions: HashMap<String, usize>,
    index: Box<dyn WeightedIndex>,
    /// Item id -> units selected since the last commit/revert
    pending: BTreeMap<String, u64>,
    rng: StdRng,
    selector: SelectorKind,
}

impl std::fmt::Debug for RewardPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RewardPool")
            .field("catalog", &self.catalog)
            .field("pending", &self.pending)
            .field("selector", &self.selector)
            .field("total_available", &self.index.total_available())
            .finish()
    }
}

impl RewardPool {
    /// Build a pool seeded from OS entropy
    pub fn new(catalog: Vec<RewardItem>, selector: SelectorKind) -> Result<Self, PoolError> {
        Self::with_rng(catalog, selector, StdRng::from_entropy())
    }

    /// Build a pool with an explicit random source (deterministic tests)
    pub fn with_rng(
        catalog: Vec<RewardItem>,
        selector: SelectorKind,
        rng: StdRng,
    ) -> Result<Self, PoolError> {
        PoolConfig {
            catalog: catalog.clone(),
        }
        .validate()?;

        let mut pool = Self {
            catalog: Vec::new(),
            positions: HashMap::new(),
            index: selector.build(),
            pending: BTreeMap::new(),
            rng,
            selector,
        };
        pool.install(catalog);
        Ok(pool)
    }

    /// Build a pool from a config file
    pub fn from_config_path(path: &Path, selector: SelectorKind) -> Result<Self, PoolError> {
        let config = PoolConfig::load(path)?;
        Self::new(config.catalog, selector)
    }

    /// Persisted catalog (pending draws not subtracted)
    pub fn catalog(&self) -> &[RewardItem] {
        &self.catalog
    }

    pub fn selector(&self) -> SelectorKind {
        self.selector
    }

    /// Catalog with each quantity replaced by what is still available to draw
    pub fn state(&self) -> Vec<RewardItem> {
        self.catalog
            .iter()
            .map(|item| RewardItem {
                quantity: self.index.item_remaining(&item.item_id).unwrap_or(0),
                ..item.clone()
            })
            .collect()
    }

    pub fn item_remaining(&self, item_id: &str) -> Option<u64> {
        self.index.item_remaining(item_id)
    }

    pub fn total_available(&self) -> u64 {
        self.index.total_available()
    }

    /// Number of units staged since the last commit/revert
    pub fn pending_draws(&self) -> u64 {
        self.pending.values().sum()
    }

    /// Pick an item and stage its removal
    ///
    /// The index is decremented immediately so later selects in the same
    /// batch cannot hand out the same unit.
    pub fn select_item(&mut self) -> Result<String, PoolError> {
        let item_id = self.index.select(&mut self.rng)?.to_string();
        self.index.update(&item_id, -1);
        *self.pending.entry(item_id.clone()).or_default() += 1;
        Ok(item_id)
    }

    /// Apply the staged batch to persisted quantities
    pub fn commit_draw(&mut self) {
        for (item_id, count) in std::mem::take(&mut self.pending) {
            if let Some(&pos) = self.positions.get(&item_id) {
                let item = &mut self.catalog[pos];
                item.quantity = item.quantity.saturating_sub(count);
            }
        }
    }

    /// Undo a single staged selection that never made it into the log
    pub fn cancel_selection(&mut self, item_id: &str) {
        let Some(count) = self.pending.get_mut(item_id) else {
            return;
        };
        *count -= 1;
        if *count == 0 {
            self.pending.remove(item_id);
        }
        self.index.update(item_id, 1);
    }

    /// Return the staged batch to the index; persisted quantities are untouched
    pub fn revert_draw(&mut self) {
        for (item_id, count) in std::mem::take(&mut self.pending) {
            self.index.update(&item_id, count as i64);
        }
    }

    /// Administrative change to quantity and weight
    ///
    /// Unknown ids are appended to the catalog.
    pub fn update_item(
        &mut self,
        item_id: &str,
        quantity: u64,
        weight: u64,
    ) -> Result<(), PoolError> {
        if !self.pending.is_empty() {
            return Err(PoolError::PendingDrawsNotEmpty);
        }
        self.apply_update_log(item_id, quantity, weight);
        Ok(())
    }

    pub fn create_snapshot(&self, last_request_id: u64) -> Result<PoolSnapshot, PoolError> {
        if !self.pending.is_empty() {
            return Err(PoolError::PendingDrawsNotEmpty);
        }
        Ok(PoolSnapshot {
            catalog: self.catalog.clone(),
            last_request_id,
        })
    }

    pub fn save_snapshot(&self, path: &Path, last_request_id: u64) -> Result<(), PoolError> {
        self.create_snapshot(last_request_id)?.save(path)
    }

    /// Replace all state from a snapshot file, returning its last request id
    pub fn load_snapshot(&mut self, path: &Path) -> Result<u64, PoolError> {
        let snapshot = PoolSnapshot::load(path)?;
        self.restore(&snapshot)?;
        Ok(snapshot.last_request_id)
    }

    /// Replace all state from an in-memory snapshot and rebuild the index
    pub fn restore(&mut self, snapshot: &PoolSnapshot) -> Result<(), PoolError> {
        PoolConfig {
            catalog: snapshot.catalog.clone(),
        }
        .validate()?;
        self.install(snapshot.catalog.clone());
        Ok(())
    }

    /// Replay a durable successful draw
    ///
    /// Replay may see a draw for an item an administrator later zeroed, so an
    /// item already at zero stays at zero.
    pub fn apply_draw_log(&mut self, item_id: &str) {
        let Some(&pos) = self.positions.get(item_id) else {
            tracing::warn!(item_id, "draw log for unknown item ignored");
            return;
        };
        let item = &mut self.catalog[pos];
        if item.quantity == 0 {
            return;
        }
        item.quantity -= 1;
        if self.index.item_remaining(item_id).unwrap_or(0) > 0 {
            self.index.update(item_id, -1);
        }
    }

    /// Replay a durable administrative update
    pub fn apply_update_log(&mut self, item_id: &str, quantity: u64, weight: u64) {
        let staged = self.pending.get(item_id).copied().unwrap_or(0);
        match self.positions.get(item_id) {
            Some(&pos) => {
                let item = &mut self.catalog[pos];
                item.quantity = quantity;
                item.weight = weight;
                let available = quantity.saturating_sub(staged);
                self.index.set_item(item_id, available, weight);
            }
            None => {
                self.positions.insert(item_id.to_string(), self.catalog.len());
                self.catalog.push(RewardItem::new(item_id, quantity, weight));
                self.rebuild_index();
            }
        }
    }

    fn install(&mut self, catalog: Vec<RewardItem>) {
        self.positions = catalog
            .iter()
            .enumerate()
            .map(|(pos, item)| (item.item_id.clone(), pos))
            .collect();
        self.catalog = catalog;
        self.pending.clear();
        self.index.reset(&self.catalog);
    }

    /// Reset the index from the catalog, then reapply staged removals
    fn rebuild_index(&mut self) {
        self.index.reset(&self.catalog);
        for (item_id, &count) in &self.pending {
            let available = self.index.item_remaining(item_id).unwrap_or(0);
            self.index.update(item_id, -(count.min(available) as i64));
        }
    }
}

#[cfg(test)]
#[path = "pool_tests.rs"]
mod tests;
