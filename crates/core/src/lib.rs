// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! rp-core: reward catalog, weighted selection and the staged-draw pool
//!
//! This crate provides:
//! - Catalog, config and snapshot types with their JSON file formats
//! - Two interchangeable weighted indexes (prefix-sum and Fenwick tree)
//! - `RewardPool`, which stages draws until the caller commits or reverts them

pub mod error;
pub mod item;
pub mod pool;
pub mod selector;

pub use error::PoolError;
pub use item::{PoolConfig, PoolSnapshot, RewardItem};
pub use pool::RewardPool;
pub use selector::{FenwickIndex, PrefixSumIndex, SelectorKind, WeightedIndex};
