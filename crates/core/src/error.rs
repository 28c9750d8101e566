// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the reward pool

use thiserror::Error;

/// Errors that can occur in pool operations
#[derive(Debug, Error)]
pub enum PoolError {
    #[error("reward pool is empty")]
    EmptyRewardPool,
    #[error("pending draws remain; commit or revert them first")]
    PendingDrawsNotEmpty,
    #[error("duplicate item id in catalog: {0}")]
    DuplicateItem(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
