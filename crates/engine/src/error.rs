// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the engine

use rp_core::PoolError;
use rp_storage::WalError;
use thiserror::Error;

/// Errors that can occur in the engine
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("pool error: {0}")]
    Pool(#[from] PoolError),
    #[error("WAL error: {0}")]
    Wal(#[from] WalError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),
    #[error("system is shutting down")]
    ShuttingDown,
    #[error("WAL is full and no rotation path is configured")]
    NoRotationPath,
    #[error("no snapshot path is configured")]
    NoSnapshotPath,
    #[error("recovery failed: {0}")]
    Recovery(String),
}
