// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for storage, encoding and the WAL

use thiserror::Error;

/// Errors raised by a storage backend
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage full: {requested} bytes requested, {remaining} remaining")]
    Full { requested: u64, remaining: u64 },
    #[error("storage is closed")]
    Closed,
    #[error("invalid WAL header: {0}")]
    InvalidHeader(String),
    #[error("next WAL path too long for header: {0} bytes")]
    PathTooLong(usize),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while encoding or decoding log entries
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid record at line {line}: {reason}")]
    InvalidRecord { line: usize, reason: String },
    #[error("field {field} cannot be encoded: {value:?}")]
    Unencodable { field: &'static str, value: String },
}

/// Errors that can occur in WAL operations
#[derive(Debug, Error)]
pub enum WalError {
    #[error("WAL storage is full")]
    WalFull,
    #[error("WAL buffer is not empty")]
    BufferNotEmpty,
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("format error: {0}")]
    Format(#[from] FormatError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
