// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! rp-storage: write-ahead log for the reward pool
//!
//! Entries are buffered in memory, encoded by a [`Formatter`] and written in
//! batches to a [`Storage`] backend. A full backend is reported as
//! [`WalError::WalFull`] so the owner can rotate to a new target.

pub mod backend;
pub mod entry;
pub mod error;
pub mod formatter;
pub mod options;
pub mod parse;
pub mod wal;

#[cfg(any(test, feature = "test-support"))]
pub use backend::FakeStorage;
pub use backend::{FileStorage, MmapStorage, Storage};
pub use entry::{LogEntry, LogError};
pub use error::{FormatError, StorageError, WalError};
pub use formatter::{DelimitedFormatter, Formatter, JsonLinesFormatter};
pub use options::{FormatterKind, StorageKind, WalOptions};
pub use parse::{parse_wal, parse_wal_chain, truncate_wal, ParsedWal, WalChain, WalSegment};
pub use wal::Wal;
