// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Storage backends for WAL bytes

#[cfg(any(test, feature = "test-support"))]
mod fake;
mod file;
pub(crate) mod mmap;

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeStorage;
pub use file::FileStorage;
pub use mmap::MmapStorage;

use crate::error::StorageError;
use std::path::Path;

/// Byte sink the WAL writes batches into
///
/// A write is all-or-nothing: a backend that cannot take the whole slice
/// returns [`StorageError::Full`] and leaves its contents unchanged. Written
/// bytes are durable only after [`Storage::flush`].
pub trait Storage: Send {
    fn write(&mut self, data: &[u8]) -> Result<(), StorageError>;

    /// Write several slices as one batch
    fn write_all(&mut self, chunks: &[&[u8]]) -> Result<(), StorageError> {
        let requested: u64 = chunks.iter().map(|c| c.len() as u64).sum();
        if let Some(remaining) = self.remaining() {
            if requested > remaining {
                return Err(StorageError::Full {
                    requested,
                    remaining,
                });
            }
        }
        for chunk in chunks {
            self.write(chunk)?;
        }
        Ok(())
    }

    /// Free space, or None when the backend grows without bound
    fn remaining(&self) -> Option<u64>;

    /// Whether `len` more bytes fit
    fn can_write(&self, len: usize) -> bool {
        match self.remaining() {
            Some(remaining) => len as u64 <= remaining,
            None => true,
        }
    }

    /// Make every written byte durable (fsync / msync)
    fn flush(&mut self) -> Result<(), StorageError>;

    /// Drop bytes written since the last successful flush
    ///
    /// After a failed write or flush the backend must not keep a batch the
    /// owner is about to revert; the next flush would make it durable.
    fn discard_unflushed(&mut self) -> Result<(), StorageError>;

    /// Bytes durably written to the current target
    fn size(&self) -> Result<u64, StorageError>;

    /// Switch to a new backing target
    fn rotate(&mut self, new_path: &Path) -> Result<(), StorageError>;

    fn close(&mut self) -> Result<(), StorageError>;

    fn path(&self) -> &Path;
}

/// Create the parent directory of `path` if it has one
fn ensure_parent(path: &Path) -> std::io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent),
        _ => Ok(()),
    }
}
