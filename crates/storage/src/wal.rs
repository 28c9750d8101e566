// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Write-ahead log: in-memory batch over a storage backend
//!
//! `log_*` calls only encode into the buffer. [`Wal::flush`] hands the whole
//! buffer to storage in one write and syncs it. A failed flush leaves storage
//! at its last durable byte and keeps the buffer; the owner decides whether
//! to discard it ([`Wal::reset`]) and, on [`WalError::WalFull`], rotate.

use crate::backend::Storage;
use crate::entry::{LogEntry, LogError};
use crate::error::{StorageError, WalError};
use crate::formatter::Formatter;
use crate::options::WalOptions;
use std::path::Path;

pub struct Wal {
    formatter: Box<dyn Formatter>,
    storage: Box<dyn Storage>,
    buffer: Vec<u8>,
    /// Entries encoded into `buffer`
    buffered: Vec<LogEntry>,
    /// Entries flushed since open or the last reset
    flushed: u64,
}

impl Wal {
    pub fn new(formatter: Box<dyn Formatter>, storage: Box<dyn Storage>) -> Self {
        Self {
            formatter,
            storage,
            buffer: Vec::with_capacity(4096),
            buffered: Vec::new(),
            flushed: 0,
        }
    }

    /// Open a WAL at `path` with the codec and backend named in `options`
    pub fn open_with(path: &Path, options: &WalOptions) -> Result<Self, WalError> {
        let storage = options.storage.open(path)?;
        tracing::info!(
            path = %path.display(),
            formatter = ?options.formatter,
            storage = ?options.storage,
            "opened WAL"
        );
        Ok(Self::new(options.formatter.build(), storage))
    }

    /// Encode an entry into the buffer
    pub fn log(&mut self, entry: LogEntry) -> Result<(), WalError> {
        let bytes = self.formatter.encode(std::slice::from_ref(&entry))?;
        self.buffer.extend_from_slice(&bytes);
        self.buffered.push(entry);
        Ok(())
    }

    pub fn log_draw(
        &mut self,
        request_id: u64,
        item_id: &str,
        success: bool,
        error_code: LogError,
    ) -> Result<(), WalError> {
        self.log(LogEntry::Draw {
            request_id,
            item_id: item_id.to_string(),
            success,
            error_code,
        })
    }

    pub fn log_update(
        &mut self,
        item_id: &str,
        quantity: u64,
        weight: u64,
    ) -> Result<(), WalError> {
        self.log(LogEntry::Update {
            item_id: item_id.to_string(),
            quantity,
            weight,
        })
    }

    pub fn log_snapshot(&mut self, path: &Path) -> Result<(), WalError> {
        self.log(LogEntry::Snapshot {
            path: path.display().to_string(),
        })
    }

    pub fn log_rotate(&mut self, old_path: &Path, new_path: &Path) -> Result<(), WalError> {
        self.log(LogEntry::Rotate {
            old_path: old_path.display().to_string(),
            new_path: new_path.display().to_string(),
        })
    }

    /// Write the buffered batch and make it durable
    ///
    /// Returns the entries that became durable. On any failure the buffer is
    /// kept and storage holds nothing of the batch; a full backend yields
    /// [`WalError::WalFull`].
    pub fn flush(&mut self) -> Result<Vec<LogEntry>, WalError> {
        if self.buffer.is_empty() {
            return Ok(Vec::new());
        }
        if !self.storage.can_write(self.buffer.len()) {
            return Err(self.full(self.buffer.len() as u64, self.storage.remaining()));
        }

        let written = self
            .storage
            .write(&self.buffer)
            .and_then(|()| self.storage.flush());
        match written {
            Ok(()) => {}
            Err(StorageError::Full {
                requested,
                remaining,
            }) => return Err(self.full(requested, Some(remaining))),
            Err(e) => {
                self.discard_unflushed();
                return Err(e.into());
            }
        }

        self.buffer.clear();
        let entries = std::mem::take(&mut self.buffered);
        self.flushed += entries.len() as u64;
        Ok(entries)
    }

    fn full(&self, requested: u64, remaining: Option<u64>) -> WalError {
        tracing::warn!(
            path = %self.storage.path().display(),
            requested,
            remaining,
            "WAL storage full"
        );
        WalError::WalFull
    }

    fn discard_unflushed(&mut self) {
        if let Err(e) = self.storage.discard_unflushed() {
            tracing::error!(
                path = %self.storage.path().display(),
                error = %e,
                "could not discard unflushed WAL bytes"
            );
        }
    }

    /// Point storage at a new target; the buffer must be empty
    pub fn rotate(&mut self, new_path: &Path) -> Result<(), WalError> {
        if !self.buffer.is_empty() {
            return Err(WalError::BufferNotEmpty);
        }
        self.storage.rotate(new_path)?;
        Ok(())
    }

    /// Drop the buffered batch and the flush bookkeeping
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.buffered.clear();
        self.flushed = 0;
    }

    /// Bytes durably written to the current target
    pub fn size(&self) -> Result<u64, WalError> {
        Ok(self.storage.size()?)
    }

    /// Entries buffered and not yet flushed
    pub fn pending_entries(&self) -> usize {
        self.buffered.len()
    }

    /// Entries flushed since open or the last reset
    pub fn flushed_entries(&self) -> u64 {
        self.flushed
    }

    pub fn path(&self) -> &Path {
        self.storage.path()
    }

    pub fn close(&mut self) -> Result<(), WalError> {
        if !self.buffer.is_empty() {
            tracing::warn!(
                entries = self.buffered.len(),
                "closing WAL with unflushed entries"
            );
        }
        self.storage.close()?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "wal_tests.rs"]
mod tests;
