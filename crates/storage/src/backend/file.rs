// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only file backend

use super::{ensure_parent, Storage};
use crate::error::StorageError;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Unbounded append-only WAL file; flush is fsync
pub struct FileStorage {
    path: PathBuf,
    file: Option<File>,
    /// Bytes in the file as of the last flush
    synced_len: u64,
}

impl FileStorage {
    /// Open or create a WAL file for appending
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        let file = open_append(path)?;
        let synced_len = file.metadata()?.len();
        Ok(Self {
            path: path.to_path_buf(),
            file: Some(file),
            synced_len,
        })
    }

    fn file(&mut self) -> Result<&mut File, StorageError> {
        self.file.as_mut().ok_or(StorageError::Closed)
    }
}

fn open_append(path: &Path) -> Result<File, StorageError> {
    ensure_parent(path)?;
    Ok(OpenOptions::new()
        .create(true)
        .append(true)
        .read(true)
        .open(path)?)
}

impl Storage for FileStorage {
    fn write(&mut self, data: &[u8]) -> Result<(), StorageError> {
        self.file()?.write_all(data)?;
        Ok(())
    }

    fn remaining(&self) -> Option<u64> {
        None
    }

    fn flush(&mut self) -> Result<(), StorageError> {
        let file = self.file()?;
        file.sync_all()?;
        let len = file.metadata()?.len();
        self.synced_len = len;
        Ok(())
    }

    fn discard_unflushed(&mut self) -> Result<(), StorageError> {
        let synced_len = self.synced_len;
        let file = self.file()?;
        let len = file.metadata()?.len();
        if len != synced_len {
            file.set_len(synced_len)?;
            file.sync_all()?;
            tracing::warn!(
                path = %self.path.display(),
                dropped = len.saturating_sub(synced_len),
                "truncated unflushed WAL bytes"
            );
        }
        Ok(())
    }

    fn size(&self) -> Result<u64, StorageError> {
        if self.file.is_none() {
            return Err(StorageError::Closed);
        }
        Ok(self.synced_len)
    }

    fn rotate(&mut self, new_path: &Path) -> Result<(), StorageError> {
        self.flush()?;
        let file = open_append(new_path)?;
        self.synced_len = file.metadata()?.len();
        self.file = Some(file);
        self.path = new_path.to_path_buf();
        tracing::info!(path = %new_path.display(), "rotated WAL file");
        Ok(())
    }

    fn close(&mut self) -> Result<(), StorageError> {
        if let Some(file) = self.file.take() {
            file.sync_all()?;
        }
        Ok(())
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
#[path = "file_tests.rs"]
mod tests;
