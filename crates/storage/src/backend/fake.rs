// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory storage with scriptable failures, for tests

use super::Storage;
use crate::error::StorageError;
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct FakeState {
    path: PathBuf,
    /// Flushed bytes per path
    durable: BTreeMap<PathBuf, Vec<u8>>,
    /// Written but not yet flushed bytes for the current path
    staged: Vec<u8>,
    capacity: Option<u64>,
    full_writes: usize,
    failing_flushes: usize,
    closed: bool,
    flush_calls: usize,
    rotations: Vec<PathBuf>,
}

/// Cloneable handle to a shared in-memory store
///
/// Keep one clone in the test to script failures and inspect what reached
/// "disk" after the other clone is moved into a WAL.
#[derive(Debug, Clone, Default)]
pub struct FakeStorage {
    state: Arc<Mutex<FakeState>>,
    path: PathBuf,
}

impl FakeStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let state = FakeState {
            path: path.clone(),
            ..FakeState::default()
        };
        Self {
            state: Arc::new(Mutex::new(state)),
            path,
        }
    }

    /// Reject every write that would push a path past `bytes`
    pub fn with_capacity(self, bytes: u64) -> Self {
        self.lock().capacity = Some(bytes);
        self
    }

    /// Make the next `n` writes fail with `StorageError::Full`
    pub fn fail_writes_with_full(&self, n: usize) {
        self.lock().full_writes = n;
    }

    /// Make the next `n` flushes fail with an IO error; written bytes stay
    /// staged until discarded or flushed
    pub fn fail_flushes(&self, n: usize) {
        self.lock().failing_flushes = n;
    }

    /// Flushed bytes for `path`
    pub fn contents(&self, path: &Path) -> Vec<u8> {
        self.lock().durable.get(path).cloned().unwrap_or_default()
    }

    pub fn current_path(&self) -> PathBuf {
        self.lock().path.clone()
    }

    pub fn rotations(&self) -> Vec<PathBuf> {
        self.lock().rotations.clone()
    }

    pub fn flush_calls(&self) -> usize {
        self.lock().flush_calls
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        // a panicking test thread poisons the lock; the data is still usable
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl FakeState {
    fn used(&self) -> u64 {
        let durable = self.durable.get(&self.path).map_or(0, Vec::len);
        (durable + self.staged.len()) as u64
    }
}

impl Storage for FakeStorage {
    fn write(&mut self, data: &[u8]) -> Result<(), StorageError> {
        let mut state = self.lock();
        if state.closed {
            return Err(StorageError::Closed);
        }
        let remaining = state
            .capacity
            .map_or(u64::MAX, |cap| cap.saturating_sub(state.used()));
        if state.full_writes > 0 {
            state.full_writes -= 1;
            return Err(StorageError::Full {
                requested: data.len() as u64,
                remaining: 0,
            });
        }
        if data.len() as u64 > remaining {
            return Err(StorageError::Full {
                requested: data.len() as u64,
                remaining,
            });
        }
        state.staged.extend_from_slice(data);
        Ok(())
    }

    fn remaining(&self) -> Option<u64> {
        let state = self.lock();
        state.capacity.map(|cap| cap.saturating_sub(state.used()))
    }

    fn flush(&mut self) -> Result<(), StorageError> {
        let mut state = self.lock();
        if state.closed {
            return Err(StorageError::Closed);
        }
        state.flush_calls += 1;
        if state.failing_flushes > 0 {
            state.failing_flushes -= 1;
            return Err(io::Error::other("injected flush failure").into());
        }
        let staged = std::mem::take(&mut state.staged);
        let path = state.path.clone();
        state.durable.entry(path).or_default().extend(staged);
        Ok(())
    }

    fn discard_unflushed(&mut self) -> Result<(), StorageError> {
        self.lock().staged.clear();
        Ok(())
    }

    fn size(&self) -> Result<u64, StorageError> {
        let state = self.lock();
        Ok(state.durable.get(&state.path).map_or(0, Vec::len) as u64)
    }

    fn rotate(&mut self, new_path: &Path) -> Result<(), StorageError> {
        self.flush()?;
        let mut state = self.lock();
        state.path = new_path.to_path_buf();
        state.durable.entry(new_path.to_path_buf()).or_default();
        state.rotations.push(new_path.to_path_buf());
        drop(state);
        self.path = new_path.to_path_buf();
        Ok(())
    }

    fn close(&mut self) -> Result<(), StorageError> {
        if self.lock().closed {
            return Ok(());
        }
        self.flush()?;
        self.lock().closed = true;
        Ok(())
    }

    fn path(&self) -> &Path {
        &self.path
    }
}
