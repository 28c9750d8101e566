// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Path generation collaborator
//!
//! WAL files are named `wal.NNN`; snapshots are
//! `snapshot-<seq:08>-<UTC timestamp>.json`, so a snapshot still referenced
//! by an older WAL marker is never overwritten.

use chrono::Utc;
use std::path::{Path, PathBuf};

const WAL_PREFIX: &str = "wal.";
const SNAPSHOT_PREFIX: &str = "snapshot-";

/// Paths the processor asks for when it rotates or snapshots
pub trait Utils: Send + Sync {
    /// Target for a rotation, or None when rotation is not possible
    fn gen_rotated_wal_path(&self) -> Option<PathBuf>;

    /// Fresh snapshot file path, or None when snapshots are disabled
    fn gen_snapshot_path(&self) -> Option<PathBuf>;

    /// The WAL after the newest one on disk
    fn gen_next_wal_path(&self) -> std::io::Result<Option<PathBuf>>;
}

/// Directory-backed paths; an empty directory disables that capability
#[derive(Debug, Clone, Default)]
pub struct DefaultUtils {
    wal_dir: Option<PathBuf>,
    snapshot_dir: Option<PathBuf>,
}

impl DefaultUtils {
    pub fn new(wal_dir: impl Into<PathBuf>, snapshot_dir: impl Into<PathBuf>) -> Self {
        fn non_empty(path: PathBuf) -> Option<PathBuf> {
            (!path.as_os_str().is_empty()).then_some(path)
        }
        Self {
            wal_dir: non_empty(wal_dir.into()),
            snapshot_dir: non_empty(snapshot_dir.into()),
        }
    }

    pub fn wal_path(dir: &Path, seq: u64) -> PathBuf {
        dir.join(format!("{WAL_PREFIX}{seq:03}"))
    }

    /// Newest `wal.NNN` on disk, or `wal.000` when there is none
    pub fn latest_wal_path(&self) -> std::io::Result<Option<PathBuf>> {
        let Some(dir) = &self.wal_dir else {
            return Ok(None);
        };
        let seq = highest_seq(dir, WAL_PREFIX, parse_wal_seq)?.unwrap_or(0);
        Ok(Some(Self::wal_path(dir, seq)))
    }

    /// Oldest `wal.NNN` on disk, or `wal.000` when there is none
    ///
    /// After pruning, an mmap chain starts here.
    pub fn earliest_wal_path(&self) -> std::io::Result<Option<PathBuf>> {
        let Some(dir) = &self.wal_dir else {
            return Ok(None);
        };
        let seq = seq_range(dir, WAL_PREFIX, parse_wal_seq)?.map_or(0, |(low, _)| low);
        Ok(Some(Self::wal_path(dir, seq)))
    }
}

impl Utils for DefaultUtils {
    fn gen_rotated_wal_path(&self) -> Option<PathBuf> {
        match self.gen_next_wal_path() {
            Ok(path) => path,
            Err(e) => {
                tracing::error!(error = %e, "cannot scan WAL directory");
                None
            }
        }
    }

    fn gen_snapshot_path(&self) -> Option<PathBuf> {
        let dir = self.snapshot_dir.as_ref()?;
        let seq = match highest_seq(dir, SNAPSHOT_PREFIX, parse_snapshot_seq) {
            Ok(seq) => seq.map_or(1, |s| s + 1),
            Err(e) => {
                tracing::error!(error = %e, "cannot scan snapshot directory");
                return None;
            }
        };
        let timestamp = Utc::now().format("%Y%m%dT%H%M%S%.3fZ");
        Some(dir.join(format!("{SNAPSHOT_PREFIX}{seq:08}-{timestamp}.json")))
    }

    fn gen_next_wal_path(&self) -> std::io::Result<Option<PathBuf>> {
        let Some(dir) = &self.wal_dir else {
            return Ok(None);
        };
        let next = highest_seq(dir, WAL_PREFIX, parse_wal_seq)?.map_or(0, |s| s + 1);
        Ok(Some(Self::wal_path(dir, next)))
    }
}

fn parse_wal_seq(name: &str) -> Option<u64> {
    name.strip_prefix(WAL_PREFIX)?.parse().ok()
}

fn parse_snapshot_seq(name: &str) -> Option<u64> {
    let rest = name.strip_prefix(SNAPSHOT_PREFIX)?;
    rest.split('-').next()?.parse().ok()
}

fn highest_seq(
    dir: &Path,
    prefix: &str,
    parse: fn(&str) -> Option<u64>,
) -> std::io::Result<Option<u64>> {
    Ok(seq_range(dir, prefix, parse)?.map(|(_, high)| high))
}

/// Lowest and highest sequence among files in `dir` matching `parse`; a
/// missing directory has none
fn seq_range(
    dir: &Path,
    prefix: &str,
    parse: fn(&str) -> Option<u64>,
) -> std::io::Result<Option<(u64, u64)>> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e),
    };
    let mut range: Option<(u64, u64)> = None;
    for entry in entries {
        let name = entry?.file_name();
        let Some(name) = name.to_str() else { continue };
        if !name.starts_with(prefix) {
            continue;
        }
        if let Some(seq) = parse(name) {
            range = Some(match range {
                Some((low, high)) => (low.min(seq), high.max(seq)),
                None => (seq, seq),
            });
        }
    }
    Ok(range)
}

#[cfg(test)]
#[path = "utils_tests.rs"]
mod tests;
