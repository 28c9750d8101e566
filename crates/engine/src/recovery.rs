// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Rebuilding a pool from snapshot + WAL after a restart
//!
//! ```text
//! wal.000 ─sealed─► wal.001 ─sealed─► wal.002
//!   ... Snapshot{s1} draws ... Rotate Snapshot{s2} draws ...
//!                                     ▲
//!                  replay starts after the last marker whose file loads
//! ```
//!
//! Everything before that marker is dead weight once recovery succeeds:
//! [`Recovered::prune`] deletes the WAL files preceding the marker's file and
//! the snapshots named by older markers.

use crate::error::EngineError;
use crate::replay::replay_logs;
use rp_core::{PoolConfig, PoolSnapshot, RewardPool, SelectorKind};
use rp_storage::{parse_wal_chain, truncate_wal, Formatter, LogEntry, WalChain};
use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};

/// A pool ready for traffic
#[derive(Debug)]
pub struct Recovered {
    pub pool: RewardPool,
    pub last_request_id: u64,
    /// WAL to continue appending to
    pub wal_path: PathBuf,
    /// First WAL file still needed; start the next recovery here
    pub chain_start: PathBuf,
    obsolete: Obsolete,
}

/// Files a successful recovery no longer depends on
#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct Obsolete {
    wal_files: Vec<PathBuf>,
    snapshots: Vec<PathBuf>,
}

impl Recovered {
    /// Delete WAL files and snapshots older than the recovery base
    ///
    /// Returns the removed paths. Files already gone are skipped.
    pub fn prune(&self) -> Result<Vec<PathBuf>, EngineError> {
        let mut removed = Vec::new();
        for path in self.obsolete.wal_files.iter().chain(&self.obsolete.snapshots) {
            match std::fs::remove_file(path) {
                Ok(()) => removed.push(path.clone()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        if !removed.is_empty() {
            tracing::info!(
                removed = removed.len(),
                chain_start = %self.chain_start.display(),
                "pruned files older than recovery base"
            );
        }
        Ok(removed)
    }
}

/// Load the newest usable snapshot and replay the WAL after it
///
/// The base state is, in order of preference: the snapshot named by the
/// last loadable Snapshot marker in the WAL chain, `snapshot_path` if it
/// exists, then the config catalog. Undecodable WAL data aborts recovery.
pub fn recover_pool(
    snapshot_path: Option<&Path>,
    wal_path: &Path,
    config_path: &Path,
    formatter: &dyn Formatter,
    selector: SelectorKind,
) -> Result<Recovered, EngineError> {
    let chain = parse_wal_chain(wal_path, formatter).map_err(|e| {
        EngineError::Recovery(format!("cannot read WAL {}: {e}", wal_path.display()))
    })?;

    if let Some(len) = chain.torn_at {
        truncate_wal(&chain.last_path, len).map_err(|e| {
            EngineError::Recovery(format!(
                "cannot drop torn tail of {}: {e}",
                chain.last_path.display()
            ))
        })?;
    }

    let marker = last_loadable_marker(&chain.entries);
    let (chain_start, obsolete) = match &marker {
        Some((_, index)) => obsolete_before(&chain, *index, snapshot_path),
        None => (
            chain
                .segments
                .first()
                .map_or_else(|| wal_path.to_path_buf(), |s| s.path.clone()),
            Obsolete::default(),
        ),
    };
    let (base, replay_from) = match marker {
        Some((snapshot, index)) => (snapshot, index + 1),
        None => (base_snapshot(snapshot_path, config_path)?, 0),
    };

    let mut pool = RewardPool::new(base.catalog, selector)?;
    let replayed = &chain.entries[replay_from..];
    let last_request_id = replay_logs(&mut pool, replayed, base.last_request_id);

    tracing::info!(
        wal = %chain.last_path.display(),
        replayed = replayed.len(),
        last_request_id,
        "recovered reward pool"
    );
    Ok(Recovered {
        pool,
        last_request_id,
        wal_path: chain.last_path,
        chain_start,
        obsolete,
    })
}

/// Chain files before the one holding `marker`, and snapshots named by
/// earlier markers
fn obsolete_before(
    chain: &WalChain,
    marker: usize,
    keep_snapshot: Option<&Path>,
) -> (PathBuf, Obsolete) {
    let holder = chain
        .segments
        .iter()
        .rposition(|s| s.first_entry <= marker)
        .unwrap_or(0);
    let chain_start = chain
        .segments
        .get(holder)
        .map_or_else(|| chain.last_path.clone(), |s| s.path.clone());
    let wal_files = chain.segments[..holder]
        .iter()
        .map(|s| s.path.clone())
        .collect();

    let kept = match &chain.entries[marker] {
        LogEntry::Snapshot { path } => Some(PathBuf::from(path)),
        _ => None,
    };
    let snapshots: BTreeSet<PathBuf> = chain.entries[..marker]
        .iter()
        .filter_map(|entry| match entry {
            LogEntry::Snapshot { path } => Some(PathBuf::from(path)),
            _ => None,
        })
        .filter(|path| Some(path) != kept.as_ref())
        .filter(|path| Some(path.as_path()) != keep_snapshot)
        .collect();

    (
        chain_start,
        Obsolete {
            wal_files,
            snapshots: snapshots.into_iter().collect(),
        },
    )
}

/// Newest Snapshot marker whose file can be read, with its position
fn last_loadable_marker(entries: &[LogEntry]) -> Option<(PoolSnapshot, usize)> {
    entries
        .iter()
        .enumerate()
        .rev()
        .find_map(|(index, entry)| match entry {
            LogEntry::Snapshot { path } => match PoolSnapshot::load(Path::new(path)) {
                Ok(snapshot) => Some((snapshot, index)),
                Err(e) => {
                    tracing::warn!(path = %path, error = %e, "snapshot marker unusable, trying older");
                    None
                }
            },
            _ => None,
        })
}

fn base_snapshot(
    snapshot_path: Option<&Path>,
    config_path: &Path,
) -> Result<PoolSnapshot, EngineError> {
    if let Some(path) = snapshot_path.filter(|p| p.exists()) {
        tracing::info!(path = %path.display(), "recovering from snapshot file");
        return Ok(PoolSnapshot::load(path)?);
    }
    tracing::info!(path = %config_path.display(), "recovering from config");
    let config = PoolConfig::load(config_path)?;
    Ok(PoolSnapshot {
        catalog: config.catalog,
        last_request_id: 0,
    })
}

#[cfg(test)]
#[path = "recovery_tests.rs"]
mod tests;
