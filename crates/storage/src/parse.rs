// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reading WAL files back for replay
//!
//! A plain WAL file that does not end in a newline was cut short mid-append;
//! the incomplete record is reported as a torn tail instead of an error.
//! Undecodable complete records are still errors.

use crate::backend::mmap::{Header, HEADER_SIZE};
use crate::entry::LogEntry;
use crate::error::WalError;
use crate::formatter::Formatter;
use std::collections::HashSet;
use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};

/// Decoded contents of one WAL file
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ParsedWal {
    pub entries: Vec<LogEntry>,
    /// Where the file continues, if it was sealed by rotation
    pub next_path: Option<PathBuf>,
    /// Length of the complete records when the file ends in a partial one
    pub torn_at: Option<u64>,
}

/// One file of a chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalSegment {
    pub path: PathBuf,
    /// Index of this file's first entry in [`WalChain::entries`]
    pub first_entry: usize,
}

/// Entries of a rotation chain in log order
#[derive(Debug, PartialEq, Eq)]
pub struct WalChain {
    pub entries: Vec<LogEntry>,
    /// Last file of the chain, where appending should resume
    pub last_path: PathBuf,
    /// Files that were read, in chain order
    pub segments: Vec<WalSegment>,
    /// Set when `last_path` ends in a torn record; see [`truncate_wal`]
    pub torn_at: Option<u64>,
}

/// Read and decode every durable entry in `path`
///
/// A missing file is an empty log. Files with an mmap header contribute
/// only their flushed data region.
pub fn parse_wal(path: &Path, formatter: &dyn Formatter) -> Result<ParsedWal, WalError> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(ParsedWal::default()),
        Err(e) => return Err(e.into()),
    };

    if !Header::detect(&bytes) {
        let complete = bytes.iter().rposition(|&b| b == b'\n').map_or(0, |i| i + 1);
        let torn_at = (complete < bytes.len()).then_some(complete as u64);
        if torn_at.is_some() {
            tracing::warn!(
                path = %path.display(),
                valid = complete,
                dropped = bytes.len() - complete,
                "WAL ends in an incomplete record, ignoring it"
            );
        }
        return Ok(ParsedWal {
            entries: formatter.decode(&bytes[..complete])?,
            next_path: None,
            torn_at,
        });
    }

    let header = Header::decode(&bytes)?;
    let end = HEADER_SIZE.saturating_add(header.data_length as usize);
    let data = bytes.get(HEADER_SIZE..end).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!(
                "{}: data length {} exceeds file size",
                path.display(),
                header.data_length
            ),
        )
    })?;
    Ok(ParsedWal {
        entries: formatter.decode(data)?,
        next_path: header.next_path.map(PathBuf::from),
        torn_at: None,
    })
}

/// Parse `start` and every file it was rotated into
///
/// Links are followed until a file has no successor, is missing, or was
/// already visited.
pub fn parse_wal_chain(start: &Path, formatter: &dyn Formatter) -> Result<WalChain, WalError> {
    let mut entries = Vec::new();
    let mut segments = Vec::new();
    let mut torn_at = None;
    let mut visited = HashSet::new();
    let mut current = start.to_path_buf();

    loop {
        if !visited.insert(current.clone()) {
            tracing::warn!(path = %current.display(), "WAL chain loops, stopping");
            break;
        }
        if !current.exists() {
            if current != start {
                tracing::warn!(path = %current.display(), "rotated WAL missing, chain ends");
            }
            break;
        }

        let parsed = parse_wal(&current, formatter)?;
        tracing::debug!(
            path = %current.display(),
            entries = parsed.entries.len(),
            "parsed WAL file"
        );
        segments.push(WalSegment {
            path: current.clone(),
            first_entry: entries.len(),
        });
        entries.extend(parsed.entries);
        match parsed.next_path {
            Some(next) => current = next,
            None => {
                torn_at = parsed.torn_at;
                break;
            }
        }
    }

    Ok(WalChain {
        entries,
        last_path: current,
        segments,
        torn_at,
    })
}

/// Cut a plain WAL file back to `len` bytes and sync it
pub fn truncate_wal(path: &Path, len: u64) -> Result<(), WalError> {
    let file = OpenOptions::new().write(true).open(path)?;
    file.set_len(len)?;
    file.sync_all()?;
    tracing::info!(path = %path.display(), len, "WAL truncated at last complete record");
    Ok(())
}

#[cfg(test)]
#[path = "parse_tests.rs"]
mod tests;
