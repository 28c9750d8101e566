// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Entry codecs
//!
//! Both codecs are line oriented: every entry becomes exactly one
//! newline-terminated record, so a batch is the concatenation of its
//! entries and can be appended to storage as one write.

mod delimited;
mod json;

pub use delimited::DelimitedFormatter;
pub use json::JsonLinesFormatter;

use crate::entry::LogEntry;
use crate::error::FormatError;

/// Encodes entry batches to bytes and back
pub trait Formatter: Send + Sync {
    fn encode(&self, entries: &[LogEntry]) -> Result<Vec<u8>, FormatError>;

    fn decode(&self, data: &[u8]) -> Result<Vec<LogEntry>, FormatError>;
}

/// Split a buffer into `(line_number, line)` pairs, skipping blank lines
///
/// Line numbers are 1-based for error messages.
fn records(data: &[u8]) -> impl Iterator<Item = (usize, &[u8])> {
    data.split(|&b| b == b'\n')
        .enumerate()
        .map(|(i, line)| (i + 1, line.strip_suffix(b"\r").unwrap_or(line)))
        .filter(|(_, line)| !line.is_empty())
}

#[cfg(test)]
#[path = "formatter_tests.rs"]
mod tests;
