// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! JSON-lines codec: one self-describing object per line

use super::{records, Formatter};
use crate::entry::LogEntry;
use crate::error::FormatError;

#[derive(Debug, Default, Clone, Copy)]
pub struct JsonLinesFormatter;

impl Formatter for JsonLinesFormatter {
    fn encode(&self, entries: &[LogEntry]) -> Result<Vec<u8>, FormatError> {
        let mut out = Vec::with_capacity(entries.len() * 96);
        for entry in entries {
            serde_json::to_writer(&mut out, entry)?;
            out.push(b'\n');
        }
        Ok(out)
    }

    fn decode(&self, data: &[u8]) -> Result<Vec<LogEntry>, FormatError> {
        records(data)
            .map(|(line, record)| {
                serde_json::from_slice(record).map_err(|e| FormatError::InvalidRecord {
                    line,
                    reason: e.to_string(),
                })
            })
            .collect()
    }
}
