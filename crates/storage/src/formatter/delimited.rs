// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Compact comma-delimited codec
//!
//! Field order per type:
//!
//! ```text
//! draw,<request_id>,<item_id>,<error_code>,<success>
//! update,<item_id>,<quantity>,<probability>
//! snapshot,<path>
//! rotate,<old_path>,<new_path>
//! ```
//!
//! There is no escaping, so text fields containing a comma or a line break
//! are rejected at encode time.

use super::{records, Formatter};
use crate::entry::{LogEntry, LogError};
use crate::error::FormatError;
use std::fmt::Write as _;
use std::str::FromStr;

#[derive(Debug, Default, Clone, Copy)]
pub struct DelimitedFormatter;

impl Formatter for DelimitedFormatter {
    fn encode(&self, entries: &[LogEntry]) -> Result<Vec<u8>, FormatError> {
        let mut out = String::with_capacity(entries.len() * 48);
        for entry in entries {
            encode_entry(entry, &mut out)?;
            out.push('\n');
        }
        Ok(out.into_bytes())
    }

    fn decode(&self, data: &[u8]) -> Result<Vec<LogEntry>, FormatError> {
        records(data)
            .map(|(line, record)| decode_record(line, record))
            .collect()
    }
}

fn encode_entry(entry: &LogEntry, out: &mut String) -> Result<(), FormatError> {
    // write! into a String cannot fail
    let _ = match entry {
        LogEntry::Draw {
            request_id,
            item_id,
            success,
            error_code,
        } => write!(
            out,
            "draw,{request_id},{},{},{success}",
            text("item_id", item_id)?,
            u8::from(*error_code)
        ),
        LogEntry::Update {
            item_id,
            quantity,
            weight,
        } => write!(
            out,
            "update,{},{quantity},{weight}",
            text("item_id", item_id)?
        ),
        LogEntry::Snapshot { path } => write!(out, "snapshot,{}", text("path", path)?),
        LogEntry::Rotate { old_path, new_path } => write!(
            out,
            "rotate,{},{}",
            text("old_path", old_path)?,
            text("new_path", new_path)?
        ),
    };
    Ok(())
}

fn text<'a>(field: &'static str, value: &'a str) -> Result<&'a str, FormatError> {
    if value.contains([',', '\n', '\r']) {
        return Err(FormatError::Unencodable {
            field,
            value: value.to_string(),
        });
    }
    Ok(value)
}

fn decode_record(line: usize, record: &[u8]) -> Result<LogEntry, FormatError> {
    let invalid = |reason: String| FormatError::InvalidRecord { line, reason };

    let record = std::str::from_utf8(record).map_err(|e| invalid(e.to_string()))?;
    let fields: Vec<&str> = record.split(',').collect();
    let expect = |count: usize| {
        if fields.len() == count {
            Ok(())
        } else {
            Err(invalid(format!(
                "{} record needs {count} fields, found {}",
                fields[0],
                fields.len()
            )))
        }
    };

    let entry = match fields[0] {
        "draw" => {
            expect(5)?;
            let code: u8 = number(line, "error_code", fields[3])?;
            LogEntry::Draw {
                request_id: number(line, "request_id", fields[1])?,
                item_id: fields[2].to_string(),
                error_code: LogError::try_from(code).map_err(invalid)?,
                success: number(line, "success", fields[4])?,
            }
        }
        "update" => {
            expect(4)?;
            LogEntry::Update {
                item_id: fields[1].to_string(),
                quantity: number(line, "quantity", fields[2])?,
                weight: number(line, "probability", fields[3])?,
            }
        }
        "snapshot" => {
            expect(2)?;
            LogEntry::Snapshot {
                path: fields[1].to_string(),
            }
        }
        "rotate" => {
            expect(3)?;
            LogEntry::Rotate {
                old_path: fields[1].to_string(),
                new_path: fields[2].to_string(),
            }
        }
        other => return Err(invalid(format!("unknown entry type {other:?}"))),
    };
    Ok(entry)
}

fn number<T: FromStr>(line: usize, field: &str, value: &str) -> Result<T, FormatError> {
    value.parse().map_err(|_| FormatError::InvalidRecord {
        line,
        reason: format!("invalid {field}: {value:?}"),
    })
}
