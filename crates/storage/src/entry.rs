// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! WAL log entries
//!
//! The `type` discriminator is part of the on-disk format and is written
//! verbatim by both formatters.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Reason code carried by a Draw entry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum LogError {
    #[default]
    None,
    PoolEmpty,
}

impl From<LogError> for u8 {
    fn from(code: LogError) -> u8 {
        match code {
            LogError::None => 0,
            LogError::PoolEmpty => 1,
        }
    }
}

impl TryFrom<u8> for LogError {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(LogError::None),
            1 => Ok(LogError::PoolEmpty),
            other => Err(format!("unknown error code {other}")),
        }
    }
}

/// A single record in the write-ahead log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LogEntry {
    Draw {
        request_id: u64,
        item_id: String,
        success: bool,
        error_code: LogError,
    },
    Update {
        item_id: String,
        quantity: u64,
        #[serde(rename = "probability")]
        weight: u64,
    },
    /// Marks that the pool state up to here is captured in `path`
    Snapshot { path: String },
    /// First entry of a WAL created by rotation
    Rotate { old_path: String, new_path: String },
}

impl LogEntry {
    pub fn draw_success(request_id: u64, item_id: impl Into<String>) -> Self {
        LogEntry::Draw {
            request_id,
            item_id: item_id.into(),
            success: true,
            error_code: LogError::None,
        }
    }

    pub fn draw_failure(request_id: u64, error_code: LogError) -> Self {
        LogEntry::Draw {
            request_id,
            item_id: String::new(),
            success: false,
            error_code,
        }
    }

    /// The wire name of this entry's type
    pub fn kind(&self) -> &'static str {
        match self {
            LogEntry::Draw { .. } => "draw",
            LogEntry::Update { .. } => "update",
            LogEntry::Snapshot { .. } => "snapshot",
            LogEntry::Rotate { .. } => "rotate",
        }
    }

    /// Request id of a Draw entry
    pub fn request_id(&self) -> Option<u64> {
        match self {
            LogEntry::Draw { request_id, .. } => Some(*request_id),
            _ => None,
        }
    }

    /// Whether replay changes pool state for this entry
    pub fn is_state_change(&self) -> bool {
        matches!(
            self,
            LogEntry::Draw { success: true, .. } | LogEntry::Update { .. }
        )
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogEntry::Draw {
                request_id,
                item_id,
                success: true,
                ..
            } => write!(f, "draw #{request_id} -> {item_id}"),
            LogEntry::Draw {
                request_id,
                error_code,
                ..
            } => write!(f, "draw #{request_id} failed ({error_code:?})"),
            LogEntry::Update {
                item_id,
                quantity,
                weight,
            } => write!(f, "update {item_id} qty={quantity} weight={weight}"),
            LogEntry::Snapshot { path } => write!(f, "snapshot {path}"),
            LogEntry::Rotate { old_path, new_path } => {
                write!(f, "rotate {old_path} -> {new_path}")
            }
        }
    }
}

#[cfg(test)]
#[path = "entry_tests.rs"]
mod tests;
