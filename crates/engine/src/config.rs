// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine options

use crate::error::EngineError;
use rp_core::SelectorKind;
use rp_storage::WalOptions;
use serde::{Deserialize, Serialize};
use std::path::Path;

const DEFAULT_FLUSH_AFTER_N_DRAW: usize = 10;
const DEFAULT_REQUEST_BUFFER_SIZE: usize = 100;
const DEFAULT_STREAM_BUFFER_SIZE: usize = 1024;

/// Actor tuning knobs; zero means "use the default"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemOptions {
    /// Draws buffered before a flush is forced
    pub flush_after_n_draw: usize,
    /// Mailbox capacity
    pub request_buffer_size: usize,
    /// Streaming queue capacity
    pub stream_buffer_size: usize,
}

impl Default for SystemOptions {
    fn default() -> Self {
        Self {
            flush_after_n_draw: DEFAULT_FLUSH_AFTER_N_DRAW,
            request_buffer_size: DEFAULT_REQUEST_BUFFER_SIZE,
            stream_buffer_size: DEFAULT_STREAM_BUFFER_SIZE,
        }
    }
}

impl SystemOptions {
    /// Replace zero values with defaults
    pub fn normalized(self) -> Self {
        fn or(value: usize, default: usize) -> usize {
            if value == 0 {
                default
            } else {
                value
            }
        }
        Self {
            flush_after_n_draw: or(self.flush_after_n_draw, DEFAULT_FLUSH_AFTER_N_DRAW),
            request_buffer_size: or(self.request_buffer_size, DEFAULT_REQUEST_BUFFER_SIZE),
            stream_buffer_size: or(self.stream_buffer_size, DEFAULT_STREAM_BUFFER_SIZE),
        }
    }
}

/// Everything a host needs to build a system, loadable from TOML
///
/// ```toml
/// selector = "fenwick"
///
/// [system]
/// flush_after_n_draw = 10
///
/// [wal]
/// formatter = "delimited"
/// storage = { kind = "mmap", capacity_bytes = 1048576 }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub selector: SelectorKind,
    pub system: SystemOptions,
    pub wal: WalOptions,
}

impl EngineConfig {
    pub fn from_toml(text: &str) -> Result<Self, EngineError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, EngineError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
