// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! WAL construction options

use crate::backend::{FileStorage, MmapStorage, Storage};
use crate::error::StorageError;
use crate::formatter::{DelimitedFormatter, Formatter, JsonLinesFormatter};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default data capacity of an mmap WAL file (64 MiB)
pub const DEFAULT_MMAP_CAPACITY: u64 = 64 * 1024 * 1024;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatterKind {
    #[default]
    Json,
    Delimited,
}

impl FormatterKind {
    pub fn build(self) -> Box<dyn Formatter> {
        match self {
            FormatterKind::Json => Box::new(JsonLinesFormatter),
            FormatterKind::Delimited => Box::new(DelimitedFormatter),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StorageKind {
    #[default]
    File,
    Mmap {
        #[serde(default = "default_mmap_capacity")]
        capacity_bytes: u64,
    },
}

fn default_mmap_capacity() -> u64 {
    DEFAULT_MMAP_CAPACITY
}

impl StorageKind {
    pub fn open(self, path: &Path) -> Result<Box<dyn Storage>, StorageError> {
        Ok(match self {
            StorageKind::File => Box::new(FileStorage::open(path)?),
            StorageKind::Mmap { capacity_bytes } => {
                Box::new(MmapStorage::open(path, capacity_bytes)?)
            }
        })
    }
}

/// Which codec and backend a WAL is opened with
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalOptions {
    pub formatter: FormatterKind,
    pub storage: StorageKind,
}
