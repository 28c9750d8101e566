// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Catalog, config and snapshot types
//!
//! On disk the weight of an item is called `probability`, matching the
//! config and snapshot JSON formats.

use crate::error::PoolError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// A single reward unit type in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardItem {
    /// Unique key within the catalog
    pub item_id: String,
    /// Remaining units
    pub quantity: u64,
    /// Relative selection weight
    #[serde(rename = "probability")]
    pub weight: u64,
}

impl RewardItem {
    pub fn new(item_id: impl Into<String>, quantity: u64, weight: u64) -> Self {
        Self {
            item_id: item_id.into(),
            quantity,
            weight,
        }
    }
}

/// Base catalog loaded from the pool config file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolConfig {
    pub catalog: Vec<RewardItem>,
}

impl PoolConfig {
    /// Load and validate a config file
    pub fn load(path: &Path) -> Result<Self, PoolError> {
        let file = File::open(path)?;
        let config: PoolConfig = serde_json::from_reader(BufReader::new(file))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject catalogs that repeat an item id
    pub fn validate(&self) -> Result<(), PoolError> {
        let mut seen = HashSet::with_capacity(self.catalog.len());
        for item in &self.catalog {
            if !seen.insert(item.item_id.as_str()) {
                return Err(PoolError::DuplicateItem(item.item_id.clone()));
            }
        }
        Ok(())
    }
}

/// Point-in-time pool state plus the last assigned request id
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSnapshot {
    pub catalog: Vec<RewardItem>,
    #[serde(default)]
    pub last_request_id: u64,
}

impl PoolSnapshot {
    /// Write the snapshot atomically (temp file, fsync, rename)
    pub fn save(&self, path: &Path) -> Result<(), PoolError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let tmp_path = tmp_path_for(path);
        {
            let file = File::create(&tmp_path)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer(&mut writer, self)?;
            writer.write_all(b"\n")?;
            let file = writer.into_inner().map_err(|e| e.into_error())?;
            file.sync_all()?;
        }
        fs::rename(&tmp_path, path)?;
        Ok(())
    }

    /// Read a snapshot file
    pub fn load(path: &Path) -> Result<Self, PoolError> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".tmp");
    PathBuf::from(name)
}

#[cfg(test)]
#[path = "item_tests.rs"]
mod tests;
