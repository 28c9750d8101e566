//! Shared host harness for specs

use rp_core::{PoolConfig, RewardItem, SelectorKind};
use rp_engine::{recover_pool, Context, DefaultUtils, System, SystemOptions, Utils};
use rp_storage::{StorageKind, Wal, WalOptions};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

/// A host directory layout: config file, WAL dir, snapshot dir
pub struct Host {
    _dir: TempDir,
    pub config: PathBuf,
    pub wal_dir: PathBuf,
    pub snapshot_dir: PathBuf,
    pub wal: WalOptions,
    pub selector: SelectorKind,
}

impl Host {
    pub fn new(catalog: &[RewardItem]) -> Self {
        rp_engine::logging::init("warn");
        let dir = TempDir::new().unwrap();
        let config = dir.path().join("config.json");
        let body = PoolConfig {
            catalog: catalog.to_vec(),
        };
        std::fs::write(&config, serde_json::to_vec_pretty(&body).unwrap()).unwrap();

        let wal_dir = dir.path().join("wal");
        let snapshot_dir = dir.path().join("snapshots");
        std::fs::create_dir_all(&wal_dir).unwrap();
        std::fs::create_dir_all(&snapshot_dir).unwrap();

        Self {
            _dir: dir,
            config,
            wal_dir,
            snapshot_dir,
            wal: WalOptions::default(),
            selector: SelectorKind::Fenwick,
        }
    }

    pub fn with_mmap(mut self, capacity_bytes: u64) -> Self {
        self.wal.storage = StorageKind::Mmap { capacity_bytes };
        self
    }

    pub fn utils(&self) -> DefaultUtils {
        DefaultUtils::new(&self.wal_dir, &self.snapshot_dir)
    }

    /// First WAL of the chain
    pub fn first_wal(&self) -> PathBuf {
        DefaultUtils::wal_path(&self.wal_dir, 0)
    }

    /// Recover from disk and start a system on the recovered WAL
    pub fn boot(&self, options: SystemOptions) -> System {
        let utils = self.utils();
        let start = self.recovery_start();
        let recovered = recover_pool(
            None,
            &start,
            &self.config,
            self.wal.formatter.build().as_ref(),
            self.selector,
        )
        .unwrap();
        recovered.prune().unwrap();

        let wal = Wal::open_with(&recovered.wal_path, &self.wal).unwrap();
        let ctx = Context::new(wal, Arc::new(utils) as Arc<dyn Utils>);
        System::start(
            ctx,
            recovered.pool,
            options,
            recovered.last_request_id,
            None,
        )
    }

    /// Mmap chains are followed from the oldest file left after pruning;
    /// plain files start at the newest one
    pub fn recovery_start(&self) -> PathBuf {
        match self.wal.storage {
            StorageKind::Mmap { .. } => self.utils().earliest_wal_path().unwrap().unwrap(),
            StorageKind::File => self.utils().latest_wal_path().unwrap().unwrap(),
        }
    }

    pub fn wal_files(&self) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = std::fs::read_dir(&self.wal_dir)
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .collect();
        files.sort();
        files
    }
}

pub fn options(flush_after_n_draw: usize) -> SystemOptions {
    SystemOptions {
        flush_after_n_draw,
        ..SystemOptions::default()
    }
}

/// Draw `n` times, counting outcomes by item id ("" for failures)
pub async fn draw_n(system: &System, n: usize) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for _ in 0..n {
        let response = system.draw().await;
        let key = response.item().unwrap_or_default().to_string();
        *counts.entry(key).or_default() += 1;
    }
    counts
}

pub fn quantities(items: &[RewardItem]) -> Vec<(String, u64)> {
    items
        .iter()
        .map(|item| (item.item_id.clone(), item.quantity))
        .collect()
}
