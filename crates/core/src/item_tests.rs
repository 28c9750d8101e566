// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tempfile::TempDir;

#[test]
fn config_parses_probability_as_weight() {
    let json = r#"{"catalog":[{"item_id":"gold","quantity":3,"probability":10}]}"#;
    let config: PoolConfig = serde_json::from_str(json).unwrap();

    assert_eq!(config.catalog, vec![RewardItem::new("gold", 3, 10)]);
}

#[test]
fn config_load_rejects_duplicate_ids() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(
        &path,
        r#"{"catalog":[
            {"item_id":"gold","quantity":1,"probability":1},
            {"item_id":"gold","quantity":2,"probability":2}
        ]}"#,
    )
    .unwrap();

    let err = PoolConfig::load(&path).unwrap_err();
    assert!(matches!(err, PoolError::DuplicateItem(id) if id == "gold"));
}

#[test]
fn config_load_missing_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let err = PoolConfig::load(&dir.path().join("nope.json")).unwrap_err();
    assert!(matches!(err, PoolError::Io(_)));
}

#[test]
fn snapshot_save_and_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("snapshots").join("snap.json");
    let snapshot = PoolSnapshot {
        catalog: vec![
            RewardItem::new("gold", 1, 10),
            RewardItem::new("rock", 0, 90),
        ],
        last_request_id: 42,
    };

    snapshot.save(&path).unwrap();
    let loaded = PoolSnapshot::load(&path).unwrap();

    assert_eq!(loaded, snapshot);
    assert!(!tmp_path_for(&path).exists());
}

#[test]
fn snapshot_file_uses_wire_field_names() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("snap.json");
    PoolSnapshot {
        catalog: vec![RewardItem::new("gold", 2, 5)],
        last_request_id: 7,
    }
    .save(&path)
    .unwrap();

    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(value["last_request_id"], 7);
    assert_eq!(value["catalog"][0]["item_id"], "gold");
    assert_eq!(value["catalog"][0]["probability"], 5);
}

#[test]
fn snapshot_without_request_id_defaults_to_zero() {
    let snapshot: PoolSnapshot = serde_json::from_str(r#"{"catalog":[]}"#).unwrap();
    assert_eq!(snapshot.last_request_id, 0);
}
