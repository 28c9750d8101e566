// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use rp_core::{RewardItem, SelectorKind};
use rp_storage::LogError;

fn pool() -> RewardPool {
    RewardPool::new(
        vec![
            RewardItem::new("gold", 2, 10),
            RewardItem::new("silver", 5, 20),
        ],
        SelectorKind::Fenwick,
    )
    .unwrap()
}

#[test]
fn successful_draws_decrement() {
    let mut pool = pool();

    let id = apply_log(&mut pool, &LogEntry::draw_success(4, "gold"));

    assert_eq!(id, Some(4));
    assert_eq!(pool.catalog()[0].quantity, 1);
    assert_eq!(pool.item_remaining("gold"), Some(1));
}

#[test]
fn failed_draws_only_report_id() {
    let mut pool = pool();

    let id = apply_log(&mut pool, &LogEntry::draw_failure(9, LogError::PoolEmpty));

    assert_eq!(id, Some(9));
    assert_eq!(pool.total_available(), 30);
}

#[test]
fn markers_change_nothing() {
    let mut pool = pool();
    let entries = [
        LogEntry::Snapshot {
            path: "snap.json".into(),
        },
        LogEntry::Rotate {
            old_path: "wal.000".into(),
            new_path: "wal.001".into(),
        },
    ];

    assert_eq!(replay_logs(&mut pool, &entries, 12), 12);
    assert_eq!(pool.total_available(), 30);
}

#[test]
fn replay_tracks_highest_request_id() {
    let mut pool = pool();
    let entries = vec![
        LogEntry::draw_success(1, "gold"),
        LogEntry::Update {
            item_id: "ruby".into(),
            quantity: 1,
            weight: 100,
        },
        LogEntry::draw_success(2, "ruby"),
        LogEntry::draw_failure(3, LogError::PoolEmpty),
    ];

    let last = replay_logs(&mut pool, &entries, 0);

    assert_eq!(last, 3);
    assert_eq!(pool.item_remaining("ruby"), Some(0));
    assert_eq!(pool.item_remaining("gold"), Some(1));
}

#[test]
fn replay_is_deterministic() {
    let entries = vec![
        LogEntry::draw_success(1, "gold"),
        LogEntry::draw_success(2, "silver"),
        LogEntry::draw_success(3, "gold"),
        LogEntry::draw_success(4, "gold"),
    ];
    let mut a = pool();
    let mut b = pool();

    assert_eq!(replay_logs(&mut a, &entries, 0), replay_logs(&mut b, &entries, 0));
    assert_eq!(a.catalog(), b.catalog());
    assert_eq!(a.catalog()[0].quantity, 0);
}
