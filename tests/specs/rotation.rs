//! WAL rotation on a small fixed-capacity mmap log

use crate::prelude::*;
use rp_core::RewardItem;
use rp_engine::recover_pool;
use rp_storage::{parse_wal, LogEntry};
use similar_asserts::assert_eq;

fn stocked() -> Vec<RewardItem> {
    vec![
        RewardItem::new("gold", 1000, 1),
        RewardItem::new("silver", 1000, 3),
    ]
}

#[tokio::test]
async fn full_log_rotates_into_new_files() {
    let host = Host::new(&stocked()).with_mmap(1024);
    let system = host.boot(options(1));

    draw_n(&system, 60).await;
    system.stop().await;

    let files = host.wal_files();
    assert!(files.len() > 2, "expected several rotations, got {files:?}");

    let formatter = host.wal.formatter.build();
    for (old, new) in files.iter().zip(&files[1..]) {
        let parsed = parse_wal(old, formatter.as_ref()).unwrap();
        assert_eq!(parsed.next_path.as_ref(), Some(new));

        let opened = parse_wal(new, formatter.as_ref()).unwrap();
        assert!(
            matches!(
                opened.entries.as_slice(),
                [LogEntry::Rotate { .. }, LogEntry::Snapshot { .. }, ..]
            ),
            "{new:?} starts with {:?}",
            opened.entries.first()
        );
    }
}

#[tokio::test]
async fn rotated_chain_recovers_final_state() {
    let host = Host::new(&stocked()).with_mmap(1024);
    let system = host.boot(options(1));

    draw_n(&system, 60).await;
    let live = system.state().await.unwrap();
    let last_request_id = system.get_request_id().await.unwrap();
    system.stop().await;

    let formatter = host.wal.formatter.build();
    let recovered = recover_pool(
        None,
        &host.first_wal(),
        &host.config,
        formatter.as_ref(),
        host.selector,
    )
    .unwrap();

    assert_eq!(recovered.pool.state(), live);
    assert_eq!(recovered.last_request_id, last_request_id);
    assert_eq!(Some(&recovered.wal_path), host.wal_files().last());
}

#[tokio::test]
async fn batched_draws_survive_rotation() {
    let host = Host::new(&stocked()).with_mmap(2048);
    let system = host.boot(options(5));

    draw_n(&system, 100).await;
    let live = system.state().await.unwrap();
    system.stop().await;

    let restarted = host.boot(options(5));
    assert_eq!(restarted.state().await.unwrap(), live);
    assert_eq!(restarted.get_request_id().await.unwrap(), 100);
    restarted.stop().await;
}

#[tokio::test]
async fn restart_prunes_files_before_last_snapshot() {
    let host = Host::new(&stocked()).with_mmap(1024);
    let system = host.boot(options(1));

    draw_n(&system, 60).await;
    let live = system.state().await.unwrap();
    let last_request_id = system.get_request_id().await.unwrap();
    system.stop().await;
    let newest = host.wal_files().last().cloned().unwrap();
    assert!(host.wal_files().len() > 2);

    let restarted = host.boot(options(1));
    assert_eq!(restarted.state().await.unwrap(), live);
    restarted.stop().await;

    assert_eq!(host.wal_files(), vec![newest.clone()]);
    let snapshots = std::fs::read_dir(&host.snapshot_dir).unwrap().count();
    assert_eq!(snapshots, 1);

    let formatter = host.wal.formatter.build();
    let recovered = recover_pool(
        None,
        &host.recovery_start(),
        &host.config,
        formatter.as_ref(),
        host.selector,
    )
    .unwrap();
    assert_eq!(host.recovery_start(), newest);
    assert_eq!(recovered.pool.state(), live);
    assert_eq!(recovered.last_request_id, last_request_id);
}

#[test]
fn sealed_file_keeps_only_flushed_region() {
    let host = Host::new(&stocked()).with_mmap(4096);
    let formatter = host.wal.formatter.build();
    let path = host.first_wal();
    let mut storage = host.wal.storage.open(&path).unwrap();

    let durable = formatter
        .encode(&[LogEntry::draw_success(1, "gold")])
        .unwrap();
    storage.write(&durable).unwrap();
    storage.flush().unwrap();
    let torn = formatter
        .encode(&[LogEntry::draw_success(2, "gold")])
        .unwrap();
    storage.write(&torn).unwrap();
    drop(storage);

    let parsed = parse_wal(&path, formatter.as_ref()).unwrap();
    assert_eq!(parsed.entries, vec![LogEntry::draw_success(1, "gold")]);
}
