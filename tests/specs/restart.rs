//! Stopping and restarting from disk

use crate::prelude::*;
use rp_core::RewardItem;
use rp_engine::recover_pool;
use rp_storage::FormatterKind;
use similar_asserts::assert_eq;

fn catalog() -> Vec<RewardItem> {
    vec![
        RewardItem::new("gold", 5, 1),
        RewardItem::new("silver", 20, 4),
        RewardItem::new("bronze", 50, 10),
    ]
}

#[tokio::test]
async fn restart_resumes_state_and_request_ids() {
    let mut host = Host::new(&catalog());
    host.wal.formatter = FormatterKind::Delimited;

    let system = host.boot(options(3));
    draw_n(&system, 7).await;
    system.update_item("gold", 9, 2).await.unwrap();
    draw_n(&system, 2).await;
    let live = system.state().await.unwrap();
    system.stop().await;

    let system = host.boot(options(3));
    assert_eq!(system.state().await.unwrap(), live);
    assert_eq!(system.get_request_id().await.unwrap(), 9);

    let next = system.draw().await;
    assert_eq!(next.request_id, 10);
    system.stop().await;
}

#[tokio::test]
async fn recovery_is_idempotent() {
    let host = Host::new(&catalog());
    let system = host.boot(options(4));
    draw_n(&system, 13).await;
    system.snapshot().await.unwrap();
    draw_n(&system, 6).await;
    system.stop().await;

    let formatter = host.wal.formatter.build();
    let recover = || {
        recover_pool(
            None,
            &host.recovery_start(),
            &host.config,
            formatter.as_ref(),
            host.selector,
        )
        .unwrap()
    };
    let first = recover();
    let second = recover();

    assert_eq!(first.pool.catalog(), second.pool.catalog());
    assert_eq!(first.last_request_id, 19);
    assert_eq!(second.last_request_id, 19);

    // restart without traffic, then recover once more
    let system = host.boot(options(4));
    system.snapshot().await.unwrap();
    system.stop().await;
    let third = recover();
    assert_eq!(third.pool.catalog(), first.pool.catalog());
    assert_eq!(third.last_request_id, 19);
}

#[tokio::test]
async fn stop_flushes_partial_batch() {
    let host = Host::new(&catalog());
    let system = host.boot(options(100));
    draw_n(&system, 5).await;
    let live = system.state().await.unwrap();
    system.stop().await;

    assert!(system.draw().await.result.is_err());

    let formatter = host.wal.formatter.build();
    let recovered = recover_pool(
        None,
        &host.recovery_start(),
        &host.config,
        formatter.as_ref(),
        host.selector,
    )
    .unwrap();
    assert_eq!(recovered.pool.state(), live);
    assert_eq!(recovered.last_request_id, 5);
}
