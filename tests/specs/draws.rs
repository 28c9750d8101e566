//! Drawing until the pool runs dry

use crate::prelude::*;
use rp_core::{PoolError, RewardItem};
use rp_engine::EngineError;
use similar_asserts::assert_eq;

#[tokio::test]
async fn single_unit_is_drawn_once() {
    let host = Host::new(&[RewardItem::new("gold", 1, 100)]);
    let system = host.boot(options(10));

    let first = system.draw().await;
    assert_eq!(first.request_id, 1);
    assert_eq!(first.item(), Some("gold"));

    let second = system.draw().await;
    assert_eq!(second.request_id, 2);
    assert!(matches!(
        second.result,
        Err(EngineError::Pool(PoolError::EmptyRewardPool))
    ));

    system.stop().await;
}

#[tokio::test]
async fn rare_item_is_never_overdrawn() {
    let host = Host::new(&[
        RewardItem::new("gold", 1, 100),
        RewardItem::new("silver", 100, 10),
    ]);
    let system = host.boot(options(10));

    let counts = draw_n(&system, 200).await;

    assert_eq!(counts.get("gold"), Some(&1));
    assert_eq!(counts.get("silver"), Some(&100));
    assert_eq!(counts.get(""), Some(&99));

    let state = system.state().await.unwrap();
    assert_eq!(
        quantities(&state),
        vec![("gold".to_string(), 0), ("silver".to_string(), 0)]
    );
    system.stop().await;
}

#[tokio::test]
async fn total_successes_match_stock() {
    let host = Host::new(&[
        RewardItem::new("a", 3, 1),
        RewardItem::new("b", 4, 1),
        RewardItem::new("zero", 0, 50),
        RewardItem::new("c", 5, 1),
    ]);
    let system = host.boot(options(4));

    let counts = draw_n(&system, 20).await;

    assert_eq!(counts.get("a"), Some(&3));
    assert_eq!(counts.get("b"), Some(&4));
    assert_eq!(counts.get("c"), Some(&5));
    assert_eq!(counts.get("zero"), None);
    assert_eq!(counts.get(""), Some(&8));
    assert_eq!(system.get_request_id().await.unwrap(), 20);
    system.stop().await;
}

#[tokio::test]
async fn restock_makes_item_drawable_again() {
    let host = Host::new(&[RewardItem::new("gold", 1, 1)]);
    let system = host.boot(options(1));

    assert_eq!(draw_n(&system, 2).await.get("gold"), Some(&1));

    system.update_item("gold", 2, 1).await.unwrap();
    system.update_item("ruby", 1, 1).await.unwrap();

    let counts = draw_n(&system, 4).await;
    assert_eq!(counts.get("gold"), Some(&2));
    assert_eq!(counts.get("ruby"), Some(&1));
    assert_eq!(counts.get(""), Some(&1));
    system.stop().await;
}
