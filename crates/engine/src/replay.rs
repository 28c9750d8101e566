// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Applying durable log entries to a pool

use rp_core::RewardPool;
use rp_storage::LogEntry;

/// Apply one entry; returns the request id of a Draw entry
///
/// Failed draws change nothing but still consumed their id. Snapshot and
/// Rotate entries are markers only.
pub fn apply_log(pool: &mut RewardPool, entry: &LogEntry) -> Option<u64> {
    match entry {
        LogEntry::Draw {
            request_id,
            item_id,
            success,
            ..
        } => {
            if *success {
                pool.apply_draw_log(item_id);
            }
            Some(*request_id)
        }
        LogEntry::Update {
            item_id,
            quantity,
            weight,
        } => {
            pool.apply_update_log(item_id, *quantity, *weight);
            None
        }
        LogEntry::Snapshot { .. } | LogEntry::Rotate { .. } => None,
    }
}

/// Apply entries in order, returning the highest request id seen
/// (or `last_request_id` if none is higher)
pub fn replay_logs<'a>(
    pool: &mut RewardPool,
    entries: impl IntoIterator<Item = &'a LogEntry>,
    last_request_id: u64,
) -> u64 {
    entries
        .into_iter()
        .filter_map(|entry| apply_log(pool, entry))
        .fold(last_request_id, u64::max)
}

#[cfg(test)]
#[path = "replay_tests.rs"]
mod tests;
