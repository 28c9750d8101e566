// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Single-consumer message loop owning the pool and the WAL
//!
//! Draws are staged in the pool and buffered in the WAL; a flush decides
//! their fate:
//!
//! ```text
//! flush ── ok ─────────► commit, stream entries
//!       ├─ WAL full ───► revert, drop batch, rotate, snapshot into new WAL
//!       └─ other error ► revert, drop batch
//! ```

use crate::context::Context;
use crate::error::EngineError;
use crate::message::{DrawResponse, Message};
use crate::replay;
use crate::streamer::StreamHandle;
use rp_core::RewardPool;
use rp_storage::{LogEntry, LogError, WalError};
use std::path::PathBuf;
use tokio::sync::{mpsc, oneshot};

/// Result of a flush that did not fail outright
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flushed {
    /// The batch is durable
    Committed,
    /// The batch was dropped and the WAL rotated
    Rotated,
}

pub(crate) struct Processor {
    ctx: Context,
    pool: RewardPool,
    request_id: u64,
    staged_draws: usize,
    flush_after_n_draw: usize,
    rx: mpsc::Receiver<Message>,
    stop: oneshot::Receiver<()>,
    stream: Option<StreamHandle>,
}

impl Processor {
    pub(crate) fn new(
        ctx: Context,
        pool: RewardPool,
        last_request_id: u64,
        flush_after_n_draw: usize,
        rx: mpsc::Receiver<Message>,
        stop: oneshot::Receiver<()>,
        stream: Option<StreamHandle>,
    ) -> Self {
        Self {
            ctx,
            pool,
            request_id: last_request_id,
            staged_draws: 0,
            flush_after_n_draw: flush_after_n_draw.max(1),
            rx,
            stop,
            stream,
        }
    }

    pub(crate) async fn run(mut self) {
        self.anchor_empty_wal();
        tracing::debug!(
            wal = %self.ctx.wal.path().display(),
            request_id = self.request_id,
            "processor started"
        );

        loop {
            tokio::select! {
                biased;
                // a dropped System counts as a stop request
                _ = &mut self.stop => break,
                message = self.rx.recv() => match message {
                    Some(message) => self.handle(message),
                    None => break,
                },
            }
        }
        self.shutdown();
    }

    /// A fresh WAL gets a snapshot marker before any traffic
    fn anchor_empty_wal(&mut self) {
        match self.ctx.wal.size() {
            Ok(0) => match self.write_snapshot() {
                Ok(path) => {
                    tracing::info!(path = %path.display(), "anchored empty WAL with snapshot")
                }
                Err(e) => tracing::warn!(error = %e, "initial snapshot failed"),
            },
            Ok(_) => {}
            Err(e) => tracing::warn!(error = %e, "WAL size unknown, skipping initial snapshot"),
        }
    }

    fn handle(&mut self, message: Message) {
        match message {
            Message::Draw { reply } => {
                let _ = reply.send(self.handle_draw());
            }
            Message::Flush { reply } => {
                let _ = reply.send(self.flush_staged().map(|_| ()));
            }
            Message::Snapshot { reply } => {
                let _ = reply.send(self.handle_snapshot());
            }
            Message::State { reply } => {
                let _ = reply.send(Ok(self.pool.state()));
            }
            Message::UpdateItem {
                item_id,
                quantity,
                weight,
                reply,
            } => {
                let _ = reply.send(self.handle_update(&item_id, quantity, weight));
            }
            Message::GetRequestId { reply } => {
                let _ = reply.send(Ok(self.request_id));
            }
            Message::SetRequestId { request_id, reply } => {
                tracing::info!(from = self.request_id, to = request_id, "request id set");
                self.request_id = request_id;
                let _ = reply.send(Ok(()));
            }
            Message::ApplyLog { entry, reply } => {
                let _ = reply.send(self.handle_apply_log(&entry));
            }
        }
    }

    fn handle_draw(&mut self) -> DrawResponse {
        self.request_id += 1;
        let request_id = self.request_id;

        let selected = self.pool.select_item();
        let logged = match &selected {
            Ok(item_id) => self
                .ctx
                .wal
                .log_draw(request_id, item_id, true, LogError::None),
            // selection only fails on an empty pool
            Err(_) => self
                .ctx
                .wal
                .log_draw(request_id, "", false, LogError::PoolEmpty),
        };

        if let Err(e) = logged {
            // an unlogged selection must not be committed with the batch
            if let Ok(item_id) = &selected {
                self.pool.cancel_selection(item_id);
            }
            tracing::error!(request_id, error = %e, "draw could not be logged");
            return DrawResponse {
                request_id,
                result: Err(e.into()),
            };
        }

        self.staged_draws += 1;
        if self.staged_draws >= self.flush_after_n_draw {
            // the outcome belongs to the batch, not to this draw
            if let Err(e) = self.flush_staged() {
                tracing::error!(request_id, error = %e, "batch flush failed");
            }
        }

        DrawResponse {
            request_id,
            result: selected.map_err(EngineError::from),
        }
    }

    /// Flush buffered entries and settle staged draws
    fn flush_staged(&mut self) -> Result<Flushed, EngineError> {
        let staged = std::mem::take(&mut self.staged_draws);
        match self.ctx.wal.flush() {
            Ok(entries) => {
                self.pool.commit_draw();
                if staged > 0 {
                    tracing::debug!(staged, "flushed and committed draws");
                }
                self.stream(entries);
                Ok(Flushed::Committed)
            }
            Err(WalError::WalFull) => {
                self.pool.revert_draw();
                self.ctx.wal.reset();
                tracing::warn!(staged, "WAL full, staged draws reverted, rotating");
                self.rotate()?;
                Ok(Flushed::Rotated)
            }
            Err(e) => {
                self.pool.revert_draw();
                self.ctx.wal.reset();
                tracing::error!(staged, error = %e, "WAL flush failed, staged draws reverted");
                Err(e.into())
            }
        }
    }

    /// Move to a new WAL and anchor it with Rotate + Snapshot entries
    fn rotate(&mut self) -> Result<(), EngineError> {
        let Some(new_path) = self.ctx.utils.gen_rotated_wal_path() else {
            tracing::error!("WAL full and no rotation path available");
            return Err(EngineError::NoRotationPath);
        };
        let old_path = self.ctx.wal.path().to_path_buf();
        self.ctx.wal.rotate(&new_path)?;
        self.ctx.wal.log_rotate(&old_path, &new_path)?;
        tracing::info!(
            old = %old_path.display(),
            new = %new_path.display(),
            "WAL rotated"
        );

        match self.write_snapshot() {
            Ok(_) => Ok(()),
            Err(EngineError::NoSnapshotPath) => {
                // keep the rotate marker even without a snapshot
                self.ctx.wal.flush()?;
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Save the pool, then log and flush a marker pointing at the file
    ///
    /// Requires an empty batch.
    fn write_snapshot(&mut self) -> Result<PathBuf, EngineError> {
        let path = self
            .ctx
            .utils
            .gen_snapshot_path()
            .ok_or(EngineError::NoSnapshotPath)?;
        self.pool.save_snapshot(&path, self.request_id)?;
        self.ctx.wal.log_snapshot(&path)?;
        if let Err(e) = self.ctx.wal.flush() {
            self.ctx.wal.reset();
            return Err(e.into());
        }
        tracing::debug!(
            path = %path.display(),
            request_id = self.request_id,
            "snapshot written"
        );
        Ok(path)
    }

    fn handle_snapshot(&mut self) -> Result<PathBuf, EngineError> {
        self.settle_batch();
        self.write_snapshot()
    }

    /// Log and flush an update; apply it only once durable
    fn handle_update(
        &mut self,
        item_id: &str,
        quantity: u64,
        weight: u64,
    ) -> Result<(), EngineError> {
        self.settle_batch();

        for _ in 0..2 {
            self.ctx.wal.log_update(item_id, quantity, weight)?;
            if self.flush_staged()? == Flushed::Committed {
                self.pool.update_item(item_id, quantity, weight)?;
                tracing::info!(item_id, quantity, weight, "item updated");
                return Ok(());
            }
            // rotated: the update was dropped with the batch, log it again
        }
        Err(WalError::WalFull.into())
    }

    /// Apply a replicated entry without logging it locally
    fn handle_apply_log(&mut self, entry: &LogEntry) -> Result<(), EngineError> {
        self.settle_batch();
        if let Some(request_id) = replay::apply_log(&mut self.pool, entry) {
            self.request_id = self.request_id.max(request_id);
        }
        Ok(())
    }

    /// Flush staged draws so the pool has no pending batch
    fn settle_batch(&mut self) {
        if let Err(e) = self.flush_staged() {
            tracing::error!(error = %e, "flush before state change failed");
        }
    }

    fn stream(&self, entries: Vec<LogEntry>) {
        let Some(stream) = &self.stream else {
            return;
        };
        for entry in entries.into_iter().filter(LogEntry::is_state_change) {
            stream.offer(entry);
        }
    }

    fn shutdown(&mut self) {
        tracing::debug!("processor shutting down");
        self.rx.close();
        let mut rejected = 0usize;
        while let Ok(message) = self.rx.try_recv() {
            message.reject();
            rejected += 1;
        }
        if rejected > 0 {
            tracing::info!(rejected, "rejected queued requests at shutdown");
        }

        if let Err(e) = self.flush_staged() {
            tracing::error!(error = %e, "final flush failed");
        }
        if let Err(e) = self.ctx.wal.close() {
            tracing::error!(error = %e, "closing WAL failed");
        }
        tracing::info!(
            request_id = self.request_id,
            flushed_entries = self.ctx.wal.flushed_entries(),
            "processor stopped"
        );
    }
}
