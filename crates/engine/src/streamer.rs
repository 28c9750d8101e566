// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Best-effort forwarding of committed WAL entries
//!
//! The processor offers entries with `try_send`; when the queue is full the
//! entry is dropped and counted. The streaming task drains whatever is queued
//! before it exits.

use crate::error::EngineError;
use async_trait::async_trait;
use rp_storage::LogEntry;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Sink for committed entries
#[async_trait]
pub trait WalStreamer: Send + Sync {
    async fn stream(&self, entry: &LogEntry) -> Result<(), EngineError>;
}

/// Emits each entry as a tracing event
#[derive(Debug, Default, Clone, Copy)]
pub struct LogStreamer;

#[async_trait]
impl WalStreamer for LogStreamer {
    async fn stream(&self, entry: &LogEntry) -> Result<(), EngineError> {
        let payload = serde_json::to_string(entry)?;
        tracing::info!(target: "rp_engine::stream", kind = entry.kind(), %payload, "wal entry");
        Ok(())
    }
}

/// Discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopStreamer;

#[async_trait]
impl WalStreamer for NoopStreamer {
    async fn stream(&self, _entry: &LogEntry) -> Result<(), EngineError> {
        Ok(())
    }
}

/// Processor-side handle to the streaming queue
pub(crate) struct StreamHandle {
    tx: mpsc::Sender<LogEntry>,
    dropped: Arc<AtomicU64>,
}

impl StreamHandle {
    /// Queue an entry without waiting
    pub(crate) fn offer(&self, entry: LogEntry) {
        match self.tx.try_send(entry) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(entry)) => {
                let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                tracing::warn!(kind = entry.kind(), dropped, "stream queue full, entry dropped");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::debug!("stream consumer gone");
            }
        }
    }
}

/// Consumer task owning the streamer
pub(crate) struct StreamingActor {
    rx: mpsc::Receiver<LogEntry>,
    streamer: Arc<dyn WalStreamer>,
}

impl StreamingActor {
    /// Spawn the consumer; it exits once every handle is dropped
    pub(crate) fn spawn(
        streamer: Arc<dyn WalStreamer>,
        buffer: usize,
    ) -> (StreamHandle, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(buffer);
        let actor = StreamingActor { rx, streamer };
        let handle = StreamHandle {
            tx,
            dropped: Arc::new(AtomicU64::new(0)),
        };
        (handle, tokio::spawn(actor.run()))
    }

    async fn run(mut self) {
        let mut streamed = 0u64;
        while let Some(entry) = self.rx.recv().await {
            match self.streamer.stream(&entry).await {
                Ok(()) => streamed += 1,
                Err(e) => tracing::warn!(error = %e, "streaming entry failed"),
            }
        }
        tracing::debug!(streamed, "streaming actor stopped");
    }
}

#[cfg(test)]
#[path = "streamer_tests.rs"]
mod tests;
