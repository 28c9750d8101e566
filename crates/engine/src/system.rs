// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Client-facing handle to the processor
//!
//! Every call sends one message and waits on its private reply channel.
//! `System` is cheap to share behind an `Arc`; all methods take `&self`.

use crate::config::SystemOptions;
use crate::context::Context;
use crate::error::EngineError;
use crate::message::{DrawResponse, Message};
use crate::processor::Processor;
use crate::streamer::{StreamingActor, WalStreamer};
use rp_core::{RewardItem, RewardPool};
use rp_storage::LogEntry;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio::task::JoinHandle;

struct Tasks {
    stop: oneshot::Sender<()>,
    processor: JoinHandle<()>,
    streaming: Option<JoinHandle<()>>,
}

pub struct System {
    tx: mpsc::Sender<Message>,
    tasks: Mutex<Option<Tasks>>,
}

impl System {
    /// Spawn the processor (and the streaming actor when a streamer is given)
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(
        ctx: Context,
        pool: RewardPool,
        options: SystemOptions,
        last_request_id: u64,
        streamer: Option<Arc<dyn WalStreamer>>,
    ) -> Self {
        let options = options.normalized();
        let (tx, rx) = mpsc::channel(options.request_buffer_size);
        let (stop, stop_rx) = oneshot::channel();

        let (stream, streaming) = match streamer {
            Some(streamer) => {
                let (handle, task) = StreamingActor::spawn(streamer, options.stream_buffer_size);
                (Some(handle), Some(task))
            }
            None => (None, None),
        };

        let processor = Processor::new(
            ctx,
            pool,
            last_request_id,
            options.flush_after_n_draw,
            rx,
            stop_rx,
            stream,
        );
        let processor = tokio::spawn(processor.run());
        tracing::info!(
            flush_after_n_draw = options.flush_after_n_draw,
            request_buffer_size = options.request_buffer_size,
            last_request_id,
            "system started"
        );

        Self {
            tx,
            tasks: Mutex::new(Some(Tasks {
                stop,
                processor,
                streaming,
            })),
        }
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<Result<T, EngineError>>) -> Message,
    ) -> Result<T, EngineError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(make(reply))
            .await
            .map_err(|_| EngineError::ShuttingDown)?;
        rx.await.map_err(|_| EngineError::ShuttingDown)?
    }

    /// Draw one unit
    pub async fn draw(&self) -> DrawResponse {
        let (reply, rx) = oneshot::channel();
        if self.tx.send(Message::Draw { reply }).await.is_err() {
            return DrawResponse::shutting_down();
        }
        rx.await.unwrap_or_else(|_| DrawResponse::shutting_down())
    }

    /// Flush staged draws now
    pub async fn flush(&self) -> Result<(), EngineError> {
        self.request(|reply| Message::Flush { reply }).await
    }

    /// Write a snapshot and return its path
    pub async fn snapshot(&self) -> Result<PathBuf, EngineError> {
        self.request(|reply| Message::Snapshot { reply }).await
    }

    /// Catalog with currently drawable quantities
    pub async fn state(&self) -> Result<Vec<RewardItem>, EngineError> {
        self.request(|reply| Message::State { reply }).await
    }

    pub async fn update_item(
        &self,
        item_id: impl Into<String>,
        quantity: u64,
        weight: u64,
    ) -> Result<(), EngineError> {
        let item_id = item_id.into();
        self.request(|reply| Message::UpdateItem {
            item_id,
            quantity,
            weight,
            reply,
        })
        .await
    }

    pub async fn get_request_id(&self) -> Result<u64, EngineError> {
        self.request(|reply| Message::GetRequestId { reply }).await
    }

    pub async fn set_request_id(&self, request_id: u64) -> Result<(), EngineError> {
        self.request(|reply| Message::SetRequestId { request_id, reply })
            .await
    }

    /// Apply an entry replicated from elsewhere
    pub async fn apply_log(&self, entry: LogEntry) -> Result<(), EngineError> {
        self.request(|reply| Message::ApplyLog { entry, reply }).await
    }

    /// Stop the processor and wait for it to exit
    ///
    /// Queued requests are answered with `ShuttingDown`; staged draws get a
    /// final flush. Calling again is a no-op.
    pub async fn stop(&self) {
        let mut guard = self.tasks.lock().await;
        let Some(tasks) = guard.take() else {
            return;
        };

        // a failed send means the processor already exited
        let _ = tasks.stop.send(());
        if let Err(e) = tasks.processor.await {
            tracing::error!(error = %e, "processor task failed");
        }
        if let Some(streaming) = tasks.streaming {
            if let Err(e) = streaming.await {
                tracing::error!(error = %e, "streaming task failed");
            }
        }
        tracing::info!("system stopped");
    }
}

#[cfg(test)]
#[path = "system_tests.rs"]
mod tests;
