// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Mailbox messages
//!
//! Each request carries its own oneshot sender; the processor answers every
//! message it dequeues, including during shutdown.

use crate::error::EngineError;
use rp_core::RewardItem;
use rp_storage::LogEntry;
use std::path::PathBuf;
use tokio::sync::oneshot;

type Reply<T> = oneshot::Sender<Result<T, EngineError>>;

pub(crate) enum Message {
    Draw {
        reply: oneshot::Sender<DrawResponse>,
    },
    Flush {
        reply: Reply<()>,
    },
    Snapshot {
        reply: Reply<PathBuf>,
    },
    State {
        reply: Reply<Vec<RewardItem>>,
    },
    UpdateItem {
        item_id: String,
        quantity: u64,
        weight: u64,
        reply: Reply<()>,
    },
    GetRequestId {
        reply: Reply<u64>,
    },
    SetRequestId {
        request_id: u64,
        reply: Reply<()>,
    },
    ApplyLog {
        entry: LogEntry,
        reply: Reply<()>,
    },
}

impl Message {
    /// Answer with `ShuttingDown` instead of processing
    pub(crate) fn reject(self) {
        match self {
            Message::Draw { reply } => {
                let _ = reply.send(DrawResponse::shutting_down());
            }
            Message::Flush { reply }
            | Message::UpdateItem { reply, .. }
            | Message::SetRequestId { reply, .. }
            | Message::ApplyLog { reply, .. } => {
                let _ = reply.send(Err(EngineError::ShuttingDown));
            }
            Message::Snapshot { reply } => {
                let _ = reply.send(Err(EngineError::ShuttingDown));
            }
            Message::State { reply } => {
                let _ = reply.send(Err(EngineError::ShuttingDown));
            }
            Message::GetRequestId { reply } => {
                let _ = reply.send(Err(EngineError::ShuttingDown));
            }
        }
    }
}

/// Outcome of a draw, tagged with the request id it consumed
///
/// Draws rejected during shutdown never got an id and report 0.
#[derive(Debug)]
pub struct DrawResponse {
    pub request_id: u64,
    pub result: Result<String, EngineError>,
}

impl DrawResponse {
    pub(crate) fn shutting_down() -> Self {
        Self {
            request_id: 0,
            result: Err(EngineError::ShuttingDown),
        }
    }

    /// Drawn item id, if the draw succeeded
    pub fn item(&self) -> Option<&str> {
        self.result.as_deref().ok()
    }

    pub fn into_result(self) -> Result<String, EngineError> {
        self.result
    }
}
