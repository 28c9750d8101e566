// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! rp-engine: single-writer actor tying the reward pool to its WAL
//!
//! ```text
//! caller ──► System ──► mailbox ──► Processor ──► RewardPool
//!                                       │
//!                                       └──► Wal ──► StreamingActor
//! ```

mod config;
mod context;
mod error;
pub mod logging;
mod message;
mod processor;
pub mod recovery;
pub mod replay;
mod streamer;
mod system;
mod utils;

pub use config::{EngineConfig, SystemOptions};
pub use context::Context;
pub use error::EngineError;
pub use message::DrawResponse;
pub use recovery::{recover_pool, Recovered};
pub use streamer::{LogStreamer, NoopStreamer, WalStreamer};
pub use system::System;
pub use utils::{DefaultUtils, Utils};
