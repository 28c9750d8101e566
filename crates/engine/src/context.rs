// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::utils::Utils;
use rp_storage::Wal;
use std::sync::Arc;

/// Collaborators handed to the processor at start
///
/// Owned by the actor task; nothing else holds the WAL.
pub struct Context {
    pub wal: Wal,
    pub utils: Arc<dyn Utils>,
}

impl Context {
    pub fn new(wal: Wal, utils: Arc<dyn Utils>) -> Self {
        Self { wal, utils }
    }
}
