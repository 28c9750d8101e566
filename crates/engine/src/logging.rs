// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tracing subscriber setup for hosts and tests
//!
//! `RUST_LOG` wins over the default filter passed in.

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn filter(default_filter: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter))
}

/// Log to stderr
///
/// Safe to call more than once; later calls are ignored.
pub fn init(default_filter: &str) {
    let _ = tracing_subscriber::registry()
        .with(filter(default_filter))
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

/// Log to `path` through a background writer
///
/// Keep the returned guard alive for as long as logs should be written.
pub fn init_file(path: &Path, default_filter: &str) -> std::io::Result<WorkerGuard> {
    let (dir, file_name) = match (path.parent(), path.file_name()) {
        (Some(dir), Some(name)) => (dir, name),
        _ => {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("not a log file path: {}", path.display()),
            ))
        }
    };
    std::fs::create_dir_all(dir)?;

    let appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let _ = tracing_subscriber::registry()
        .with(filter(default_filter))
        .with(fmt::layer().with_ansi(false).with_writer(writer))
        .try_init();
    Ok(guard)
}

#[cfg(test)]
#[path = "logging_tests.rs"]
mod tests;
