// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the worker binary.

use std::path::PathBuf;
use std::time::Duration;

/// Root of the shared storage filesystem.
pub fn storage_root() -> PathBuf {
    std::env::var("STORAGE_ROOT")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/app/storage"))
}

/// Redis endpoint for the queue channels.
pub fn redis_endpoint() -> (String, u16) {
    let host = std::env::var("REDIS_HOST").unwrap_or_else(|_| "localhost".to_string());
    let port = std::env::var("REDIS_PORT")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(6379);
    (host, port)
}

/// Per-subprocess timeout override.
pub fn step_timeout() -> Duration {
    std::env::var("SW_STEP_TIMEOUT_SECS")
        .ok()
        .and_then(|value| value.parse().ok())
        .map(Duration::from_secs)
        .unwrap_or(sw_adapters::DEFAULT_STEP_TIMEOUT)
}
