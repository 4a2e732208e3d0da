// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon.

use std::path::PathBuf;

/// State directory holding job documents and the daemon lock:
/// `SW_STATE_DIR` > `XDG_STATE_HOME/stepwise` > `~/.local/state/stepwise`
pub fn state_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var("SW_STATE_DIR") {
        return Some(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Some(PathBuf::from(xdg).join("stepwise"));
    }
    let home = std::env::var("HOME").ok()?;
    Some(PathBuf::from(home).join(".local/state/stepwise"))
}

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
