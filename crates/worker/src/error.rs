// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker error taxonomy
//!
//! Domain errors (`MissingInput`, `CommandFailed`, `NoOutputs`, `Io`) are
//! converted to a `StepStatus{failed}` envelope so the orchestrator
//! observes them uniformly; queue errors are caught in the outer loop,
//! logged, and retried after a backoff.

use std::path::PathBuf;
use sw_adapters::QueueError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("missing input '{name}': {}", .path.display())]
    MissingInput { name: String, path: PathBuf },
    #[error("command failed: {0}")]
    CommandFailed(String),
    #[error("command created no output files (expected: {expected})")]
    NoOutputs { expected: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Queue(#[from] QueueError),
    #[error("envelope serialization: {0}")]
    Serialize(#[from] serde_json::Error),
}
