// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the orchestrator

use sw_adapters::QueueError;
use sw_pipeline::{TemplateError, ValidationError};
use sw_storage::StoreError;
use thiserror::Error;

/// Errors surfaced by orchestrator operations.
///
/// `Validation`, `NotFound`, `AlreadyComplete` and `InFlight` map to the
/// HTTP front door's 400/404 responses; `Store` and `Queue` are
/// infrastructure errors the caller's outer loop logs and retries.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("job not found: {0}")]
    NotFound(String),
    #[error("job already complete: {0}")]
    AlreadyComplete(String),
    #[error("job is still in flight: {0}")]
    InFlight(String),
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Queue(#[from] QueueError),
    #[error("envelope serialization: {0}")]
    Serialize(#[from] serde_json::Error),
}
