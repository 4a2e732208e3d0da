// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The job store contract and per-step update document

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use sw_core::{Job, JobId, JobStatus, StepId, StepStatus};
use thiserror::Error;

/// Errors from job persistence
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("job already exists: {0}")]
    DuplicateJob(String),
    #[error("job not found: {0}")]
    JobNotFound(String),
    #[error("step {step} not found in job {job}")]
    StepNotFound { job: String, step: String },
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A targeted update to one step of a job document.
///
/// Mirrors a positional-subdocument write: only the fields set here are
/// touched. An absent `outputs` never clears previously recorded outputs.
#[derive(Debug, Clone)]
pub struct StepUpdate {
    pub status: StepStatus,
    pub outputs: Option<IndexMap<String, String>>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub error_message: Option<String>,
    /// Sets `error_message` to null (used by retry)
    pub clear_error: bool,
}

impl StepUpdate {
    pub fn new(status: StepStatus) -> Self {
        Self {
            status,
            outputs: None,
            started_at: None,
            finished_at: None,
            error_message: None,
            clear_error: false,
        }
    }

    pub fn with_outputs(mut self, outputs: IndexMap<String, String>) -> Self {
        self.outputs = Some(outputs);
        self
    }

    pub fn with_started_at(mut self, at: DateTime<Utc>) -> Self {
        self.started_at = Some(at);
        self
    }

    pub fn with_finished_at(mut self, at: DateTime<Utc>) -> Self {
        self.finished_at = Some(at);
        self
    }

    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }

    pub fn clearing_error(mut self) -> Self {
        self.clear_error = true;
        self
    }
}

/// Persistence contract for job documents.
///
/// All writes are atomic per job document. Readiness evaluation re-reads
/// the job fresh before every decision, so optimistic concurrency is not
/// required here.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Insert a new job. Fails if the job id already exists.
    async fn create(&self, job: &Job) -> Result<(), StoreError>;

    /// Fetch the full job document.
    async fn get(&self, job_id: &JobId) -> Result<Option<Job>, StoreError>;

    /// Set the job-level status. Last writer wins; `updated_at` refreshed.
    async fn update_job_status(&self, job_id: &JobId, status: JobStatus) -> Result<(), StoreError>;

    /// Apply a [`StepUpdate`] to the matching step.
    async fn update_step(
        &self,
        job_id: &JobId,
        step_id: &StepId,
        update: StepUpdate,
    ) -> Result<(), StoreError>;

    /// Outputs of a step; empty if the step has none.
    async fn get_step_outputs(
        &self,
        job_id: &JobId,
        step_id: &StepId,
    ) -> Result<IndexMap<String, String>, StoreError>;
}

/// Apply a step update to a job document in place.
///
/// Shared by every in-process store implementation. Illegal status moves
/// (per [`StepStatus::can_transition`]) are logged and skipped; the rest of
/// the update still applies, so duplicate or late events cannot corrupt a
/// terminal step.
pub(crate) fn apply_step_update(
    job: &mut Job,
    step_id: &StepId,
    update: StepUpdate,
    now: DateTime<Utc>,
) -> Result<(), StoreError> {
    let job_label = job.job_id.to_string();
    let step = job
        .find_step_mut(step_id)
        .ok_or_else(|| StoreError::StepNotFound {
            job: job_label,
            step: step_id.to_string(),
        })?;

    if step.status.can_transition(update.status) {
        step.status = update.status;
    } else {
        tracing::warn!(
            step = %step.step_id,
            from = %step.status,
            to = %update.status,
            "ignoring illegal step status transition"
        );
    }

    if let Some(outputs) = update.outputs {
        step.outputs = outputs;
    }
    if let Some(at) = update.started_at {
        step.started_at = Some(at);
    }
    if let Some(at) = update.finished_at {
        step.finished_at = Some(at);
    }
    if update.clear_error {
        step.error_message = None;
    } else if let Some(message) = update.error_message {
        step.error_message = Some(message);
    }

    job.updated_at = now;
    Ok(())
}

/// Apply a job-level status change in place.
pub(crate) fn apply_job_status(job: &mut Job, status: JobStatus, now: DateTime<Utc>) {
    if job.status.can_transition(status) {
        job.status = status;
    } else {
        tracing::warn!(
            job = %job.job_id,
            from = %job.status,
            to = %status,
            "ignoring illegal job status transition"
        );
    }
    job.updated_at = now;
}
