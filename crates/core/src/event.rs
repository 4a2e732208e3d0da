// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire types for the two queue channels binding orchestrator and workers

use crate::command::CommandSpec;
use crate::job::JobId;
use crate::status::StepStatus;
use crate::step::StepId;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Channel the workers publish step status events on.
pub const STATUS_CHANNEL: &str = "job_status_events";

/// Per-service request channel name.
pub fn request_channel(service: &str) -> String {
    format!("{service}_requests")
}

/// Tag identifying the kind of a status event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventType {
    #[serde(rename = "JOB_STEP_PROCESSING")]
    StepProcessing,
    #[serde(rename = "JOB_STEP_COMPLETE")]
    StepComplete,
    #[serde(rename = "JOB_STEP_FAILED")]
    StepFailed,
}

impl EventType {
    fn for_status(status: StepStatus) -> Self {
        match status {
            StepStatus::Complete => EventType::StepComplete,
            StepStatus::Failed => EventType::StepFailed,
            // Workers never report pending; default to the heartbeat tag
            StepStatus::Pending | StepStatus::Processing => EventType::StepProcessing,
        }
    }
}

/// Dispatch envelope: orchestrator → worker, on `<service>_requests`.
///
/// Everything a worker needs is in the envelope: the resolved command,
/// resolved input/output maps, and the composite directory name. No
/// worker-side lookup of job state is required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepExecute {
    pub job_id: JobId,
    pub step_id: StepId,
    pub step_name: String,
    pub microservice: String,
    pub command_spec: CommandSpec,
    #[serde(default)]
    pub inputs: IndexMap<String, String>,
    #[serde(default)]
    pub outputs: IndexMap<String, String>,
    pub composite_name: String,
}

/// Status envelope: worker → orchestrator, on `job_status_events`.
///
/// `outputs` is null (not empty) for processing and failure reports so the
/// orchestrator never clears previously recorded outputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepStatusEvent {
    pub event_type: EventType,
    pub job_id: JobId,
    pub step_id: StepId,
    pub step_name: String,
    pub status: StepStatus,
    #[serde(default)]
    pub outputs: Option<IndexMap<String, String>>,
    #[serde(default)]
    pub error_message: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl StepStatusEvent {
    /// Heartbeat emitted when a worker picks up an envelope.
    pub fn processing(envelope: &StepExecute, timestamp: DateTime<Utc>) -> Self {
        Self::for_envelope(envelope, StepStatus::Processing, None, None, timestamp)
    }

    /// Success report with the recorded storage-relative output paths.
    pub fn complete(
        envelope: &StepExecute,
        outputs: IndexMap<String, String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self::for_envelope(
            envelope,
            StepStatus::Complete,
            Some(outputs),
            None,
            timestamp,
        )
    }

    /// Failure report. Carries no outputs so prior state is preserved.
    pub fn failed(
        envelope: &StepExecute,
        error_message: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self::for_envelope(
            envelope,
            StepStatus::Failed,
            None,
            Some(error_message.into()),
            timestamp,
        )
    }

    fn for_envelope(
        envelope: &StepExecute,
        status: StepStatus,
        outputs: Option<IndexMap<String, String>>,
        error_message: Option<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            event_type: EventType::for_status(status),
            job_id: envelope.job_id.clone(),
            step_id: envelope.step_id.clone(),
            step_name: envelope.step_name.clone(),
            status,
            outputs,
            error_message,
            timestamp,
        }
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
