// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job and step status enums with transition guards

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of a job as a whole.
///
/// Legal transitions: `pending → processing → {complete, failed}`.
/// Both terminal states are sticky; only an explicit retry re-opens a
/// failed job (back to `processing`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Accepted, nothing dispatched yet
    Pending,
    /// At least one step dispatched
    Processing,
    /// Every step completed
    Complete,
    /// A step failed
    Failed,
}

impl JobStatus {
    /// Whether a move to `to` is a legal job-status transition.
    ///
    /// Same-state writes are allowed (duplicate events are expected on an
    /// at-least-once channel).
    pub fn can_transition(self, to: JobStatus) -> bool {
        use JobStatus::*;
        if self == to {
            return true;
        }
        matches!(
            (self, to),
            (Pending, Processing)
                | (Processing, Complete)
                | (Processing, Failed)
                // retry re-opens a failed job
                | (Failed, Processing)
        )
    }

    /// Check if this status is terminal
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Complete | JobStatus::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStatus::Pending => write!(f, "pending"),
            JobStatus::Processing => write!(f, "processing"),
            JobStatus::Complete => write!(f, "complete"),
            JobStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Status of a single step.
///
/// Same four values as [`JobStatus`]; steps additionally allow
/// `failed → pending` so retry can reset exactly one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    /// Waiting for dependencies
    Pending,
    /// Dispatched to a worker
    Processing,
    /// Worker reported success
    Complete,
    /// Worker reported failure
    Failed,
}

impl StepStatus {
    /// Whether a move to `to` is a legal step-status transition.
    ///
    /// `complete` is sticky. `failed → pending` is the retry reset.
    /// Same-state writes are allowed (heartbeats, duplicate events).
    pub fn can_transition(self, to: StepStatus) -> bool {
        use StepStatus::*;
        if self == to {
            return true;
        }
        matches!(
            (self, to),
            (Pending, Processing) | (Processing, Complete) | (Processing, Failed) | (Failed, Pending)
        )
    }

    /// Check if this status is terminal
    pub fn is_terminal(self) -> bool {
        matches!(self, StepStatus::Complete | StepStatus::Failed)
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepStatus::Pending => write!(f, "pending"),
            StepStatus::Processing => write!(f, "processing"),
            StepStatus::Complete => write!(f, "complete"),
            StepStatus::Failed => write!(f, "failed"),
        }
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
