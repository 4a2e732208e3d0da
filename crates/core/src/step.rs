// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A single node in a job's step graph

use crate::command::CommandSpec;
use crate::status::StepStatus;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Unique identifier for a step within a job.
    pub struct StepId;
}

/// One node in a job's step graph.
///
/// Inputs and outputs map logical names to paths, URIs, or templates.
/// After a step completes, every recorded output value is a resolved
/// storage-relative path, never a template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub step_id: StepId,
    /// Human label, unique within the job
    pub name: String,
    /// Position in submission order (dense 0..N-1)
    pub order: u32,
    /// Which worker pool handles this step
    pub service: String,
    pub command_spec: CommandSpec,
    #[serde(default)]
    pub inputs: IndexMap<String, String>,
    #[serde(default)]
    pub outputs: IndexMap<String, String>,
    pub status: StepStatus,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub finished_at: Option<DateTime<Utc>>,
    /// Set iff status is failed
    #[serde(default)]
    pub error_message: Option<String>,
}

impl Step {
    pub fn is_complete(&self) -> bool {
        self.status == StepStatus::Complete
    }

    pub fn is_failed(&self) -> bool {
        self.status == StepStatus::Failed
    }

    /// Derived directory name `{order:03}_{service}_{program}_{hash8}`.
    ///
    /// A pure function of `(order, service, program, canonical(flags))`:
    /// stable, sortable, and unique enough to address a step's output
    /// directory across runs with identical parameters.
    pub fn composite_name(&self) -> String {
        let hash = self.command_spec.params_hash();
        format!(
            "{:03}_{}_{}_{}",
            self.order,
            self.service,
            self.command_spec.program,
            &hash[..8]
        )
    }
}

#[cfg(test)]
#[path = "step_tests.rs"]
mod tests;
