// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed job submission payloads
//!
//! The HTTP front door hands the core an untyped JSON body; these types
//! validate it into records at the boundary. Parsing is permissive:
//! unknown fields are ignored.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use sw_core::CommandSpec;

/// Body of a job submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSubmission {
    #[serde(default)]
    pub user_id: Option<String>,
    pub steps: Vec<StepSubmission>,
    #[serde(default)]
    pub step_transitions: Vec<TransitionSubmission>,
}

/// One step of a submission. Order is implied by position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepSubmission {
    pub name: String,
    pub service: String,
    pub command_spec: CommandSpec,
    #[serde(default)]
    pub inputs: IndexMap<String, String>,
    #[serde(default)]
    pub outputs: IndexMap<String, String>,
}

/// A transition edge, declared by step name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionSubmission {
    pub from_step_name: String,
    pub to_step_name: String,
    #[serde(default)]
    pub output_to_input_mapping: IndexMap<String, String>,
}

#[cfg(test)]
#[path = "submission_tests.rs"]
mod tests;
