// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Directed edges between steps

use crate::step::StepId;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A directed edge between two steps with an output → input projection.
///
/// Immutable after creation. The mapping keys are output names of the
/// source step; the values are input names of the target step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub from_step_id: StepId,
    pub to_step_id: StepId,
    #[serde(default)]
    pub output_to_input_mapping: IndexMap<String, String>,
}

impl Transition {
    /// Project source-step outputs onto target-step input names.
    ///
    /// Outputs not named by the mapping are dropped; mapping entries whose
    /// source output is absent are skipped.
    pub fn apply_mapping(
        &self,
        source_outputs: &IndexMap<String, String>,
    ) -> IndexMap<String, String> {
        self.output_to_input_mapping
            .iter()
            .filter_map(|(src, dst)| {
                source_outputs
                    .get(src)
                    .map(|value| (dst.clone(), value.clone()))
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "transition_tests.rs"]
mod tests;
