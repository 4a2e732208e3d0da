// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The job document: unit of work and single source of truth

use crate::status::JobStatus;
use crate::step::{Step, StepId};
use crate::transition::Transition;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Unique identifier for a job, generated at creation.
    pub struct JobId;
}

/// The unit of work: a directed graph of steps plus its execution state.
///
/// Created once, mutated only by the orchestrator (through the job store),
/// never deleted by the core. Steps are indexed both by `step_id` and by
/// positional `order`; `order` values are dense 0..N-1 in submission order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub job_id: JobId,
    /// Namespaces storage under `users/<user_id>/`
    #[serde(default)]
    pub user_id: Option<String>,
    pub status: JobStatus,
    pub steps: Vec<Step>,
    #[serde(default)]
    pub step_transitions: Vec<Transition>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    /// Find a step by ID.
    pub fn find_step(&self, step_id: &StepId) -> Option<&Step> {
        self.steps.iter().find(|s| &s.step_id == step_id)
    }

    /// Find a step by ID, mutably.
    pub fn find_step_mut(&mut self, step_id: &StepId) -> Option<&mut Step> {
        self.steps.iter_mut().find(|s| &s.step_id == step_id)
    }

    /// Find a step by its human-readable name.
    pub fn step_by_name(&self, name: &str) -> Option<&Step> {
        self.steps.iter().find(|s| s.name == name)
    }

    /// Outputs of a step; empty if the step is unknown or has none.
    pub fn step_outputs(&self, step_id: &StepId) -> IndexMap<String, String> {
        self.find_step(step_id)
            .map(|s| s.outputs.clone())
            .unwrap_or_default()
    }

    /// Transitions whose target is the given step.
    pub fn inbound_transitions<'a>(
        &'a self,
        step_id: &'a StepId,
    ) -> impl Iterator<Item = &'a Transition> + 'a {
        self.step_transitions
            .iter()
            .filter(move |t| &t.to_step_id == step_id)
    }

    /// Steps that are not the target of any transition.
    ///
    /// These form the initial dispatch set at job creation.
    pub fn initial_steps(&self) -> Vec<&Step> {
        self.steps
            .iter()
            .filter(|s| self.inbound_transitions(&s.step_id).next().is_none())
            .collect()
    }

    /// The job-complete predicate: every step has completed.
    pub fn all_steps_complete(&self) -> bool {
        self.steps.iter().all(Step::is_complete)
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
