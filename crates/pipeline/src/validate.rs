// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Submission validation and job construction

use crate::submission::JobSubmission;
use std::collections::{HashMap, HashSet, VecDeque};
use sw_core::{Clock, IdGen, Job, JobId, JobStatus, Step, StepId, StepStatus, Transition};
use thiserror::Error;

/// Errors rejecting a job submission
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("submission has no steps")]
    EmptySteps,
    #[error("duplicate step name: {0}")]
    DuplicateStepName(String),
    #[error("step '{0}' has no service")]
    MissingService(String),
    #[error("transition references unknown step: {0}")]
    UnknownTransitionStep(String),
    #[error("step transitions form a cycle")]
    CyclicTransitions,
}

/// Validate a submission and construct the job document.
///
/// Assigns the job id, step ids, and dense `order` values in submission
/// order; resolves transition endpoints from step names to ids; rejects
/// cyclic transition graphs. The returned job is `pending` with every step
/// `pending` — persisting and dispatching are the orchestrator's job.
pub fn build_job<G: IdGen, C: Clock>(
    submission: JobSubmission,
    id_gen: &G,
    clock: &C,
) -> Result<Job, ValidationError> {
    if submission.steps.is_empty() {
        return Err(ValidationError::EmptySteps);
    }

    let mut seen_names = HashSet::new();
    for step in &submission.steps {
        if !seen_names.insert(step.name.as_str()) {
            return Err(ValidationError::DuplicateStepName(step.name.clone()));
        }
        if step.service.is_empty() {
            return Err(ValidationError::MissingService(step.name.clone()));
        }
    }

    let steps: Vec<Step> = submission
        .steps
        .into_iter()
        .enumerate()
        .map(|(order, s)| Step {
            step_id: StepId::new(id_gen.next()),
            name: s.name,
            order: order as u32,
            service: s.service,
            command_spec: s.command_spec,
            inputs: s.inputs,
            outputs: s.outputs,
            status: StepStatus::Pending,
            started_at: None,
            finished_at: None,
            error_message: None,
        })
        .collect();

    let id_by_name: HashMap<&str, &StepId> =
        steps.iter().map(|s| (s.name.as_str(), &s.step_id)).collect();

    let mut step_transitions = Vec::with_capacity(submission.step_transitions.len());
    for t in submission.step_transitions {
        let from = id_by_name
            .get(t.from_step_name.as_str())
            .ok_or_else(|| ValidationError::UnknownTransitionStep(t.from_step_name.clone()))?;
        let to = id_by_name
            .get(t.to_step_name.as_str())
            .ok_or_else(|| ValidationError::UnknownTransitionStep(t.to_step_name.clone()))?;
        step_transitions.push(Transition {
            from_step_id: (*from).clone(),
            to_step_id: (*to).clone(),
            output_to_input_mapping: t.output_to_input_mapping,
        });
    }

    if has_cycle(&steps, &step_transitions) {
        return Err(ValidationError::CyclicTransitions);
    }

    let now = clock.now();
    Ok(Job {
        job_id: JobId::new(id_gen.next()),
        user_id: submission.user_id,
        status: JobStatus::Pending,
        steps,
        step_transitions,
        created_at: now,
        updated_at: now,
    })
}

/// Kahn's algorithm: the transition graph is acyclic iff every step can be
/// drained in topological order.
fn has_cycle(steps: &[Step], transitions: &[Transition]) -> bool {
    let mut indegree: HashMap<&StepId, usize> = steps.iter().map(|s| (&s.step_id, 0)).collect();
    let mut successors: HashMap<&StepId, Vec<&StepId>> = HashMap::new();

    for t in transitions {
        if let Some(count) = indegree.get_mut(&t.to_step_id) {
            *count += 1;
        }
        successors
            .entry(&t.from_step_id)
            .or_default()
            .push(&t.to_step_id);
    }

    let mut queue: VecDeque<&StepId> = indegree
        .iter()
        .filter(|(_, &count)| count == 0)
        .map(|(id, _)| *id)
        .collect();

    let mut drained = 0;
    while let Some(id) = queue.pop_front() {
        drained += 1;
        for &next in successors.get(id).into_iter().flatten() {
            if let Some(count) = indegree.get_mut(next) {
                *count -= 1;
                if *count == 0 {
                    queue.push_back(next);
                }
            }
        }
    }

    drained != steps.len()
}

#[cfg(test)]
#[path = "validate_tests.rs"]
mod tests;
