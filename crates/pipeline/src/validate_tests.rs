// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::submission::{StepSubmission, TransitionSubmission};
use sw_core::{CommandSpec, FakeClock, SequentialIdGen};

fn step(name: &str, service: &str) -> StepSubmission {
    StepSubmission {
        name: name.to_string(),
        service: service.to_string(),
        command_spec: CommandSpec::new("prog"),
        inputs: Default::default(),
        outputs: Default::default(),
    }
}

fn edge(from: &str, to: &str) -> TransitionSubmission {
    TransitionSubmission {
        from_step_name: from.to_string(),
        to_step_name: to.to_string(),
        output_to_input_mapping: [("out".to_string(), "in".to_string())].into_iter().collect(),
    }
}

fn build(steps: Vec<StepSubmission>, transitions: Vec<TransitionSubmission>) -> Result<sw_core::Job, ValidationError> {
    let submission = JobSubmission {
        user_id: Some("u1".to_string()),
        steps,
        step_transitions: transitions,
    };
    build_job(submission, &SequentialIdGen::new("id"), &FakeClock::new())
}

#[test]
fn builds_job_with_dense_orders_and_resolved_transitions() {
    let job = build(
        vec![step("a", "x"), step("b", "y")],
        vec![edge("a", "b")],
    )
    .unwrap();

    assert_eq!(job.status, sw_core::JobStatus::Pending);
    assert_eq!(job.steps[0].order, 0);
    assert_eq!(job.steps[1].order, 1);
    assert_eq!(job.step_transitions[0].from_step_id, job.steps[0].step_id);
    assert_eq!(job.step_transitions[0].to_step_id, job.steps[1].step_id);
    assert_eq!(job.created_at, job.updated_at);
}

#[test]
fn step_ids_and_job_id_come_from_the_generator() {
    let job = build(vec![step("a", "x")], vec![]).unwrap();
    assert_eq!(job.steps[0].step_id.as_str(), "id-1");
    assert_eq!(job.job_id.as_str(), "id-2");
}

#[test]
fn empty_steps_rejected() {
    let err = build(vec![], vec![]).unwrap_err();
    assert!(matches!(err, ValidationError::EmptySteps));
}

#[test]
fn duplicate_step_names_rejected() {
    let err = build(vec![step("a", "x"), step("a", "y")], vec![]).unwrap_err();
    assert!(matches!(err, ValidationError::DuplicateStepName(name) if name == "a"));
}

#[test]
fn missing_service_rejected() {
    let err = build(vec![step("a", "")], vec![]).unwrap_err();
    assert!(matches!(err, ValidationError::MissingService(name) if name == "a"));
}

#[test]
fn unknown_transition_endpoint_rejected() {
    let err = build(vec![step("a", "x")], vec![edge("a", "ghost")]).unwrap_err();
    assert!(matches!(err, ValidationError::UnknownTransitionStep(name) if name == "ghost"));
}

#[test]
fn two_step_cycle_rejected() {
    let err = build(
        vec![step("a", "x"), step("b", "x")],
        vec![edge("a", "b"), edge("b", "a")],
    )
    .unwrap_err();
    assert!(matches!(err, ValidationError::CyclicTransitions));
}

#[test]
fn self_loop_rejected() {
    let err = build(vec![step("a", "x")], vec![edge("a", "a")]).unwrap_err();
    assert!(matches!(err, ValidationError::CyclicTransitions));
}

#[test]
fn fan_in_graph_accepted() {
    let job = build(
        vec![step("a", "x"), step("b", "x"), step("c", "y")],
        vec![edge("a", "c"), edge("b", "c")],
    )
    .unwrap();

    assert_eq!(job.step_transitions.len(), 2);
    assert_eq!(job.initial_steps().len(), 2);
}

#[test]
fn diamond_graph_accepted() {
    let job = build(
        vec![step("a", "x"), step("b", "x"), step("c", "x"), step("d", "x")],
        vec![edge("a", "b"), edge("a", "c"), edge("b", "d"), edge("c", "d")],
    )
    .unwrap();
    assert_eq!(job.initial_steps().len(), 1);
}
