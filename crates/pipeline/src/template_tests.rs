// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use proptest::prelude::*;
use sw_core::test_support::{JobBuilder, StepBuilder};
use sw_core::StepStatus;

fn job() -> Job {
    JobBuilder::new("j1")
        .user("u1")
        .step(
            StepBuilder::new("slice", "flucoma")
                .program("fluid-noveltyslice")
                .output("out", "users/u1/jobs/j1/000_x/slices.wav")
                .status(StepStatus::Complete),
        )
        .step(
            StepBuilder::new("mfcc", "librosa")
                .program("mfcc")
                .input("src", "{{steps.slice.outputs.out}}"),
        )
        .build()
}

#[test]
fn substitutes_job_scalars() {
    let job = job();
    let resolved = resolve("users/{{user_id}}/jobs/{{job_id}}/x", &job, None).unwrap();
    assert_eq!(resolved, "users/u1/jobs/j1/x");
}

#[test]
fn substitutes_step_scalars_when_step_given() {
    let job = job();
    let step = job.step_by_name("slice").unwrap();
    let resolved = resolve("{{step_id}}/{{composite_name}}", &job, Some(step)).unwrap();
    assert_eq!(resolved, format!("slice-id/{}", step.composite_name()));
}

#[test]
fn step_tokens_left_without_step_context() {
    let job = job();
    let resolved = resolve("{{step_id}}", &job, None).unwrap();
    assert_eq!(resolved, "{{step_id}}");
}

#[test]
fn user_id_left_when_job_has_none() {
    let job = JobBuilder::new("j2")
        .step(StepBuilder::new("a", "x").program("p"))
        .build();
    let resolved = resolve("users/{{user_id}}/x", &job, None).unwrap();
    assert_eq!(resolved, "users/{{user_id}}/x");
}

#[test]
fn unknown_scalar_tokens_left_as_is() {
    let job = job();
    let resolved = resolve("{{mystery}}/{{job_id}}", &job, None).unwrap();
    assert_eq!(resolved, "{{mystery}}/j1");
}

#[test]
fn cross_step_reference_resolves_by_name() {
    let job = job();
    let resolved = resolve("{{steps.slice.outputs.out}}", &job, None).unwrap();
    assert_eq!(resolved, "users/u1/jobs/j1/000_x/slices.wav");
}

#[test]
fn unknown_step_reference_fails() {
    let job = job();
    let err = resolve("{{steps.nope.outputs.out}}", &job, None).unwrap_err();
    assert!(matches!(err, TemplateError::UnknownStep { step } if step == "nope"));
}

#[test]
fn unknown_output_key_fails() {
    let job = job();
    let err = resolve("{{steps.slice.outputs.nope}}", &job, None).unwrap_err();
    assert!(matches!(
        err,
        TemplateError::UnknownOutput { step, output } if step == "slice" && output == "nope"
    ));
}

#[test]
fn substituted_values_are_not_rescanned() {
    // A step output that itself contains a template token survives verbatim
    let job = JobBuilder::new("j3")
        .step(
            StepBuilder::new("odd", "x")
                .program("p")
                .output("out", "{{job_id}}/literal"),
        )
        .build();

    let resolved = resolve("{{steps.odd.outputs.out}}", &job, None).unwrap();
    assert_eq!(resolved, "{{job_id}}/literal");
}

#[test]
fn resolve_map_resolves_every_value() {
    let job = job();
    let step = job.step_by_name("mfcc").unwrap();
    let resolved = resolve_map(&step.inputs, &job, Some(step)).unwrap();
    assert_eq!(resolved["src"], "users/u1/jobs/j1/000_x/slices.wav");
}

proptest! {
    // Single-pass stability: resolving an already-resolved template is a no-op
    #[test]
    fn resolve_is_idempotent(template in "[a-z/{}_.]{0,40}") {
        let job = job();
        if let Ok(once) = resolve(&template, &job, None) {
            if let Ok(twice) = resolve(&once, &job, None) {
                prop_assert_eq!(once, twice);
            }
        }
    }
}
