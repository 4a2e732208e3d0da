// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

const LINEAR_CHAIN: &str = r#"{
    "user_id": "u1",
    "steps": [
        { "name": "hpss", "service": "flucoma",
          "command_spec": { "program": "fluid-hpss", "flags": {"-source": "{{in}}"} },
          "inputs": { "in": "users/u1/uploads/a.wav" },
          "outputs": { "out": "users/{{user_id}}/jobs/{{job_id}}/{{composite_name}}/h.wav" } },
        { "name": "mfcc", "service": "librosa",
          "command_spec": { "program": "mfcc", "args": ["{{src}}"] },
          "inputs": { "src": "{{steps.hpss.outputs.out}}" },
          "outputs": { "csv": "users/{{user_id}}/jobs/{{job_id}}/{{composite_name}}/m.csv" } }
    ],
    "step_transitions": [
        { "from_step_name": "hpss", "to_step_name": "mfcc",
          "output_to_input_mapping": { "out": "src" } }
    ]
}"#;

#[test]
fn parses_a_full_submission() {
    let submission: JobSubmission = serde_json::from_str(LINEAR_CHAIN).unwrap();

    assert_eq!(submission.user_id.as_deref(), Some("u1"));
    assert_eq!(submission.steps.len(), 2);
    assert_eq!(submission.steps[0].command_spec.program, "fluid-hpss");
    assert_eq!(submission.step_transitions.len(), 1);
    assert_eq!(
        submission.step_transitions[0].output_to_input_mapping["out"],
        "src"
    );
}

#[test]
fn optional_fields_default() {
    let submission: JobSubmission = serde_json::from_str(
        r#"{ "steps": [ { "name": "a", "service": "x", "command_spec": { "program": "p" } } ] }"#,
    )
    .unwrap();

    assert!(submission.user_id.is_none());
    assert!(submission.step_transitions.is_empty());
    assert!(submission.steps[0].inputs.is_empty());
    assert!(submission.steps[0].outputs.is_empty());
}

#[test]
fn unknown_fields_are_ignored() {
    let submission: JobSubmission = serde_json::from_str(
        r#"{ "steps": [ { "name": "a", "service": "x",
              "command_spec": { "program": "p" }, "priority": 9 } ],
             "webhook": "http://example.com" }"#,
    )
    .unwrap();

    assert_eq!(submission.steps[0].name, "a");
}

#[test]
fn missing_command_spec_is_rejected() {
    let result = serde_json::from_str::<JobSubmission>(
        r#"{ "steps": [ { "name": "a", "service": "x" } ] }"#,
    );
    assert!(result.is_err());
}
