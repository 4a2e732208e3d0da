// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::test_support::StepBuilder;
use serde_json::json;

#[test]
fn composite_name_shape() {
    let step = StepBuilder::new("hpss", "flucoma")
        .order(0)
        .program("fluid-hpss")
        .flag("-harmonic", json!("{{out}}"))
        .build();

    let name = step.composite_name();
    assert!(name.starts_with("000_flucoma_fluid-hpss_"));
    // 8-char hex hash suffix
    let suffix = name.rsplit('_').next().unwrap();
    assert_eq!(suffix.len(), 8);
    assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn composite_name_is_stable_for_identical_parameters() {
    let a = StepBuilder::new("a", "svc")
        .order(2)
        .program("prog")
        .flag("-x", json!(1))
        .build();
    let b = StepBuilder::new("b", "svc")
        .order(2)
        .program("prog")
        .flag("-x", json!(1))
        .build();

    // Name and step_id differ; composite name does not
    assert_eq!(a.composite_name(), b.composite_name());
}

#[test]
fn composite_name_changes_with_a_single_flag_value() {
    let a = StepBuilder::new("a", "svc")
        .program("prog")
        .flag("-x", json!(1))
        .build();
    let b = StepBuilder::new("a", "svc")
        .program("prog")
        .flag("-x", json!(2))
        .build();

    assert_ne!(a.composite_name(), b.composite_name());
    // Only the hash suffix differs
    assert_eq!(
        a.composite_name().rsplit_once('_').map(|(p, _)| p.to_string()),
        b.composite_name().rsplit_once('_').map(|(p, _)| p.to_string()),
    );
}

#[test]
fn composite_name_zero_pads_order() {
    let step = StepBuilder::new("s", "svc").order(12).program("p").build();
    assert!(step.composite_name().starts_with("012_svc_p_"));
}

#[test]
fn step_serde_round_trip() {
    let step = StepBuilder::new("analyze", "librosa")
        .program("mfcc")
        .input("src", "{{steps.slice.outputs.out}}")
        .output("csv", "users/{{user_id}}/jobs/{{job_id}}/{{composite_name}}/mfcc.csv")
        .build();

    let json = serde_json::to_string(&step).unwrap();
    let parsed: crate::Step = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, step);
}
