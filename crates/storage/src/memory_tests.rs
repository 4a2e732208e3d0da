// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use sw_core::test_support::{JobBuilder, StepBuilder};
use sw_core::StepStatus;

fn job(id: &str) -> Job {
    JobBuilder::new(id)
        .user("u1")
        .step(StepBuilder::new("a", "x").program("p").output("out", "a.tmpl"))
        .step(StepBuilder::new("b", "y").program("q"))
        .transition("a", "b", &[("out", "src")])
        .build()
}

fn outputs(pairs: &[(&str, &str)]) -> IndexMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[tokio::test]
async fn create_then_get_round_trips() {
    let store = MemoryJobStore::new();
    let job = job("j1");
    store.create(&job).await.unwrap();

    let fetched = store.get(&job.job_id).await.unwrap().unwrap();
    assert_eq!(fetched, job);
}

#[tokio::test]
async fn duplicate_create_fails() {
    let store = MemoryJobStore::new();
    let job = job("j1");
    store.create(&job).await.unwrap();

    let err = store.create(&job).await.unwrap_err();
    assert!(matches!(err, StoreError::DuplicateJob(id) if id == "j1"));
}

#[tokio::test]
async fn get_missing_returns_none() {
    let store = MemoryJobStore::new();
    assert!(store.get(&JobId::new("nope")).await.unwrap().is_none());
}

#[tokio::test]
async fn update_job_status_refreshes_updated_at() {
    let store = MemoryJobStore::new();
    let job = job("j1");
    store.create(&job).await.unwrap();

    store
        .update_job_status(&job.job_id, JobStatus::Processing)
        .await
        .unwrap();

    let fetched = store.get(&job.job_id).await.unwrap().unwrap();
    assert_eq!(fetched.status, JobStatus::Processing);
    assert!(fetched.updated_at >= job.updated_at);
}

#[tokio::test]
async fn illegal_job_status_move_is_ignored() {
    let store = MemoryJobStore::new();
    let job = job("j1");
    store.create(&job).await.unwrap();

    // pending → complete skips processing; the guard drops it
    store
        .update_job_status(&job.job_id, JobStatus::Complete)
        .await
        .unwrap();

    let fetched = store.get(&job.job_id).await.unwrap().unwrap();
    assert_eq!(fetched.status, JobStatus::Pending);
}

#[tokio::test]
async fn update_step_targets_only_the_matching_step() {
    let store = MemoryJobStore::new();
    let job = job("j1");
    store.create(&job).await.unwrap();
    let a = job.steps[0].step_id.clone();

    store
        .update_step(&job.job_id, &a, StepUpdate::new(StepStatus::Processing))
        .await
        .unwrap();

    let fetched = store.get(&job.job_id).await.unwrap().unwrap();
    assert_eq!(fetched.steps[0].status, StepStatus::Processing);
    assert_eq!(fetched.steps[1].status, StepStatus::Pending);
}

#[tokio::test]
async fn absent_outputs_do_not_clear_recorded_outputs() {
    let store = MemoryJobStore::new();
    let job = job("j1");
    store.create(&job).await.unwrap();
    let a = job.steps[0].step_id.clone();

    store
        .update_step(&job.job_id, &a, StepUpdate::new(StepStatus::Processing))
        .await
        .unwrap();
    store
        .update_step(
            &job.job_id,
            &a,
            StepUpdate::new(StepStatus::Complete).with_outputs(outputs(&[("out", "jobs/j1/a.wav")])),
        )
        .await
        .unwrap();

    // A late heartbeat without outputs arrives after completion
    store
        .update_step(&job.job_id, &a, StepUpdate::new(StepStatus::Processing))
        .await
        .unwrap();

    let recorded = store.get_step_outputs(&job.job_id, &a).await.unwrap();
    assert_eq!(recorded["out"], "jobs/j1/a.wav");

    // The illegal complete → processing move was also dropped
    let fetched = store.get(&job.job_id).await.unwrap().unwrap();
    assert_eq!(fetched.steps[0].status, StepStatus::Complete);
}

#[tokio::test]
async fn clear_error_nulls_the_message() {
    let store = MemoryJobStore::new();
    let job = job("j1");
    store.create(&job).await.unwrap();
    let a = job.steps[0].step_id.clone();

    store
        .update_step(&job.job_id, &a, StepUpdate::new(StepStatus::Processing))
        .await
        .unwrap();
    store
        .update_step(
            &job.job_id,
            &a,
            StepUpdate::new(StepStatus::Failed).with_error("exit status 2"),
        )
        .await
        .unwrap();

    let fetched = store.get(&job.job_id).await.unwrap().unwrap();
    assert_eq!(fetched.steps[0].error_message.as_deref(), Some("exit status 2"));

    store
        .update_step(
            &job.job_id,
            &a,
            StepUpdate::new(StepStatus::Pending).clearing_error(),
        )
        .await
        .unwrap();

    let fetched = store.get(&job.job_id).await.unwrap().unwrap();
    assert_eq!(fetched.steps[0].status, StepStatus::Pending);
    assert!(fetched.steps[0].error_message.is_none());
}

#[tokio::test]
async fn unknown_step_update_errors() {
    let store = MemoryJobStore::new();
    let job = job("j1");
    store.create(&job).await.unwrap();

    let err = store
        .update_step(
            &job.job_id,
            &sw_core::StepId::new("ghost"),
            StepUpdate::new(StepStatus::Processing),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::StepNotFound { .. }));
}

#[tokio::test]
async fn step_outputs_empty_when_none_recorded() {
    let store = MemoryJobStore::new();
    let job = job("j1");
    store.create(&job).await.unwrap();
    let b = job.steps[1].step_id.clone();

    assert!(store.get_step_outputs(&job.job_id, &b).await.unwrap().is_empty());
}
