// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The dispatch core: create-job, readiness evaluation, step dispatch,
//! status event handling, and retry.
//!
//! Status events are processed by a single serial consumer, so dispatch
//! decisions are linearizable with respect to observed events. The
//! double-dispatch guard relies on ordering inside [`Orchestrator`]:
//! a step is persisted as `processing` before its envelope is published,
//! so a concurrent readiness evaluation can never pick it up again.

use crate::error::OrchestratorError;
use crate::layout::StorageLayout;
use indexmap::IndexMap;
use serde::Serialize;
use std::sync::Arc;
use sw_adapters::Queue;
use sw_core::{
    request_channel, Clock, IdGen, Job, JobId, JobStatus, Step, StepExecute, StepId, StepStatus,
    StepStatusEvent,
};
use sw_pipeline::JobSubmission;
use sw_storage::{JobStore, StepUpdate, StoreError};

/// Response body for a retry request.
#[derive(Debug, Clone, Serialize)]
pub struct RetryReceipt {
    pub status: &'static str,
    pub job_id: JobId,
    pub resume_step: String,
    pub step_index: u32,
}

/// The orchestrator: owns all mutation of job state.
///
/// Generic over the store, queue, id generator and clock so tests can run
/// against in-memory fakes with deterministic ids and time.
pub struct Orchestrator<S, Q, G, C> {
    store: Arc<S>,
    queue: Arc<Q>,
    layout: StorageLayout,
    id_gen: G,
    clock: C,
}

impl<S, Q, G, C> Orchestrator<S, Q, G, C>
where
    S: JobStore,
    Q: Queue,
    G: IdGen,
    C: Clock,
{
    pub fn new(store: Arc<S>, queue: Arc<Q>, layout: StorageLayout, id_gen: G, clock: C) -> Self {
        Self {
            store,
            queue,
            layout,
            id_gen,
            clock,
        }
    }

    /// Validate a submission, persist the job, pre-create its directory
    /// tree, and dispatch every step with no inbound transition.
    ///
    /// Returns a fresh snapshot of the created job.
    pub async fn create_job(
        &self,
        submission: JobSubmission,
    ) -> Result<Job, OrchestratorError> {
        let job = sw_pipeline::build_job(submission, &self.id_gen, &self.clock)?;
        self.store.create(&job).await?;
        self.layout.ensure_job_tree(&job);

        tracing::info!(
            job = %job.job_id,
            steps = job.steps.len(),
            transitions = job.step_transitions.len(),
            "job created"
        );

        self.store
            .update_job_status(&job.job_id, JobStatus::Processing)
            .await?;

        let initial: Vec<StepId> = job
            .initial_steps()
            .iter()
            .map(|step| step.step_id.clone())
            .collect();
        for step_id in &initial {
            self.dispatch_by_id(&job, step_id).await?;
        }

        self.require_job(&job.job_id).await
    }

    /// Fetch a job snapshot.
    pub async fn get_job(&self, job_id: &JobId) -> Result<Option<Job>, OrchestratorError> {
        Ok(self.store.get(job_id).await?)
    }

    /// Reset the first non-complete step and dispatch it again.
    ///
    /// Completed earlier steps are left untouched; their outputs remain
    /// available to downstream consumers via transitions.
    pub async fn retry(&self, job_id: &JobId) -> Result<RetryReceipt, OrchestratorError> {
        let job = self.require_job(job_id).await?;

        match job.status {
            JobStatus::Complete => {
                return Err(OrchestratorError::AlreadyComplete(job_id.to_string()))
            }
            JobStatus::Processing => return Err(OrchestratorError::InFlight(job_id.to_string())),
            JobStatus::Pending | JobStatus::Failed => {}
        }

        let resume = job
            .steps
            .iter()
            .find(|step| !step.is_complete())
            .ok_or_else(|| OrchestratorError::AlreadyComplete(job_id.to_string()))?;
        let resume_id = resume.step_id.clone();

        self.store
            .update_step(
                job_id,
                &resume_id,
                StepUpdate::new(StepStatus::Pending).clearing_error(),
            )
            .await?;
        self.store
            .update_job_status(job_id, JobStatus::Processing)
            .await?;

        tracing::info!(job = %job_id, step = %resume.name, "retrying from first non-complete step");

        // Fresh snapshot so dispatch sees the reset step
        let job = self.require_job(job_id).await?;
        self.dispatch_by_id(&job, &resume_id).await?;

        let resume = job
            .find_step(&resume_id)
            .ok_or_else(|| OrchestratorError::NotFound(job_id.to_string()))?;
        Ok(RetryReceipt {
            status: "retrying",
            job_id: job.job_id.clone(),
            resume_step: resume.name.clone(),
            step_index: resume.order,
        })
    }

    /// Parse a raw status envelope; malformed payloads are dropped with a
    /// log so the consumer loop never crashes on garbage.
    pub async fn handle_status_payload(&self, payload: &str) -> Result<(), OrchestratorError> {
        match serde_json::from_str::<StepStatusEvent>(payload) {
            Ok(event) => self.handle_status(event).await,
            Err(err) => {
                tracing::warn!(error = %err, "dropping malformed status event");
                Ok(())
            }
        }
    }

    /// Apply one status event and re-evaluate readiness.
    pub async fn handle_status(&self, event: StepStatusEvent) -> Result<(), OrchestratorError> {
        if event.job_id.as_str().is_empty() || event.step_id.as_str().is_empty() {
            tracing::warn!("dropping status event with empty ids");
            return Ok(());
        }

        tracing::debug!(
            job = %event.job_id,
            step = %event.step_id,
            status = %event.status,
            "handling status event"
        );

        let mut update = StepUpdate::new(event.status);
        if let Some(outputs) = event.outputs.clone() {
            update = update.with_outputs(outputs);
        }
        if event.status.is_terminal() {
            update = update.with_finished_at(self.clock.now());
        }
        if let Some(message) = event.error_message.clone() {
            update = update.with_error(message);
        }

        match self.store.update_step(&event.job_id, &event.step_id, update).await {
            Ok(()) => {}
            Err(StoreError::JobNotFound(_)) | Err(StoreError::StepNotFound { .. }) => {
                tracing::warn!(
                    job = %event.job_id,
                    step = %event.step_id,
                    "dropping status event for unknown job or step"
                );
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        }

        // Re-read fresh: readiness is purely a function of persisted state
        let job = self.require_job(&event.job_id).await?;

        match event.status {
            StepStatus::Complete => self.advance(&job).await,
            StepStatus::Failed => {
                tracing::warn!(
                    job = %job.job_id,
                    step = %event.step_id,
                    error = event.error_message.as_deref().unwrap_or("unknown"),
                    "step failed; failing job"
                );
                self.store
                    .update_job_status(&job.job_id, JobStatus::Failed)
                    .await?;
                Ok(())
            }
            // Heartbeats update the store but trigger no dispatch
            StepStatus::Processing | StepStatus::Pending => Ok(()),
        }
    }

    /// Dispatch every ready step, or mark the job complete when none
    /// remain and every step has completed.
    async fn advance(&self, job: &Job) -> Result<(), OrchestratorError> {
        if job.status == JobStatus::Failed {
            // Late sibling completions are recorded, but a failed job
            // never dispatches again
            tracing::debug!(job = %job.job_id, "job already failed; not dispatching");
            return Ok(());
        }

        let ready = self.ready_steps(job);
        if ready.is_empty() {
            if job.all_steps_complete() {
                self.store
                    .update_job_status(&job.job_id, JobStatus::Complete)
                    .await?;
                tracing::info!(job = %job.job_id, "job complete");
            } else {
                tracing::debug!(job = %job.job_id, "no steps ready; waiting on dependencies");
            }
            return Ok(());
        }

        for step_id in ready {
            self.dispatch_by_id(job, &step_id).await?;
        }
        Ok(())
    }

    /// Steps eligible to dispatch: `pending` with every inbound
    /// transition source `complete`.
    fn ready_steps(&self, job: &Job) -> Vec<StepId> {
        job.steps
            .iter()
            .filter(|step| step.status == StepStatus::Pending)
            .filter(|step| {
                job.inbound_transitions(&step.step_id).all(|t| {
                    job.find_step(&t.from_step_id)
                        .is_some_and(Step::is_complete)
                })
            })
            .map(|step| step.step_id.clone())
            .collect()
    }

    /// Dispatch one step, converting resolution failures into a failed
    /// step and a failed job (the worker never sees the envelope).
    async fn dispatch_by_id(&self, job: &Job, step_id: &StepId) -> Result<(), OrchestratorError> {
        let step = job
            .find_step(step_id)
            .ok_or_else(|| OrchestratorError::NotFound(step_id.to_string()))?;

        match self.dispatch(job, step).await {
            Ok(()) => Ok(()),
            Err(OrchestratorError::Template(err)) => {
                tracing::warn!(
                    job = %job.job_id,
                    step = %step.name,
                    error = %err,
                    "dispatch failed during resolution; failing step"
                );
                self.store
                    .update_step(
                        &job.job_id,
                        step_id,
                        StepUpdate::new(StepStatus::Failed)
                            .with_error(err.to_string())
                            .with_finished_at(self.clock.now()),
                    )
                    .await?;
                self.store
                    .update_job_status(&job.job_id, JobStatus::Failed)
                    .await?;
                Ok(())
            }
            Err(other) => Err(other),
        }
    }

    /// The dispatch sequence: persist `processing`, fold inbound
    /// transition outputs into the inputs, resolve templates, resolve the
    /// command spec, and publish the envelope.
    async fn dispatch(&self, job: &Job, step: &Step) -> Result<(), OrchestratorError> {
        // Set processing BEFORE publishing: reversing this would let a
        // worker report back before the store reflects the dispatch,
        // producing a duplicate dispatch on the next status event.
        self.store
            .update_step(
                &job.job_id,
                &step.step_id,
                StepUpdate::new(StepStatus::Processing).with_started_at(self.clock.now()),
            )
            .await?;

        // Inbound transition projections, in submission order; later
        // transitions overwrite earlier keys
        let mut mapped_inputs: IndexMap<String, String> = IndexMap::new();
        for transition in job.inbound_transitions(&step.step_id) {
            let source_outputs = self
                .store
                .get_step_outputs(&job.job_id, &transition.from_step_id)
                .await?;
            mapped_inputs.extend(transition.apply_mapping(&source_outputs));
        }

        // Transition values win over statically declared inputs
        let mut merged_inputs = step.inputs.clone();
        merged_inputs.extend(mapped_inputs);

        // Inputs are handed to the worker as absolute paths; outputs stay
        // storage-relative so recorded output paths remain portable
        let inputs: IndexMap<String, String> = sw_pipeline::resolve_map(&merged_inputs, job, Some(step))?
            .into_iter()
            .map(|(name, value)| (name, self.layout.absolutize_pathlike(&value)))
            .collect();
        let outputs = sw_pipeline::resolve_map(&step.outputs, job, Some(step))?;

        // Command placeholders resolve to absolute paths so the rendered
        // program never depends on the worker's working directory
        let absolute_outputs: IndexMap<String, String> = outputs
            .iter()
            .map(|(name, value)| (name.clone(), self.layout.absolutize_pathlike(value)))
            .collect();
        let command_spec = step.command_spec.resolve(&inputs, &absolute_outputs);

        let envelope = StepExecute {
            job_id: job.job_id.clone(),
            step_id: step.step_id.clone(),
            step_name: step.name.clone(),
            microservice: step.service.clone(),
            command_spec,
            inputs,
            outputs,
            composite_name: step.composite_name(),
        };

        let channel = request_channel(&step.service);
        self.queue
            .push(&channel, &serde_json::to_string(&envelope)?)
            .await?;

        tracing::info!(
            job = %job.job_id,
            step = %step.name,
            service = %step.service,
            channel = %channel,
            "dispatched step"
        );
        Ok(())
    }

    async fn require_job(&self, job_id: &JobId) -> Result<Job, OrchestratorError> {
        self.store
            .get(job_id)
            .await?
            .ok_or_else(|| OrchestratorError::NotFound(job_id.to_string()))
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
