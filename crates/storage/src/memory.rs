// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory job store

use crate::store::{apply_job_status, apply_step_update, JobStore, StepUpdate, StoreError};
use async_trait::async_trait;
use chrono::Utc;
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::collections::HashMap;
use sw_core::{Job, JobId, JobStatus, StepId};

/// Job store backed by a process-local map.
///
/// The reference store for unit and scenario tests, and sufficient for
/// embedded single-process deployments.
#[derive(Default)]
pub struct MemoryJobStore {
    jobs: RwLock<HashMap<String, Job>>,
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored jobs.
    pub fn len(&self) -> usize {
        self.jobs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.read().is_empty()
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn create(&self, job: &Job) -> Result<(), StoreError> {
        let mut jobs = self.jobs.write();
        if jobs.contains_key(job.job_id.as_str()) {
            return Err(StoreError::DuplicateJob(job.job_id.to_string()));
        }
        jobs.insert(job.job_id.to_string(), job.clone());
        Ok(())
    }

    async fn get(&self, job_id: &JobId) -> Result<Option<Job>, StoreError> {
        Ok(self.jobs.read().get(job_id.as_str()).cloned())
    }

    async fn update_job_status(&self, job_id: &JobId, status: JobStatus) -> Result<(), StoreError> {
        let mut jobs = self.jobs.write();
        let job = jobs
            .get_mut(job_id.as_str())
            .ok_or_else(|| StoreError::JobNotFound(job_id.to_string()))?;
        apply_job_status(job, status, Utc::now());
        Ok(())
    }

    async fn update_step(
        &self,
        job_id: &JobId,
        step_id: &StepId,
        update: StepUpdate,
    ) -> Result<(), StoreError> {
        let mut jobs = self.jobs.write();
        let job = jobs
            .get_mut(job_id.as_str())
            .ok_or_else(|| StoreError::JobNotFound(job_id.to_string()))?;
        apply_step_update(job, step_id, update, Utc::now())
    }

    async fn get_step_outputs(
        &self,
        job_id: &JobId,
        step_id: &StepId,
    ) -> Result<IndexMap<String, String>, StoreError> {
        let jobs = self.jobs.read();
        let job = jobs
            .get(job_id.as_str())
            .ok_or_else(|| StoreError::JobNotFound(job_id.to_string()))?;
        Ok(job.step_outputs(step_id))
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
