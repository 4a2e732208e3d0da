// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! File-backed job store
//!
//! One JSON document per job under a state directory. Writes go through a
//! temp file and an atomic rename, so a crash mid-write never leaves a
//! torn document behind.

use crate::store::{apply_job_status, apply_step_update, JobStore, StepUpdate, StoreError};
use async_trait::async_trait;
use chrono::Utc;
use indexmap::IndexMap;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use sw_core::{Job, JobId, JobStatus, StepId};

/// Job store writing one document per job to `<dir>/<job_id>.json`.
pub struct FsJobStore {
    dir: PathBuf,
    // Read-modify-write cycles must not interleave
    write_lock: Mutex<()>,
}

impl FsJobStore {
    /// Open (and create) the store directory.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            write_lock: Mutex::new(()),
        })
    }

    fn job_path(&self, job_id: &JobId) -> PathBuf {
        self.dir.join(format!("{}.json", job_id.as_str()))
    }

    fn read_job(&self, job_id: &JobId) -> Result<Option<Job>, StoreError> {
        let path = self.job_path(job_id);
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    fn require_job(&self, job_id: &JobId) -> Result<Job, StoreError> {
        self.read_job(job_id)?
            .ok_or_else(|| StoreError::JobNotFound(job_id.to_string()))
    }

    fn write_job(&self, job: &Job) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(job)?;
        let path = self.job_path(&job.job_id);
        write_atomic(&path, &bytes)
    }
}

/// Write via temp file + rename so readers never observe a partial document.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, bytes)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

#[async_trait]
impl JobStore for FsJobStore {
    async fn create(&self, job: &Job) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock();
        if self.job_path(&job.job_id).exists() {
            return Err(StoreError::DuplicateJob(job.job_id.to_string()));
        }
        self.write_job(job)
    }

    async fn get(&self, job_id: &JobId) -> Result<Option<Job>, StoreError> {
        self.read_job(job_id)
    }

    async fn update_job_status(&self, job_id: &JobId, status: JobStatus) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock();
        let mut job = self.require_job(job_id)?;
        apply_job_status(&mut job, status, Utc::now());
        self.write_job(&job)
    }

    async fn update_step(
        &self,
        job_id: &JobId,
        step_id: &StepId,
        update: StepUpdate,
    ) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock();
        let mut job = self.require_job(job_id)?;
        apply_step_update(&mut job, step_id, update, Utc::now())?;
        self.write_job(&job)
    }

    async fn get_step_outputs(
        &self,
        job_id: &JobId,
        step_id: &StepId,
    ) -> Result<IndexMap<String, String>, StoreError> {
        let job = self.require_job(job_id)?;
        Ok(job.step_outputs(step_id))
    }
}

#[cfg(test)]
#[path = "fs_tests.rs"]
mod tests;
