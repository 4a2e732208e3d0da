// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Canonical directory layout under the shared storage root
//!
//! ```text
//! STORAGE_ROOT/
//!   users/<user_id>/
//!     uploads/[folder/]<file>            # user assets (externally managed)
//!     jobs/<job_id>/
//!       <composite_name_of_step_1>/...   # all of step 1's outputs
//!       <composite_name_of_step_2>/...
//! ```

use std::path::{Path, PathBuf};
use sw_core::{Job, JobId, Step};

/// Produces and pre-creates the directory tree for a job's step outputs.
///
/// Creates directories only, never files. Failures to mkdir are logged,
/// not fatal: a step that cannot write will fail loudly at that point.
#[derive(Debug, Clone)]
pub struct StorageLayout {
    root: PathBuf,
}

impl StorageLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `users/<user_id>/uploads` — user assets, managed by the upload
    /// endpoints (external collaborator).
    pub fn user_uploads_dir(&self, user_id: &str) -> PathBuf {
        self.root.join("users").join(user_id).join("uploads")
    }

    /// `users/<user_id>/jobs/<job_id>`
    pub fn job_dir(&self, user_id: &str, job_id: &JobId) -> PathBuf {
        self.root
            .join("users")
            .join(user_id)
            .join("jobs")
            .join(job_id.as_str())
    }

    /// `users/<user_id>/jobs/<job_id>/<composite_name>`
    pub fn step_dir(&self, user_id: &str, job_id: &JobId, step: &Step) -> PathBuf {
        self.job_dir(user_id, job_id).join(step.composite_name())
    }

    /// Turn a storage-relative path into an absolute one; absolute paths
    /// pass through unchanged.
    pub fn absolutize(&self, path: &str) -> PathBuf {
        let candidate = Path::new(path);
        if candidate.is_absolute() {
            candidate.to_path_buf()
        } else {
            self.root.join(candidate)
        }
    }

    /// Absolutize values that look like storage-relative paths; opaque
    /// scalars and already-absolute paths pass through unchanged.
    pub fn absolutize_pathlike(&self, value: &str) -> String {
        if value.contains('/') && !value.starts_with('/') {
            self.root.join(value).to_string_lossy().into_owned()
        } else {
            value.to_string()
        }
    }

    /// Pre-create every step's composite directory and every directory
    /// implied by declared output paths (after template resolution).
    pub fn ensure_job_tree(&self, job: &Job) {
        let Some(user_id) = job.user_id.as_deref() else {
            tracing::warn!(job = %job.job_id, "cannot prepare job directories without a user_id");
            return;
        };

        for step in &job.steps {
            let step_dir = self.step_dir(user_id, &job.job_id, step);
            if let Err(err) = std::fs::create_dir_all(&step_dir) {
                tracing::warn!(
                    job = %job.job_id,
                    step = %step.name,
                    path = %step_dir.display(),
                    error = %err,
                    "failed to pre-create step directory"
                );
            }

            for (output_name, template) in &step.outputs {
                let resolved = match sw_pipeline::resolve(template, job, Some(step)) {
                    Ok(resolved) => resolved,
                    Err(err) => {
                        tracing::warn!(
                            job = %job.job_id,
                            step = %step.name,
                            output = %output_name,
                            error = %err,
                            "skipping unresolvable output path"
                        );
                        continue;
                    }
                };

                let absolute = self.absolutize(&resolved);
                // Outputs escaping the storage root are not ours to create
                if !absolute.starts_with(&self.root) {
                    continue;
                }
                if let Some(parent) = absolute.parent() {
                    if let Err(err) = std::fs::create_dir_all(parent) {
                        tracing::warn!(
                            job = %job.job_id,
                            step = %step.name,
                            path = %parent.display(),
                            error = %err,
                            "failed to pre-create output directory"
                        );
                    }
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "layout_tests.rs"]
mod tests;
