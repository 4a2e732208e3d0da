// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Path materialization against the shared storage root
//!
//! Workers use the shared filesystem directly: no upload/download stage
//! for the local backend. Envelope paths are storage-relative (or already
//! absolute); materialization turns them into absolute paths and checks
//! the preconditions the external program relies on.

use crate::error::WorkerError;
use indexmap::IndexMap;
use std::path::{Path, PathBuf};

/// Compute the absolute path for a storage-relative (or absolute) value.
pub fn absolutize(root: &Path, value: &str) -> PathBuf {
    let candidate = Path::new(value);
    if candidate.is_absolute() {
        candidate.to_path_buf()
    } else {
        root.join(candidate)
    }
}

/// Strip the storage root, recovering the relative path recorded in the
/// job document. Paths outside the root pass through unchanged.
pub fn relative_to_root(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .into_owned()
}

/// Map every input to an absolute path, failing on the first one that
/// does not exist on shared storage.
pub fn materialize_inputs(
    root: &Path,
    inputs: &IndexMap<String, String>,
) -> Result<IndexMap<String, String>, WorkerError> {
    let mut materialized = IndexMap::with_capacity(inputs.len());
    for (name, value) in inputs {
        let absolute = absolutize(root, value);
        if !absolute.exists() {
            return Err(WorkerError::MissingInput {
                name: name.clone(),
                path: absolute,
            });
        }
        tracing::debug!(input = %name, path = %absolute.display(), "using shared storage file");
        materialized.insert(name.clone(), absolute.to_string_lossy().into_owned());
    }
    Ok(materialized)
}

/// Map every output to an absolute path and ensure its parent directory
/// exists so the external program can write it.
pub fn prepare_outputs(
    root: &Path,
    outputs: &IndexMap<String, String>,
) -> Result<IndexMap<String, String>, WorkerError> {
    let mut prepared = IndexMap::with_capacity(outputs.len());
    for (name, value) in outputs {
        let absolute = absolutize(root, value);
        if let Some(parent) = absolute.parent() {
            std::fs::create_dir_all(parent)?;
        }
        prepared.insert(name.clone(), absolute.to_string_lossy().into_owned());
    }
    Ok(prepared)
}

/// Check declared outputs after execution.
///
/// Returns the storage-relative paths of outputs that exist with non-zero
/// size. If none were created the step failed; if only some are missing
/// the step succeeds and the gaps are logged.
pub fn validate_outputs(
    root: &Path,
    outputs: &IndexMap<String, String>,
) -> Result<IndexMap<String, String>, WorkerError> {
    if outputs.is_empty() {
        return Ok(IndexMap::new());
    }

    let mut created = IndexMap::new();
    let mut missing = Vec::new();

    for (name, value) in outputs {
        let path = Path::new(value);
        let size = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);
        if size > 0 {
            created.insert(name.clone(), relative_to_root(root, path));
        } else {
            missing.push(name.as_str());
            tracing::warn!(output = %name, path = %value, "expected output missing or empty");
        }
    }

    if created.is_empty() {
        return Err(WorkerError::NoOutputs {
            expected: outputs.keys().cloned().collect::<Vec<_>>().join(", "),
        });
    }
    if !missing.is_empty() {
        tracing::warn!(missing = %missing.join(", "), "some expected outputs were not created");
    }
    Ok(created)
}

#[cfg(test)]
#[path = "paths_tests.rs"]
mod tests;
