// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Template variable interpolation
//!
//! Templates may reference `{{job_id}}`, `{{user_id}}`, `{{step_id}}`,
//! `{{composite_name}}`, and `{{steps.<name>.outputs.<key>}}` cross-step
//! references. Resolution is a single pass: substituted values are never
//! re-scanned, and unknown scalar tokens are left in place so partial
//! resolution is safe.

use indexmap::IndexMap;
use regex::Regex;
use std::sync::LazyLock;
use sw_core::{Job, Step};
use thiserror::Error;

/// Errors raised while resolving cross-step references
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("template references unknown step '{step}'")]
    UnknownStep { step: String },
    #[error("step '{step}' has no output '{output}'")]
    UnknownOutput { step: String, output: String },
}

/// Regex for `{{token}}` where token is a scalar name or a
/// `steps.<name>.outputs.<key>` reference
// Allow expect here as the regex is compile-time verified to be valid
#[allow(clippy::expect_used)]
static TOKEN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([a-zA-Z_][a-zA-Z0-9_]*|steps\.[a-zA-Z0-9_-]+\.outputs\.[a-zA-Z0-9_-]+)\s*\}\}")
        .expect("constant regex pattern is valid")
});

/// Resolve template tokens against a job and (optionally) a step.
///
/// Substitutes, in one pass over the template:
/// - `{{job_id}}`, `{{user_id}}` (left as-is when the job has no user),
/// - `{{step_id}}`, `{{composite_name}}` when a step is provided,
/// - `{{steps.<name>.outputs.<key>}}` looked up by step name; absent steps
///   or output keys are an error,
/// - anything else is left as-is.
pub fn resolve(template: &str, job: &Job, step: Option<&Step>) -> Result<String, TemplateError> {
    let mut result = String::with_capacity(template.len());
    let mut last = 0;

    for caps in TOKEN_PATTERN.captures_iter(template) {
        let Some(whole) = caps.get(0) else { continue };
        result.push_str(&template[last..whole.start()]);

        match lookup(&caps[1], job, step)? {
            Some(value) => result.push_str(&value),
            None => result.push_str(whole.as_str()),
        }
        last = whole.end();
    }

    result.push_str(&template[last..]);
    Ok(result)
}

/// Resolve every value of a logical-name → template map.
pub fn resolve_map(
    map: &IndexMap<String, String>,
    job: &Job,
    step: Option<&Step>,
) -> Result<IndexMap<String, String>, TemplateError> {
    map.iter()
        .map(|(name, value)| Ok((name.clone(), resolve(value, job, step)?)))
        .collect()
}

/// Look up one token. `Ok(None)` means "leave the token in place".
fn lookup(token: &str, job: &Job, step: Option<&Step>) -> Result<Option<String>, TemplateError> {
    if let Some(reference) = token.strip_prefix("steps.") {
        return resolve_step_reference(reference, job).map(Some);
    }

    Ok(match token {
        "job_id" => Some(job.job_id.to_string()),
        "user_id" => job.user_id.clone(),
        "step_id" => step.map(|s| s.step_id.to_string()),
        "composite_name" => step.map(Step::composite_name),
        _ => None,
    })
}

/// Resolve `<name>.outputs.<key>` against the job's steps.
fn resolve_step_reference(reference: &str, job: &Job) -> Result<String, TemplateError> {
    let (step_name, output_key) = match reference.split_once(".outputs.") {
        Some(parts) => parts,
        None => {
            return Err(TemplateError::UnknownStep {
                step: reference.to_string(),
            })
        }
    };

    let step = job
        .step_by_name(step_name)
        .ok_or_else(|| TemplateError::UnknownStep {
            step: step_name.to_string(),
        })?;

    step.outputs
        .get(output_key)
        .cloned()
        .ok_or_else(|| TemplateError::UnknownOutput {
            step: step_name.to_string(),
            output: output_key.to_string(),
        })
}

#[cfg(test)]
#[path = "template_tests.rs"]
mod tests;
