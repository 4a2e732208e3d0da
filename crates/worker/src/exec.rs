// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command rendering: resolved spec + materialized paths → argv

use indexmap::IndexMap;
use std::path::Path;
use sw_core::command::{placeholder_name, scalar_to_string};
use sw_core::CommandSpec;

/// Render a command spec to an argv with materialized paths.
///
/// - `{{name}}` placeholders in flag values and positional args are
///   substituted with the absolute paths computed during materialization
///   (inputs searched first, then outputs).
/// - Space-separated scalar flag values are split into separate argv
///   entries (e.g. `-fftsettings "1024 512 1024"` becomes three tokens).
/// - Storage-relative flag values are absolutized under the root.
pub fn build_argv(
    spec: &CommandSpec,
    inputs: &IndexMap<String, String>,
    outputs: &IndexMap<String, String>,
    storage_root: &Path,
) -> Vec<String> {
    let substitute = |raw: &str| -> Option<String> {
        let name = placeholder_name(raw)?;
        inputs.get(name).or_else(|| outputs.get(name)).cloned()
    };

    let mut argv = vec![spec.program.clone()];

    for (flag, value) in &spec.flags {
        argv.push(flag.clone());
        let raw = scalar_to_string(value);

        if let Some(path) = substitute(&raw) {
            argv.push(path);
        } else if raw.contains(char::is_whitespace) {
            argv.extend(raw.split_whitespace().map(String::from));
        } else if raw.contains('/') && !raw.starts_with('/') {
            argv.push(storage_root.join(&raw).to_string_lossy().into_owned());
        } else {
            argv.push(raw);
        }
    }

    for arg in &spec.args {
        let raw = scalar_to_string(arg);
        match substitute(&raw) {
            Some(path) => argv.push(path),
            None => argv.push(raw),
        }
    }

    argv
}

#[cfg(test)]
#[path = "exec_tests.rs"]
mod tests;
