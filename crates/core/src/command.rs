// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Serializable subprocess descriptions

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// A serializable description of an external program invocation.
///
/// Flags are an ordered name → scalar mapping; args are ordered positional
/// scalars. The spec renders deterministically to
/// `[program, flag1, val1, …, arg1, arg2, …]`.
///
/// Flag and arg values of the exact form `{{name}}` are placeholders that
/// [`CommandSpec::resolve`] rewrites against input/output maps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandSpec {
    /// Base command or executable name
    pub program: String,
    /// CLI flags, e.g. `{"-i": "input.wav", "-ar": 44100}`
    #[serde(default)]
    pub flags: IndexMap<String, Value>,
    /// Ordered positional args
    #[serde(default)]
    pub args: Vec<Value>,
    /// Run through a shell instead of spawning the program directly
    #[serde(default)]
    pub shell: bool,
    /// Working directory override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwd: Option<PathBuf>,
    /// Environment variables for the subprocess
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<IndexMap<String, String>>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            flags: IndexMap::new(),
            args: Vec::new(),
            shell: false,
            cwd: None,
            env: None,
        }
    }

    /// Render to an argv: `[program, flag1, val1, …, arg1, arg2, …]`.
    pub fn to_argv(&self) -> Vec<String> {
        let mut argv = vec![self.program.clone()];
        for (flag, value) in &self.flags {
            argv.push(flag.clone());
            argv.push(scalar_to_string(value));
        }
        argv.extend(self.args.iter().map(scalar_to_string));
        argv
    }

    /// Replace `{{name}}` placeholders in flag values and args.
    ///
    /// Inputs are searched first, then outputs. Non-placeholder and
    /// multi-token values pass through unchanged. Returns a new spec; the
    /// receiver is never mutated.
    pub fn resolve(
        &self,
        inputs: &IndexMap<String, String>,
        outputs: &IndexMap<String, String>,
    ) -> CommandSpec {
        let substitute = |value: &Value| -> Value {
            let Some(name) = value.as_str().and_then(placeholder_name) else {
                return value.clone();
            };
            match inputs.get(name).or_else(|| outputs.get(name)) {
                Some(path) => Value::String(path.clone()),
                None => value.clone(),
            }
        };

        CommandSpec {
            program: self.program.clone(),
            flags: self
                .flags
                .iter()
                .map(|(flag, value)| (flag.clone(), substitute(value)))
                .collect(),
            args: self.args.iter().map(substitute).collect(),
            shell: self.shell,
            cwd: self.cwd.clone(),
            env: self.env.clone(),
        }
    }

    /// Stable MD5 hex digest over the canonicalized flags.
    ///
    /// Keys are sorted and the encoding is compact, so the digest is
    /// independent of flag insertion order. This feeds the composite step
    /// name and enables content-addressed caching of step outputs.
    pub fn params_hash(&self) -> String {
        use md5::{Digest, Md5};

        let sorted: BTreeMap<&String, &Value> = self.flags.iter().collect();
        let canonical = serde_json::to_string(&sorted).unwrap_or_default();
        format!("{:x}", Md5::digest(canonical.as_bytes()))
    }
}

/// Extract the placeholder name from a value of the exact form `{{name}}`.
///
/// Multi-token strings and values with embedded braces are not placeholders.
pub fn placeholder_name(value: &str) -> Option<&str> {
    let inner = value.strip_prefix("{{")?.strip_suffix("}}")?;
    let inner = inner.trim();
    if inner.is_empty() || inner.contains(['{', '}']) || inner.contains(char::is_whitespace) {
        return None;
    }
    Some(inner)
}

/// Render a scalar JSON value as a single argv token.
///
/// Strings render bare (no quotes); numbers and bools use their JSON form.
pub fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
#[path = "command_tests.rs"]
mod tests;
