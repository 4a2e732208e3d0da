// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Builders for constructing jobs and steps in tests.
//!
//! Only compiled for tests or with the `test-support` feature.

use crate::command::CommandSpec;
use crate::job::{Job, JobId};
use crate::status::{JobStatus, StepStatus};
use crate::step::{Step, StepId};
use crate::transition::Transition;
use chrono::{TimeZone, Utc};
use serde_json::Value;

/// Builder for a [`Step`]. The step id defaults to `<name>-id`.
#[derive(Debug, Clone)]
pub struct StepBuilder {
    step: Step,
}

impl StepBuilder {
    pub fn new(name: impl Into<String>, service: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            step: Step {
                step_id: StepId::new(format!("{name}-id")),
                name,
                order: 0,
                service: service.into(),
                command_spec: CommandSpec::new("true"),
                inputs: Default::default(),
                outputs: Default::default(),
                status: StepStatus::Pending,
                started_at: None,
                finished_at: None,
                error_message: None,
            },
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.step.step_id = StepId::new(id);
        self
    }

    pub fn order(mut self, order: u32) -> Self {
        self.step.order = order;
        self
    }

    pub fn program(mut self, program: impl Into<String>) -> Self {
        self.step.command_spec.program = program.into();
        self
    }

    pub fn flag(mut self, flag: impl Into<String>, value: Value) -> Self {
        self.step.command_spec.flags.insert(flag.into(), value);
        self
    }

    pub fn arg(mut self, value: Value) -> Self {
        self.step.command_spec.args.push(value);
        self
    }

    pub fn shell(mut self) -> Self {
        self.step.command_spec.shell = true;
        self
    }

    pub fn input(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.step.inputs.insert(name.into(), value.into());
        self
    }

    pub fn output(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.step.outputs.insert(name.into(), value.into());
        self
    }

    pub fn status(mut self, status: StepStatus) -> Self {
        self.step.status = status;
        self
    }

    pub fn build(self) -> Step {
        self.step
    }
}

/// Builder for a [`Job`]. Step orders are assigned by insertion position;
/// transitions are declared by step name and resolved to ids at build time.
#[derive(Debug, Clone)]
pub struct JobBuilder {
    job_id: JobId,
    user_id: Option<String>,
    status: JobStatus,
    steps: Vec<Step>,
    transitions: Vec<(String, String, Vec<(String, String)>)>,
}

impl JobBuilder {
    pub fn new(job_id: impl Into<String>) -> Self {
        Self {
            job_id: JobId::new(job_id),
            user_id: None,
            status: JobStatus::Pending,
            steps: Vec::new(),
            transitions: Vec::new(),
        }
    }

    pub fn user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn status(mut self, status: JobStatus) -> Self {
        self.status = status;
        self
    }

    pub fn step(mut self, builder: StepBuilder) -> Self {
        let mut step = builder.build();
        step.order = self.steps.len() as u32;
        self.steps.push(step);
        self
    }

    pub fn transition(mut self, from: &str, to: &str, mapping: &[(&str, &str)]) -> Self {
        self.transitions.push((
            from.to_string(),
            to.to_string(),
            mapping
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        ));
        self
    }

    pub fn build(self) -> Job {
        let id_of = |name: &str| -> StepId {
            self.steps
                .iter()
                .find(|s| s.name == name)
                .map(|s| s.step_id.clone())
                .unwrap_or_else(|| StepId::new(format!("{name}-id")))
        };

        let step_transitions = self
            .transitions
            .iter()
            .map(|(from, to, mapping)| Transition {
                from_step_id: id_of(from),
                to_step_id: id_of(to),
                output_to_input_mapping: mapping.iter().cloned().collect(),
            })
            .collect();

        let created_at = Utc
            .timestamp_millis_opt(1_700_000_000_000)
            .single()
            .unwrap_or_default();

        Job {
            job_id: self.job_id,
            user_id: self.user_id,
            status: self.status,
            steps: self.steps,
            step_transitions,
            created_at,
            updated_at: created_at,
        }
    }
}
