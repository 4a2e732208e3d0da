// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The worker loop: pop, materialize, execute, validate, report

use crate::error::WorkerError;
use crate::{exec, paths};
use indexmap::IndexMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use sw_adapters::{run_with_timeout, Queue};
use sw_core::{request_channel, Clock, StepExecute, StepStatusEvent, SystemClock, STATUS_CHANNEL};
use tokio::process::Command;
use tokio::sync::Notify;

/// How long a blocking pop waits before looping.
const POLL_TIMEOUT: Duration = Duration::from_secs(10);

/// Pause after a queue error before retrying.
const QUEUE_BACKOFF: Duration = Duration::from_secs(1);

/// A per-service consumer executing pre-constructed commands.
///
/// The orchestrator constructs safe, well-formed commands; the worker
/// executes them verbatim against shared storage and reports status on
/// the status channel.
pub struct Worker<Q> {
    service: String,
    queue: Arc<Q>,
    storage_root: PathBuf,
    step_timeout: Duration,
}

impl<Q: Queue> Worker<Q> {
    pub fn new(
        service: impl Into<String>,
        queue: Arc<Q>,
        storage_root: impl Into<PathBuf>,
        step_timeout: Duration,
    ) -> Self {
        Self {
            service: service.into(),
            queue,
            storage_root: storage_root.into(),
            step_timeout,
        }
    }

    /// Consume the service's request channel until shutdown.
    ///
    /// Queue errors are logged and retried after a backoff; a worker
    /// process only exits on shutdown.
    pub async fn run(&self, shutdown: Arc<Notify>) {
        let channel = request_channel(&self.service);
        tracing::info!(service = %self.service, channel = %channel, "worker listening");

        loop {
            tokio::select! {
                _ = shutdown.notified() => {
                    tracing::info!(service = %self.service, "worker shutting down");
                    break;
                }
                popped = self.queue.pop(&channel, POLL_TIMEOUT) => match popped {
                    Ok(Some(payload)) => self.handle_payload(&payload).await,
                    Ok(None) => {}
                    Err(err) => {
                        tracing::error!(error = %err, "queue error, backing off");
                        tokio::time::sleep(QUEUE_BACKOFF).await;
                    }
                },
            }
        }
    }

    /// Handle one raw envelope: heartbeat, execute, report.
    ///
    /// Malformed envelopes are dropped with a log. Domain failures become
    /// `failed` status events; they never kill the loop.
    pub async fn handle_payload(&self, payload: &str) {
        let envelope: StepExecute = match serde_json::from_str(payload) {
            Ok(envelope) => envelope,
            Err(err) => {
                tracing::warn!(error = %err, "dropping malformed execute envelope");
                return;
            }
        };

        tracing::info!(
            job = %envelope.job_id,
            step = %envelope.step_name,
            "processing step"
        );
        self.emit(StepStatusEvent::processing(&envelope, SystemClock.now()))
            .await;

        match self.process(&envelope).await {
            Ok(outputs) => {
                tracing::info!(
                    job = %envelope.job_id,
                    step = %envelope.step_name,
                    outputs = outputs.len(),
                    "step complete"
                );
                self.emit(StepStatusEvent::complete(&envelope, outputs, SystemClock.now()))
                    .await;
            }
            Err(err) => {
                tracing::warn!(
                    job = %envelope.job_id,
                    step = %envelope.step_name,
                    error = %err,
                    "step failed"
                );
                self.emit(StepStatusEvent::failed(&envelope, err.to_string(), SystemClock.now()))
                    .await;
            }
        }
    }

    /// Execute one envelope and return the validated relative output map.
    pub async fn process(
        &self,
        envelope: &StepExecute,
    ) -> Result<IndexMap<String, String>, WorkerError> {
        let inputs = paths::materialize_inputs(&self.storage_root, &envelope.inputs)?;
        let outputs = paths::prepare_outputs(&self.storage_root, &envelope.outputs)?;

        // Per-step scratch directory; removed on drop. Files under the
        // shared step output path are never deleted here.
        let scratch = tempfile::Builder::new()
            .prefix(&format!("{}_{}_", self.service, envelope.step_id))
            .tempdir()?;

        let argv = exec::build_argv(&envelope.command_spec, &inputs, &outputs, &self.storage_root);
        tracing::info!(command = %argv.join(" "), "executing");

        let mut cmd = if envelope.command_spec.shell {
            let mut cmd = Command::new("sh");
            cmd.arg("-c").arg(argv.join(" "));
            cmd
        } else {
            let mut cmd = Command::new(&argv[0]);
            cmd.args(&argv[1..]);
            cmd
        };
        let cwd = envelope
            .command_spec
            .cwd
            .clone()
            .unwrap_or_else(|| scratch.path().to_path_buf());
        cmd.current_dir(cwd);
        if let Some(env) = &envelope.command_spec.env {
            cmd.envs(env.iter());
        }

        let description = format!("step '{}'", envelope.step_name);
        let output = run_with_timeout(cmd, self.step_timeout, &description)
            .await
            .map_err(WorkerError::CommandFailed)?;

        if !output.status.success() {
            let code = output
                .status
                .code()
                .map(|code| code.to_string())
                .unwrap_or_else(|| "signal".to_string());
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(WorkerError::CommandFailed(format!(
                "exit {}: {}",
                code,
                stderr.trim()
            )));
        }
        if !output.stdout.is_empty() {
            tracing::debug!(stdout = %String::from_utf8_lossy(&output.stdout).trim(), "command stdout");
        }

        paths::validate_outputs(&self.storage_root, &outputs)
    }

    async fn emit(&self, event: StepStatusEvent) {
        match serde_json::to_string(&event) {
            Ok(payload) => {
                if let Err(err) = self.queue.push(STATUS_CHANNEL, &payload).await {
                    tracing::error!(error = %err, "failed to publish status event");
                }
            }
            Err(err) => tracing::error!(error = %err, "failed to encode status event"),
        }
    }
}

#[cfg(test)]
#[path = "runtime_tests.rs"]
mod tests;
