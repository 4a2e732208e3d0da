// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stepwise worker (sw-worker)
//!
//! One process per service instance: consumes `<service>_requests`,
//! executes external programs against the shared storage root, and
//! reports step status back on `job_status_events`. Horizontal
//! parallelism comes from running more processes of the same service.

use std::sync::Arc;
use sw_adapters::RedisQueue;
use sw_worker::{env, Worker};
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::Notify;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let service = match parse_service() {
        Some(service) => service,
        None => {
            eprintln!("Usage: sw-worker <service>");
            eprintln!();
            eprintln!("Consumes the <service>_requests queue and executes steps.");
            eprintln!("Environment: STORAGE_ROOT, REDIS_HOST, REDIS_PORT, SW_STEP_TIMEOUT_SECS");
            std::process::exit(2);
        }
    };

    setup_logging();

    let (host, port) = env::redis_endpoint();
    let queue = match RedisQueue::connect(&host, port).await {
        Ok(queue) => Arc::new(queue),
        Err(err) => {
            error!(host = %host, port, error = %err, "failed to connect to redis");
            return Err(err.into());
        }
    };

    let storage_root = env::storage_root();
    info!(
        service = %service,
        storage_root = %storage_root.display(),
        "starting worker"
    );

    let worker = Worker::new(service, queue, storage_root, env::step_timeout());
    let shutdown = Arc::new(Notify::new());

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    {
        let shutdown = Arc::clone(&shutdown);
        tokio::spawn(async move {
            tokio::select! {
                _ = sigterm.recv() => info!("received SIGTERM"),
                _ = sigint.recv() => info!("received SIGINT"),
            }
            shutdown.notify_waiters();
        });
    }

    worker.run(shutdown).await;
    info!("worker stopped");
    Ok(())
}

fn parse_service() -> Option<String> {
    match std::env::args().nth(1) {
        Some(arg) if arg == "--help" || arg == "-h" => None,
        Some(service) if !service.starts_with('-') => Some(service),
        Some(_) => None,
        None => std::env::var("SW_SERVICE").ok(),
    }
}

fn setup_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .init();
}
