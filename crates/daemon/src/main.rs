// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stepwise daemon (swd)
//!
//! The orchestrator server process. Owns the single serial consumer of
//! the `job_status_events` channel: every status event from a worker is
//! applied to the job store and re-evaluated for dispatch. The HTTP
//! front door embeds `sw-engine` in its own process and shares state
//! through the store and the queue; `swd` owns only the status channel.

mod env;

use fs2::FileExt;
use std::sync::Arc;
use std::time::Duration;
use sw_adapters::{Queue, RedisQueue};
use sw_core::{SystemClock, UuidIdGen, STATUS_CHANNEL};
use sw_engine::{Orchestrator, StorageLayout};
use sw_storage::FsJobStore;
use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info};

/// How long a blocking pop waits before looping.
const POLL_TIMEOUT: Duration = Duration::from_secs(10);

/// Pause after an infrastructure error before retrying.
const ERROR_BACKOFF: Duration = Duration::from_secs(1);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Some(arg) = std::env::args().nth(1) {
        match arg.as_str() {
            "--version" | "-V" | "-v" => {
                println!("swd {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" | "-h" | "help" => {
                println!("swd {}", env!("CARGO_PKG_VERSION"));
                println!("Stepwise daemon - consumes job status events and dispatches steps");
                println!();
                println!("USAGE:");
                println!("    swd");
                println!();
                println!("Environment: STORAGE_ROOT, REDIS_HOST, REDIS_PORT, SW_STATE_DIR");
                println!();
                println!("OPTIONS:");
                println!("    -h, --help       Print help information");
                println!("    -v, --version    Print version information");
                return Ok(());
            }
            _ => {
                eprintln!("error: unexpected argument '{arg}'");
                eprintln!("Usage: swd [--help | --version]");
                std::process::exit(1);
            }
        }
    }

    setup_logging();

    let Some(state_dir) = env::state_dir() else {
        eprintln!("error: no state directory (set SW_STATE_DIR or HOME)");
        std::process::exit(1);
    };
    std::fs::create_dir_all(&state_dir)?;

    // One status consumer per state dir: a second consumer would break
    // the serial-dispatch guarantee readiness evaluation relies on
    let lock_path = state_dir.join("swd.lock");
    let lock_file = std::fs::OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(&lock_path)?;
    if lock_file.try_lock_exclusive().is_err() {
        eprintln!("swd is already running (lock: {})", lock_path.display());
        std::process::exit(1);
    }

    let (host, port) = env::redis_endpoint();
    let queue = match RedisQueue::connect(&host, port).await {
        Ok(queue) => Arc::new(queue),
        Err(err) => {
            error!(host = %host, port, error = %err, "failed to connect to redis");
            return Err(err.into());
        }
    };

    let store = Arc::new(FsJobStore::open(state_dir.join("jobs"))?);
    let layout = StorageLayout::new(env::storage_root());
    let orchestrator = Orchestrator::new(
        Arc::clone(&store),
        Arc::clone(&queue),
        layout,
        UuidIdGen,
        SystemClock,
    );

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    info!(
        state_dir = %state_dir.display(),
        storage_root = %env::storage_root().display(),
        "daemon ready, consuming status events"
    );

    // Status event loop - processed serially, so dispatch decisions are
    // linearizable with respect to observed events
    loop {
        tokio::select! {
            _ = sigterm.recv() => {
                info!("received SIGTERM, shutting down...");
                break;
            }
            _ = sigint.recv() => {
                info!("received SIGINT, shutting down...");
                break;
            }
            popped = queue.pop(STATUS_CHANNEL, POLL_TIMEOUT) => match popped {
                Ok(Some(payload)) => {
                    if let Err(err) = orchestrator.handle_status_payload(&payload).await {
                        error!(error = %err, "failed to handle status event");
                        tokio::time::sleep(ERROR_BACKOFF).await;
                    }
                }
                Ok(None) => {}
                Err(err) => {
                    error!(error = %err, "queue error, backing off");
                    tokio::time::sleep(ERROR_BACKOFF).await;
                }
            },
        }
    }

    info!("daemon stopped");
    Ok(())
}

fn setup_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .init();
}
