// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Adapters for external I/O: message queues and subprocesses

pub mod queue;
pub mod subprocess;

pub use queue::{Queue, QueueError, RedisQueue};
pub use subprocess::{run_with_timeout, DEFAULT_STEP_TIMEOUT};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use queue::MemoryQueue;
