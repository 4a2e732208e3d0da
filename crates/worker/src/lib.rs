// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! sw-worker: the per-service worker runtime
//!
//! A single data-driven loop executes whatever the envelope describes:
//! the command spec and output map fully specify what to run and where
//! results land. Service-specific knowledge lives in the submitter's
//! command construction, not here.

pub mod env;
pub mod error;
pub mod exec;
pub mod paths;
pub mod runtime;

pub use error::WorkerError;
pub use exec::build_argv;
pub use runtime::Worker;
