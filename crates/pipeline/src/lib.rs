// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! sw-pipeline: submission payloads, graph validation, and template resolution

pub mod submission;
pub mod template;
pub mod validate;

pub use submission::{JobSubmission, StepSubmission, TransitionSubmission};
pub use template::{resolve, resolve_map, TemplateError};
pub use validate::{build_job, ValidationError};
