//! mkharness — sandboxed test harness for `make`-based build libraries.
//!
//! A scenario copies a build-file and the shared group library into a fresh
//! workspace, generates a few input files, runs the build tool there, and
//! reports `(exit code, stdout, stderr)` before removing the workspace.
//!
//! # Architecture
//!
//! ```text
//! Scenario ──► Sandbox::scope ──► create_fixture ──► BuildRunner::run
//!                  │                                      │
//!                  └──────────── teardown ◄── ScenarioReport
//! ```
//!
//! The building blocks live in `mkharness-core` (runner, paths, config) and
//! `mkharness-sandbox` (workspaces, fixtures); this crate composes them.

pub mod scenario;

pub use mkharness_core::{config::Config, ArgList, BuildOutcome, BuildRequest, BuildRunner, HarnessError};
pub use mkharness_sandbox::{create_fixture, Sandbox, SandboxOptions, WorkspaceIds};
pub use scenario::{Harness, Scenario, ScenarioReport};
