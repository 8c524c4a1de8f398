//! mkharness-core — building blocks for driving a `make`-style build tool.
//!
//! This crate owns everything that does not touch a scratch workspace: the
//! error type, configuration, path sanitizing, and the build runner itself.
//!
//! # Architecture
//!
//! ```text
//! Config ──► BuildRunner ──► child process ──► BuildOutcome
//!              ▲
//!   path::sanitize (working dir, -f file)
//! ```
//!
//! Everything is synchronous. One [`BuildRunner::run`] call spawns exactly
//! one child and blocks until it exits.

pub mod config;
pub mod error;
pub mod path;
pub mod runner;
pub mod types;

pub use error::{HarnessError, Result};
pub use runner::BuildRunner;
pub use types::{ArgList, BuildOutcome, BuildRequest};
