//! Shared test utilities for mkharness integration harnesses.
//!
//! Import everything you need via `mod common; use common::*;` at the top of
//! each harness file.

pub mod assertions;
pub mod builders;
pub mod fixtures;
pub mod tools;

pub use builders::*;
pub use fixtures::*;
pub use tools::*;
