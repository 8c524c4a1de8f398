//! mkharness-sandbox — disposable workspaces for build-tool scenarios.
//!
//! A [`Sandbox`] is a uniquely named scratch directory holding a copy of the
//! build-file under its canonical name plus the shared library it includes.
//! [`fixture::create_fixture`] drops trivial input files into it. Names come
//! from a caller-owned [`WorkspaceIds`], so nothing here touches global state.

pub mod fixture;
pub mod id;
pub mod workspace;

pub use fixture::create_fixture;
pub use id::WorkspaceIds;
pub use workspace::{Sandbox, SandboxOptions};
