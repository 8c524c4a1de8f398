//! Workspace name generation.

use mkharness_core::config::SandboxConfig;
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// Hands out workspace directory names of the form `<prefix><32 hex chars>`.
///
/// The token is the MD5 digest of a per-generator counter combined with a
/// fresh random UUID, so names never repeat within one generator and collide
/// across generators (or processes) only with negligible probability.
#[derive(Debug)]
pub struct WorkspaceIds {
    prefix: String,
    counter: AtomicU64,
}

impl WorkspaceIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: AtomicU64::new(0),
        }
    }

    pub fn from_config(cfg: &SandboxConfig) -> Self {
        Self::new(cfg.prefix.clone())
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn next_name(&self) -> String {
        let seq = self.counter.fetch_add(1, Ordering::Relaxed);
        let digest = md5::compute(format!("{seq}:{}", Uuid::new_v4()));
        format!("{}{:x}", self.prefix, digest)
    }
}

impl Default for WorkspaceIds {
    fn default() -> Self {
        Self::new("_tmp_")
    }
}
