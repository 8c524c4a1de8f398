//! Sandbox — per-scenario scratch workspace with guaranteed cleanup.
//!
//! Setup fails fast with [`HarnessError::PreconditionFailed`] before creating
//! anything if either fixture is missing. Teardown is explicit via
//! [`Sandbox::teardown`] so its errors propagate; `Drop` is the fallback for
//! panics and early returns and only logs.

use crate::fixture::create_fixture;
use crate::id::WorkspaceIds;
use mkharness_core::config::SandboxConfig;
use mkharness_core::path::sanitize;
use mkharness_core::{HarnessError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

// ---------------------------------------------------------------------------
// SandboxOptions
// ---------------------------------------------------------------------------

/// Where workspaces live and what the build-file is renamed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SandboxOptions {
    pub root: PathBuf,
    pub build_file_name: String,
}

impl SandboxOptions {
    pub fn from_config(cfg: &SandboxConfig) -> Self {
        Self {
            root: cfg.root.clone(),
            build_file_name: cfg.build_file_name.clone(),
        }
    }

    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }
}

impl Default for SandboxOptions {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            build_file_name: "Makefile".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Sandbox
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct Sandbox {
    dir: PathBuf,
    build_file: PathBuf,
    shared_lib: PathBuf,
    torn_down: bool,
}

impl Sandbox {
    /// Create a fresh workspace under `opts.root` and populate it.
    ///
    /// `shared_lib` keeps its file name; `build_file` is copied as
    /// `opts.build_file_name` so the build tool discovers it without `-f`.
    pub fn create(
        build_file: impl AsRef<Path>,
        shared_lib: impl AsRef<Path>,
        ids: &WorkspaceIds,
        opts: &SandboxOptions,
    ) -> Result<Self> {
        let build_file = sanitize(build_file)?;
        let shared_lib = sanitize(shared_lib)?;
        for fixture in [&build_file, &shared_lib] {
            if !fixture.is_file() {
                return Err(HarnessError::PreconditionFailed {
                    path: fixture.clone(),
                });
            }
        }
        let lib_name = shared_lib
            .file_name()
            .ok_or_else(|| HarnessError::PreconditionFailed {
                path: shared_lib.clone(),
            })?
            .to_owned();

        let dir = sanitize(&opts.root)?.join(ids.next_name());
        std::fs::create_dir(&dir).map_err(|e| {
            HarnessError::io(format!("failed to create workspace {}", dir.display()), e)
        })?;
        info!(workspace = %dir.display(), "created sandbox");

        // From here on Drop owns cleanup if a copy fails.
        let sandbox = Sandbox {
            build_file: dir.join(&opts.build_file_name),
            shared_lib: dir.join(lib_name),
            dir,
            torn_down: false,
        };
        copy(&shared_lib, &sandbox.shared_lib)?;
        copy(&build_file, &sandbox.build_file)?;
        Ok(sandbox)
    }

    /// Create a sandbox, run `body` in it, then tear it down.
    ///
    /// Teardown runs whether or not `body` fails. If teardown itself fails,
    /// that error is returned even when `body` had already failed.
    pub fn scope<T, F>(
        build_file: impl AsRef<Path>,
        shared_lib: impl AsRef<Path>,
        ids: &WorkspaceIds,
        opts: &SandboxOptions,
        body: F,
    ) -> Result<T>
    where
        F: FnOnce(&Sandbox) -> Result<T>,
    {
        let sandbox = Sandbox::create(build_file, shared_lib, ids, opts)?;
        let result = body(&sandbox);
        sandbox.teardown()?;
        result
    }

    /// The workspace directory.
    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// The build-file copy, under its canonical name.
    pub fn build_file(&self) -> &Path {
        &self.build_file
    }

    pub fn shared_lib(&self) -> &Path {
        &self.shared_lib
    }

    pub fn join(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.dir.join(relative)
    }

    /// Generate a fixture file inside the workspace.
    pub fn create_fixture(&self, filename: impl AsRef<Path>) -> Result<PathBuf> {
        create_fixture(filename, &self.dir)
    }

    /// Recursively remove the workspace.
    pub fn teardown(mut self) -> Result<()> {
        self.torn_down = true;
        std::fs::remove_dir_all(&self.dir).map_err(|e| {
            HarnessError::io(format!("failed to remove workspace {}", self.dir.display()), e)
        })?;
        info!(workspace = %self.dir.display(), "removed sandbox");
        Ok(())
    }
}

impl Drop for Sandbox {
    fn drop(&mut self) {
        if self.torn_down {
            return;
        }
        debug!(workspace = %self.dir.display(), "sandbox dropped without teardown");
        if let Err(e) = std::fs::remove_dir_all(&self.dir) {
            warn!(workspace = %self.dir.display(), error = %e, "failed to remove sandbox");
        }
    }
}

fn copy(from: &Path, to: &Path) -> Result<()> {
    std::fs::copy(from, to).map_err(|e| {
        HarnessError::io(
            format!("failed to copy {} to {}", from.display(), to.display()),
            e,
        )
    })?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
