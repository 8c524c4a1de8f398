//! Test builders — a scratch root with a group library layout and a harness
//! that creates its workspaces inside it.

use mkharness::{BuildRunner, Harness, SandboxOptions, Scenario, WorkspaceIds};
use std::path::{Path, PathBuf};

/// A temporary root holding `grouplib.mk`, one build-file, and every
/// workspace the bed's harness creates.
pub struct TestBed {
    pub root: tempfile::TempDir,
    pub build_file: PathBuf,
    pub shared_lib: PathBuf,
}

impl TestBed {
    pub fn new(case: &str, contents: &str) -> Self {
        let root = tempfile::tempdir().unwrap();
        let (build_file, shared_lib) = super::write_group_layout(root.path(), case, contents);
        Self {
            root,
            build_file,
            shared_lib,
        }
    }

    pub fn path(&self) -> &Path {
        self.root.path()
    }

    pub fn options(&self) -> SandboxOptions {
        SandboxOptions::default().root(self.root.path())
    }

    pub fn harness(&self, runner: BuildRunner) -> Harness {
        Harness::new(runner, WorkspaceIds::default(), self.options())
    }

    /// A scenario for this bed's build-file with the two standard sources.
    pub fn scenario(&self, name: &str) -> Scenario {
        Scenario::new(name, &self.build_file, &self.shared_lib)
            .source("source.1")
            .source("source.2")
    }

    /// Workspace directories currently under the root.
    pub fn workspaces(&self) -> Vec<PathBuf> {
        std::fs::read_dir(self.root.path())
            .unwrap()
            .map(|e| e.unwrap().path())
            .filter(|p| {
                p.is_dir()
                    && p.file_name()
                        .map(|n| n.to_string_lossy().starts_with("_tmp_"))
                        .unwrap_or(false)
            })
            .collect()
    }
}
