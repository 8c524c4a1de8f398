//! Scenarios — a build-file, its shared library, some generated sources and
//! one build-tool run, composed inside a [`Sandbox`].

use mkharness_core::config::Config;
use mkharness_core::{ArgList, BuildOutcome, BuildRequest, BuildRunner, Result};
use mkharness_sandbox::{Sandbox, SandboxOptions, WorkspaceIds};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::info;

// ---------------------------------------------------------------------------
// Scenario
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scenario {
    pub name: String,
    pub build_file: PathBuf,
    pub shared_lib: PathBuf,
    /// Fixture files generated in the workspace before the build runs.
    pub sources: Vec<String>,
    pub targets: Option<ArgList>,
    pub flags: Option<ArgList>,
    /// Files that must exist in the workspace after the build.
    pub expect_outputs: Vec<String>,
}

impl Scenario {
    pub fn new(
        name: impl Into<String>,
        build_file: impl Into<PathBuf>,
        shared_lib: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            build_file: build_file.into(),
            shared_lib: shared_lib.into(),
            sources: Vec::new(),
            targets: None,
            flags: None,
            expect_outputs: Vec::new(),
        }
    }

    /// `case_01.mk` against `../grouplib.mk` with `source.1` and `source.2`,
    /// default target, no flags.
    pub fn basic_operation() -> Self {
        Self::new("basic_operation", "case_01.mk", "../grouplib.mk")
            .source("source.1")
            .source("source.2")
    }

    pub fn source(mut self, filename: impl Into<String>) -> Self {
        self.sources.push(filename.into());
        self
    }

    pub fn targets(mut self, targets: impl Into<ArgList>) -> Self {
        self.targets = Some(targets.into());
        self
    }

    pub fn flags(mut self, flags: impl Into<ArgList>) -> Self {
        self.flags = Some(flags.into());
        self
    }

    pub fn expect_output(mut self, filename: impl Into<String>) -> Self {
        self.expect_outputs.push(filename.into());
        self
    }

    /// Load a scenario from a TOML file.
    ///
    /// `targets` and `flags` may be a string or an array of strings; any
    /// other shape is [`HarnessError::InvalidArgument`](mkharness_core::HarnessError::InvalidArgument).
    /// Relative `build_file` and `shared_lib` paths resolve against the
    /// directory holding the scenario file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw: ScenarioFile = config::Config::builder()
            .add_source(config::File::from(path).format(config::FileFormat::Toml))
            .build()?
            .try_deserialize()?;

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        let name = raw.name.unwrap_or_else(|| {
            path.file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| "scenario".to_string())
        });

        Ok(Self {
            name,
            build_file: base.join(raw.build_file),
            shared_lib: base.join(raw.shared_lib),
            sources: raw.sources,
            targets: raw
                .targets
                .as_ref()
                .map(|v| ArgList::from_value("targets", v))
                .transpose()?,
            flags: raw
                .flags
                .as_ref()
                .map(|v| ArgList::from_value("flags", v))
                .transpose()?,
            expect_outputs: raw.expect,
        })
    }
}

/// On-disk shape of a scenario file.
#[derive(Debug, Deserialize)]
struct ScenarioFile {
    name: Option<String>,
    build_file: PathBuf,
    shared_lib: PathBuf,
    #[serde(default)]
    sources: Vec<String>,
    targets: Option<serde_json::Value>,
    flags: Option<serde_json::Value>,
    #[serde(default)]
    expect: Vec<String>,
}

// ---------------------------------------------------------------------------
// ScenarioReport
// ---------------------------------------------------------------------------

/// What one scenario run observed, captured before the workspace went away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioReport {
    pub scenario: String,
    pub workspace: PathBuf,
    pub outcome: BuildOutcome,
    /// Each expected output and whether it existed after the build.
    pub outputs: Vec<(String, bool)>,
}

impl ScenarioReport {
    /// Human-readable reasons this run does not count as a success. Empty
    /// when the build exited 0 and every expected output was present.
    pub fn failures(&self) -> Vec<String> {
        let mut failures = Vec::new();
        if !self.outcome.success() {
            failures.push(format!("build exited with code {}", self.outcome.exit_code));
        }
        failures.extend(
            self.outputs
                .iter()
                .filter(|(_, present)| !present)
                .map(|(name, _)| format!("expected output {name} was not produced")),
        );
        failures
    }

    pub fn passed(&self) -> bool {
        self.failures().is_empty()
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "scenario": self.scenario,
            "workspace": self.workspace.display().to_string(),
            "outcome": self.outcome.to_json(),
            "outputs": self
                .outputs
                .iter()
                .map(|(name, present)| serde_json::json!({ "name": name, "present": present }))
                .collect::<Vec<_>>(),
        })
    }
}

impl fmt::Display for ScenarioReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "scenario: {}", self.scenario)?;
        writeln!(f, "workspace: {}", self.workspace.display())?;
        write!(f, "{}", self.outcome)?;
        for (name, present) in &self.outputs {
            let state = if *present { "present" } else { "missing" };
            writeln!(f, "output {name}: {state}")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

/// Runner, name generator and sandbox options bundled for repeated runs.
#[derive(Debug)]
pub struct Harness {
    pub runner: BuildRunner,
    pub ids: WorkspaceIds,
    pub options: SandboxOptions,
}

impl Harness {
    pub fn new(runner: BuildRunner, ids: WorkspaceIds, options: SandboxOptions) -> Self {
        Self {
            runner,
            ids,
            options,
        }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self::new(
            BuildRunner::from_config(&cfg.build),
            WorkspaceIds::from_config(&cfg.sandbox),
            SandboxOptions::from_config(&cfg.sandbox),
        )
    }

    /// Set up the sandbox, generate the sources, run the build tool with no
    /// `-f` (it finds the canonical build-file itself) and tear down.
    ///
    /// A non-zero exit code is reported, not raised.
    pub fn run(&self, scenario: &Scenario) -> Result<ScenarioReport> {
        Sandbox::scope(
            &scenario.build_file,
            &scenario.shared_lib,
            &self.ids,
            &self.options,
            |sandbox| {
                for source in &scenario.sources {
                    sandbox.create_fixture(source)?;
                }

                let request = BuildRequest {
                    build_file: None,
                    targets: scenario.targets.clone(),
                    flags: scenario.flags.clone(),
                    working_dir: sandbox.path().to_path_buf(),
                };
                let outcome = self.runner.run(&request)?;
                let outputs = scenario
                    .expect_outputs
                    .iter()
                    .map(|name| (name.clone(), sandbox.join(name).exists()))
                    .collect();

                info!(
                    scenario = %scenario.name,
                    exit_code = outcome.exit_code,
                    "scenario finished"
                );
                Ok(ScenarioReport {
                    scenario: scenario.name.clone(),
                    workspace: sandbox.path().to_path_buf(),
                    outcome,
                    outputs,
                })
            },
        )
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::from_config(&Config::defaults())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use mkharness_core::HarnessError;
    use pretty_assertions::assert_eq;

    #[test]
    fn basic_operation_matches_group_library_layout() {
        let s = Scenario::basic_operation();
        assert_eq!(s.build_file, PathBuf::from("case_01.mk"));
        assert_eq!(s.shared_lib, PathBuf::from("../grouplib.mk"));
        assert_eq!(s.sources, vec!["source.1", "source.2"]);
        assert_eq!(s.targets, None);
        assert_eq!(s.flags, None);
        assert!(s.expect_outputs.is_empty());
    }

    #[test]
    fn from_file_resolves_paths_and_arg_lists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("case_02.toml");
        std::fs::write(
            &path,
            r#"
build_file = "case_02.mk"
shared_lib = "../grouplib.mk"
sources    = ["a.c", "b.c"]
targets    = "build test"
flags      = ["-k", " -s "]
expect     = ["output.txt"]
"#,
        )
        .unwrap();

        let s = Scenario::from_file(&path).unwrap();
        assert_eq!(s.name, "case_02");
        assert_eq!(s.build_file, dir.path().join("case_02.mk"));
        assert_eq!(s.shared_lib, dir.path().join("../grouplib.mk"));
        assert_eq!(s.sources, vec!["a.c", "b.c"]);
        assert_eq!(s.targets.unwrap().tokens(), vec!["build", "test"]);
        assert_eq!(s.flags.unwrap().tokens(), vec!["-k", "-s"]);
        assert_eq!(s.expect_outputs, vec!["output.txt"]);
    }

    #[test]
    fn from_file_rejects_integer_targets() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(
            &path,
            "build_file = \"a.mk\"\nshared_lib = \"lib.mk\"\ntargets = 5\n",
        )
        .unwrap();

        let err = Scenario::from_file(&path).unwrap_err();
        assert!(
            matches!(err, HarnessError::InvalidArgument { what: "targets", .. }),
            "got {err:?}"
        );
    }

    #[test]
    fn report_failures_list_exit_code_and_missing_outputs() {
        let report = ScenarioReport {
            scenario: "s".to_string(),
            workspace: PathBuf::from("/tmp/_tmp_x"),
            outcome: BuildOutcome {
                exit_code: 2,
                stdout: Vec::new(),
                stderr: Vec::new(),
            },
            outputs: vec![("a".to_string(), true), ("b".to_string(), false)],
        };
        assert_eq!(
            report.failures(),
            vec![
                "build exited with code 2".to_string(),
                "expected output b was not produced".to_string(),
            ]
        );
        assert!(!report.passed());
    }
}
