//! Value types passed into and out of the build runner.
//!
//! [`ArgList`] is the tagged input for targets and flags, [`BuildRequest`]
//! collects one invocation, and [`BuildOutcome`] is the captured
//! `(exit code, stdout, stderr)` triple.

use crate::error::{HarnessError, Result};
use std::fmt;
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// ArgList
// ---------------------------------------------------------------------------

/// An ordered list of command-line tokens, given either as one delimited
/// string or as an explicit sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgList {
    /// A single string, split on whitespace.
    Delimited(String),
    /// Already-ordered tokens; each one is trimmed.
    Sequence(Vec<String>),
}

impl ArgList {
    pub fn delimited(raw: impl Into<String>) -> Self {
        ArgList::Delimited(raw.into())
    }

    pub fn sequence<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ArgList::Sequence(items.into_iter().map(Into::into).collect())
    }

    /// Coerce a dynamically-typed value (scenario file, JSON) into an
    /// [`ArgList`]. Strings become [`ArgList::Delimited`], arrays of strings
    /// become [`ArgList::Sequence`]; anything else is rejected with
    /// [`HarnessError::InvalidArgument`] naming `what` and the value.
    pub fn from_value(what: &'static str, value: &serde_json::Value) -> Result<Self> {
        let invalid = || HarnessError::InvalidArgument {
            what,
            value: value.to_string(),
        };

        match value {
            serde_json::Value::String(s) => Ok(ArgList::Delimited(s.clone())),
            serde_json::Value::Array(items) => items
                .iter()
                .map(|item| item.as_str().map(str::to_string).ok_or_else(invalid))
                .collect::<Result<Vec<_>>>()
                .map(ArgList::Sequence),
            _ => Err(invalid()),
        }
    }

    /// The tokens in order, trimmed, with empty entries dropped.
    pub fn tokens(&self) -> Vec<String> {
        match self {
            ArgList::Delimited(raw) => raw.split_whitespace().map(str::to_string).collect(),
            ArgList::Sequence(items) => items
                .iter()
                .map(|item| item.trim())
                .filter(|item| !item.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }
}

impl From<&str> for ArgList {
    fn from(raw: &str) -> Self {
        ArgList::Delimited(raw.to_string())
    }
}

impl From<String> for ArgList {
    fn from(raw: String) -> Self {
        ArgList::Delimited(raw)
    }
}

impl From<Vec<String>> for ArgList {
    fn from(items: Vec<String>) -> Self {
        ArgList::Sequence(items)
    }
}

impl From<&[&str]> for ArgList {
    fn from(items: &[&str]) -> Self {
        ArgList::sequence(items.iter().copied())
    }
}

// ---------------------------------------------------------------------------
// BuildRequest
// ---------------------------------------------------------------------------

/// One build-tool invocation. Paths are sanitized by the runner, not here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
    /// Passed as `-f <file>` when set; otherwise the tool discovers its
    /// default build-file in `working_dir`.
    pub build_file: Option<PathBuf>,
    pub targets: Option<ArgList>,
    /// Appended after the targets.
    pub flags: Option<ArgList>,
    pub working_dir: PathBuf,
}

impl BuildRequest {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            build_file: None,
            targets: None,
            flags: None,
            working_dir: working_dir.into(),
        }
    }

    pub fn build_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.build_file = Some(path.into());
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
}

impl Default for BuildRequest {
    fn default() -> Self {
        Self::new(".")
    }
}

// ---------------------------------------------------------------------------
// BuildOutcome
// ---------------------------------------------------------------------------

/// Exit code plus fully captured output of one build-tool run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOutcome {
    /// Process exit code. On Unix a child killed by a signal reports the
    /// negated signal number.
    pub exit_code: i32,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl BuildOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    pub fn stdout_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }

    /// JSON view with both streams decoded lossily.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "exit_code": self.exit_code,
            "stdout": self.stdout_lossy(),
            "stderr": self.stderr_lossy(),
        })
    }
}

/// Renders the triple for human inspection: the exit code, then each stream
/// under its own header.
impl fmt::Display for BuildOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "exit code: {}", self.exit_code)?;
        writeln!(f, "--- stdout ---")?;
        write_stream(f, &self.stdout)?;
        writeln!(f, "--- stderr ---")?;
        write_stream(f, &self.stderr)
    }
}

fn write_stream(f: &mut fmt::Formatter<'_>, bytes: &[u8]) -> fmt::Result {
    let text = String::from_utf8_lossy(bytes);
    if text.is_empty() || text.ends_with('\n') {
        write!(f, "{text}")
    } else {
        writeln!(f, "{text}")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
