//! Error taxonomy shared by every mkharness crate.

use std::path::PathBuf;
use std::time::Duration;

/// Convenience alias used throughout the library crates.
pub type Result<T> = std::result::Result<T, HarnessError>;

#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    /// `targets` or `flags` arrived in a shape that is neither a string nor a
    /// sequence of strings. Raised before any process is spawned.
    #[error("{what} could not be determined from {value}")]
    InvalidArgument { what: &'static str, value: String },

    /// A fixture the sandbox needs does not exist. Raised before any
    /// workspace directory is created.
    #[error("required fixture file does not exist: {}", path.display())]
    PreconditionFailed { path: PathBuf },

    /// The build tool could not be launched at all (usually: not on `PATH`).
    #[error("failed to launch build tool `{tool}`")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    /// The build tool outlived the configured timeout and was killed along
    /// with every process it started.
    #[error("build tool `{tool}` exceeded timeout of {timeout:?}")]
    Timeout { tool: String, timeout: Duration },

    #[error("{context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration")]
    Config(#[from] config::ConfigError),
}

impl HarnessError {
    /// Wrap an I/O error with a short description of what was being done.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        HarnessError::Io {
            context: context.into(),
            source,
        }
    }
}
