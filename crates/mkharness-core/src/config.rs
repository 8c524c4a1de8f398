//! Configuration types for mkharness.
//!
//! [`Config::load`] layers, in order: the embedded defaults, an optional TOML
//! file, and `MKHARNESS_<SECTION>__<KEY>` environment variables.
//! [`Config::defaults`] returns the embedded defaults without touching the
//! filesystem or the environment (useful in tests).

use crate::error::Result;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

// ---------------------------------------------------------------------------
// Embedded defaults
// ---------------------------------------------------------------------------

const DEFAULT_CONFIG: &str = r#"
[build]
tool         = "make"
timeout_secs = 0

[sandbox]
root            = "."
prefix          = "_tmp_"
build_file_name = "Makefile"
"#;

const ENV_PREFIX: &str = "MKHARNESS";

// ---------------------------------------------------------------------------
// Public config types
// ---------------------------------------------------------------------------

/// Top-level harness configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub build: BuildConfig,
    #[serde(default)]
    pub sandbox: SandboxConfig,
}

/// `[build]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct BuildConfig {
    /// Executable invoked by the runner. Looked up on `PATH`.
    #[serde(default = "default_tool")]
    pub tool: String,
    /// Kill the build tool after this many seconds. `0` waits forever.
    #[serde(default)]
    pub timeout_secs: u64,
}

fn default_tool() -> String { "make".to_string() }

impl BuildConfig {
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            tool: default_tool(),
            timeout_secs: 0,
        }
    }
}

/// `[sandbox]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct SandboxConfig {
    /// Directory under which workspaces are created.
    #[serde(default = "default_root")]
    pub root: PathBuf,
    /// Workspace directory names are `<prefix><token>`.
    #[serde(default = "default_prefix")]
    pub prefix: String,
    /// Name the build-file is copied to, so the tool finds it without `-f`.
    #[serde(default = "default_build_file_name")]
    pub build_file_name: String,
}

fn default_root() -> PathBuf { PathBuf::from(".") }
fn default_prefix() -> String { "_tmp_".to_string() }
fn default_build_file_name() -> String { "Makefile".to_string() }

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            prefix: default_prefix(),
            build_file_name: default_build_file_name(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::defaults()
    }
}

impl Config {
    /// Load the layered configuration. `path` overrides the per-user file at
    /// `$XDG_CONFIG_HOME/mkharness/config.toml`; an explicit path must exist,
    /// the per-user file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::from(config_path().as_path()).required(false),
        };

        let cfg = config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .add_source(file)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;
        Ok(cfg)
    }

    /// Return the built-in defaults without touching the filesystem.
    pub fn defaults() -> Self {
        config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .build()
            .expect("built-in default config must be valid TOML")
            .try_deserialize()
            .expect("built-in default config must deserialize correctly")
    }
}

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

fn config_path() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".to_string()))
                .join(".config")
        })
        .join("mkharness")
        .join("config.toml")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
