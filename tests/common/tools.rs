//! Build-tool stand-ins.
//!
//! `make` is not guaranteed on every machine the suite runs on, so most
//! harnesses drive plain POSIX tools through the runner instead.

use mkharness::ArgList;

/// `true` if a `make` binary answers `--version`.
pub fn make_available() -> bool {
    std::process::Command::new("make")
        .arg("--version")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Targets that turn `sh` into a one-command build tool: `sh -c <script>`.
/// Sequence form keeps the script's inner spaces intact.
pub fn sh_script(script: &str) -> ArgList {
    ArgList::sequence(["-c", script])
}
