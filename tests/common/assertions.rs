//! Domain-specific assertion macros for mkharness harnesses.
//!
//! Failures print the whole `(exit code, stdout, stderr)` triple so a broken
//! build can be diagnosed from the test log alone.

/// Assert that a build exited 0.
#[macro_export]
macro_rules! assert_build_ok {
    ($outcome:expr) => {{
        let outcome: &mkharness::BuildOutcome = &$outcome;
        if !outcome.success() {
            panic!("assert_build_ok! failed:\n{}", outcome);
        }
    }};
}

/// Assert that a build exited with a specific code.
#[macro_export]
macro_rules! assert_exit_code {
    ($outcome:expr, $code:expr) => {{
        let outcome: &mkharness::BuildOutcome = &$outcome;
        let code: i32 = $code;
        if outcome.exit_code != code {
            panic!(
                "assert_exit_code! failed: expected {}, got {}\n{}",
                code, outcome.exit_code, outcome
            );
        }
    }};
}

/// Assert that a workspace directory is gone.
#[macro_export]
macro_rules! assert_workspace_removed {
    ($path:expr) => {{
        let path: &std::path::Path = $path.as_ref();
        if path.exists() {
            panic!(
                "assert_workspace_removed! failed: {} still exists",
                path.display()
            );
        }
    }};
}

/// Skip the calling test (by returning early) when `make` is missing.
#[macro_export]
macro_rules! require_make {
    () => {
        if !make_available() {
            eprintln!("skipping: `make` not found on PATH");
            return;
        }
    };
}
