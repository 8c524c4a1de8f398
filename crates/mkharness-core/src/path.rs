//! Path sanitizing for user-supplied build-file, library and directory paths.
//!
//! [`sanitize`] is a pure string transform apart from reading `$HOME`, the
//! environment and the current directory: it never checks that the path
//! exists.

use crate::error::{HarnessError, Result};
use std::borrow::Cow;
use std::path::{Component, Path, PathBuf};

/// Turn a user-supplied path into a canonical absolute path.
///
/// In order: a leading `~` is expanded to the home directory, `$VAR` and
/// `${VAR}` references are expanded (unknown variables stay as written), the
/// result is made absolute against the current directory and then
/// normalized lexically. Symlinks are not resolved.
///
/// Sanitizing an already sanitized path returns it unchanged.
pub fn sanitize(path: impl AsRef<Path>) -> Result<PathBuf> {
    let path = path.as_ref();
    let expanded = match path.to_str() {
        Some(raw) => PathBuf::from(expand(raw).into_owned()),
        None => path.to_path_buf(),
    };

    let absolute = if expanded.is_absolute() {
        expanded
    } else {
        let cwd = std::env::current_dir()
            .map_err(|e| HarnessError::io("failed to read current directory", e))?;
        cwd.join(expanded)
    };

    Ok(normalize(&absolute))
}

fn expand(raw: &str) -> Cow<'_, str> {
    shellexpand::full_with_context_no_errors(
        raw,
        || dirs::home_dir().and_then(|home| home.to_str().map(str::to_string)),
        |var: &str| std::env::var(var).ok(),
    )
}

/// Lexical normalization of an absolute path: drops `.` segments and repeated
/// separators and folds `..` into its parent. `..` above the root stays at
/// the root.
pub(crate) fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => out.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            Component::Normal(segment) => out.push(segment),
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
