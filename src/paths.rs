use crate::env::EnvironmentView;
use crate::error::{Result, SbError};
use std::path::{Component, Path, PathBuf};

/// Replace a leading `~/` with the home directory.
///
/// Only the two-character `~/` prefix is recognised; `~` on its own and
/// `~user/...` pass through untouched.
pub fn expand_home(raw: &str, home: Option<&Path>) -> Result<PathBuf> {
    match raw.strip_prefix("~/") {
        Some(rest) => {
            let home = home.ok_or(SbError::HomeNotFound)?;
            Ok(home.join(rest))
        }
        None => Ok(PathBuf::from(raw)),
    }
}

/// Expand `~/` and make the result absolute against the environment's cwd.
pub fn tilde_expand(raw: &str, env: &EnvironmentView) -> Result<PathBuf> {
    let expanded = expand_home(raw, env.home.as_deref())?;
    if expanded.is_absolute() {
        return Ok(normalize(&expanded));
    }

    let cwd = match &env.cwd {
        Some(cwd) => cwd.clone(),
        None => std::env::current_dir().map_err(|source| SbError::InvalidPath {
            path: raw.to_string(),
            source,
        })?,
    };
    Ok(normalize(&cwd.join(expanded)))
}

/// Lexically clean a path: drop `.` components, fold `..` into its parent,
/// and lose any trailing separator. Symlinks are not consulted.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() && !out.has_root() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}
