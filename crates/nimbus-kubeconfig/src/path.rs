//! Kubeconfig path resolution.

use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

use path_absolutize::Absolutize;

use crate::error::KubeconfigError;

/// Check that `path` can hold a kubeconfig and make it absolute.
///
/// # Errors
///
/// Returns [`KubeconfigError::InvalidPath`] for an empty path and for any
/// path that cleans to `.`, `..` or the filesystem root, such as `./`,
/// `a/..` or `//`.
pub fn validate_path(path: &Path) -> Result<PathBuf, KubeconfigError> {
    if path.as_os_str().is_empty() || !names_a_file(path) {
        return Err(KubeconfigError::InvalidPath(path.display().to_string()));
    }

    let absolute = path
        .absolutize()
        .map_err(|e| KubeconfigError::InvalidPath(format!("{}: {e}", path.display())))?;
    if absolute.parent().is_none() {
        return Err(KubeconfigError::InvalidPath(path.display().to_string()));
    }
    Ok(absolute.into_owned())
}

/// Whether `path`, cleaned lexically, still ends in a file name.
fn names_a_file(path: &Path) -> bool {
    let mut names = 0_usize;
    let mut last_is_name = false;
    for component in path.components() {
        match component {
            Component::Normal(_) => {
                names += 1;
                last_is_name = true;
            }
            Component::ParentDir if names > 0 => {
                names -= 1;
                last_is_name = names > 0;
            }
            Component::ParentDir => last_is_name = false,
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
        }
    }
    last_is_name
}

/// The default kubeconfig location.
///
/// The first non-empty entry of `KUBECONFIG` wins, then `~/.kube/config`.
///
/// # Errors
///
/// Returns [`KubeconfigError::InvalidPath`] when neither is available.
pub fn default_path() -> Result<PathBuf, KubeconfigError> {
    let env = std::env::var_os("KUBECONFIG");
    default_path_from(env.as_deref(), dirs::home_dir().as_deref())
}

fn default_path_from(
    kubeconfig_env: Option<&OsStr>,
    home: Option<&Path>,
) -> Result<PathBuf, KubeconfigError> {
    if let Some(path) = kubeconfig_env
        .into_iter()
        .flat_map(std::env::split_paths)
        .find(|p| !p.as_os_str().is_empty())
    {
        return Ok(path);
    }
    home.map(|h| h.join(".kube").join("config")).ok_or_else(|| {
        KubeconfigError::InvalidPath("cannot determine the home directory".to_string())
    })
}

/// Resolve the target file: `requested` when given, the default otherwise.
///
/// # Errors
///
/// Returns [`KubeconfigError::InvalidPath`] if the result cannot hold a
/// kubeconfig.
pub fn resolve_path(requested: Option<&Path>) -> Result<PathBuf, KubeconfigError> {
    match requested {
        Some(path) => validate_path(path),
        None => validate_path(&default_path()?),
    }
}
