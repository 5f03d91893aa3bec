//! Writing issued kubeconfigs to disk.

use std::fmt;
use std::fs::{self, Permissions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::document::Document;
use crate::error::{DocumentError, KubeconfigError};
use crate::lock::FileLock;
use crate::path::resolve_path;

type Confirm<'a> = Box<dyn Fn(&str) -> io::Result<bool> + 'a>;

/// How [`write_kubeconfig`] treats an existing file.
#[derive(Default)]
pub struct WriteOptions<'a> {
    overwrite: bool,
    switch_context: bool,
    confirm: Option<Confirm<'a>>,
}

impl fmt::Debug for WriteOptions<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriteOptions")
            .field("overwrite", &self.overwrite)
            .field("switch_context", &self.switch_context)
            .field("confirm", &self.confirm.is_some())
            .finish()
    }
}

impl<'a> WriteOptions<'a> {
    /// Merge without asking.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace an existing file instead of merging into it.
    #[must_use]
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Select the issued context even if the file already selects one.
    #[must_use]
    pub fn with_switch_context(mut self, switch_context: bool) -> Self {
        self.switch_context = switch_context;
        self
    }

    /// Ask before touching an existing file. Returning `false` leaves it as is.
    #[must_use]
    pub fn with_confirmation(mut self, confirm: impl Fn(&str) -> io::Result<bool> + 'a) -> Self {
        self.confirm = Some(Box::new(confirm));
        self
    }

    fn confirmed(&self, prompt: &str, path: &Path) -> Result<(), KubeconfigError> {
        let Some(confirm) = &self.confirm else {
            return Ok(());
        };
        if confirm(prompt).map_err(KubeconfigError::Prompt)? {
            Ok(())
        } else {
            Err(KubeconfigError::Declined(path.to_path_buf()))
        }
    }
}

/// Write `data` (YAML or JSON) to the kubeconfig at `path`, or at the default
/// location when `path` is `None`.
///
/// A missing file is created with mode `0600`. An existing file is either
/// replaced by `data` or merged with it, keeping its permissions.
///
/// Returns the absolute path written.
///
/// # Errors
///
/// Fails if `data` is empty or malformed, the existing file cannot be parsed,
/// the operator declines, or the filesystem refuses the write.
pub fn write_kubeconfig(
    path: Option<&Path>,
    data: &str,
    options: &WriteOptions<'_>,
) -> Result<PathBuf, KubeconfigError> {
    if data.trim().is_empty() {
        return Err(KubeconfigError::Empty);
    }
    let issued = Document::from_yaml(data)?;
    let path = resolve_path(path)?;

    let parent = path
        .parent()
        .ok_or_else(|| KubeconfigError::InvalidPath(path.display().to_string()))?;
    fs::create_dir_all(parent).map_err(KubeconfigError::Write)?;

    let _lock = FileLock::acquire(&path).map_err(KubeconfigError::Write)?;

    let existing = match fs::metadata(&path) {
        Ok(meta) => Some(meta.permissions()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => None,
        Err(e) => return Err(KubeconfigError::Write(e)),
    };

    let Some(permissions) = existing else {
        debug!(path = %path.display(), "creating kubeconfig");
        write_atomically(&path, data.as_bytes(), private_permissions())?;
        info!(path = %path.display(), "kubeconfig created");
        return Ok(path);
    };

    if options.overwrite {
        options.confirmed(
            &format!("Replace your kubeconfig {:?}?", path.display().to_string()),
            &path,
        )?;
        write_atomically(&path, data.as_bytes(), Some(permissions))?;
        info!(path = %path.display(), "kubeconfig replaced");
        return Ok(path);
    }

    options.confirmed(
        &format!("Update your kubeconfig {:?}?", path.display().to_string()),
        &path,
    )?;
    let current = fs::read_to_string(&path).map_err(|source| DocumentError::Read {
        path: path.clone(),
        source,
    })?;
    let mut document = Document::from_yaml(&current)?;
    document.merge(issued, options.switch_context);
    let rendered = document.to_yaml().map_err(DocumentError::Parse)?;
    write_atomically(&path, rendered.as_bytes(), Some(permissions))?;
    info!(path = %path.display(), "kubeconfig merged");
    Ok(path)
}

#[cfg(unix)]
fn private_permissions() -> Option<Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn private_permissions() -> Option<Permissions> {
    None
}

fn write_atomically(
    path: &Path,
    contents: &[u8],
    permissions: Option<Permissions>,
) -> Result<(), KubeconfigError> {
    let dir = path
        .parent()
        .ok_or_else(|| KubeconfigError::InvalidPath(path.display().to_string()))?;
    let mut tmp = NamedTempFile::new_in(dir).map_err(KubeconfigError::Write)?;
    tmp.write_all(contents).map_err(KubeconfigError::Write)?;
    tmp.as_file().sync_all().map_err(KubeconfigError::Write)?;
    if let Some(permissions) = permissions {
        tmp.as_file()
            .set_permissions(permissions)
            .map_err(KubeconfigError::Write)?;
    }
    tmp.persist(path)
        .map_err(|e| KubeconfigError::Write(e.error))?;
    Ok(())
}
