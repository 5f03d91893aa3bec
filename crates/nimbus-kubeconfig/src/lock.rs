//! Advisory lock held while a kubeconfig is rewritten.
//!
//! The lock lives on a sidecar `<file>.lock` because the kubeconfig itself is
//! replaced by rename. The sidecar is left in place after release so that
//! every writer locks the same inode.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

/// Exclusive lock, released on drop.
#[derive(Debug)]
pub(crate) struct FileLock {
    #[cfg(unix)]
    _guard: nix::fcntl::Flock<File>,
    #[cfg(not(unix))]
    _file: File,
    path: PathBuf,
}

impl FileLock {
    /// Block until the lock for `target` is held.
    pub(crate) fn acquire(target: &Path) -> io::Result<Self> {
        let path = lock_path(target);
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)?;

        #[cfg(unix)]
        let lock = {
            use nix::fcntl::{Flock, FlockArg};
            let guard = Flock::lock(file, FlockArg::LockExclusive)
                .map_err(|(_, errno)| io::Error::from(errno))?;
            Self {
                _guard: guard,
                path,
            }
        };
        #[cfg(not(unix))]
        let lock = Self { _file: file, path };

        debug!(path = %lock.path.display(), "kubeconfig lock acquired");
        Ok(lock)
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        debug!(path = %self.path.display(), "kubeconfig lock released");
    }
}

fn lock_path(target: &Path) -> PathBuf {
    let mut name = target.as_os_str().to_owned();
    name.push(".lock");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_path_is_a_sidecar() {
        assert_eq!(
            lock_path(Path::new("/home/op/.kube/config")),
            PathBuf::from("/home/op/.kube/config.lock")
        );
    }

    #[test]
    fn lock_can_be_reacquired_after_release() {
        let dir = tempfile::tempdir().expect("tempdir");
        let target = dir.path().join("config");
        drop(FileLock::acquire(&target).expect("first"));
        drop(FileLock::acquire(&target).expect("second"));
        assert!(dir.path().join("config.lock").exists());
    }
}
