use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The blob was copied from remote storage.
    Fetched,
    /// A local copy already existed; nothing was fetched.
    AlreadyPresent,
    /// No remote storage is configured.
    Skipped,
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("artifact `{0}` not found in remote storage")]
    NotInRemote(String),

    #[error("local artifact path {0} has no file name")]
    InvalidLocalPath(PathBuf),

    #[error("artifact sync I/O failed: {0}")]
    Io(#[from] io::Error),
}

/// Fetches the bundle blob to its local path before the store loads it.
pub trait ArtifactSync: Send + Sync {
    fn sync(&self, local: &Path) -> Result<SyncOutcome, SyncError>;
}

/// Remote storage exposed as a directory (a mounted bucket or a local mirror).
#[derive(Debug, Clone)]
pub struct MirrorSync {
    root: PathBuf,
}

impl MirrorSync {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ArtifactSync for MirrorSync {
    fn sync(&self, local: &Path) -> Result<SyncOutcome, SyncError> {
        if local.exists() {
            info!(path = %local.display(), "artifact already present locally; skipping sync");
            return Ok(SyncOutcome::AlreadyPresent);
        }

        let name = local
            .file_name()
            .ok_or_else(|| SyncError::InvalidLocalPath(local.to_path_buf()))?;
        let remote = self.root.join(name);
        if !remote.is_file() {
            return Err(SyncError::NotInRemote(remote.display().to_string()));
        }

        if let Some(parent) = local.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut partial = name.to_os_string();
        partial.push(".partial");
        let partial = local.with_file_name(partial);
        fs::copy(&remote, &partial)?;
        fs::rename(&partial, local)?;

        info!(from = %remote.display(), to = %local.display(), "fetched artifact bundle");
        Ok(SyncOutcome::Fetched)
    }
}

/// Used when no remote storage is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSync;

impl ArtifactSync for NoSync {
    fn sync(&self, local: &Path) -> Result<SyncOutcome, SyncError> {
        warn!(path = %local.display(), "no model mirror configured; skipping artifact sync");
        Ok(SyncOutcome::Skipped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetches_missing_blob_from_mirror() {
        let mirror = tempfile::tempdir().unwrap();
        let local_dir = tempfile::tempdir().unwrap();
        fs::write(mirror.path().join("no_show_model.json"), b"{}").unwrap();

        let local = local_dir.path().join("models/no_show_model.json");
        let outcome = MirrorSync::new(mirror.path()).sync(&local).unwrap();

        assert_eq!(outcome, SyncOutcome::Fetched);
        assert_eq!(fs::read(&local).unwrap(), b"{}");
    }

    #[test]
    fn existing_local_copy_is_kept() {
        let mirror = tempfile::tempdir().unwrap();
        let local_dir = tempfile::tempdir().unwrap();
        fs::write(mirror.path().join("m.json"), b"remote").unwrap();
        let local = local_dir.path().join("m.json");
        fs::write(&local, b"local").unwrap();

        let outcome = MirrorSync::new(mirror.path()).sync(&local).unwrap();
        assert_eq!(outcome, SyncOutcome::AlreadyPresent);
        assert_eq!(fs::read(&local).unwrap(), b"local");
    }

    #[test]
    fn absent_remote_blob_is_an_error() {
        let mirror = tempfile::tempdir().unwrap();
        let local_dir = tempfile::tempdir().unwrap();
        let err = MirrorSync::new(mirror.path())
            .sync(&local_dir.path().join("m.json"))
            .unwrap_err();
        assert!(matches!(err, SyncError::NotInRemote(_)));
    }

    #[test]
    fn no_sync_skips() {
        assert_eq!(NoSync.sync(Path::new("x.json")).unwrap(), SyncOutcome::Skipped);
    }
}
