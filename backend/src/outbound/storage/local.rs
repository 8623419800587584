//! `AttachmentStorage` writing into a directory on the local filesystem.
//!
//! File access goes through `cap_std::fs::Dir` handles opened on the upload
//! directory, so a stored name can never escape it. Blocking calls run on the
//! Tokio blocking pool.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use cap_std::{ambient_authority, fs::Dir};
use tracing::debug;

use crate::domain::ports::{AttachmentStorage, AttachmentStorageError};

/// Stores attachments as flat files under one directory.
#[derive(Debug, Clone)]
pub struct LocalAttachmentStorage {
    root: PathBuf,
}

impl LocalAttachmentStorage {
    /// Storage rooted at `root`. The directory is created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory files are written to.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

fn ensure_dir(root: &Path) -> io::Result<Dir> {
    Dir::create_ambient_dir_all(root, ambient_authority())?;
    #[cfg(unix)]
    {
        use cap_std::fs::{Permissions, PermissionsExt as _};
        if let (Some(parent), Some(leaf)) = (root.parent(), root.file_name()) {
            let parent = if parent.as_os_str().is_empty() {
                Path::new(".")
            } else {
                parent
            };
            Dir::open_ambient_dir(parent, ambient_authority())?
                .set_permissions(leaf, Permissions::from_mode(0o755))?;
        }
    }
    Dir::open_ambient_dir(root, ambient_authority())
}

fn checked_name(name: &str) -> Result<&str, AttachmentStorageError> {
    let plain = !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\']);
    if plain {
        Ok(name)
    } else {
        Err(AttachmentStorageError::io(name, "not a plain file name"))
    }
}

async fn blocking<T, F>(name: &str, task: F) -> Result<T, AttachmentStorageError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, AttachmentStorageError> + Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|err| AttachmentStorageError::io(name, err.to_string()))?
}

#[async_trait]
impl AttachmentStorage for LocalAttachmentStorage {
    async fn store(&self, name: &str, bytes: Vec<u8>) -> Result<(), AttachmentStorageError> {
        let file_name = checked_name(name)?.to_owned();
        let root = self.root.clone();
        blocking(name, move || {
            let dir = ensure_dir(&root).map_err(|err| {
                AttachmentStorageError::directory(format!("{}: {err}", root.display()))
            })?;
            dir.write(&file_name, &bytes)
                .map_err(|err| AttachmentStorageError::io(file_name.as_str(), err.to_string()))?;
            debug!(file = %file_name, size = bytes.len(), "stored attachment");
            Ok(())
        })
        .await
    }

    async fn read(&self, name: &str) -> Result<Option<Vec<u8>>, AttachmentStorageError> {
        let file_name = checked_name(name)?.to_owned();
        let root = self.root.clone();
        blocking(name, move || {
            let dir = match Dir::open_ambient_dir(&root, ambient_authority()) {
                Ok(dir) => dir,
                Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
                Err(err) => {
                    return Err(AttachmentStorageError::directory(format!(
                        "{}: {err}",
                        root.display()
                    )));
                }
            };
            match dir.read(&file_name) {
                Ok(bytes) => Ok(Some(bytes)),
                Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
                Err(err) => Err(AttachmentStorageError::io(file_name.as_str(), err.to_string())),
            }
        })
        .await
    }

    async fn remove(&self, name: &str) -> Result<(), AttachmentStorageError> {
        let file_name = checked_name(name)?.to_owned();
        let root = self.root.clone();
        blocking(name, move || {
            let dir = match Dir::open_ambient_dir(&root, ambient_authority()) {
                Ok(dir) => dir,
                Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(()),
                Err(err) => {
                    return Err(AttachmentStorageError::directory(format!(
                        "{}: {err}",
                        root.display()
                    )));
                }
            };
            match dir.remove_file(&file_name) {
                Ok(()) => Ok(()),
                Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
                Err(err) => Err(AttachmentStorageError::io(file_name.as_str(), err.to_string())),
            }
        })
        .await
    }
}
