//! Per-project storage of encrypted env files.

use std::path::{Path, PathBuf};

use zeroize::Zeroizing;

use crate::crypto;
use crate::error::{CryptoError, VaultError};
use crate::fs::{Filesystem, OsFilesystem, Permissions};

/// File name of the encrypted artifact inside a project directory.
pub const ARTIFACT_FILE_NAME: &str = ".env.enc";

/// Maps project names to one encrypted artifact each.
///
/// A project `name` lives in the directory `root/name` and owns exactly one
/// file, `root/name/.env.enc`. The vault keeps no secrets between calls: the
/// password is passed to every operation and dropped when it returns.
#[derive(Debug, Clone)]
pub struct ProjectVault<F = OsFilesystem> {
    root: PathBuf,
    fs: F,
    permissions: Permissions,
}

impl ProjectVault {
    /// Creates a vault rooted at `root` on the OS filesystem with default modes.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_filesystem(root, OsFilesystem, Permissions::default())
    }
}

impl<F: Filesystem> ProjectVault<F> {
    pub fn with_filesystem(root: impl Into<PathBuf>, fs: F, permissions: Permissions) -> Self {
        Self {
            root: root.into(),
            fs,
            permissions,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the directory backing `project`.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::InvalidProjectName`] for a blank name.
    pub fn project_dir(&self, project: &str) -> Result<PathBuf, VaultError> {
        if project.trim().is_empty() {
            return Err(VaultError::InvalidProjectName);
        }
        Ok(self.root.join(project))
    }

    /// Returns the location of the encrypted artifact of `project`.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::InvalidProjectName`] for a blank name.
    pub fn artifact_path(&self, project: &str) -> Result<PathBuf, VaultError> {
        Ok(self.project_dir(project)?.join(ARTIFACT_FILE_NAME))
    }

    /// Returns `true` if `project` has been encrypted before.
    pub fn has_artifact(&self, project: &str) -> bool {
        self.artifact_path(project).is_ok_and(|path| self.fs.is_file(&path))
    }

    /// Encrypts the file at `source` into the artifact of `project`.
    ///
    /// The project directory is created if needed and any previous artifact
    /// is replaced. Returns the path of the written artifact.
    ///
    /// # Errors
    ///
    /// * [`VaultError::SourceRead`] if `source` cannot be read.
    /// * [`VaultError::Directory`] if the project directory cannot be created.
    /// * [`VaultError::Crypto`] if encryption fails (e.g. an empty password).
    /// * [`VaultError::ArtifactWrite`] if the artifact cannot be written.
    pub fn encrypt_project_file(
        &self,
        project: &str,
        source: &Path,
        password: &str,
    ) -> Result<PathBuf, VaultError> {
        let dir = self.project_dir(project)?;

        let plaintext = self
            .fs
            .read(source)
            .map(Zeroizing::new)
            .map_err(|err| VaultError::SourceRead {
                path: source.to_path_buf(),
                source: err,
            })?;

        self.fs
            .create_dir_all(&dir, self.permissions.directory)
            .map_err(|source| VaultError::Directory {
                path: dir.clone(),
                source,
            })?;

        let blob = crypto::encrypt(&plaintext, password)?;
        drop(plaintext);

        let artifact = dir.join(ARTIFACT_FILE_NAME);
        self.fs
            .write_atomic(&artifact, blob.as_bytes(), self.permissions.artifact)
            .map_err(|source| VaultError::ArtifactWrite {
                path: artifact.clone(),
                source,
            })?;

        Ok(artifact)
    }

    /// Decrypts the artifact of `project` into `destination`.
    ///
    /// `destination` is only touched once decryption has succeeded, and then
    /// replaced as a whole.
    ///
    /// # Errors
    ///
    /// * [`VaultError::ArtifactRead`] if the project has no artifact.
    /// * [`VaultError::Crypto`] if the password is wrong or the artifact is damaged.
    /// * [`VaultError::DestinationWrite`] if `destination` cannot be written.
    pub fn decrypt_project_file(
        &self,
        project: &str,
        destination: &Path,
        password: &str,
    ) -> Result<(), VaultError> {
        let plaintext = self.open_artifact(project, password)?;

        self.fs
            .write_atomic(destination, &plaintext, self.permissions.plaintext)
            .map_err(|source| VaultError::DestinationWrite {
                path: destination.to_path_buf(),
                source,
            })
    }

    /// Lists the variable names stored in the artifact of `project`.
    ///
    /// The payload is decrypted in memory only; nothing is written.
    ///
    /// # Errors
    ///
    /// Same as [`ProjectVault::decrypt_project_file`] for reading and
    /// decryption, plus [`VaultError::EnvParse`] if the payload is not a
    /// valid env file.
    pub fn project_keys(&self, project: &str, password: &str) -> Result<Vec<String>, VaultError> {
        let plaintext = self.open_artifact(project, password)?;

        let mut keys = Vec::new();
        for item in dotenvy::from_read_iter(plaintext.as_slice()) {
            let (key, value) = item.map_err(VaultError::EnvParse)?;
            drop(Zeroizing::new(value));
            keys.push(key);
        }
        Ok(keys)
    }

    fn open_artifact(
        &self,
        project: &str,
        password: &str,
    ) -> Result<Zeroizing<Vec<u8>>, VaultError> {
        let artifact = self.artifact_path(project)?;

        let data = self
            .fs
            .read(&artifact)
            .map_err(|source| VaultError::ArtifactRead {
                path: artifact.clone(),
                source,
            })?;

        let text = std::str::from_utf8(&data).map_err(|_| CryptoError::Encoding)?;
        Ok(crypto::decrypt(text.trim_ascii(), password)?)
    }
}
