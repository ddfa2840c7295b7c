use anyhow::{Context, Result};
use secure_env::{Filesystem, ProjectVault};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub fn encrypt<F: Filesystem>(
    vault: &ProjectVault<F>,
    project: &str,
    source: &Path,
    password: &str,
) -> Result<PathBuf> {
    debug!(project, source = %source.display(), "encrypting project file");

    let artifact = vault
        .encrypt_project_file(project, source, password)
        .with_context(|| format!("failed to encrypt project '{project}'"))?;

    info!(project, artifact = %artifact.display(), "project encrypted");
    Ok(artifact)
}

pub fn decrypt<F: Filesystem>(
    vault: &ProjectVault<F>,
    project: &str,
    destination: &Path,
    password: &str,
) -> Result<()> {
    debug!(project, destination = %destination.display(), "decrypting project file");

    vault
        .decrypt_project_file(project, destination, password)
        .with_context(|| format!("failed to decrypt project '{project}'"))?;

    info!(project, "project decrypted");
    Ok(())
}

pub fn keys<F: Filesystem>(
    vault: &ProjectVault<F>,
    project: &str,
    password: &str,
) -> Result<Vec<String>> {
    let keys = vault
        .project_keys(project, password)
        .with_context(|| format!("failed to read project '{project}'"))?;

    debug!(project, count = keys.len(), "listed project keys");
    Ok(keys)
}
