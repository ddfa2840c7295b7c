//! Error types for the cipher and the project vault.

use std::io;
use std::path::PathBuf;

/// Failures of the password-based cipher.
///
/// A wrong password and a tampered blob both surface as
/// [`CryptoError::Authentication`]; the two cases are not distinguishable.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("password cannot be empty")]
    EmptyPassword,

    #[error("ciphertext is not valid base64")]
    Encoding,

    #[error("ciphertext too short: {len} bytes, need at least {min}")]
    MalformedCiphertext { len: usize, min: usize },

    #[error("invalid password or corrupted data")]
    Authentication,

    #[error("OS random generator unavailable")]
    Random,

    #[error("encryption failed")]
    Encryption,
}

/// Failures of project vault operations.
#[derive(Debug, thiserror::Error)]
pub enum VaultError {
    #[error("project name cannot be empty")]
    InvalidProjectName,

    #[error("error reading file '{}'", path.display())]
    SourceRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("error creating directory '{}'", path.display())]
    Directory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("error writing encrypted file '{}'", path.display())]
    ArtifactWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("error reading encrypted file '{}'", path.display())]
    ArtifactRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("error creating file '{}'", path.display())]
    DestinationWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("decrypted payload is not a valid env file")]
    EnvParse(#[source] dotenvy::Error),

    #[error(transparent)]
    Crypto(#[from] CryptoError),
}
